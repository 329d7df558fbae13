use regex::Regex;
use std::fmt;

/// A single way of recognising a channel as belonging to a category.
/// All variants match case-insensitively.
#[derive(Debug, Clone)]
pub enum CategoryRule {
    /// Display name equals this text
    ExactName(String),
    /// Text occurs anywhere in the match haystack
    Substring(String),
    /// Pattern matches anywhere in the match haystack
    RegexPattern(Regex),
}

impl CategoryRule {
    /// Short name used in config and logs
    pub fn kind(&self) -> &'static str {
        match self {
            CategoryRule::ExactName(_) => "exact",
            CategoryRule::Substring(_) => "contains",
            CategoryRule::RegexPattern(_) => "regex",
        }
    }

    /// Rule text as configured (pattern source for regex rules)
    pub fn text(&self) -> &str {
        match self {
            CategoryRule::ExactName(text) | CategoryRule::Substring(text) => text,
            CategoryRule::RegexPattern(regex) => regex.as_str(),
        }
    }

    /// Rule text usable as a channel name for approximate matching.
    /// Regex sources are patterns, not names.
    pub fn name_candidate(&self) -> Option<&str> {
        match self {
            CategoryRule::ExactName(text) | CategoryRule::Substring(text) => Some(text),
            CategoryRule::RegexPattern(_) => None,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, CategoryRule::ExactName(_))
    }
}

impl PartialEq for CategoryRule {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.text() == other.text()
    }
}

impl fmt::Display for CategoryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\"{}\"", self.kind(), self.text())
    }
}

/// Named classification bucket with its ordered match rules
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub(crate) name: String,
    pub(crate) rules: Vec<CategoryRule>,
}

impl Category {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

/// Outcome of classifying one entry. Borrowed from the registry that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassificationResult<'r> {
    pub category: Option<&'r Category>,
    pub matched_rule: Option<&'r CategoryRule>,
    /// Similarity of the winning candidate (approximate mode only)
    pub score: Option<f64>,
}

impl<'r> ClassificationResult<'r> {
    pub fn unmatched() -> Self {
        Self::default()
    }

    pub fn matched_by(category: &'r Category, rule: &'r CategoryRule) -> Self {
        Self {
            category: Some(category),
            matched_rule: Some(rule),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn matched(&self) -> bool {
        self.category.is_some()
    }

    pub fn category_name(&self) -> Option<&'r str> {
        self.category.map(Category::name)
    }
}
