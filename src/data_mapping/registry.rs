//! Category registry: the configured categories and their match rules
//!
//! The registry is built once from [`CategoryDefinition`]s and never mutated
//! afterwards, so any number of classifier threads can read it concurrently.
//! Registry order (category position, then rule position) is the order in
//! which matches are reported.

use regex::RegexBuilder;
use std::collections::HashSet;
use tracing::debug;

use crate::config::{validate_category_name, CategoryDefinition, RuleDefinition};
use crate::errors::{ConfigResult, ConfigurationError};
use crate::models::{Category, CategoryRule};

/// Prepared text an entry is matched on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchInput {
    display_name: String,
    haystack: String,
    folded_haystack: String,
}

impl MatchInput {
    /// `display_name` is checked by exact rules; `haystack` by contains/regex rules
    pub fn new(display_name: &str, haystack: &str) -> Self {
        Self {
            display_name: display_name.trim().to_lowercase(),
            haystack: haystack.to_string(),
            folded_haystack: haystack.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
    /// Lowercased rule text, aligned with each category's rules
    folded_rules: Vec<Vec<String>>,
}

impl CategoryRegistry {
    /// Validate definitions and compile regex rules
    pub fn build(definitions: &[CategoryDefinition]) -> ConfigResult<Self> {
        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(definitions.len());
        let mut folded_rules = Vec::with_capacity(definitions.len());

        for (position, definition) in definitions.iter().enumerate() {
            let name = definition.name.trim();
            if name.is_empty() {
                return Err(ConfigurationError::EmptyCategoryName { position });
            }
            validate_category_name("categories.name", name)?;
            if !seen.insert(name.to_lowercase()) {
                return Err(ConfigurationError::DuplicateCategory {
                    name: name.to_string(),
                });
            }

            let mut rules = Vec::with_capacity(definition.rules.len());
            let mut folded = Vec::with_capacity(definition.rules.len());
            for rule in &definition.rules {
                let compiled = Self::compile_rule(name, rule)?;
                folded.push(match &compiled {
                    CategoryRule::RegexPattern(_) => String::new(),
                    other => other.text().to_lowercase(),
                });
                rules.push(compiled);
            }

            categories.push(Category {
                name: name.to_string(),
                rules,
            });
            folded_rules.push(folded);
        }

        let registry = Self {
            categories,
            folded_rules,
        };
        debug!(
            "Built category registry with {} categories and {} rules",
            registry.len(),
            registry.rules().count()
        );
        Ok(registry)
    }

    fn compile_rule(category: &str, rule: &RuleDefinition) -> ConfigResult<CategoryRule> {
        let (kind, text) = match rule {
            RuleDefinition::Exact(text) => ("exact", text),
            RuleDefinition::Contains(text) => ("contains", text),
            RuleDefinition::Regex(text) => ("regex", text),
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(ConfigurationError::EmptyRule {
                category: category.to_string(),
                kind: kind.to_string(),
            });
        }

        Ok(match rule {
            RuleDefinition::Exact(_) => CategoryRule::ExactName(text.to_string()),
            RuleDefinition::Contains(_) => CategoryRule::Substring(text.to_string()),
            RuleDefinition::Regex(_) => {
                let regex = RegexBuilder::new(text)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ConfigurationError::InvalidPattern {
                        category: category.to_string(),
                        pattern: text.to_string(),
                        source,
                    })?;
                CategoryRule::RegexPattern(regex)
            }
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Every (category, rule) pair in registry order
    pub fn rules(&self) -> impl Iterator<Item = (&Category, &CategoryRule)> {
        self.categories
            .iter()
            .flat_map(|category| category.rules.iter().map(move |rule| (category, rule)))
    }

    /// Every (category, rule) pair whose rule matches `input`, in registry order
    pub fn lookup<'r, 'i>(
        &'r self,
        input: &'i MatchInput,
    ) -> impl Iterator<Item = (&'r Category, &'r CategoryRule)> + 'i
    where
        'r: 'i,
    {
        self.categories
            .iter()
            .zip(self.folded_rules.iter())
            .flat_map(move |(category, folded)| {
                category
                    .rules
                    .iter()
                    .zip(folded.iter())
                    .filter(move |(rule, folded_text)| Self::rule_matches(rule, folded_text, input))
                    .map(move |(rule, _)| (category, rule))
            })
    }

    fn rule_matches(rule: &CategoryRule, folded_text: &str, input: &MatchInput) -> bool {
        match rule {
            CategoryRule::ExactName(_) => input.display_name == folded_text,
            CategoryRule::Substring(_) => input.folded_haystack.contains(folded_text),
            CategoryRule::RegexPattern(regex) => regex.is_match(&input.haystack),
        }
    }
}
