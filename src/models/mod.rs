use serde::Serialize;
use std::fmt;

pub mod data_mapping;

pub use data_mapping::{Category, CategoryRule, ClassificationResult};

/// Directive that starts a channel metadata line
pub const EXTINF_DIRECTIVE: &str = "#EXTINF";

/// Playlist header directive
pub const EXTM3U_HEADER: &str = "#EXTM3U";

/// Per-entry directives seen between `#EXTINF` and the stream URL. Any other
/// `#` line in that position is carried along the same way.
pub const ENTRY_OPTION_DIRECTIVES: &[&str] = &["#EXTVLCOPT:", "#KODIPROP:", "#EXTGRP:"];

/// Duration written when the source line carried none
pub const DEFAULT_DURATION: &str = "-1";

pub const GROUP_TITLE: &str = "group-title";
pub const TVG_ID: &str = "tvg-id";
pub const TVG_NAME: &str = "tvg-name";
pub const TVG_LOGO: &str = "tvg-logo";

/// Ordered `key="value"` attributes of an `#EXTINF` line.
///
/// Keys compare case-insensitively and keep their source spelling; source
/// order is preserved so a rewrite can serialize attributes back in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtinfAttributes {
    pairs: Vec<(String, String)>,
}

impl ExtinfAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the first attribute named `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Value of `key` when present and not blank
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Append an attribute unless the key is already present.
    /// Returns false for a duplicate, which is then ignored.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.pairs.push((key, value.into()));
        true
    }

    /// Replace the value of `key` in place, or append it
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some((_, v)) => *v = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Remove every attribute named `key`, returning the first value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let mut removed = None;
        self.pairs.retain(|(k, v)| {
            if k.eq_ignore_ascii_case(key) {
                if removed.is_none() {
                    removed = Some(v.clone());
                }
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// One playlist record: an `#EXTINF` metadata line and its stream URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// 1-based line number of the metadata line in the source text
    pub line_number: usize,
    /// Metadata line as read (surrounding whitespace trimmed)
    pub raw: String,
    /// Duration/flag token after the directive, e.g. `-1`
    pub duration: Option<String>,
    pub attributes: ExtinfAttributes,
    /// Text after the title separator comma, trimmed
    pub title: String,
    /// Directive lines (`#EXTVLCOPT:`, `#KODIPROP:`, `#EXTGRP:`, ...) attached to this entry
    pub options: Vec<String>,
    /// Stream URL, empty when the source had none
    pub url: String,
}

impl Entry {
    pub fn tvg_id(&self) -> Option<&str> {
        self.attributes.get(TVG_ID)
    }

    pub fn tvg_name(&self) -> Option<&str> {
        self.attributes.get(TVG_NAME)
    }

    pub fn tvg_logo(&self) -> Option<&str> {
        self.attributes.get(TVG_LOGO)
    }

    pub fn group_title(&self) -> Option<&str> {
        self.attributes.get(GROUP_TITLE)
    }

    pub fn has_url(&self) -> bool {
        !self.url.is_empty()
    }
}

/// What was wrong with a line the parser tolerated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Metadata line not followed by a stream URL
    MissingUrl,
    /// Attribute token that is not a well-formed `key="value"`
    MalformedAttribute(String),
    /// No title separator comma on the metadata line
    MissingDisplayName,
}

/// Non-fatal irregularity found while parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseAnomaly {
    pub line_number: usize,
    #[serde(flatten)]
    pub kind: AnomalyKind,
}

impl fmt::Display for ParseAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AnomalyKind::MissingUrl => write!(f, "line {}: entry has no stream URL", self.line_number),
            AnomalyKind::MalformedAttribute(fragment) => write!(
                f,
                "line {}: malformed attribute `{}`",
                self.line_number, fragment
            ),
            AnomalyKind::MissingDisplayName => {
                write!(f, "line {}: no display name after comma", self.line_number)
            }
        }
    }
}

/// Parsed playlist
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Playlist {
    /// `#EXTM3U` header line as found in the source
    pub header: Option<String>,
    pub entries: Vec<Entry>,
    pub anomalies: Vec<ParseAnomaly>,
}
