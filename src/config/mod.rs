use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::errors::{ConfigResult, ConfigurationError};

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    pub matching: MatchingConfig,
    #[serde(default)]
    pub categories: Vec<CategoryDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    /// Replaces the source playlist's `#EXTM3U` header line
    pub header: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_repo_path")]
    pub repo_path: PathBuf,
    /// `{timestamp}` is replaced with the commit time (RFC 3339)
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    #[serde(default = "default_true")]
    pub pull_before_push: bool,
}

/// Settings consumed by the classification engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub mode: MatchMode,
    #[serde(default)]
    pub substring_target: MatchTarget,
    #[serde(default)]
    pub name_source: NameSource,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default)]
    pub tie_break: TieBreak,
    #[serde(default = "default_noise_patterns")]
    pub noise_patterns: Vec<String>,
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Required: there is no implicit policy for unmatched channels
    pub unmatched: UnmatchedPolicy,
}

impl MatchingConfig {
    /// Settings with defaults for everything except the unmatched policy
    pub fn new(mode: MatchMode, unmatched: UnmatchedPolicy) -> Self {
        Self {
            mode,
            substring_target: MatchTarget::default(),
            name_source: NameSource::default(),
            similarity_threshold: default_similarity_threshold(),
            tie_break: TieBreak::default(),
            noise_patterns: default_noise_patterns(),
            parallel: true,
            unmatched,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigurationError::InvalidThreshold {
                value: self.similarity_threshold,
            });
        }
        if let UnmatchedPolicy::TagAs(name) = &self.unmatched {
            validate_category_name("unmatched.tag_as", name)?;
        }
        Ok(())
    }
}

/// Matching strength tier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Display name equals an exact rule
    Exact,
    /// Contains/regex rules found in the haystack
    #[default]
    #[serde(alias = "regex", alias = "substring_regex")]
    #[value(alias = "regex")]
    Substring,
    /// Normalized edit-distance similarity against all rule names
    #[serde(alias = "fuzzy")]
    #[value(alias = "fuzzy")]
    Approximate,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchMode::Exact => "exact",
            MatchMode::Substring => "substring",
            MatchMode::Approximate => "approximate",
        };
        f.write_str(name)
    }
}

/// Text that contains/regex rules are searched in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTarget {
    /// Whole metadata line minus its category attribute
    #[default]
    MetadataLine,
    DisplayName,
}

/// Which name exact and approximate matching read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    /// Text after the title comma only
    Title,
    /// `tvg-name` when set, otherwise the title
    #[default]
    PreferAttribute,
}

/// Ordering used to settle equal approximate scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Category position, then rule position
    #[default]
    RegistryOrder,
    /// Normalized rule text, then registry order
    Lexicographic,
}

/// What to do with an entry no category claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Omit both lines from the output
    Drop,
    /// Emit the entry exactly as read
    Passthrough,
    /// Rewrite the entry into this category
    TagAs(String),
}

impl FromStr for UnmatchedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "drop" => Ok(UnmatchedPolicy::Drop),
            "passthrough" | "pass" => Ok(UnmatchedPolicy::Passthrough),
            other => other
                .strip_prefix("tag:")
                .or_else(|| other.strip_prefix("tag="))
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| UnmatchedPolicy::TagAs(name.to_string()))
                .ok_or_else(|| {
                    format!("unknown unmatched policy '{other}' (expected drop, passthrough or tag:<name>)")
                }),
        }
    }
}

impl fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedPolicy::Drop => f.write_str("drop"),
            UnmatchedPolicy::Passthrough => f.write_str("passthrough"),
            UnmatchedPolicy::TagAs(name) => write!(f, "tag:{name}"),
        }
    }
}

/// Declarative source of one registry category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl CategoryDefinition {
    pub fn new(name: impl Into<String>, rules: Vec<RuleDefinition>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleDefinition {
    Exact(String),
    #[serde(alias = "substring")]
    Contains(String),
    Regex(String),
}

/// Category names end up inside a quoted attribute value
pub(crate) fn validate_category_name(field: &str, name: &str) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigurationError::invalid_value(field, "name is empty"));
    }
    if name.contains('"') || name.contains('\n') {
        return Err(ConfigurationError::invalid_value(
            field,
            format!("'{name}' contains a quote or newline"),
        ));
    }
    Ok(())
}

impl Config {
    pub fn load_from_file(config_file: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = config_file.as_ref();
        if !path.exists() {
            return Err(ConfigurationError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            "Loaded configuration from {} ({} categories)",
            path.display(),
            config.categories.len()
        );
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Write the starter template. Refuses to overwrite unless `force` is set.
    pub fn write_template(path: impl AsRef<Path>, force: bool) -> ConfigResult<()> {
        let path = path.as_ref();
        if path.exists() && !force {
            return Err(ConfigurationError::invalid_value(
                "config",
                format!("{} already exists (use --force to overwrite)", path.display()),
            ));
        }
        std::fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(|source| {
            ConfigurationError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!("Wrote configuration template to {}", path.display());
        Ok(())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            header: None,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            repo_path: default_repo_path(),
            commit_message: default_commit_message(),
            author_name: None,
            author_email: None,
            pull_before_push: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses() {
        let config = Config::from_toml_str(DEFAULT_CONFIG_TEMPLATE).unwrap();

        assert_eq!(config.matching.mode, MatchMode::Substring);
        assert_eq!(config.matching.unmatched, UnmatchedPolicy::Drop);
        assert_eq!(config.categories.len(), 5);
        assert_eq!(config.categories[1].name, "Movies");
        assert_eq!(
            config.categories[1].rules[2],
            RuleDefinition::Contains("Zee Cinema".to_string())
        );
        assert_eq!(config.output.path, PathBuf::from("list.m3u"));
    }

    #[test]
    fn test_unmatched_policy_is_required() {
        let toml = r#"
            [matching]
            mode = "exact"
        "#;
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("unmatched"));
    }

    #[test]
    fn test_tag_as_policy_from_toml() {
        let toml = r#"
            [matching]
            mode = "fuzzy"
            unmatched = { tag_as = "Uncategorized" }

            [[categories]]
            name = "News"
            rules = [{ exact = "BBC News" }, { substring = "cnn" }, { regex = "^sky news" }]
        "#;
        let config = Config::from_toml_str(toml).unwrap();

        assert_eq!(config.matching.mode, MatchMode::Approximate);
        assert_eq!(
            config.matching.unmatched,
            UnmatchedPolicy::TagAs("Uncategorized".to_string())
        );
        assert_eq!(config.matching.similarity_threshold, 0.85);
        assert_eq!(
            config.categories[0].rules,
            vec![
                RuleDefinition::Exact("BBC News".to_string()),
                RuleDefinition::Contains("cnn".to_string()),
                RuleDefinition::Regex("^sky news".to_string()),
            ]
        );
    }

    #[test]
    fn test_unmatched_policy_from_str() {
        assert_eq!("drop".parse::<UnmatchedPolicy>(), Ok(UnmatchedPolicy::Drop));
        assert_eq!(
            "passthrough".parse::<UnmatchedPolicy>(),
            Ok(UnmatchedPolicy::Passthrough)
        );
        assert_eq!(
            "tag:Other".parse::<UnmatchedPolicy>(),
            Ok(UnmatchedPolicy::TagAs("Other".to_string()))
        );
        assert!("tag:".parse::<UnmatchedPolicy>().is_err());
        assert!("keep".parse::<UnmatchedPolicy>().is_err());
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut matching = MatchingConfig::new(MatchMode::Approximate, UnmatchedPolicy::Drop);
        assert!(matching.validate().is_ok());

        matching.similarity_threshold = 1.2;
        assert!(matches!(
            matching.validate(),
            Err(ConfigurationError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_validate_tag_name() {
        let matching = MatchingConfig::new(
            MatchMode::Exact,
            UnmatchedPolicy::TagAs("Bad \"name\"".to_string()),
        );
        assert!(matching.validate().is_err());
    }

    #[test]
    fn test_write_template_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        Config::write_template(&path, false).unwrap();
        assert!(Config::write_template(&path, false).is_err());
        Config::write_template(&path, true).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.categories.len(), 5);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigurationError::NotFound { .. }));
    }
}
