//! Channel name similarity scoring for approximate category matching
//!
//! Names are normalized (case folded, quality/feed tags stripped, whitespace
//! collapsed) and then scored with a normalized Levenshtein similarity:
//! `1 - distance / max(len_a, len_b)` over characters, so 1.0 means identical
//! and 0.85 allows roughly 15% character-level divergence.

use regex::Regex;

use crate::config::defaults::{default_noise_patterns, default_similarity_threshold};
use crate::config::MatchingConfig;
use crate::errors::{ConfigResult, ConfigurationError};

/// Scores within this distance of the threshold count as reaching it
pub const SCORE_TOLERANCE: f64 = 1e-9;

/// Configuration for channel similarity analysis
#[derive(Debug, Clone)]
pub struct SimilarityConfig {
    /// Patterns removed from both names before comparing
    pub noise_patterns: Vec<String>,
    /// Minimum similarity (0.0-1.0) for a candidate to be accepted
    pub threshold: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            noise_patterns: default_noise_patterns(),
            threshold: default_similarity_threshold(),
        }
    }
}

impl SimilarityConfig {
    /// Create from the matching section of the application config
    pub fn from_matching(config: &MatchingConfig) -> Self {
        Self {
            noise_patterns: config.noise_patterns.clone(),
            threshold: config.similarity_threshold,
        }
    }
}

/// Channel similarity analyzer
#[derive(Debug, Clone)]
pub struct ChannelSimilarityAnalyzer {
    config: SimilarityConfig,
    noise_regex: Vec<Regex>,
}

impl ChannelSimilarityAnalyzer {
    pub fn new(config: SimilarityConfig) -> ConfigResult<Self> {
        if !(0.0..=1.0).contains(&config.threshold) {
            return Err(ConfigurationError::InvalidThreshold {
                value: config.threshold,
            });
        }

        let noise_regex = config
            .noise_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigurationError::InvalidNoisePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            config,
            noise_regex,
        })
    }

    pub fn with_default_config() -> ConfigResult<Self> {
        Self::new(SimilarityConfig::default())
    }

    /// Fold case, strip noise patterns and collapse whitespace
    pub fn normalize_channel_name(&self, name: &str) -> String {
        let mut normalized = name.to_string();
        for regex in &self.noise_regex {
            normalized = regex.replace_all(&normalized, " ").into_owned();
        }

        normalized
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ")
            .to_lowercase()
    }

    /// Similarity of two already-normalized names. Empty names never match.
    pub fn similarity(&self, name1: &str, name2: &str) -> f64 {
        if name1.is_empty() || name2.is_empty() {
            return 0.0;
        }
        if name1 == name2 {
            return 1.0;
        }
        strsim::normalized_levenshtein(name1, name2)
    }

    /// Normalize both names and score them
    pub fn compare(&self, name1: &str, name2: &str) -> f64 {
        self.similarity(
            &self.normalize_channel_name(name1),
            &self.normalize_channel_name(name2),
        )
    }

    /// Threshold check, inclusive at the boundary
    pub fn meets_threshold(&self, score: f64) -> bool {
        score + SCORE_TOLERANCE >= self.config.threshold
    }
}
