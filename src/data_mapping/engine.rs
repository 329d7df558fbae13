use std::borrow::Cow;
use tracing::trace;

use crate::config::{MatchMode, MatchTarget, MatchingConfig, NameSource, TieBreak};
use crate::data_mapping::registry::{CategoryRegistry, MatchInput};
use crate::errors::ConfigResult;
use crate::models::{ClassificationResult, Entry, TVG_NAME};
use crate::proxy::rewriter::{attribute_value, derived_display_name, render_extinf};
use crate::utils::channel_similarity::{
    ChannelSimilarityAnalyzer, SimilarityConfig, SCORE_TOLERANCE,
};

/// A rule name prepared for approximate matching
#[derive(Debug, Clone)]
struct FuzzyCandidate {
    category: usize,
    rule: usize,
    normalized: String,
}

/// Classifies entries against a [`CategoryRegistry`] in one matching mode.
///
/// Built once per run and shared read-only across worker threads; every
/// call to [`classify`](Self::classify) is independent of every other.
#[derive(Debug)]
pub struct ChannelClassifier<'r> {
    registry: &'r CategoryRegistry,
    mode: MatchMode,
    substring_target: MatchTarget,
    name_source: NameSource,
    analyzer: ChannelSimilarityAnalyzer,
    /// Approximate-mode pool, already in tie-break order
    candidates: Vec<FuzzyCandidate>,
}

impl<'r> ChannelClassifier<'r> {
    pub fn new(registry: &'r CategoryRegistry, settings: &MatchingConfig) -> ConfigResult<Self> {
        settings.validate()?;
        let analyzer = ChannelSimilarityAnalyzer::new(SimilarityConfig::from_matching(settings))?;

        let candidates = if settings.mode == MatchMode::Approximate {
            Self::build_candidates(registry, &analyzer, settings.tie_break)
        } else {
            Vec::new()
        };

        trace!(
            "Classifier ready: mode={}, {} approximate candidates",
            settings.mode,
            candidates.len()
        );

        Ok(Self {
            registry,
            mode: settings.mode,
            substring_target: settings.substring_target,
            name_source: settings.name_source,
            analyzer,
            candidates,
        })
    }

    fn build_candidates(
        registry: &CategoryRegistry,
        analyzer: &ChannelSimilarityAnalyzer,
        tie_break: TieBreak,
    ) -> Vec<FuzzyCandidate> {
        let mut candidates: Vec<FuzzyCandidate> = registry
            .categories()
            .iter()
            .enumerate()
            .flat_map(|(category_idx, category)| {
                category
                    .rules()
                    .iter()
                    .enumerate()
                    .filter_map(move |(rule_idx, rule)| {
                        rule.name_candidate().map(|name| (category_idx, rule_idx, name))
                    })
            })
            .map(|(category, rule, name)| FuzzyCandidate {
                category,
                rule,
                normalized: analyzer.normalize_channel_name(name),
            })
            .filter(|candidate| !candidate.normalized.is_empty())
            .collect();

        if tie_break == TieBreak::Lexicographic {
            // Stable: equal texts stay in registry order
            candidates.sort_by(|a, b| a.normalized.cmp(&b.normalized));
        }
        candidates
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn registry(&self) -> &'r CategoryRegistry {
        self.registry
    }

    /// Name that exact and approximate matching compare against.
    /// An empty title falls back to `tvg-name`, as the rewriter does. A title
    /// standing in for a missing `tvg-name` is read the way the rewriter
    /// writes it into that attribute.
    pub fn display_name<'e>(&self, entry: &'e Entry) -> Cow<'e, str> {
        match self.name_source {
            NameSource::Title => Cow::Borrowed(derived_display_name(entry)),
            NameSource::PreferAttribute => match entry.attributes.get_non_empty(TVG_NAME) {
                Some(name) => Cow::Borrowed(name.trim()),
                None => attribute_value(entry.title.trim()),
            },
        }
    }

    /// Text that contains/regex rules search in
    pub fn haystack(&self, entry: &Entry) -> String {
        match self.substring_target {
            MatchTarget::MetadataLine => render_extinf(entry, None),
            MatchTarget::DisplayName => self.display_name(entry).into_owned(),
        }
    }

    pub fn classify(&self, entry: &Entry) -> ClassificationResult<'r> {
        let result = match self.mode {
            MatchMode::Exact => self.classify_exact(&self.display_name(entry)),
            MatchMode::Substring => self.classify_substring(&self.haystack(entry)),
            MatchMode::Approximate => self.classify_approximate(&self.display_name(entry)),
        };

        trace!(
            "Line {}: '{}' -> {:?} (rule {:?}, score {:?})",
            entry.line_number,
            entry.title,
            result.category_name(),
            result.matched_rule.map(ToString::to_string),
            result.score
        );
        result
    }

    fn classify_exact(&self, display_name: &str) -> ClassificationResult<'r> {
        let registry: &'r CategoryRegistry = self.registry;
        let input = MatchInput::new(display_name, "");
        let result = registry
            .lookup(&input)
            .find(|(_, rule)| rule.is_exact())
            .map(|(category, rule)| ClassificationResult::matched_by(category, rule))
            .unwrap_or_default();
        result
    }

    fn classify_substring(&self, haystack: &str) -> ClassificationResult<'r> {
        let registry: &'r CategoryRegistry = self.registry;
        let input = MatchInput::new("", haystack);
        let result = registry
            .lookup(&input)
            .find(|(_, rule)| !rule.is_exact())
            .map(|(category, rule)| ClassificationResult::matched_by(category, rule))
            .unwrap_or_default();
        result
    }

    fn classify_approximate(&self, display_name: &str) -> ClassificationResult<'r> {
        let normalized = self.analyzer.normalize_channel_name(display_name);
        if normalized.is_empty() {
            return ClassificationResult::unmatched();
        }

        let mut best: Option<(&FuzzyCandidate, f64)> = None;
        for candidate in &self.candidates {
            let score = self.analyzer.similarity(&normalized, &candidate.normalized);
            // Only a strictly better score displaces the earlier candidate
            if best.map_or(true, |(_, best_score)| score > best_score + SCORE_TOLERANCE) {
                best = Some((candidate, score));
                if score >= 1.0 {
                    break;
                }
            }
        }

        match best {
            Some((candidate, score)) if self.analyzer.meets_threshold(score) => {
                let category = &self.registry.categories()[candidate.category];
                let rule = &category.rules()[candidate.rule];
                ClassificationResult::matched_by(category, rule).with_score(score)
            }
            _ => ClassificationResult::unmatched(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryDefinition, RuleDefinition, UnmatchedPolicy};
    use crate::ingestor::m3u_parser::parse_playlist;
    use crate::models::CategoryRule;

    fn entry(line: &str) -> Entry {
        parse_playlist(&format!("#EXTM3U\n{}\nhttp://x/1\n", line))
            .entries
            .remove(0)
    }

    fn registry() -> CategoryRegistry {
        CategoryRegistry::build(&[
            CategoryDefinition::new(
                "Entertainment",
                vec![
                    RuleDefinition::Contains("Star Plus".to_string()),
                    RuleDefinition::Exact("Colors TV".to_string()),
                ],
            ),
            CategoryDefinition::new(
                "Movies",
                vec![
                    RuleDefinition::Contains("Zee Cinema".to_string()),
                    RuleDefinition::Exact("Colors Cineplex".to_string()),
                    RuleDefinition::Regex(r"\bstar\s+gold\b".to_string()),
                ],
            ),
            CategoryDefinition::new(
                "Sports",
                vec![RuleDefinition::Contains("Star Sports".to_string())],
            ),
        ])
        .unwrap()
    }

    fn settings(mode: MatchMode) -> MatchingConfig {
        MatchingConfig::new(mode, UnmatchedPolicy::Drop)
    }

    #[test]
    fn test_exact_mode_requires_whole_name() {
        let registry = registry();
        let classifier = ChannelClassifier::new(&registry, &settings(MatchMode::Exact)).unwrap();

        let hit = classifier.classify(&entry("#EXTINF:-1,colors tv"));
        assert_eq!(hit.category_name(), Some("Entertainment"));
        assert_eq!(hit.matched_rule, Some(&CategoryRule::ExactName("Colors TV".to_string())));

        // Near-miss of another category's exact name stays unmatched
        assert!(!classifier.classify(&entry("#EXTINF:-1,Colors TV HD")).matched());
        // Substring rules are not consulted
        assert!(!classifier.classify(&entry("#EXTINF:-1,Star Plus")).matched());
    }

    #[test]
    fn test_exact_mode_precision_over_fuzzy_neighbour() {
        let registry = CategoryRegistry::build(&[
            CategoryDefinition::new("Movies", vec![RuleDefinition::Exact("Sony Max".to_string())]),
            CategoryDefinition::new("Sports", vec![RuleDefinition::Exact("Sony Max 2".to_string())]),
        ])
        .unwrap();
        let classifier = ChannelClassifier::new(&registry, &settings(MatchMode::Exact)).unwrap();

        let hit = classifier.classify(&entry("#EXTINF:-1,Sony Max"));
        assert_eq!(hit.category_name(), Some("Movies"));
        assert!(hit.score.is_none());

        let hit = classifier.classify(&entry("#EXTINF:-1,Sony Max 2"));
        assert_eq!(hit.category_name(), Some("Sports"));
    }

    #[test]
    fn test_substring_mode_searches_metadata_line() {
        let registry = registry();
        let classifier =
            ChannelClassifier::new(&registry, &settings(MatchMode::Substring)).unwrap();

        let hit = classifier.classify(&entry(
            r#"#EXTINF:-1 tvg-logo="http://logos/zee-cinema.png" tvg-name="ZC",ZC"#,
        ));
        assert!(!hit.matched(), "logo slug uses a dash, not a space");

        let hit = classifier.classify(&entry(
            r#"#EXTINF:-1 tvg-logo="http://logos/Zee Cinema.png",ZC"#,
        ));
        assert_eq!(hit.category_name(), Some("Movies"));
    }

    #[test]
    fn test_substring_mode_ignores_existing_category() {
        let registry = registry();
        let classifier =
            ChannelClassifier::new(&registry, &settings(MatchMode::Substring)).unwrap();

        let hit = classifier.classify(&entry(r#"#EXTINF:-1 group-title="Star Sports",Unknown"#));
        assert!(!hit.matched());
    }

    #[test]
    fn test_substring_mode_first_category_wins() {
        let registry = registry();
        let classifier =
            ChannelClassifier::new(&registry, &settings(MatchMode::Substring)).unwrap();

        // Matches Entertainment ("Star Plus") and Movies (regex) - registry order decides
        let hit = classifier.classify(&entry("#EXTINF:-1,Star Plus Star Gold"));
        assert_eq!(hit.category_name(), Some("Entertainment"));

        let hit = classifier.classify(&entry("#EXTINF:-1,STAR  GOLD Select"));
        assert_eq!(hit.category_name(), Some("Movies"));
        assert_eq!(hit.matched_rule.map(CategoryRule::kind), Some("regex"));
    }

    #[test]
    fn test_display_name_target() {
        let registry = registry();
        let mut matching = settings(MatchMode::Substring);
        matching.substring_target = MatchTarget::DisplayName;
        let classifier = ChannelClassifier::new(&registry, &matching).unwrap();

        let hit = classifier.classify(&entry(
            r#"#EXTINF:-1 tvg-logo="http://logos/Zee Cinema.png",ZC"#,
        ));
        assert!(!hit.matched());
    }

    #[test]
    fn test_name_source_selection() {
        let registry = registry();
        let e = entry(r#"#EXTINF:-1 tvg-name="Colors TV",Channel 12"#);

        let prefer = ChannelClassifier::new(&registry, &settings(MatchMode::Exact)).unwrap();
        assert_eq!(prefer.display_name(&e), "Colors TV");
        assert!(prefer.classify(&e).matched());

        let mut matching = settings(MatchMode::Exact);
        matching.name_source = NameSource::Title;
        let title_only = ChannelClassifier::new(&registry, &matching).unwrap();
        assert_eq!(title_only.display_name(&e), "Channel 12");
        assert!(!title_only.classify(&e).matched());
    }

    #[test]
    fn test_quoted_title_reads_like_written_tvg_name() {
        let registry = registry();
        let classifier = ChannelClassifier::new(&registry, &settings(MatchMode::Exact)).unwrap();

        let source = entry(r#"#EXTINF:-1,Star "Gold" Select"#);
        let rewritten = entry(r#"#EXTINF:-1 tvg-name="Star 'Gold' Select",Star "Gold" Select"#);
        assert_eq!(classifier.display_name(&source), "Star 'Gold' Select");
        assert_eq!(
            classifier.display_name(&source),
            classifier.display_name(&rewritten)
        );
    }

    #[test]
    fn test_approximate_mode_tolerates_misspelling() {
        let registry = registry();
        let classifier =
            ChannelClassifier::new(&registry, &settings(MatchMode::Approximate)).unwrap();

        let hit = classifier.classify(&entry("#EXTINF:-1,Zee Cinima"));
        assert_eq!(hit.category_name(), Some("Movies"));
        assert!((hit.score.unwrap() - 0.9).abs() < 1e-12);

        assert!(!classifier
            .classify(&entry("#EXTINF:-1,Unknown Local Channel"))
            .matched());
    }

    #[test]
    fn test_approximate_mode_excludes_regex_sources() {
        let registry = registry();
        let classifier =
            ChannelClassifier::new(&registry, &settings(MatchMode::Approximate)).unwrap();

        let hit = classifier.classify(&entry(r"#EXTINF:-1,\bstar\s+gold\b"));
        assert_ne!(hit.matched_rule.map(CategoryRule::kind), Some("regex"));
    }

    #[test]
    fn test_approximate_threshold_boundary() {
        let registry = CategoryRegistry::build(&[CategoryDefinition::new(
            "Letters",
            vec![RuleDefinition::Exact("abcdefghijklmnopqrst".to_string())],
        )])
        .unwrap();
        let mut matching = settings(MatchMode::Approximate);
        matching.noise_patterns.clear();
        let classifier = ChannelClassifier::new(&registry, &matching).unwrap();

        assert!(classifier
            .classify(&entry("#EXTINF:-1,abcdefghijklmnopqXYZ"))
            .matched());
        assert!(!classifier
            .classify(&entry("#EXTINF:-1,abcdefghijklmnopWXYZ"))
            .matched());
    }

    #[test]
    fn test_approximate_tie_break_orders() {
        // "abcz" is one substitution away from both rule names
        let definitions = [
            CategoryDefinition::new("Zeta", vec![RuleDefinition::Exact("abcy".to_string())]),
            CategoryDefinition::new("Alpha", vec![RuleDefinition::Exact("abcx".to_string())]),
        ];
        let registry = CategoryRegistry::build(&definitions).unwrap();

        let mut matching = settings(MatchMode::Approximate);
        matching.similarity_threshold = 0.7;

        let by_registry = ChannelClassifier::new(&registry, &matching).unwrap();
        let hit = by_registry.classify(&entry("#EXTINF:-1,abcz"));
        assert_eq!(hit.category_name(), Some("Zeta"));
        assert!((hit.score.unwrap() - 0.75).abs() < 1e-12);

        matching.tie_break = TieBreak::Lexicographic;
        let lexicographic = ChannelClassifier::new(&registry, &matching).unwrap();
        let hit = lexicographic.classify(&entry("#EXTINF:-1,abcz"));
        assert_eq!(hit.category_name(), Some("Alpha"));

        // A strictly better score still wins regardless of order
        let hit = lexicographic.classify(&entry("#EXTINF:-1,abcy"));
        assert_eq!(hit.category_name(), Some("Zeta"));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let registry = registry();
        let mut matching = settings(MatchMode::Approximate);
        matching.similarity_threshold = -0.1;

        assert!(ChannelClassifier::new(&registry, &matching).is_err());
    }
}
