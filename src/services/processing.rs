//! Playlist processing service
//!
//! Runs one playlist through parse, classify, unmatched policy, rewrite and
//! assemble. Classification may fan out over a rayon pool; results are
//! collected back in input order before anything is emitted.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{MatchMode, MatchingConfig, UnmatchedPolicy};
use crate::data_mapping::{CategoryRegistry, ChannelClassifier};
use crate::errors::ConfigResult;
use crate::ingestor::m3u_parser::M3uParser;
use crate::models::{ClassificationResult, Entry, ParseAnomaly};
use crate::proxy::generator::{OutputEntry, PlaylistAssembler};
use crate::proxy::rewriter::{render_extinf, rewrite};

/// Entries assigned to one registry category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingStats {
    pub total_entries: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub dropped: usize,
    pub passed_through: usize,
    pub tagged: usize,
    pub anomalies: usize,
    /// Registry order, including categories with no entries
    pub per_category: Vec<CategoryCount>,
    pub duration_ms: u64,
}

/// Result of one processing run
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingReport {
    #[serde(skip)]
    pub playlist: String,
    pub mode: MatchMode,
    pub generated_at: DateTime<Utc>,
    pub stats: ProcessingStats,
    pub anomalies: Vec<ParseAnomaly>,
}

/// Final form of one entry in the output
enum Disposition {
    Emit(String),
    Drop,
}

pub struct PlaylistProcessor<'r> {
    classifier: ChannelClassifier<'r>,
    parser: M3uParser,
    assembler: PlaylistAssembler,
    unmatched: UnmatchedPolicy,
    parallel: bool,
    header_override: Option<String>,
}

impl<'r> PlaylistProcessor<'r> {
    /// Build the classifier once; configuration problems surface here
    pub fn new(registry: &'r CategoryRegistry, settings: &MatchingConfig) -> ConfigResult<Self> {
        Ok(Self {
            classifier: ChannelClassifier::new(registry, settings)?,
            parser: M3uParser::new(),
            assembler: PlaylistAssembler::new(),
            unmatched: settings.unmatched.clone(),
            parallel: settings.parallel,
            header_override: None,
        })
    }

    /// Emit this header instead of the one found in the source
    pub fn with_header(mut self, header: Option<String>) -> Self {
        self.header_override = header.filter(|h| !h.trim().is_empty());
        self
    }

    pub fn classifier(&self) -> &ChannelClassifier<'r> {
        &self.classifier
    }

    pub fn process(&self, content: &str) -> ProcessingReport {
        let started = Instant::now();
        let playlist = self.parser.parse(content);

        for anomaly in &playlist.anomalies {
            debug!("Parse anomaly: {}", anomaly);
        }
        if !playlist.anomalies.is_empty() {
            warn!(
                "Playlist has {} anomalies (missing URLs, malformed attributes or titles)",
                playlist.anomalies.len()
            );
        }

        let classifications = self.classify_all(&playlist.entries);

        let registry = self.classifier.registry();
        let mut stats = ProcessingStats {
            total_entries: playlist.entries.len(),
            anomalies: playlist.anomalies.len(),
            per_category: registry
                .categories()
                .iter()
                .map(|category| CategoryCount {
                    name: category.name().to_string(),
                    count: 0,
                })
                .collect(),
            ..Default::default()
        };

        let mut outputs = Vec::with_capacity(playlist.entries.len());
        for (entry, classification) in playlist.entries.iter().zip(&classifications) {
            match self.dispose(entry, classification, &mut stats) {
                Disposition::Emit(metadata_line) => outputs.push(OutputEntry {
                    metadata_line,
                    entry,
                }),
                Disposition::Drop => {}
            }
        }

        let header = self
            .header_override
            .as_deref()
            .or(playlist.header.as_deref());
        let text = self.assembler.assemble(header, outputs);
        stats.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            "Processed {} entries: {} matched, {} unmatched ({} dropped, {} passed through, {} tagged) in {}ms",
            stats.total_entries,
            stats.matched,
            stats.unmatched,
            stats.dropped,
            stats.passed_through,
            stats.tagged,
            stats.duration_ms
        );

        ProcessingReport {
            playlist: text,
            mode: self.classifier.mode(),
            generated_at: Utc::now(),
            stats,
            anomalies: playlist.anomalies,
        }
    }

    fn classify_all(&self, entries: &[Entry]) -> Vec<ClassificationResult<'r>> {
        let classifier = &self.classifier;
        if self.parallel {
            entries
                .par_iter()
                .map(|entry| classifier.classify(entry))
                .collect()
        } else {
            entries.iter().map(|entry| classifier.classify(entry)).collect()
        }
    }

    fn dispose(
        &self,
        entry: &Entry,
        classification: &ClassificationResult<'r>,
        stats: &mut ProcessingStats,
    ) -> Disposition {
        if let Some(line) = rewrite(entry, classification) {
            stats.matched += 1;
            if let Some(name) = classification.category_name() {
                if let Some(count) = stats.per_category.iter_mut().find(|c| c.name == name) {
                    count.count += 1;
                }
                debug!("Line {}: '{}' -> {}", entry.line_number, entry.title, name);
            }
            return Disposition::Emit(line);
        }

        stats.unmatched += 1;
        match &self.unmatched {
            UnmatchedPolicy::Drop => {
                stats.dropped += 1;
                debug!("Line {}: '{}' unmatched, dropped", entry.line_number, entry.title);
                Disposition::Drop
            }
            UnmatchedPolicy::Passthrough => {
                stats.passed_through += 1;
                debug!("Line {}: '{}' unmatched, kept as-is", entry.line_number, entry.title);
                Disposition::Emit(entry.raw.clone())
            }
            UnmatchedPolicy::TagAs(name) => {
                stats.tagged += 1;
                debug!("Line {}: '{}' unmatched, tagged {}", entry.line_number, entry.title, name);
                Disposition::Emit(render_extinf(entry, Some(name.as_str())))
            }
        }
    }
}
