//! Service layer
//!
//! - `processing`: the playlist processing pipeline and its run report
//! - `git_publisher`: pushing the generated playlist to a git remote

pub mod git_publisher;
pub mod processing;

pub use git_publisher::{GitPublisher, PlaylistPublisher, PublishOutcome};
pub use processing::{CategoryCount, PlaylistProcessor, ProcessingReport, ProcessingStats};
