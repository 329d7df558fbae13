//! Centralized error handling for the M3U classifier
//!
//! This module groups the error types used across the application layers:
//!
//! - **Configuration Errors**: invalid category definitions, bad patterns,
//!   unreadable config files. Always fatal, raised before any playlist is touched.
//! - **Source Errors**: fetching the upstream playlist
//! - **Storage Errors**: writing the rewritten playlist
//! - **Publish Errors**: committing and pushing the result with git
//!
//! Parse anomalies are deliberately not errors; see [`crate::models::ParseAnomaly`].
//!
//! # Usage
//!
//! ```rust
//! use m3u_classifier::errors::{AppError, AppResult, SourceError};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::from(SourceError::MissingUrl))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for configuration Results
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for Publish Results
pub type PublishResult<T> = Result<T, PublishError>;
