//! Classify IPTV M3U playlist channels into categories and rewrite their
//! `group-title` metadata.
//!
//! The engine is synchronous and pure: [`ingestor`] parses playlist text,
//! [`data_mapping`] classifies entries against a [`data_mapping::CategoryRegistry`],
//! [`proxy`] rewrites and assembles the output, and [`services::processing`]
//! ties them together. Fetching, writing and publishing live in [`sources`],
//! [`proxy::generator`] and [`services::git_publisher`].

pub mod config;
pub mod data_mapping;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod proxy;
pub mod services;
pub mod sources;
pub mod utils;
