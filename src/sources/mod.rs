//! Playlist sources
//!
//! A source hands the raw playlist text to the processor. HTTP is what a
//! scheduled run uses; local files cover offline processing and tests.

pub mod m3u;
pub mod traits;

pub use m3u::{FilePlaylistSource, HttpPlaylistSource};
pub use traits::PlaylistSource;

use std::path::Path;

use crate::config::SourceConfig;
use crate::errors::SourceResult;

/// Pick a source for `location`: `file://` URLs and existing paths are read
/// from disk, anything else is fetched over HTTP.
pub fn create_source(location: &str, config: &SourceConfig) -> SourceResult<Box<dyn PlaylistSource>> {
    if let Some(path) = location.strip_prefix("file://") {
        return Ok(Box::new(FilePlaylistSource::new(path)));
    }
    if !location.contains("://") && Path::new(location).is_file() {
        return Ok(Box::new(FilePlaylistSource::new(location)));
    }
    Ok(Box::new(HttpPlaylistSource::new(
        location,
        config.timeout_secs,
        &config.user_agent,
    )?))
}
