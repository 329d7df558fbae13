use async_trait::async_trait;

use crate::errors::SourceResult;

/// Supplies the raw text of the upstream playlist
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Human-readable location, safe to log
    fn describe(&self) -> String;

    /// Fetch the whole playlist. No retries: a failure is returned as-is.
    async fn fetch(&self) -> SourceResult<String>;
}
