//! M3U playlist sources
//!
//! [`HttpPlaylistSource`] downloads the provider playlist with a bounded
//! timeout; [`FilePlaylistSource`] reads one from disk.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use super::traits::PlaylistSource;
use crate::errors::{SourceError, SourceResult};
use crate::utils::{normalize_url_scheme, redact_url};

/// Fetches a playlist over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpPlaylistSource {
    client: Client,
    url: String,
    timeout_secs: u64,
}

impl HttpPlaylistSource {
    pub fn new(url: &str, timeout_secs: u64, user_agent: &str) -> SourceResult<Self> {
        let url = Self::validate_url(url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            url,
            timeout_secs,
        })
    }

    fn validate_url(raw: &str) -> SourceResult<String> {
        let normalized = normalize_url_scheme(raw);
        let parsed = url::Url::parse(&normalized)
            .map_err(|e| SourceError::invalid_url(redact_url(&normalized), e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => Ok(normalized),
            other => Err(SourceError::invalid_url(
                redact_url(&normalized),
                format!("unsupported scheme '{}'", other),
            )),
        }
    }

    fn map_request_error(&self, error: reqwest::Error) -> SourceError {
        if error.is_timeout() {
            SourceError::Timeout {
                url: redact_url(&self.url),
                timeout_secs: self.timeout_secs,
            }
        } else {
            SourceError::Request(error)
        }
    }
}

#[async_trait]
impl PlaylistSource for HttpPlaylistSource {
    fn describe(&self) -> String {
        redact_url(&self.url)
    }

    async fn fetch(&self) -> SourceResult<String> {
        info!("Fetching playlist from {}", self.describe());

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;
        debug!("Downloaded {} bytes", body.len());
        Ok(body)
    }
}

/// Reads a playlist from the local filesystem
#[derive(Debug, Clone)]
pub struct FilePlaylistSource {
    path: PathBuf,
}

impl FilePlaylistSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PlaylistSource for FilePlaylistSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> SourceResult<String> {
        info!("Reading playlist from {}", self.path.display());
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })
    }
}
