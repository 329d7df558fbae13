use std::path::Path;
use tracing::info;

use crate::errors::StorageError;
use crate::models::*;

/// An entry on its way to the output: its final metadata line plus the
/// option and URL lines carried over from the source.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputEntry<'a> {
    pub metadata_line: String,
    pub entry: &'a Entry,
}

/// Serializes retained entries into playlist text
#[derive(Debug, Clone, Default)]
pub struct PlaylistAssembler;

impl PlaylistAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Header once, then metadata + options + URL per entry, in order.
    /// Entries without a URL emit no URL line.
    pub fn assemble<'a, I>(&self, header: Option<&str>, entries: I) -> String
    where
        I: IntoIterator<Item = OutputEntry<'a>>,
    {
        let header = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(EXTM3U_HEADER);

        let mut m3u = String::with_capacity(4096);
        m3u.push_str(header);
        m3u.push('\n');

        for output in entries {
            m3u.push_str(&output.metadata_line);
            m3u.push('\n');
            for option in &output.entry.options {
                m3u.push_str(option);
                m3u.push('\n');
            }
            if output.entry.has_url() {
                m3u.push_str(&output.entry.url);
                m3u.push('\n');
            }
        }

        m3u
    }
}

/// Persists the assembled playlist
#[derive(Debug, Clone, Default)]
pub struct PlaylistWriter;

impl PlaylistWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write `content` to `path`, creating parent directories as needed
    pub async fn save(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        let write_error = |source: std::io::Error| StorageError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }
        tokio::fs::write(path, content).await.map_err(write_error)?;

        info!("Saved playlist to {} ({} bytes)", path.display(), content.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestor::m3u_parser::parse_playlist;

    #[test]
    fn test_assemble_keeps_order_and_skips_empty_urls() {
        let playlist = parse_playlist(
            "#EXTM3U\n#EXTINF:-1,A\n#EXTVLCOPT:http-referrer=x\nhttp://a\n#EXTINF:-1,B\n",
        );
        let outputs = playlist.entries.iter().map(|entry| OutputEntry {
            metadata_line: entry.raw.clone(),
            entry,
        });

        let text = PlaylistAssembler::new().assemble(playlist.header.as_deref(), outputs);
        assert_eq!(
            text,
            "#EXTM3U\n#EXTINF:-1,A\n#EXTVLCOPT:http-referrer=x\nhttp://a\n#EXTINF:-1,B\n"
        );
    }

    #[test]
    fn test_assemble_default_header_for_empty_playlist() {
        let text = PlaylistAssembler::new().assemble(None, Vec::new());
        assert_eq!(text, "#EXTM3U\n");
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/list.m3u");

        PlaylistWriter::new().save(&path, "#EXTM3U\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "#EXTM3U\n");
    }
}
