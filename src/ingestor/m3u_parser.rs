use tracing::{debug, trace};

use crate::models::*;

/// Turns playlist text into ordered [`Entry`] records.
///
/// The parser never fails: anything it has to tolerate (a metadata line with
/// no URL, a malformed attribute, a missing title) is recorded as a
/// [`ParseAnomaly`] and the entry is kept with the missing field left empty.
#[derive(Debug, Clone, Default)]
pub struct M3uParser;

impl M3uParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, content: &str) -> Playlist {
        let lines: Vec<&str> = content.lines().collect();
        let mut playlist = Playlist::default();
        let mut seen_content = false;
        let mut i = 0;

        while i < lines.len() {
            let line_number = i + 1;
            let line = lines[i].trim();

            if line.is_empty() {
                i += 1;
                continue;
            }

            if !seen_content {
                seen_content = true;
                if line.starts_with(EXTM3U_HEADER) {
                    playlist.header = Some(line.to_string());
                    i += 1;
                    continue;
                }
            }

            if !Self::is_metadata_line(line) {
                trace!("Skipping line {} outside any entry: {}", line_number, line);
                i += 1;
                continue;
            }

            let mut entry = self.parse_extinf_line(line, line_number, &mut playlist.anomalies);
            i += 1;

            while let Some(next) = lines.get(i).map(|l| l.trim()) {
                if !Self::is_option_line(next) {
                    break;
                }
                entry.options.push(next.to_string());
                i += 1;
            }

            match lines.get(i).map(|l| l.trim()) {
                Some(url) if !url.is_empty() && !url.starts_with('#') => {
                    entry.url = url.to_string();
                    i += 1;
                }
                _ => {
                    debug!("Entry at line {} has no stream URL", line_number);
                    playlist.anomalies.push(ParseAnomaly {
                        line_number,
                        kind: AnomalyKind::MissingUrl,
                    });
                }
            }

            playlist.entries.push(entry);
        }

        debug!(
            "Parsed {} entries ({} anomalies) from {} lines",
            playlist.entries.len(),
            playlist.anomalies.len(),
            lines.len()
        );
        playlist
    }

    pub fn is_metadata_line(line: &str) -> bool {
        line.starts_with(EXTINF_DIRECTIVE)
    }

    /// A directive line that belongs to the entry above it
    fn is_option_line(line: &str) -> bool {
        if ENTRY_OPTION_DIRECTIVES
            .iter()
            .any(|directive| line.starts_with(directive))
        {
            return true;
        }
        line.starts_with('#') && !Self::is_metadata_line(line) && !line.starts_with(EXTM3U_HEADER)
    }

    /// Parse `#EXTINF:-1 tvg-id="..." tvg-name="..." group-title="...",Channel Name`
    fn parse_extinf_line(
        &self,
        line: &str,
        line_number: usize,
        anomalies: &mut Vec<ParseAnomaly>,
    ) -> Entry {
        let body = line.strip_prefix(EXTINF_DIRECTIVE).unwrap_or(line);
        let body = body.strip_prefix(':').unwrap_or(body);

        let (attributes_part, title) = match Self::find_title_separator(body) {
            Some(comma_pos) => (&body[..comma_pos], body[comma_pos + 1..].trim()),
            None => {
                anomalies.push(ParseAnomaly {
                    line_number,
                    kind: AnomalyKind::MissingDisplayName,
                });
                (body, "")
            }
        };

        let (duration, attributes) = self.parse_attributes(attributes_part, line_number, anomalies);

        Entry {
            line_number,
            raw: line.to_string(),
            duration,
            attributes,
            title: title.to_string(),
            options: Vec::new(),
            url: String::new(),
        }
    }

    /// Last comma outside a quoted value; plain last comma if quotes never balance
    fn find_title_separator(body: &str) -> Option<usize> {
        let mut in_quotes = false;
        let mut separator = None;
        for (pos, ch) in body.char_indices() {
            match ch {
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => separator = Some(pos),
                _ => {}
            }
        }
        separator.or_else(|| body.rfind(','))
    }

    /// Split the attribute section into the duration token and `key="value"` pairs
    fn parse_attributes(
        &self,
        attributes: &str,
        line_number: usize,
        anomalies: &mut Vec<ParseAnomaly>,
    ) -> (Option<String>, ExtinfAttributes) {
        let chars: Vec<char> = attributes.chars().collect();
        let mut attrs = ExtinfAttributes::new();
        let mut duration = None;
        let mut first_token = true;
        let mut pos = 0;

        let mut malformed = |fragment: String| {
            anomalies.push(ParseAnomaly {
                line_number,
                kind: AnomalyKind::MalformedAttribute(fragment),
            });
        };

        loop {
            while pos < chars.len() && chars[pos].is_whitespace() {
                pos += 1;
            }
            if pos >= chars.len() {
                break;
            }

            let start = pos;
            while pos < chars.len() && chars[pos] != '=' && !chars[pos].is_whitespace() {
                pos += 1;
            }
            let key: String = chars[start..pos].iter().collect();

            if pos >= chars.len() || chars[pos].is_whitespace() {
                // Bare token: the duration when it comes first, noise otherwise
                if first_token {
                    duration = Some(key);
                } else {
                    malformed(key);
                }
                first_token = false;
                continue;
            }
            first_token = false;
            pos += 1;

            let (value, well_formed) = if chars.get(pos) == Some(&'"') {
                pos += 1;
                let value_start = pos;
                while pos < chars.len() && chars[pos] != '"' {
                    pos += 1;
                }
                let value: String = chars[value_start..pos].iter().collect();
                let closed = pos < chars.len();
                if closed {
                    pos += 1;
                }
                (value, closed)
            } else {
                let value_start = pos;
                while pos < chars.len() && !chars[pos].is_whitespace() {
                    pos += 1;
                }
                let value: String = chars[value_start..pos].iter().filter(|c| **c != '"').collect();
                (value, false)
            };

            let fragment: String = chars[start..pos].iter().collect();
            if key.is_empty() || key.contains('"') {
                malformed(fragment);
                continue;
            }
            if !well_formed {
                malformed(fragment);
            }
            if !attrs.insert_if_absent(key.as_str(), value) {
                trace!("Ignoring duplicate attribute '{}' on line {}", key, line_number);
            }
        }

        (duration, attrs)
    }
}

/// Parse playlist text with a default parser
pub fn parse_playlist(content: &str) -> Playlist {
    M3uParser::new().parse(content)
}
