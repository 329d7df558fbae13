//! Default values for configuration fields and the starter config template

use std::path::PathBuf;

pub fn default_timeout_secs() -> u64 {
    15
}

pub fn default_user_agent() -> String {
    format!("m3u-classifier/{}", env!("CARGO_PKG_VERSION"))
}

pub fn default_output_path() -> PathBuf {
    PathBuf::from("list.m3u")
}

pub fn default_repo_path() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_commit_message() -> String {
    "Update filtered M3U playlist".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_similarity_threshold() -> f64 {
    0.85
}

/// Quality and feed tags that say nothing about which channel it is
pub fn default_noise_patterns() -> Vec<String> {
    vec![
        r"(?i)\b4K\b".to_string(),
        r"(?i)\bU?HD\b".to_string(),
        r"(?i)\bFHD\b".to_string(),
        r"(?i)\bSD\b".to_string(),
        r"(?i)\bHEVC\b".to_string(),
        r"(?i)\b720P?\b".to_string(),
        r"(?i)\b1080P?\b".to_string(),
        r"\[|\]|\(|\)".to_string(),
    ]
}

/// Written by `m3u-classifier init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# m3u-classifier configuration

[source]
# Playlist to fetch. Can also be given with --url or the M3U_URL environment variable.
# url = "http://example.com/playlist.m3u"
timeout_secs = 15

[output]
path = "list.m3u"

[publish]
enabled = false
repo_path = "."
commit_message = "Update filtered M3U playlist"
pull_before_push = true
# author_name = "Playlist Bot"
# author_email = "bot@example.com"

[matching]
# exact | substring | approximate
mode = "substring"
# Where contains/regex rules look: metadata_line | display_name
substring_target = "display_name"
# Which name exact/approximate matching reads: title | prefer_attribute
name_source = "prefer_attribute"
similarity_threshold = 0.85
tie_break = "registry_order"
parallel = true
# What happens to channels no category claims:
# "drop" | "passthrough" | { tag_as = "Uncategorized" }
unmatched = "drop"

[[categories]]
name = "Entertainment"
rules = [
    { contains = "Star Plus" },
    { contains = "Star Bharat" },
    { contains = "Sony TV" },
    { contains = "Sony SAB" },
    { contains = "Colors TV" },
    { contains = "Zee TV" },
    { contains = "Zee Anmol" },
    { contains = "Sony Pal" },
    { contains = "& TV" },
]

[[categories]]
name = "Movies"
rules = [
    { contains = "Star Gold" },
    { contains = "Star Gold Select" },
    { contains = "Zee Cinema" },
    { contains = "Zee Action" },
    { contains = "Zee Bollywood" },
    { contains = "Zee Classic" },
    { contains = "Sony Max" },
    { contains = "Sony Max 2" },
    { contains = "Sony Wah" },
    { contains = "Colors Cineplex" },
    { contains = "& pictures" },
    { contains = "UTV Movies" },
    { contains = "UTV Action" },
    { contains = "B4U Movies" },
    { contains = "Zee Anmol Cinema" },
]

[[categories]]
name = "Kids"
rules = [
    { contains = "Cartoon Network" },
    { contains = "Pogo" },
    { contains = "Hungama TV" },
    { contains = "Disney Channel" },
    { contains = "Nick" },
    { contains = "Nick HD+" },
    { contains = "Discovery Kids" },
]

[[categories]]
name = "Knowledge"
rules = [
    { contains = "Discovery Channel" },
    { contains = "Discovery Science" },
    { contains = "National Geographic" },
    { contains = "History TV18" },
    { contains = "Animal Planet" },
]

[[categories]]
name = "Sports"
rules = [
    { contains = "Star Sports" },
    { contains = "Sony Ten" },
    { contains = "Sony Six" },
    { contains = "Sony Ten 1" },
    { contains = "Sony Ten 2" },
    { contains = "Sony Ten 3" },
    { contains = "Sony Ten 4" },
    { contains = "Sports18" },
]
"#;
