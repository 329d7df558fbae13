//! Utility functions for the M3U classifier
//!
//! - `utils::channel_similarity` for approximate channel name scoring
//! - URL helpers used by the playlist sources

pub mod channel_similarity;

/// Normalize a URL by ensuring it has a proper scheme (http:// or https://)
/// If the URL already has a scheme, it returns it unchanged.
/// If the URL lacks a scheme, it prepends "http://"
pub fn normalize_url_scheme(url: &str) -> String {
    let trimmed_url = url.trim();

    if trimmed_url.contains("://") {
        trimmed_url.to_string()
    } else {
        format!("http://{}", trimmed_url)
    }
}

/// Strip credentials and query from a URL before it goes into a log line.
/// Provider playlist URLs usually carry the account password as a query parameter.
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            let _ = parsed.set_password(None);
            let _ = parsed.set_username("");
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_scheme() {
        assert_eq!(
            normalize_url_scheme("provider.tv/get.php"),
            "http://provider.tv/get.php"
        );
        assert_eq!(
            normalize_url_scheme(" https://provider.tv/list.m3u "),
            "https://provider.tv/list.m3u"
        );
    }

    #[test]
    fn test_redact_url_hides_credentials() {
        assert_eq!(
            redact_url("http://user:pw@provider.tv/get.php?username=u&password=p"),
            "http://provider.tv/get.php"
        );
        assert_eq!(redact_url("not a url"), "<invalid url>");
    }
}
