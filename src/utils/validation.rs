//! URL helpers for locators

use percent_encoding::percent_decode_str;
use url::Url;

/// Schemes the downloader can fetch from directly
pub const REMOTE_SCHEMES: [&str; 4] = ["http", "https", "ftp", "file"];

/// Parse `input` as a remote URL.
///
/// Single-letter schemes are Windows drive letters (`C:\...`), not URLs.
pub fn parse_remote_url(input: &str) -> Option<Url> {
    let parsed = Url::parse(input).ok()?;
    let scheme = parsed.scheme();
    if scheme.len() > 1 && REMOTE_SCHEMES.contains(&scheme) {
        Some(parsed)
    } else {
        None
    }
}

/// Last non-empty path segment of a URL or local path
///
/// URL segments are percent-decoded; local paths are taken literally.
pub fn last_path_segment(locator: &str) -> Option<String> {
    match parse_remote_url(locator) {
        Some(url) => last_segment(url.path())
            .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned()),
        None => {
            let path = locator.split(|c| c == '?' || c == '#').next().unwrap_or("");
            last_segment(path).map(str::to_string)
        }
    }
}

fn last_segment(path: &str) -> Option<&str> {
    path.rsplit(|c| c == '/' || c == '\\')
        .find(|segment| !segment.is_empty())
}
