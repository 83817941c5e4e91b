//! Media address resolution
//!
//! Image references carry a path relative to the content origin. They are
//! joined here instead of by plain concatenation so that stray or missing
//! slashes on either side do not matter.

use crate::types::MediaRef;

/// Join a relative path onto an origin
///
/// Absolute URLs (`http://`, `https://`) pass through untouched and
/// protocol-relative ones (`//cdn/...`) take the origin's scheme, so media
/// served from a CDN keeps working.
pub fn join_url(origin: &str, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }

    let origin = origin.trim_end_matches('/');

    if let Some(rest) = path.strip_prefix("//") {
        let scheme = origin.split_once("://").map(|(s, _)| s).unwrap_or("https");
        return format!("{}://{}", scheme, rest);
    }

    let path = path.trim_start_matches('/');
    if path.is_empty() {
        origin.to_string()
    } else {
        format!("{}/{}", origin, path)
    }
}

fn is_absolute(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl MediaRef {
    /// Fetchable address of this media item
    pub fn resolve(&self, origin: &str) -> String {
        join_url(origin, &self.url)
    }

    /// Alternative text, or `fallback` when absent or blank
    pub fn alt_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.alternative_text.as_deref() {
            Some(alt) if !alt.trim().is_empty() => alt,
            _ => fallback,
        }
    }
}
