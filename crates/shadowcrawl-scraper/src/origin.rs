//! URL origin and domain extraction for store URLs.

use crate::error::CrawlError;

/// Extracts the scheme+host origin from a store URL.
///
/// Given `"https://shop.example.com/collections/all"`, returns
/// `"https://shop.example.com"`, so platform endpoints are always built from
/// the store root.
///
/// # Errors
///
/// Returns [`CrawlError::InvalidUrl`] if the URL cannot be parsed or has no host.
pub fn store_origin(store_url: &str) -> Result<String, CrawlError> {
    let url = reqwest::Url::parse(store_url.trim()).map_err(|e| CrawlError::InvalidUrl {
        url: store_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(CrawlError::InvalidUrl {
            url: store_url.to_owned(),
            reason: "URL has no host".to_owned(),
        });
    }
    Ok(url.origin().ascii_serialization())
}

/// Extracts the host (plus any explicit port) from a URL.
///
/// Falls back to the trimmed input string if parsing fails, so every input
/// still maps to a stable rate-limit key.
#[must_use]
pub fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url.trim())
        .ok()
        .and_then(|u| {
            u.host_str().map(|host| match u.port() {
                Some(port) => format!("{}:{port}", host.to_ascii_lowercase()),
                None => host.to_ascii_lowercase(),
            })
        })
        .unwrap_or_else(|| url.trim().to_owned())
}
