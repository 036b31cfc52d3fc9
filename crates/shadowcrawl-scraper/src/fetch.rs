//! Storefront page fetch feeding the fingerprinter.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::Client;

use crate::error::CrawlError;
use crate::fingerprint::{classify, FingerprintResult};

const MAX_REDIRECTS: usize = 10;

/// Builds the HTTP client shared by the fetcher and every adapter.
///
/// # Errors
///
/// Returns [`CrawlError::Network`] if the underlying `reqwest::Client`
/// cannot be constructed (e.g., invalid TLS config).
pub fn build_http_client(timeout: Duration, user_agent: &str) -> Result<Client, CrawlError> {
    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Fetches a storefront's landing page and classifies its platform.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// GETs `url`, following redirects, and returns the final page.
    ///
    /// # Errors
    ///
    /// - [`CrawlError::Network`] — connection failure or timeout.
    /// - [`CrawlError::HttpStatus`] — the final response is not 2xx.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, CrawlError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(FetchedPage {
            url: url.to_owned(),
            final_url,
            headers,
            body,
        })
    }

    /// Fetches `url` and runs the fingerprint rules on the final response.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_page`]. A page that matches no rule is not an
    /// error; it classifies as unknown.
    pub async fn fetch_and_classify(&self, url: &str) -> Result<FingerprintResult, CrawlError> {
        let page = self.fetch_page(url).await?;
        Ok(page.fingerprint())
    }
}

/// A successfully fetched storefront page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl FetchedPage {
    #[must_use]
    pub fn fingerprint(&self) -> FingerprintResult {
        let detection = classify(&self.body, &self.headers);
        tracing::debug!(
            url = %self.url,
            final_url = %self.final_url,
            platform = %detection.platform,
            confidence = detection.confidence,
            reason = detection.reason,
            "storefront fingerprinted"
        );
        FingerprintResult::new(self.url.clone(), detection)
    }
}
