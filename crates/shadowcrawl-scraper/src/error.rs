use serde::Serialize;
use shadowcrawl_core::PlatformKind;
use thiserror::Error;

/// Failure of a single crawl job. Never shared across jobs.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("no adapter for platform {platform} (store {url})")]
    UnsupportedPlatform { platform: PlatformKind, url: String },

    #[error("could not parse {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("invalid store URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Coarse error category used in per-job reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlErrorKind {
    Network,
    HttpStatus,
    UnsupportedPlatform,
    Parse,
    InvalidUrl,
}

impl CrawlErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CrawlErrorKind::Network => "network",
            CrawlErrorKind::HttpStatus => "http_status",
            CrawlErrorKind::UnsupportedPlatform => "unsupported_platform",
            CrawlErrorKind::Parse => "parse",
            CrawlErrorKind::InvalidUrl => "invalid_url",
        }
    }
}

impl std::fmt::Display for CrawlErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CrawlError {
    #[must_use]
    pub fn kind(&self) -> CrawlErrorKind {
        match self {
            CrawlError::Network(_) => CrawlErrorKind::Network,
            CrawlError::HttpStatus { .. } => CrawlErrorKind::HttpStatus,
            CrawlError::UnsupportedPlatform { .. } => CrawlErrorKind::UnsupportedPlatform,
            CrawlError::Parse { .. } => CrawlErrorKind::Parse,
            CrawlError::InvalidUrl { .. } => CrawlErrorKind::InvalidUrl,
        }
    }
}
