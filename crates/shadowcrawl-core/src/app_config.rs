use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub stores_path: PathBuf,
    /// Minimum spacing between two requests to the same domain.
    pub rate_limit_delay_secs: f64,
    pub max_concurrent_crawls: usize,
    pub request_timeout_secs: f64,
    pub user_agent: String,
}

impl AppConfig {
    #[must_use]
    pub fn rate_limit_delay(&self) -> Duration {
        secs_to_duration(self.rate_limit_delay_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        secs_to_duration(self.request_timeout_secs)
    }
}

/// Negative and NaN read as zero; values past the `Duration` range saturate.
fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
