use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; shadowcrawl/0.1; +storefront-indexer)";

/// Reads `SHADOWCRAWL_*` settings, after merging any `.env` file into the
/// process environment.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for the first variable that is set
/// but out of range or unparseable. Unset variables take their defaults.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Reads `SHADOWCRAWL_*` settings from the process environment only.
///
/// # Errors
///
/// Same as [`load_app_config`].
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Builds an [`AppConfig`] from `lookup`, which stands in for `std::env::var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;
    use std::time::Duration;

    let or_default =
        |var: &str, default: &str| lookup(var).unwrap_or_else(|_| default.to_owned());

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_secs = |var: &str, default: &str, allow_zero: bool| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let secs = raw
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(invalid(
                var,
                format!("{raw} is not a finite, non-negative number of seconds"),
            ));
        }
        if !allow_zero && secs <= 0.0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        if Duration::try_from_secs_f64(secs).is_err() {
            return Err(invalid(var, format!("{raw} seconds is too large")));
        }
        Ok(secs)
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("SHADOWCRAWL_ENV", "development"))?;
    let log_level = or_default("SHADOWCRAWL_LOG_LEVEL", "info");
    let stores_path = PathBuf::from(or_default(
        "SHADOWCRAWL_STORES_PATH",
        "./config/stores.yaml",
    ));

    let rate_limit_delay_secs = parse_secs("SHADOWCRAWL_RATE_LIMIT_DELAY_SECS", "2.0", true)?;
    let max_concurrent_crawls = parse_usize("SHADOWCRAWL_MAX_CONCURRENT_CRAWLS", "10")?;
    let request_timeout_secs = parse_secs("SHADOWCRAWL_REQUEST_TIMEOUT_SECS", "15.0", false)?;
    let user_agent = or_default("SHADOWCRAWL_USER_AGENT", DEFAULT_USER_AGENT);

    Ok(AppConfig {
        env,
        log_level,
        stores_path,
        rate_limit_delay_secs,
        max_concurrent_crawls,
        request_timeout_secs,
        user_agent,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHADOWCRAWL_ENV".to_string(),
            reason: format!("expected development, test, or production; got {other}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
