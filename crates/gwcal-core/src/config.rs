use std::path::PathBuf;

use crate::app_config::{AppConfig, DEFAULT_GEOCODER_URL, DEFAULT_SOURCE_URL, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric value cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric value cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let source_url = or_default("GWCAL_SOURCE_URL", DEFAULT_SOURCE_URL);
    let geocoder_url = or_default("GWCAL_GEOCODER_URL", DEFAULT_GEOCODER_URL);
    let output_path = PathBuf::from(or_default("GWCAL_OUTPUT_PATH", "data/calendar.json"));
    let cache_dir = PathBuf::from(or_default("GWCAL_CACHE_DIR", "cache"));
    let user_agent = or_default("GWCAL_USER_AGENT", DEFAULT_USER_AGENT);
    let request_timeout_secs = parse_u64("GWCAL_REQUEST_TIMEOUT_SECS", "15")?;
    let geocode_max_attempts = parse_u32("GWCAL_GEOCODE_MAX_ATTEMPTS", "3")?;
    let geocode_backoff_base_ms = parse_u64("GWCAL_GEOCODE_BACKOFF_BASE_MS", "1000")?;
    let geocode_delay_ms = parse_u64("GWCAL_GEOCODE_DELAY_MS", "0")?;
    let log_level = or_default("GWCAL_LOG_LEVEL", "info");

    if geocode_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GWCAL_GEOCODE_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        source_url,
        geocoder_url,
        output_path,
        cache_dir,
        user_agent,
        request_timeout_secs,
        geocode_max_attempts,
        geocode_backoff_base_ms,
        geocode_delay_ms,
        log_level,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
