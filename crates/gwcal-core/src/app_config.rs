use std::path::PathBuf;

pub const DEFAULT_SOURCE_URL: &str = "https://ucigravelworldseries.com/en/calendar/";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_USER_AGENT: &str = "gw-fetcher/1.0";

/// Runtime settings for one calendar run.
///
/// Built from `GWCAL_*` environment variables by [`crate::load_app_config`];
/// individual fields may then be overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub source_url: String,
    pub geocoder_url: String,
    pub output_path: PathBuf,
    pub cache_dir: PathBuf,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Total geocode attempts per query, including the first one.
    pub geocode_max_attempts: u32,
    pub geocode_backoff_base_ms: u64,
    /// Minimum gap between two remote geocode calls. `0` disables pacing.
    pub geocode_delay_ms: u64,
    pub log_level: String,
}
