//! Application configuration loaded from the environment
//!
//! A `.env` file in the working directory is honoured for local development,
//! except in test builds.

use std::path::PathBuf;
use std::time::Duration;

use app_state::DEFAULT_PAGE_SIZE;
use perpus_client::http::DEFAULT_BASE_URL;

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is present but cannot be used
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings for one run of the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the books API
    pub api_url: String,
    /// Per-request timeout; the transport default applies when unset
    pub timeout: Option<Duration>,
    /// Directory of the persistent session slot
    pub data_dir: PathBuf,
    /// Rows per dashboard page
    pub page_size: usize,
    /// Delay before a form navigates back to the dashboard
    pub redirect_delay: Duration,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            data_dir: PathBuf::from("./perpus_data"),
            page_size: DEFAULT_PAGE_SIZE,
            redirect_delay: Duration::from_millis(1500),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("PERPUS_API_URL")
            .map(|url| url.trim().to_string())
            .unwrap_or(defaults.api_url);
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "PERPUS_API_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_url),
            ));
        }

        let timeout = lookup("PERPUS_TIMEOUT_SECS")
            .map(|raw| parse_number::<u64>("PERPUS_TIMEOUT_SECS", &raw))
            .transpose()?
            .map(Duration::from_secs);

        let data_dir = lookup("PERPUS_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir);

        let page_size = match lookup("PERPUS_PAGE_SIZE") {
            Some(raw) => {
                let size = parse_number::<usize>("PERPUS_PAGE_SIZE", &raw)?;
                if size == 0 {
                    return Err(ConfigError::InvalidValue(
                        "PERPUS_PAGE_SIZE".to_string(),
                        "page size must be at least 1".to_string(),
                    ));
                }
                size
            }
            None => defaults.page_size,
        };

        let redirect_delay = lookup("PERPUS_REDIRECT_DELAY_MS")
            .map(|raw| parse_number::<u64>("PERPUS_REDIRECT_DELAY_MS", &raw))
            .transpose()?
            .map(Duration::from_millis)
            .unwrap_or(defaults.redirect_delay);

        let log_filter = lookup("RUST_LOG").unwrap_or(defaults.log_filter);

        Ok(Self { api_url, timeout, data_dir, page_size, redirect_delay, log_filter })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| {
            ConfigError::InvalidValue(key.to_string(), format!("'{}' is not a valid number", raw))
        })
}
