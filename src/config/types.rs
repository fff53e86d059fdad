//! Configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::common::errors::{ClientError, Result};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Discord webhook that receives low-float notifications
    pub discord_webhook: String,
    /// Pages to scan on every tick
    #[serde(default)]
    pub pages: Vec<PageConfig>,
    /// Seconds between ticks
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// Base URL of the float lookup sidecar
    #[serde(default = "default_float_api_url")]
    pub float_api_url: String,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// A page to scan and the float threshold for its items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page URL
    pub url: String,
    /// Items at or below this float are notified
    #[serde(alias = "maxFloat", alias = "maxfloat")]
    pub max_float: f64,
}

impl PageConfig {
    pub fn new(url: impl Into<String>, max_float: f64) -> Self {
        Self {
            url: url.into(),
            max_float,
        }
    }
}

fn default_check_interval() -> u64 {
    60
}

fn default_float_api_url() -> String {
    "http://localhost:3000".to_string()
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Retries for a failed page fetch (429 responses do not count)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before retrying a failed page fetch
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Delay after a 429 response
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay_ms: u64,
    /// New links looked up per page per tick
    #[serde(default = "default_max_links_per_page")]
    pub max_links_per_page: usize,
    /// User-Agent sent with page fetches
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
            rate_limit_delay_ms: default_rate_limit_delay(),
            max_links_per_page: default_max_links_per_page(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5_000
}

fn default_rate_limit_delay() -> u64 {
    120_000
}

fn default_max_links_per_page() -> usize {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

impl AppConfig {
    /// Build a config with default settings
    pub fn new(discord_webhook: impl Into<String>, pages: Vec<PageConfig>) -> Self {
        Self {
            discord_webhook: discord_webhook.into(),
            pages,
            check_interval_seconds: default_check_interval(),
            float_api_url: default_float_api_url(),
            settings: AppSettings::default(),
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }

    /// Reject values the poll loop cannot work with
    pub fn validate(&self) -> Result<()> {
        parse_url("discord_webhook", &self.discord_webhook)?;
        parse_url("float_api_url", &self.float_api_url)?;

        if self.check_interval_seconds == 0 {
            return Err(ClientError::Configuration(
                "check_interval_seconds must be greater than zero".to_string(),
            ));
        }
        if self.settings.max_links_per_page == 0 {
            return Err(ClientError::Configuration(
                "settings.max_links_per_page must be greater than zero".to_string(),
            ));
        }

        for (i, page) in self.pages.iter().enumerate() {
            parse_url(&format!("pages[{}].url", i), &page.url)?;
            if !page.max_float.is_finite() || page.max_float < 0.0 {
                return Err(ClientError::Configuration(format!(
                    "pages[{}].max_float must be a non-negative number, got {}",
                    i, page.max_float
                )));
            }
        }

        Ok(())
    }

    /// Non-fatal problems, for logging once a subscriber is installed
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.pages.is_empty() {
            warnings.push("No pages configured, every tick will be a no-op".to_string());
        }
        warnings
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url> {
    Url::parse(value)
        .map_err(|e| ClientError::Configuration(format!("{} is not a valid URL ({}): {}", field, e, value)))
}
