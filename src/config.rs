//! Centralized configuration management for school-admin

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

use crate::admin_tui::fetch::CycleOrdering;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend
    pub api_url: String,
    /// Log file written by the tracing subscriber
    pub log_file: PathBuf,
    /// HTTP client configuration
    pub http: HttpConfig,
    /// Event loop configuration
    pub ui: UiConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

/// Event loop configuration
#[derive(Debug, Clone)]
pub struct UiConfig {
    /// How long the loop waits for a key before pumping async results (milliseconds)
    pub tick_ms: u64,
    /// Drop results of superseded fetch cycles instead of applying them in completion order
    pub latest_fetch_wins: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "school-admin/0.1.0".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: 200,
            latest_fetch_wins: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            log_file: PathBuf::from("./school_admin.log"),
            http: HttpConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let api_url = std::env::var("SCHOOL_ADMIN_API_URL")
            .unwrap_or(defaults.api_url);

        let log_file = std::env::var("SCHOOL_ADMIN_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);

        let http = HttpConfig {
            timeout_seconds: parse_env_var("SCHOOL_ADMIN_HTTP_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.http.timeout_seconds),
            user_agent: std::env::var("SCHOOL_ADMIN_USER_AGENT")
                .unwrap_or(defaults.http.user_agent),
        };

        let ui = UiConfig {
            tick_ms: parse_env_var("SCHOOL_ADMIN_TICK_MS")?.unwrap_or(defaults.ui.tick_ms),
            latest_fetch_wins: parse_env_var("SCHOOL_ADMIN_LATEST_FETCH_WINS")?
                .unwrap_or(defaults.ui.latest_fetch_wins),
        };

        Ok(Config {
            api_url,
            log_file,
            http,
            ui,
        })
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Get event loop tick as Duration
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.ui.tick_ms)
    }

    /// Ordering policy for overlapping fetch cycles
    pub fn cycle_ordering(&self) -> CycleOrdering {
        if self.ui.latest_fetch_wins {
            CycleOrdering::LatestIssued
        } else {
            CycleOrdering::Completion
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("Invalid API URL: {}", self.api_url))?;

        if self.http.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("HTTP timeout must be greater than zero"));
        }

        if self.ui.tick_ms == 0 {
            return Err(anyhow::anyhow!("Event loop tick must be greater than zero"));
        }

        // Check if parent directory of the log file exists
        if let Some(parent) = self.log_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(anyhow::anyhow!(
                    "Log file directory does not exist: {}",
                    parent.display()
                ));
            }
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.ui.tick_ms, 200);
        assert_eq!(config.cycle_ordering(), CycleOrdering::Completion);
    }

    #[test]
    fn test_config_validation() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            log_file: temp_dir.path().join("school_admin.log"),
            ..Config::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let bad_url = Config {
            api_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(bad_url.validate().is_err());

        let mut zero_timeout = Config::default();
        zero_timeout.http.timeout_seconds = 0;
        assert!(zero_timeout.validate().is_err());

        let missing_dir = Config {
            log_file: PathBuf::from("/definitely/missing/dir/school_admin.log"),
            ..Config::default()
        };
        assert!(missing_dir.validate().is_err());
    }

    #[test]
    fn test_latest_fetch_wins_selects_sequence_guard() {
        let mut config = Config::default();
        config.ui.latest_fetch_wins = true;
        assert_eq!(config.cycle_ordering(), CycleOrdering::LatestIssued);
    }
}
