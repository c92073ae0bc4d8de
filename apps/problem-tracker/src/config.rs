//! Configuration for the problem tracker.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const APP_NAME: &str = "problem-tracker";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// chrono format string used for every date shown.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_queue_limit")]
    pub review_queue_limit: usize,
    #[serde(default = "default_toast_secs")]
    pub toast_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            date_format: default_date_format(),
            review_queue_limit: default_queue_limit(),
            toast_secs: default_toast_secs(),
        }
    }
}

fn default_page_size() -> usize {
    review_core::DEFAULT_PAGE_SIZE
}

fn default_date_format() -> String {
    "%b %-d, %Y".to_string()
}

fn default_queue_limit() -> usize {
    20
}

fn default_toast_secs() -> u64 {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            enabled: true,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Read the config file. A missing file yields defaults; a file that
    /// cannot be read or parsed is an error the caller may ignore.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config at {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|d| d.config_dir().join("config.toml"))
    }

    pub fn log_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|d| d.data_dir().join("problem-tracker.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.display.page_size, 10);
        assert_eq!(config.log.level, "info");
        assert!(config.log.enabled);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::parse(
            r#"
            [api]
            base_url = "https://tracker.example.com/api/"

            [display]
            page_size = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://tracker.example.com/api/");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.display.page_size, 25);
        assert_eq!(config.display.review_queue_limit, 20);
    }

    #[test]
    fn test_zero_timeout_is_raised() {
        let config = Config::parse("[api]\ntimeout_secs = 0\n").unwrap();
        assert_eq!(config.api.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_malformed_file_is_error() {
        assert!(Config::parse("[api\nbase_url = 3").is_err());
    }
}
