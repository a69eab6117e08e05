//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::calculate::{MAX_WINDOW, MIN_WINDOW};
use crate::fetch::fpl::DEFAULT_BASE_URL;
use crate::models::PlayerMetric;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Upstream FPL API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FplConfig {
    /// Base URL of the public API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// How long a loaded snapshot (and its raw responses) stays fresh
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_user_agent() -> String {
    format!("fpl-analytics/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FplConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            cache_ttl_seconds: default_cache_ttl(),
            user_agent: default_user_agent(),
        }
    }
}

impl FplConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Directory of static dashboard files served at `/`
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            static_dir: None,
        }
    }
}

/// Defaults for analysis queries that don't specify them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_window")]
    pub default_window: usize,

    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    #[serde(default = "default_gameweeks")]
    pub default_gameweeks: u32,

    #[serde(default = "default_rank_by")]
    pub default_rank_by: PlayerMetric,
}

fn default_window() -> usize {
    5
}

fn default_top_n() -> usize {
    5
}

fn default_gameweeks() -> u32 {
    10
}

fn default_rank_by() -> PlayerMetric {
    PlayerMetric::TotalPoints
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_window: default_window(),
            default_top_n: default_top_n(),
            default_gameweeks: default_gameweeks(),
            default_rank_by: default_rank_by(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub fpl: FplConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            fpl: FplConfig::default(),
            server: ServerConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Where raw API responses are cached.
    pub fn raw_cache_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fpl.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "FPL timeout must be greater than 0".to_string(),
            ));
        }

        if self.fpl.cache_ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "FPL cache TTL must be greater than 0".to_string(),
            ));
        }

        if url::Url::parse(&self.fpl.base_url).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "FPL base URL is not a valid URL: {}",
                self.fpl.base_url
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        let window = self.analysis.default_window;
        if !(MIN_WINDOW..=MAX_WINDOW).contains(&window) {
            return Err(ConfigError::ValidationError(format!(
                "Default rolling window must be between {} and {}, got {}",
                MIN_WINDOW, MAX_WINDOW, window
            )));
        }

        if self.analysis.default_gameweeks == 0 {
            return Err(ConfigError::ValidationError(
                "Default gameweek horizon must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
