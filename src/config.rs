//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the JitoX backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Third-party SOL price endpoint (queried with `ids=solana&vs_currencies=usd`)
    #[serde(default = "default_price_url")]
    pub price_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for domain data requests
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Timeout for the price lookup
    #[serde(default = "default_price_timeout")]
    pub price_timeout_ms: u64,

    /// Timeout for deposit/withdrawal submissions
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_ms: u64,

    /// Reserved. No request reads this value.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Reserved. No request reads this value.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_base_url() -> String {
    "https://api.jitox.ai".to_string()
}

fn default_price_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price".to_string()
}

fn default_user_agent() -> String {
    "JitoX-Terminal/1.0".to_string()
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_price_timeout() -> u64 {
    5_000
}

fn default_submit_timeout() -> u64 {
    15_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            price_url: default_price_url(),
            user_agent: default_user_agent(),
            request_timeout_ms: default_request_timeout(),
            price_timeout_ms: default_price_timeout(),
            submit_timeout_ms: default_submit_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

/// Wallet polling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    5_000
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("jitox").join("config.toml")),
            Some(PathBuf::from("/etc/jitox/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Client overrides
        if let Some(url) = lookup("JITOX_BASE_URL") {
            self.client.base_url = url;
        }
        if let Some(url) = lookup("JITOX_PRICE_URL") {
            self.client.price_url = url;
        }
        if let Some(timeout) = lookup("JITOX_REQUEST_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                self.client.request_timeout_ms = ms;
            }
        }

        // Polling overrides
        if let Some(interval) = lookup("JITOX_POLL_INTERVAL_MS") {
            if let Ok(ms) = interval.parse() {
                self.polling.interval_ms = ms;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("JITOX_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("JITOX_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# JitoX Terminal Configuration
#
# Environment variables override these settings:
# - JITOX_BASE_URL
# - JITOX_PRICE_URL
# - JITOX_REQUEST_TIMEOUT_MS
# - JITOX_POLL_INTERVAL_MS
# - JITOX_LOG_LEVEL
# - JITOX_LOG_FORMAT

[client]
# JitoX backend
base_url = "https://api.jitox.ai"

# SOL/USD price source
price_url = "https://api.coingecko.com/api/v3/simple/price"

# Identifying client header
user_agent = "JitoX-Terminal/1.0"

# Timeouts (ms): domain data, price lookup, deposit/withdrawal submissions
request_timeout_ms = 10000
price_timeout_ms = 5000
submit_timeout_ms = 15000

# Reserved, not applied to any request
max_retries = 3
retry_delay_ms = 1000

[polling]
# Wallet polling interval (ms)
interval_ms = 5000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
