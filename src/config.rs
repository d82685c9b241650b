//! Service configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Background round monitor settings.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Spawn a monitor for each started session.
    #[serde(default = "default_monitor_enabled")]
    enabled: bool,

    /// Milliseconds between round checks.
    #[serde(default = "default_interval_ms")]
    interval_ms: u64,
}

impl MonitorConfig {
    /// Creates a monitor configuration.
    pub fn new(enabled: bool, interval_ms: u64) -> Self {
        Self {
            enabled,
            interval_ms,
        }
    }

    /// Poll interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new(default_monitor_enabled(), default_interval_ms())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,
}

impl HttpConfig {
    /// Creates an HTTP configuration.
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(default_host(), default_port())
    }
}

/// Configuration for the draft service.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Run the round checks right after each accepted pick.
    #[serde(default = "default_evaluate_on_pick")]
    evaluate_on_pick: bool,

    /// Generated ids tried before giving up on a collision.
    #[serde(default = "default_id_attempts")]
    id_attempts: usize,

    /// Background monitor.
    #[serde(default)]
    monitor: MonitorConfig,

    /// HTTP listener.
    #[serde(default)]
    http: HttpConfig,
}

#[instrument]
fn default_evaluate_on_pick() -> bool {
    true
}

#[instrument]
fn default_id_attempts() -> usize {
    16
}

#[instrument]
fn default_monitor_enabled() -> bool {
    true
}

#[instrument]
fn default_interval_ms() -> u64 {
    5_000
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    3000
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            evaluate_on_pick: default_evaluate_on_pick(),
            id_attempts: default_id_attempts(),
            monitor: MonitorConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(
            evaluate_on_pick = config.evaluate_on_pick,
            monitor_enabled = config.monitor.enabled,
            interval_ms = config.monitor.interval_ms,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.monitor.interval_ms == 0 {
            return Err(ConfigError::new(
                "monitor.interval_ms must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    /// Returns a copy with the synchronous post-pick check switched.
    pub fn with_evaluate_on_pick(mut self, enabled: bool) -> Self {
        self.evaluate_on_pick = enabled;
        self
    }

    /// Returns a copy with a different monitor configuration.
    pub fn with_monitor(mut self, monitor: MonitorConfig) -> Self {
        self.monitor = monitor;
        self
    }

    /// Returns a copy listening somewhere else.
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
