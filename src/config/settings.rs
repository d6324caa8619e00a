//! Application settings and configuration management

use crate::audio::HttpBackendConfig;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Catalog JSON location: a file path or an http(s) URL
    #[serde(default = "default_catalog_source")]
    pub catalog_source: String,
    /// Prefix joined to relative audio file paths
    #[serde(default)]
    pub audio_base_url: Option<String>,
    /// How long the session waits for "can play through" before starting anyway
    #[serde(default = "default_readiness_timeout_ms")]
    pub readiness_timeout_ms: u64,
    /// Bytes buffered before the HTTP backend reports it can play through
    #[serde(default = "default_ready_buffer_bytes")]
    pub ready_buffer_bytes: usize,
    /// Bytes fetched when probing a stream
    #[serde(default = "default_probe_bytes")]
    pub probe_bytes: usize,
    #[serde(default = "default_skip_forward_secs")]
    pub skip_forward_secs: f64,
    #[serde(default = "default_skip_backward_secs")]
    pub skip_backward_secs: f64,
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,
    /// Tracing filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_catalog_source() -> String {
    "complete-sermon-library.json".to_string()
}

fn default_readiness_timeout_ms() -> u64 {
    5000
}

fn default_ready_buffer_bytes() -> usize {
    256 * 1024
}

fn default_probe_bytes() -> usize {
    64 * 1024
}

fn default_skip_forward_secs() -> f64 {
    30.0
}

fn default_skip_backward_secs() -> f64 {
    15.0
}

fn default_initial_volume() -> f32 {
    1.0
}

fn default_log_filter() -> String {
    "warn".to_string()
}

/// Error types for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(s) => write!(f, "Parse error: {}", s),
            ConfigError::ValidationError(s) => write!(f, "Validation error: {}", s),
        }
    }
}

impl Error for ConfigError {}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            catalog_source: default_catalog_source(),
            audio_base_url: None,
            readiness_timeout_ms: default_readiness_timeout_ms(),
            ready_buffer_bytes: default_ready_buffer_bytes(),
            probe_bytes: default_probe_bytes(),
            skip_forward_secs: default_skip_forward_secs(),
            skip_backward_secs: default_skip_backward_secs(),
            initial_volume: default_initial_volume(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Load settings from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("sermon-stream").join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog_source.trim().is_empty() {
            return Err(ConfigError::ValidationError("Catalog source cannot be empty".to_string()));
        }

        if self.readiness_timeout_ms == 0 {
            return Err(ConfigError::ValidationError("Readiness timeout must be positive".to_string()));
        }

        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(ConfigError::ValidationError(format!(
                "Initial volume {} is outside 0.0..=1.0",
                self.initial_volume
            )));
        }

        let skip_ok = |s: f64| s.is_finite() && s > 0.0;
        if !skip_ok(self.skip_forward_secs) || !skip_ok(self.skip_backward_secs) {
            return Err(ConfigError::ValidationError("Skip amounts must be positive".to_string()));
        }

        if let Some(base) = &self.audio_base_url {
            url::Url::parse(base)
                .map_err(|e| ConfigError::ValidationError(format!("Invalid audio base URL '{}': {}", base, e)))?;
        }

        Ok(())
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    /// Tuning for the HTTP streaming backend
    pub fn http_backend_config(&self) -> HttpBackendConfig {
        HttpBackendConfig {
            ready_buffer_bytes: self.ready_buffer_bytes,
            probe_bytes: self.probe_bytes,
            ..Default::default()
        }
    }
}
