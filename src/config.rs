//! # Camera Host Configuration
//!
//! Server address and motion timings, loaded from a TOML file. Every field has
//! a default, so an empty file (or no file at all) gives the stock behaviour.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:5000"
//!
//! [motion]
//! base_step_secs = 3.0
//! idle_poll_ms = 100
//! settle_grace_ms = 20
//! capture_dwell_ms = 2000
//! ```
//!
//! Grid bounds are not configurable; see `crate::grid`.

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Upper bound for `motion.base_step_secs`: one hour for the first block.
pub const MAX_BASE_STEP_SECS: f64 = 3600.0;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub motion: MotionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

/// Worker timings. The step delay comes from the speed profile scaled by
/// `base_step_secs`; the rest are fixed waits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MotionConfig {
    #[serde(default = "default_base_step_secs")]
    pub base_step_secs: f64,
    #[serde(default = "default_idle_poll_ms")]
    pub idle_poll_ms: u64,
    #[serde(default = "default_settle_grace_ms")]
    pub settle_grace_ms: u64,
    #[serde(default = "default_capture_dwell_ms")]
    pub capture_dwell_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            base_step_secs: default_base_step_secs(),
            idle_poll_ms: default_idle_poll_ms(),
            settle_grace_ms: default_settle_grace_ms(),
            capture_dwell_ms: default_capture_dwell_ms(),
        }
    }
}

impl MotionConfig {
    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn settle_grace(&self) -> Duration {
        Duration::from_millis(self.settle_grace_ms)
    }

    pub fn capture_dwell(&self) -> Duration {
        Duration::from_millis(self.capture_dwell_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.base_step_secs.is_finite() || self.base_step_secs <= 0.0 {
            return Err("motion.base_step_secs must be a positive number".to_string());
        }
        if self.base_step_secs > MAX_BASE_STEP_SECS {
            return Err(format!("motion.base_step_secs must be at most {}", MAX_BASE_STEP_SECS));
        }
        if self.idle_poll_ms == 0 {
            return Err("motion.idle_poll_ms must be > 0".to_string());
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .bind
            .parse::<std::net::SocketAddr>()
            .map_err(|e| ConfigError::Invalid(format!("server.bind '{}': {}", self.server.bind, e)))?;
        self.motion.validate().map_err(ConfigError::Invalid)
    }
}

// Default value functions
fn default_bind() -> String { "0.0.0.0:5000".to_string() }
fn default_base_step_secs() -> f64 { 3.0 }
fn default_idle_poll_ms() -> u64 { 100 }
fn default_settle_grace_ms() -> u64 { 20 }
fn default_capture_dwell_ms() -> u64 { 2000 }

/// Load and validate configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read config file '{}': {}", path, e);
        ConfigError::Io(e)
    })?;
    let config: Config = toml::from_str(&contents).map_err(|e| {
        tracing::error!("Failed to parse config TOML: {}", e);
        ConfigError::Toml(e)
    })?;
    config.validate()?;
    Ok(config)
}
