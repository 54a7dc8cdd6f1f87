//! Metrics configuration
//!
//! Loaded from environment variables or a TOML file.
//!
//! ## Loading Strategy
//! 1. [`MetricsConfig::from_env`] reads every `FAULTLINE_*` variable
//! 2. If a variable is missing, [`MetricsConfig::load`] falls back to the
//!    TOML file at the given path. A variable that is set but invalid is an
//!    error.
//! 3. Without a file, defaults apply
//!
//! ## Environment Variables
//! - `FAULTLINE_POOL_CHANNEL_CAPACITY`: pool usage channel capacity
//!
//! ## File Format
//! ```toml
//! [pool]
//! channel_capacity = 64
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, MetricsResult};

/// Environment variable holding the pool usage channel capacity
pub const ENV_POOL_CHANNEL_CAPACITY: &str = "FAULTLINE_POOL_CHANNEL_CAPACITY";

/// Top-level metrics configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub pool: PoolTrackerConfig,
}

/// Pool usage tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolTrackerConfig {
    /// Samples buffered before producers start waiting on the consumer.
    /// Must be at least 1.
    pub channel_capacity: usize,
}

impl Default for PoolTrackerConfig {
    fn default() -> Self {
        Self { channel_capacity: 1 }
    }
}

impl PoolTrackerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::invalid("pool.channel_capacity", "must be greater than 0"));
        }
        Ok(())
    }

    /// Set the channel capacity
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

impl MetricsConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool.validate()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> MetricsResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> MetricsResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Build the configuration from environment variables
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingEnv`] or [`ConfigError::InvalidEnv`] when
    /// a variable is absent or unparsable, and [`ConfigError::Invalid`] when
    /// the parsed values fail validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let capacity = env_var(ENV_POOL_CHANNEL_CAPACITY)?;
        let channel_capacity = capacity.trim().parse::<usize>().map_err(|e| {
            ConfigError::InvalidEnv { name: ENV_POOL_CHANNEL_CAPACITY.into(), message: e.to_string() }
        })?;

        let config = Self { pool: PoolTrackerConfig { channel_capacity } };
        config.validate()?;
        Ok(config)
    }

    /// Load with fallback: environment, then `path` if given, then defaults
    ///
    /// Only a missing variable triggers the fallback.
    ///
    /// # Errors
    /// Returns the environment error when a variable is set but unparsable or
    /// invalid, and any error from [`from_file`](Self::from_file).
    pub fn load(path: Option<&Path>) -> MetricsResult<Self> {
        match Self::from_env() {
            Ok(config) => Ok(config),
            Err(ConfigError::MissingEnv { .. }) => match path {
                Some(path) => Self::from_file(path),
                None => Ok(Self::default()),
            },
            Err(error) => Err(error.into()),
        }
    }
}

fn env_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnv { name: name.to_string() })
}
