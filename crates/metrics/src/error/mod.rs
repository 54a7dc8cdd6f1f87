//! Error types for the few metrics operations that can fail
//!
//! Recording never fails: `update`, `increment`, `update_max`, `add`, `reset`
//! and registry calls have no error path. Errors only show up at the edges:
//! - loading or validating configuration
//! - sending a pool usage sample after the tracker's channel was closed
//!
//! A closed-channel send is a usage bug in the caller. It is surfaced as
//! [`MetricsError::TrackerClosed`] instead of a panic so dispatch code can
//! decide for itself how loud to be about it.

use thiserror::Error;

/// Configuration validation and loading errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range
    #[error("Invalid configuration in field '{field}': {message}")]
    Invalid { field: String, message: String },

    /// A required environment variable is not set
    #[error("Missing environment variable: {name}")]
    MissingEnv { name: String },

    /// An environment variable could not be parsed
    #[error("Invalid value for environment variable {name}: {message}")]
    InvalidEnv { name: String, message: String },
}

impl ConfigError {
    /// Create an error for a field with an invalid value
    pub fn invalid<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Invalid { field: field.into(), message: message.into() }
    }
}

/// Errors surfaced by the metrics crate
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A sample was sent to a pool tracker whose channel is closed
    #[error("Pool usage tracker '{name}' is closed")]
    TrackerClosed { name: String },

    /// Configuration was rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration file could not be read
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML
    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A pool tracker was created on a thread with no Tokio runtime
    #[cfg(feature = "runtime")]
    #[error("Pool usage tracker '{name}' needs a Tokio runtime")]
    NoRuntime { name: String },

    /// The pool tracker consumer task panicked or was cancelled
    #[cfg(feature = "runtime")]
    #[error("Pool usage consumer for '{name}' failed: {source}")]
    ConsumerFailed {
        name: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl MetricsError {
    /// Create a closed-tracker error for the named pool
    pub fn tracker_closed<S: Into<String>>(name: S) -> Self {
        Self::TrackerClosed { name: name.into() }
    }

    /// Whether the error comes from configuration rather than recording
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Io(_) | Self::Toml(_))
    }
}

/// Result alias for fallible metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
