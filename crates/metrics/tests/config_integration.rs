//! Integration tests for configuration loading
//!
//! Environment variables are process-wide, so every step that touches them
//! lives in a single test.

#![cfg(feature = "foundation")]

use std::fs;
use std::path::PathBuf;

use faultline_metrics::config::ENV_POOL_CHANNEL_CAPACITY;
use faultline_metrics::{ConfigError, MetricsConfig, MetricsError};
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> anyhow::Result<PathBuf> {
    let path = dir.path().join("metrics.toml");
    fs::write(&path, contents)?;
    Ok(path)
}

/// Validates loading a TOML file from disk.
#[test]
fn test_from_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[pool]\nchannel_capacity = 32\n")?;

    let config = MetricsConfig::from_file(&path)?;
    assert_eq!(config.pool.channel_capacity, 32);
    Ok(())
}

/// Validates that a missing file surfaces as an I/O error.
#[test]
fn test_from_file_missing() {
    let dir = TempDir::new().unwrap();
    let result = MetricsConfig::from_file(dir.path().join("absent.toml"));

    let error = result.unwrap_err();
    assert!(matches!(error, MetricsError::Io(_)));
    assert!(error.is_config());
}

/// Validates that an invalid value in a file is rejected after parsing.
#[test]
fn test_from_file_invalid_capacity() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[pool]\nchannel_capacity = 0\n")?;

    let error = MetricsConfig::from_file(&path).unwrap_err();
    assert!(matches!(error, MetricsError::Config(ConfigError::Invalid { .. })));
    Ok(())
}

/// Validates the environment-first loading strategy.
///
/// # Test Steps
/// 1. Without the variable, `from_env` reports it missing
/// 2. `load` falls back to the file, then to defaults
/// 3. An unparsable or zero variable is reported by both `from_env` and
///    `load`, without falling back
/// 4. A valid variable wins over the file
#[test]
fn test_environment_then_file_then_defaults() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[pool]\nchannel_capacity = 8\n")?;

    std::env::remove_var(ENV_POOL_CHANNEL_CAPACITY);
    assert_eq!(
        MetricsConfig::from_env(),
        Err(ConfigError::MissingEnv { name: ENV_POOL_CHANNEL_CAPACITY.to_string() })
    );
    assert_eq!(MetricsConfig::load(Some(&path))?.pool.channel_capacity, 8);
    assert_eq!(MetricsConfig::load(None)?, MetricsConfig::default());

    std::env::set_var(ENV_POOL_CHANNEL_CAPACITY, "lots");
    assert!(matches!(MetricsConfig::from_env(), Err(ConfigError::InvalidEnv { .. })));
    assert!(matches!(
        MetricsConfig::load(Some(&path)),
        Err(MetricsError::Config(ConfigError::InvalidEnv { .. }))
    ));

    std::env::set_var(ENV_POOL_CHANNEL_CAPACITY, "0");
    assert!(matches!(
        MetricsConfig::load(None),
        Err(MetricsError::Config(ConfigError::Invalid { .. }))
    ));

    std::env::set_var(ENV_POOL_CHANNEL_CAPACITY, " 128 ");
    assert_eq!(MetricsConfig::from_env()?.pool.channel_capacity, 128);
    assert_eq!(MetricsConfig::load(Some(&path))?.pool.channel_capacity, 128);

    std::env::remove_var(ENV_POOL_CHANNEL_CAPACITY);
    Ok(())
}
