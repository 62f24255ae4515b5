//! Core configuration traits and loading helpers
//!
//! Configuration types are plain serde structs with a `Default`. They are
//! loaded from TOML, optionally overridden from `ORRERY_*` environment
//! variables, and validated before use.

use crate::{OrreryError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "ORRERY_";

/// Trait for configuration validation
pub trait ConfigValidation {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;
}

/// Parse a configuration value from a TOML string and validate it
pub fn parse_toml<T>(content: &str) -> Result<T>
where
    T: DeserializeOwned + ConfigValidation,
{
    let config: T = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load a configuration value from a TOML file and validate it
pub fn load_toml<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + ConfigValidation,
{
    let content = std::fs::read_to_string(path).map_err(|e| {
        OrreryError::config(format!(
            "Failed to read config file {}: {e}",
            path.display()
        ))
    })?;
    parse_toml(&content)
}

/// Read an `ORRERY_`-prefixed environment variable, if set and non-empty
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}"))
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Parse an environment override value, naming the key in the error
pub fn parse_env_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| {
        OrreryError::config(format!("Invalid value for {ENV_PREFIX}{key}: {e}"))
    })
}
