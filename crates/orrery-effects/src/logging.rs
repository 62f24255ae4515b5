//! Tracing subscriber setup for host applications
//!
//! The coordination core only emits `tracing` events. Hosts that do not
//! install their own subscriber can call [`init_tracing`] once at startup.

use orrery_core::{OrreryError, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// Multi-line output with span context
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info,orrery_session=debug`
    pub filter: String,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
    /// Include the event target (module path) in each line
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

fn default_with_target() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Compact,
            with_target: true,
        }
    }
}

impl LogConfig {
    /// Build the filter, letting `RUST_LOG` take precedence when set
    pub fn env_filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.filter)
            .map_err(|e| OrreryError::config(format!("Invalid log filter '{}': {e}", self.filter)))
    }
}

/// Install a global `tracing` subscriber according to `config`.
///
/// Returns an error instead of panicking if a global subscriber is already set.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    installed.map_err(|e| {
        OrreryError::internal(format!("Failed to install tracing subscriber: {e}"))
    })?;
    tracing::debug!(filter = %config.filter, format = ?config.format, "tracing subscriber installed");
    Ok(())
}
