//! Coordinator configuration

use orrery_core::config::{env_var, parse_env_value, ConfigValidation};
use orrery_core::{ActivityDescriptor, OrreryError, SpatialConfiguration};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`SessionCoordinator`](crate::SessionCoordinator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Label announced for the local participant
    pub display_name: String,
    /// Activity offered to the transport on activation
    pub activity: ActivityDescriptor,
    /// Spatial arrangement requested once per connection; `None` skips it
    pub spatial: Option<SpatialConfiguration>,
    /// Upper bound on activation, `None` waits for the transport
    pub activation_timeout_ms: Option<u64>,
    /// How long `leave` waits for queued outbound actions to flush
    pub outbound_drain_timeout_ms: u64,
    /// Send a full snapshot when a new remote participant joins
    pub sync_late_joiners: bool,
    /// Style broadcast when the local immersive space opens
    pub default_immersion_style: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            display_name: "Explorer".to_string(),
            activity: ActivityDescriptor::default(),
            spatial: Some(SpatialConfiguration::default()),
            activation_timeout_ms: None,
            outbound_drain_timeout_ms: 1000,
            sync_late_joiners: true,
            default_immersion_style: "progressive".to_string(),
        }
    }
}

impl CoordinatorConfig {
    /// Override fields from `ORRERY_*` environment variables
    pub fn apply_env_overrides(mut self) -> orrery_core::Result<Self> {
        if let Some(name) = env_var("DISPLAY_NAME") {
            self.display_name = name;
        }
        if let Some(value) = env_var("ACTIVATION_TIMEOUT_MS") {
            self.activation_timeout_ms = Some(parse_env_value("ACTIVATION_TIMEOUT_MS", &value)?);
        }
        if let Some(value) = env_var("SYNC_LATE_JOINERS") {
            self.sync_late_joiners = parse_env_value("SYNC_LATE_JOINERS", &value)?;
        }
        Ok(self)
    }

    /// Activation timeout as a [`Duration`]
    pub fn activation_timeout(&self) -> Option<Duration> {
        self.activation_timeout_ms.map(Duration::from_millis)
    }

    /// Outbound drain timeout as a [`Duration`]
    pub fn outbound_drain_timeout(&self) -> Duration {
        Duration::from_millis(self.outbound_drain_timeout_ms)
    }
}

impl ConfigValidation for CoordinatorConfig {
    fn validate(&self) -> orrery_core::Result<()> {
        if self.display_name.trim().is_empty() {
            return Err(OrreryError::config("display_name must not be empty"));
        }
        if self.activity.identifier.trim().is_empty() {
            return Err(OrreryError::config("activity.identifier must not be empty"));
        }
        if self.activation_timeout_ms == Some(0) {
            return Err(OrreryError::config(
                "activation_timeout_ms must be greater than zero when set",
            ));
        }
        if self.outbound_drain_timeout_ms == 0 {
            return Err(OrreryError::config(
                "outbound_drain_timeout_ms must be greater than zero",
            ));
        }
        if let Some(spatial) = &self.spatial {
            if !spatial.content_extent.is_finite() || spatial.content_extent <= 0.0 {
                return Err(OrreryError::config(format!(
                    "spatial.content_extent must be positive, got {}",
                    spatial.content_extent
                )));
            }
        }
        if self.default_immersion_style.trim().is_empty() {
            return Err(OrreryError::config(
                "default_immersion_style must not be empty",
            ));
        }
        Ok(())
    }
}
