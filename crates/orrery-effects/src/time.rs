//! Real time effect handler for production use

use async_trait::async_trait;
use orrery_core::{PhysicalTime, PhysicalTimeEffects, TimeError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Real time handler for production use
///
/// Stateless; every call reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeHandler;

impl RealTimeHandler {
    /// Create a new real time handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhysicalTimeEffects for RealTimeHandler {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TimeError::ClockUnavailable {
                reason: format!("system clock before Unix epoch: {e}"),
            })?;
        let ts_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        Ok(PhysicalTime::from_millis(ts_ms))
    }
}
