//! Physical clock effect definition
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `orrery-effects` (`RealTimeHandler`), `orrery-testkit`
//!   (`SimulatedTimeHandler`)
//! - **Usage**: the coordinator stamps every applied action with local time

use crate::time::PhysicalTime;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for time operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    /// The clock could not be read
    #[error("Clock unavailable: {reason}")]
    ClockUnavailable {
        /// Reason the clock could not be read
        reason: String,
    },
}

/// Wall-clock time source
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current wall-clock time
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError>;
}

/// Blanket implementation for Arc<T> where T: PhysicalTimeEffects
#[async_trait]
impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for std::sync::Arc<T> {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        (**self).physical_time().await
    }
}
