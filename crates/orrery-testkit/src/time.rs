//! Simulated clock for deterministic tests

use async_trait::async_trait;
use orrery_core::{PhysicalTime, PhysicalTimeEffects, TimeError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Manually driven clock shared between clones
#[derive(Debug, Clone)]
pub struct SimulatedTimeHandler {
    state: Arc<Mutex<ClockState>>,
}

#[derive(Debug)]
struct ClockState {
    now_ms: u64,
    unavailable: bool,
}

impl SimulatedTimeHandler {
    /// Create a clock frozen at `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState {
                now_ms: start_ms,
                unavailable: false,
            })),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, ms: u64) {
        let mut state = self.state.lock();
        state.now_ms = state.now_ms.saturating_add(ms);
    }

    /// Jump to an absolute time
    pub fn set(&self, ms: u64) {
        self.state.lock().now_ms = ms;
    }

    /// Current simulated time
    pub fn current(&self) -> PhysicalTime {
        PhysicalTime::from_millis(self.state.lock().now_ms)
    }

    /// Make `physical_time` fail until re-enabled
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }
}

impl Default for SimulatedTimeHandler {
    fn default() -> Self {
        Self::new(1_000)
    }
}

#[async_trait]
impl PhysicalTimeEffects for SimulatedTimeHandler {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        let state = self.state.lock();
        if state.unavailable {
            return Err(TimeError::ClockUnavailable {
                reason: "simulated clock disabled".to_string(),
            });
        }
        Ok(PhysicalTime::from_millis(state.now_ms))
    }
}
