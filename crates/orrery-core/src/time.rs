//! Physical timestamps
//!
//! `PhysicalTime` records when something happened on the local device's clock.
//! Timestamps are never compared across participants for ordering; the shared
//! state only uses them to record local recency.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock timestamp in milliseconds since the Unix epoch
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PhysicalTime {
    /// Milliseconds since the Unix epoch
    pub ts_ms: u64,
}

impl PhysicalTime {
    /// The Unix epoch
    pub const EPOCH: Self = Self { ts_ms: 0 };

    /// Create a timestamp from milliseconds since the epoch
    pub const fn from_millis(ts_ms: u64) -> Self {
        Self { ts_ms }
    }

    /// Milliseconds since the epoch
    pub const fn as_millis(&self) -> u64 {
        self.ts_ms
    }

    /// Returns a timestamp `ms` milliseconds later, saturating at `u64::MAX`
    pub fn saturating_add_ms(self, ms: u64) -> Self {
        Self {
            ts_ms: self.ts_ms.saturating_add(ms),
        }
    }
}

impl fmt::Display for PhysicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.ts_ms)
    }
}
