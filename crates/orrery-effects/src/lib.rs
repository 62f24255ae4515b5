//! Orrery Effects - Production effect handlers
//!
//! Stateless production implementations of the interfaces in `orrery-core`
//! that do not depend on the host platform's group-session service:
//!
//! - [`RealTimeHandler`]: system wall clock for [`orrery_core::PhysicalTimeEffects`]
//! - [`logging`]: `tracing` subscriber setup for host applications
//!
//! Mock handlers belong in `orrery-testkit`, not here.

#![forbid(unsafe_code)]

pub mod logging;
pub mod time;

pub use logging::{init_tracing, LogConfig, LogFormat};
pub use time::RealTimeHandler;
