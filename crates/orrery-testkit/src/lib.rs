//! Orrery Testing Infrastructure
//!
//! In-memory stand-ins for the external collaborators of the coordination
//! core, so session behavior can be tested without a platform transport.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! orrery-testkit = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! let hub = MemorySessionHub::new();
//! let transport = hub.transport("ana");
//! let coordinator = SessionCoordinator::new(config, transport.clone(), SimulatedTimeHandler::default())?;
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod helpers;
pub mod time;
pub mod transport;

pub use helpers::{init_test_tracing, wait_until};
pub use time::SimulatedTimeHandler;
pub use transport::{MemoryChannel, MemorySessionHub, MemoryTransport, TransportLog};
