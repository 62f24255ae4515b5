//! Orrery Core - Interface layer for group-session coordination
//!
//! This crate holds the vocabulary shared by every other Orrery crate. It
//! contains no session logic of its own.
//!
//! # Contents
//!
//! - Identifiers: [`SessionId`], [`ParticipantId`]
//! - Time: [`PhysicalTime`] and the [`PhysicalTimeEffects`] clock interface
//! - Errors: [`OrreryError`] plus the per-interface [`TransportError`] and [`TimeError`]
//! - Serialization: canonical `bincode` wire helpers
//! - Configuration: validation trait and TOML loading helpers
//! - Activity metadata: [`ActivityDescriptor`] and [`SpatialConfiguration`]
//! - Effect interfaces: [`SessionTransportEffects`], [`MessageChannel`], [`InvitationEffects`]
//!
//! Implementations live elsewhere: production handlers in `orrery-effects`,
//! in-memory doubles in `orrery-testkit`, and the coordinator in `orrery-session`.

#![forbid(unsafe_code)]

/// Activity metadata and spatial arrangement preferences
pub mod activity;

/// Configuration validation and loading helpers
pub mod config;

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Unified error handling
pub mod errors;

/// Session and participant identifiers
pub mod identifiers;

/// Canonical wire serialization
pub mod serialization;

/// Physical timestamps
pub mod time;

pub use activity::{ActivityDescriptor, ActivityKind, SpatialConfiguration, SpatialTemplate};
pub use effects::{
    InboundMessage, InboundMessageStream, InvitationEffects, InvitationStream, MessageChannel,
    PhysicalTimeEffects, SessionHandle, SessionTransportEffects, TimeError, TransportError,
};
pub use errors::{OrreryError, Result};
pub use identifiers::{ParticipantId, SessionId};
pub use time::PhysicalTime;
