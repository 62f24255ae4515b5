//! Orrery Session - Group-session coordination core
//!
//! Establishes a multi-participant session, exchanges actions between
//! participants and reconciles a shared state so that every participant's
//! view converges.
//!
//! # Layers
//!
//! - [`protocol`]: the closed [`Action`] set, the [`SharedState`] snapshot and
//!   the versioned wire codec
//! - [`roster`]: [`ParticipantRoster`], unique by id, ordered by join
//! - [`store`]: [`SharedStateStore`], last-writer-wins application of actions
//! - [`channel`]: [`ActionChannel`], action encode/decode over the transport
//! - [`coordinator`]: [`SessionCoordinator`], the lifecycle state machine and
//!   sole mutator of the store
//! - [`invitations`]: [`InvitationListener`], joins sessions from invitations
//!
//! Transport, invitation detection and the clock are injected through the
//! effect traits in `orrery-core`.
//!
//! # Example
//!
//! ```ignore
//! let coordinator = SessionCoordinator::new(config, transport, RealTimeHandler::new())?;
//! coordinator.activate().await?;
//! coordinator.broadcast_local(Action::SelectPlanet(Planet::Mars)).await;
//! assert_eq!(coordinator.current_snapshot().selected_planet, Some(Planet::Mars));
//! coordinator.leave().await;
//! ```

#![forbid(unsafe_code)]

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod immersion;
pub mod invitations;
pub mod protocol;
pub mod roster;
pub mod store;

pub use channel::{ActionChannel, InboundAction, InboundActionStream};
pub use config::CoordinatorConfig;
pub use coordinator::{LifecycleState, Session, SessionCoordinator};
pub use errors::{Result, SessionError};
pub use immersion::{ImmersionTracker, ImmersiveSpaceState, InvalidImmersionTransition};
pub use invitations::InvitationListener;
pub use protocol::{
    decode_action, encode_action, Action, Participant, Planet, SharedState, UnknownPlanet,
    Vector3, WIRE_VERSION,
};
pub use roster::ParticipantRoster;
pub use store::{ApplyOutcome, SharedStateStore};
