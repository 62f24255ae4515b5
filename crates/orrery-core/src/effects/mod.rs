//! Effect interfaces consumed by the coordination core
//!
//! These traits describe the external collaborators the coordinator talks to.
//! Nothing in this module performs I/O; implementations are provided by:
//!
//! - Production: the host platform's group-session transport and `orrery-effects`
//! - Testing: the in-memory session hub in `orrery-testkit`

pub mod session;
pub mod time;

pub use session::{
    InboundMessage, InboundMessageStream, InvitationEffects, InvitationStream, MessageChannel,
    SessionHandle, SessionTransportEffects, TransportError,
};
pub use time::{PhysicalTimeEffects, TimeError};
