//! Group-session transport effect definitions
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: supplied by the host platform (production) or
//!   `orrery-testkit` (in-memory hub)
//! - **Usage**: the session coordinator in `orrery-session`
//!
//! The transport establishes sessions, tracks membership and moves opaque
//! byte payloads between participants. It never interprets payloads.

use crate::activity::{ActivityDescriptor, SpatialConfiguration};
use crate::identifiers::{ParticipantId, SessionId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;

/// Transport operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TransportError {
    /// Group sessions are not available on this device
    #[error("Transport unavailable: {reason}")]
    Unavailable {
        /// Reason the transport is unavailable
        reason: String,
    },
    /// The transport or the user refused the request
    #[error("Request refused: {reason}")]
    Refused {
        /// Reason for the refusal
        reason: String,
    },
    /// The user cancelled the request
    #[error("Request cancelled by user")]
    Cancelled,
    /// The local participant is not joined to the session
    #[error("Not connected to a session")]
    NotConnected,
    /// Failed to deliver a payload
    #[error("Send failed: {reason}")]
    SendFailed {
        /// Reason for the failure
        reason: String,
    },
    /// Operation timed out
    #[error("Operation '{operation}' timed out after {timeout_ms}ms")]
    Timeout {
        /// The operation that timed out
        operation: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },
    /// Operation is unsupported by the current transport
    #[error("Unsupported operation")]
    NotImplemented,
}

/// Handle to a session produced by activation or by an invitation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionHandle {
    /// Transport-assigned session identifier
    pub session_id: SessionId,
    /// Identifier the transport assigned to the local participant
    pub local_participant: ParticipantId,
}

impl SessionHandle {
    /// Create a new session handle
    pub fn new(session_id: SessionId, local_participant: ParticipantId) -> Self {
        Self {
            session_id,
            local_participant,
        }
    }
}

/// A payload received from another participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Participant that sent the payload
    pub sender: ParticipantId,
    /// Encoded payload bytes
    pub payload: Vec<u8>,
}

/// Stream of inbound payloads for one session
///
/// The stream ends when the session ends.
pub type InboundMessageStream = Pin<Box<dyn futures::Stream<Item = InboundMessage> + Send>>;

/// Stream of invitations to join someone else's session
pub type InvitationStream = Pin<Box<dyn futures::Stream<Item = SessionHandle> + Send>>;

/// Byte-level messaging bound to one session.
///
/// Delivery is best effort to every joined participant other than the sender,
/// in send order per sender. There is no total order across senders.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Send a payload to every other participant in the session
    async fn send(&self, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Stream of payloads from other participants.
    ///
    /// Each channel yields its inbound sequence once; a new session produces a
    /// new channel and therefore a fresh sequence.
    fn receive(&self) -> InboundMessageStream;
}

/// Session establishment provided by the platform's group-session service
#[async_trait]
pub trait SessionTransportEffects: Send + Sync {
    /// Start a new session offering `activity` to other participants
    async fn activate(&self, activity: &ActivityDescriptor)
        -> Result<SessionHandle, TransportError>;

    /// Join the session behind `handle`, making the local participant visible
    async fn join(&self, handle: &SessionHandle) -> Result<(), TransportError>;

    /// Leave the session behind `handle`
    async fn leave(&self, handle: &SessionHandle) -> Result<(), TransportError>;

    /// Obtain the message channel bound to `handle`
    async fn message_channel(
        &self,
        handle: &SessionHandle,
    ) -> Result<Arc<dyn MessageChannel>, TransportError>;

    /// Apply a spatial arrangement preference to the session
    async fn configure_spatial(
        &self,
        _handle: &SessionHandle,
        _configuration: &SpatialConfiguration,
    ) -> Result<(), TransportError> {
        Err(TransportError::NotImplemented)
    }
}

/// Source of externally-detected session invitations
pub trait InvitationEffects: Send + Sync {
    /// Subscribe to incoming invitations
    fn invitations(&self) -> InvitationStream;
}

/// Blanket implementation for Arc<T> where T: SessionTransportEffects
#[async_trait]
impl<T: SessionTransportEffects + ?Sized> SessionTransportEffects for Arc<T> {
    async fn activate(
        &self,
        activity: &ActivityDescriptor,
    ) -> Result<SessionHandle, TransportError> {
        (**self).activate(activity).await
    }

    async fn join(&self, handle: &SessionHandle) -> Result<(), TransportError> {
        (**self).join(handle).await
    }

    async fn leave(&self, handle: &SessionHandle) -> Result<(), TransportError> {
        (**self).leave(handle).await
    }

    async fn message_channel(
        &self,
        handle: &SessionHandle,
    ) -> Result<Arc<dyn MessageChannel>, TransportError> {
        (**self).message_channel(handle).await
    }

    async fn configure_spatial(
        &self,
        handle: &SessionHandle,
        configuration: &SpatialConfiguration,
    ) -> Result<(), TransportError> {
        (**self).configure_spatial(handle, configuration).await
    }
}

/// Blanket implementation for Arc<T> where T: MessageChannel
#[async_trait]
impl<T: MessageChannel + ?Sized> MessageChannel for Arc<T> {
    async fn send(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        (**self).send(payload).await
    }

    fn receive(&self) -> InboundMessageStream {
        (**self).receive()
    }
}

impl<T: InvitationEffects + ?Sized> InvitationEffects for Arc<T> {
    fn invitations(&self) -> InvitationStream {
        (**self).invitations()
    }
}
