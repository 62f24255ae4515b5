//! Action-level message channel
//!
//! Wraps the transport's byte-level [`MessageChannel`] with the action wire
//! codec. The channel performs no reconciliation; it is transport plus decode.

use crate::errors::SessionError;
use crate::protocol::{decode_action, encode_action, Action};
use futures::{Stream, StreamExt};
use orrery_core::{MessageChannel, ParticipantId};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

/// An action received from another participant
#[derive(Debug, Clone, PartialEq)]
pub struct InboundAction {
    /// Participant that sent the action, as identified by the transport
    pub sender: ParticipantId,
    /// The decoded action
    pub action: Action,
}

/// Stream of decoded inbound actions.
///
/// Undecodable payloads surface as [`SessionError::MalformedAction`] items so
/// the consumer can log them and keep reading.
pub type InboundActionStream =
    Pin<Box<dyn Stream<Item = Result<InboundAction, SessionError>> + Send>>;

/// Sends and receives [`Action`]s over a session's message channel
#[derive(Clone)]
pub struct ActionChannel {
    inner: Arc<dyn MessageChannel>,
}

impl ActionChannel {
    /// Wrap a transport channel
    pub fn new(inner: Arc<dyn MessageChannel>) -> Self {
        Self { inner }
    }

    /// Send `action` to every other participant.
    ///
    /// Best effort: a failure is returned to the caller, who is expected to
    /// log it and carry on.
    pub async fn send(&self, action: &Action) -> Result<(), SessionError> {
        let payload = encode_action(action).map_err(|e| SessionError::send_failed(e.to_string()))?;
        self.inner
            .send(payload)
            .await
            .map_err(|e| SessionError::send_failed(e.to_string()))
    }

    /// Inbound actions from any other participant.
    ///
    /// Ends when the underlying session ends.
    pub fn receive(&self) -> InboundActionStream {
        self.inner
            .receive()
            .map(|message| {
                decode_action(&message.payload)
                    .map(|action| InboundAction {
                        sender: message.sender,
                        action,
                    })
                    .map_err(SessionError::from)
            })
            .boxed()
    }
}

impl fmt::Debug for ActionChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionChannel").finish_non_exhaustive()
    }
}
