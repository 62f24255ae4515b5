//! Session error kinds
//!
//! Activation and join failures are returned to the caller. Send failures and
//! malformed inbound actions are logged by the coordinator and never end the
//! session.

use orrery_core::serialization::SerializationError;
use orrery_core::{OrreryError, SessionId, TransportError};
use serde::{Deserialize, Serialize};

/// Errors reported by the coordination core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SessionError {
    /// The transport refused activation/join or the user cancelled
    #[error("Activation failed: {reason}")]
    ActivationFailed {
        /// Reason the session could not be established
        reason: String,
    },

    /// A session is already active on this coordinator
    #[error("Already connected to {session_id}")]
    AlreadyConnected {
        /// The session that is currently active
        session_id: SessionId,
    },

    /// A best-effort broadcast could not be delivered
    #[error("Send failed: {reason}")]
    SendFailed {
        /// Reason the send failed
        reason: String,
    },

    /// An inbound payload could not be decoded
    #[error("Malformed action: {reason}")]
    MalformedAction {
        /// Decoder error message
        reason: String,
    },
}

impl SessionError {
    /// Create an activation failure
    pub fn activation_failed(reason: impl Into<String>) -> Self {
        Self::ActivationFailed {
            reason: reason.into(),
        }
    }

    /// Create a send failure
    pub fn send_failed(reason: impl Into<String>) -> Self {
        Self::SendFailed {
            reason: reason.into(),
        }
    }

    /// Create a malformed-action error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedAction {
            reason: reason.into(),
        }
    }
}

impl From<SessionError> for OrreryError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MalformedAction { reason } => OrreryError::serialization(reason),
            SessionError::SendFailed { reason } => OrreryError::network(reason),
            other => OrreryError::invalid(other.to_string()),
        }
    }
}

impl From<SerializationError> for SessionError {
    fn from(err: SerializationError) -> Self {
        Self::malformed(err.to_string())
    }
}

/// Map a transport failure during establishment to [`SessionError::ActivationFailed`]
pub(crate) fn activation_error(err: TransportError) -> SessionError {
    SessionError::activation_failed(err.to_string())
}

/// Standard Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_error_mapping() {
        let err = activation_error(TransportError::Cancelled);
        assert_eq!(
            err,
            SessionError::ActivationFailed {
                reason: "Request cancelled by user".to_string()
            }
        );
    }

    #[test]
    fn test_serialization_error_is_malformed() {
        let err = SessionError::from(SerializationError::Decode("eof".to_string()));
        assert!(matches!(err, SessionError::MalformedAction { .. }));
    }

    #[test]
    fn test_conversion_to_core_error() {
        let err: OrreryError = SessionError::send_failed("offline").into();
        assert!(matches!(err, OrreryError::Network { .. }));
    }
}
