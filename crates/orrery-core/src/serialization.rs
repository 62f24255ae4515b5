//! Canonical wire serialization for Orrery payloads
//!
//! All payloads that cross the transport go through [`to_vec`]/[`from_slice`],
//! which fix one `bincode` configuration for every participant:
//!
//! - variable-length integer encoding, little endian
//! - trailing bytes after a complete value are rejected
//! - payloads larger than [`MAX_PAYLOAD_BYTES`] are rejected in both directions
//!
//! The encoding is deterministic, so a decoded value re-encodes to the exact
//! bytes it was decoded from.

use bincode::Options;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Largest payload accepted on the wire (full-state snapshots included).
pub const MAX_PAYLOAD_BYTES: u64 = 1024 * 1024;

/// Unified error type for serialization operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializationError {
    /// Encoding failed
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Decoding failed or the payload was not a complete value
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Envelope carried an unsupported version
    #[error("Unsupported wire version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the envelope
        found: u16,
        /// Version this build understands
        expected: u16,
    },
}

/// Standard Result type for serialization operations
pub type Result<T> = std::result::Result<T, SerializationError>;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_varint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
        .with_limit(MAX_PAYLOAD_BYTES)
}

/// Serialize any serde-compatible value to canonical wire bytes
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    options()
        .serialize(value)
        .map_err(|e| SerializationError::Encode(e.to_string()))
}

/// Deserialize canonical wire bytes into any serde-compatible value
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    options()
        .deserialize(bytes)
        .map_err(|e| SerializationError::Decode(e.to_string()))
}

/// Versioned envelope wrapping every payload on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedFrame<T> {
    /// Wire protocol version
    pub version: u16,
    /// Frame payload
    pub payload: T,
}

impl<T> VersionedFrame<T> {
    /// Create a new frame at the given version
    pub fn new(version: u16, payload: T) -> Self {
        Self { version, payload }
    }
}

/// Encode `payload` inside a [`VersionedFrame`] at `version`
pub fn encode_framed<T: Serialize>(version: u16, payload: &T) -> Result<Vec<u8>> {
    to_vec(&VersionedFrame { version, payload })
}

/// Decode a [`VersionedFrame`] and check it carries `expected` version
pub fn decode_framed<T: DeserializeOwned>(expected: u16, bytes: &[u8]) -> Result<T> {
    let frame: VersionedFrame<T> = from_slice(bytes)?;
    if frame.version != expected {
        return Err(SerializationError::UnsupportedVersion {
            found: frame.version,
            expected,
        });
    }
    Ok(frame.payload)
}
