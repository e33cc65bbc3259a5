//! Error types for the coordinator crate

use std::time::Duration;
use thiserror::Error;

/// Failures talking to the coordinator, or building a request for it.
///
/// An HTTP response with any status is NOT an error here.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Invalid coordinator address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Participant id must not be empty")]
    EmptyParticipantId,

    /// No response was received. The message is already redacted.
    #[error("Coordinator request failed: {0}")]
    Transport(String),

    #[error("Coordinator request timed out after {}s", duration.as_secs())]
    Timeout { duration: Duration },

    #[error("HTTP client misconfigured: {0}")]
    Misconfiguration(String),
}

/// A 2xx fetch body that is not a usable batch descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct MalformedBatch(pub String);
