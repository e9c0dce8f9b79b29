//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding an `update_step` payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Payload is not a sequence of bodies")]
    NotASequence,

    #[error("Entry {index} is not a body record")]
    InvalidEntry { index: usize },

    #[error("Entry {index} wraps {keys} values, expected exactly one")]
    AmbiguousWrapper { index: usize, keys: usize },
}

/// Errors that can occur during transport packet parsing.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Empty packet")]
    Empty,

    #[error("Invalid engine packet type: {0:?}")]
    InvalidEngineType(char),

    #[error("Invalid socket packet type: {0:?}")]
    InvalidSocketType(char),

    #[error("Malformed packet body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Event packet without a name")]
    MissingEventName,
}
