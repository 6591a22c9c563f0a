//! Settings channel error types.

use thiserror::Error;

/// Errors from reading the external settings transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the settings channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload is not a valid settings document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decoded payload is not UTF-8")]
    NotUtf8,

    #[error("Failed to spawn poll thread: {0}")]
    Spawn(std::io::Error),
}
