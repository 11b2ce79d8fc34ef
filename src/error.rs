//! Error types for the onboarding service.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session store error: {0}")]
    Session(#[from] SessionError),

    #[error("Check-in error: {0}")]
    CheckIn(#[from] CheckInError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Session store errors.
///
/// Only the write path produces these. Reading is fail-soft: a missing or
/// corrupt file loads as an empty store.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Daily check-in collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum CheckInError {
    #[error("Request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Request dispatch errors.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to persist sessions: {0}")]
    Session(#[from] SessionError),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
