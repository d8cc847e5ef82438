//! Error types for session cache operations.

/// Error type for session cache operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Session was never stored or has been evicted.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Session has expired due to TTL.
    #[error("Session expired: {0}")]
    Expired(String),

    /// Cache configuration is unusable.
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for session cache operations.
pub type Result<T> = std::result::Result<T, Error>;
