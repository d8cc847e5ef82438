//! Error types for the OAuth flow.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// Errors that can occur during login or credential decoding.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Network/HTTP error talking to the token endpoint.
    #[error("Network error: {0}")]
    Network(String),

    /// The token endpoint rejected the exchange.
    #[error("Token exchange failed ({status}): {message}")]
    Exchange { status: u16, message: String },

    /// The token endpoint answered 2xx with an unusable body.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Stored credentials could not be decoded.
    #[error("Malformed credential: {0}")]
    MalformedCredential(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

impl OAuthError {
    /// Upstream HTTP status, if the token endpoint produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            OAuthError::Exchange { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OAuthError {
    fn from(e: reqwest::Error) -> Self {
        OAuthError::Network(e.to_string())
    }
}
