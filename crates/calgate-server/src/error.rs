//! Error types for the server.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use calgate_oauth::OAuthError;
use calgate_types::ValidationError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No usable credentials in the session.
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// Caller input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request could not be understood.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No such route.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The calendar provider rejected the call.
    #[error("Provider error: {message}")]
    Provider { status: u16, message: String },

    /// The OAuth token endpoint rejected the exchange.
    #[error("Authorization failed: {message}")]
    ExternalAuth { status: u16, message: String },

    /// An upstream service was unreachable or answered nonsense.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ServerError {
    /// Status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            ServerError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServerError::Provider { status, .. } => {
                (upstream_status(*status, 400..=599), "provider_error")
            }
            ServerError::ExternalAuth { status, .. } => {
                (upstream_status(*status, 400..=499), "external_auth_error")
            }
            ServerError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "bad_gateway"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ServerError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
        }
    }
}

/// Pass an upstream status through when it falls in `range`, else 502.
fn upstream_status(status: u16, range: std::ops::RangeInclusive<u16>) -> StatusCode {
    if range.contains(&status) {
        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
    } else {
        StatusCode::BAD_GATEWAY
    }
}

impl From<ValidationError> for ServerError {
    fn from(e: ValidationError) -> Self {
        ServerError::Validation(e.to_string())
    }
}

impl From<calgate_client::Error> for ServerError {
    fn from(e: calgate_client::Error) -> Self {
        use calgate_client::Error;
        match e {
            Error::Provider { status, message } => ServerError::Provider { status, message },
            Error::Validation(v) => v.into(),
            Error::Http(e) => ServerError::BadGateway(format!("Calendar provider unreachable: {}", e)),
            Error::Json(e) => {
                ServerError::BadGateway(format!("Unexpected calendar provider response: {}", e))
            }
            Error::InvalidUrl(e) => ServerError::Config(format!("Invalid calendar API URL: {}", e)),
            Error::Config(msg) => ServerError::Internal(msg),
        }
    }
}

impl From<OAuthError> for ServerError {
    fn from(e: OAuthError) -> Self {
        match e {
            OAuthError::Exchange { status, message } => ServerError::ExternalAuth { status, message },
            OAuthError::InvalidRequest(msg) => ServerError::Validation(msg),
            OAuthError::Network(msg) | OAuthError::InvalidResponse(msg) => {
                ServerError::BadGateway(msg)
            }
            OAuthError::MalformedCredential(msg) => ServerError::Unauthenticated(msg),
            OAuthError::Config(msg) => ServerError::Config(msg),
        }
    }
}

impl From<calgate_config::ConfigError> for ServerError {
    fn from(e: calgate_config::ConfigError) -> Self {
        ServerError::Config(e.to_string())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON that doesn't fit the expected shape.
            JsonRejection::JsonDataError(e) => ServerError::Validation(e.body_text()),
            other => ServerError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub detail: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let detail = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, code, error = %detail, "Server error");
        } else {
            tracing::warn!(status = %status, code, error = %detail, "Client error");
        }

        let body = ErrorResponse {
            code: code.to_string(),
            detail,
        };

        (status, Json(body)).into_response()
    }
}
