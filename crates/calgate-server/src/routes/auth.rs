//! OAuth login endpoints.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::auth::{OAUTH_STATE_KEY, store_credentials};
use crate::error::{ErrorResponse, Result, ServerError};
use crate::routes::extract::ApiQuery;
use crate::session::Session;
use crate::state::AppState;

/// Where the callback sends the browser after a successful login.
pub const POST_LOGIN_REDIRECT: &str = "/api/calendars";

/// Login response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Google consent-screen URL to send the user to.
    pub authorization_url: String,
}

/// Query parameters Google appends to the redirect URI.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CallbackParams {
    /// Authorization code to exchange.
    pub code: Option<String>,
    /// State echoed back from the login request.
    pub state: Option<String>,
    /// Set when the user denied consent.
    pub error: Option<String>,
}

/// GET /api/auth/login - Start an OAuth login.
#[utoipa::path(
    get,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Consent-screen URL", body = LoginResponse),
        (status = 500, description = "OAuth client not configured", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<LoginResponse>> {
    state.config.google.ensure_configured()?;

    let request = state.oauth.begin_authorization();
    session
        .insert(OAUTH_STATE_KEY, Value::String(request.state))
        .await;

    Ok(Json(LoginResponse {
        authorization_url: request.url,
    }))
}

/// GET /api/auth/callback - Finish an OAuth login.
#[utoipa::path(
    get,
    path = "/api/auth/callback",
    params(CallbackParams),
    responses(
        (status = 302, description = "Logged in, redirected to the calendar list"),
        (status = 400, description = "Consent denied or state mismatch", body = ErrorResponse),
        (status = 422, description = "Missing authorization code", body = ErrorResponse),
        (status = 502, description = "Token endpoint unreachable", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn callback_handler(
    State(state): State<AppState>,
    session: Session,
    ApiQuery(params): ApiQuery<CallbackParams>,
) -> Result<Response> {
    if let Some(error) = params.error {
        session.remove(OAUTH_STATE_KEY).await;
        return Err(ServerError::BadRequest(format!(
            "authorization was not granted: {}",
            error
        )));
    }

    let code = params
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ServerError::Validation("code: is required".to_string()))?;

    state.config.google.ensure_configured()?;

    // A login started in this session must come back with the same state.
    if let Some(expected) = session.remove(OAUTH_STATE_KEY).await {
        let returned = params.state.as_deref();
        if expected.as_str().is_none() || expected.as_str() != returned {
            return Err(ServerError::BadRequest("OAuth state mismatch".to_string()));
        }
    }

    let bundle = state.oauth.complete_authorization(&code).await?;
    store_credentials(&session, &bundle).await;
    tracing::info!(scopes = bundle.scopes.len(), "OAuth login completed");

    Ok((StatusCode::FOUND, [(header::LOCATION, POST_LOGIN_REDIRECT)]).into_response())
}
