//! Authorization gate for calendar routes.
//!
//! Every calendar or event request re-reads the credentials stored in the
//! session and builds a fresh [`CalendarClient`] from them. Nothing is
//! cached between requests.

use axum::{extract::FromRequestParts, http::request::Parts};
use calgate_client::CalendarClient;
use calgate_oauth::{CredentialBundle, from_storable, to_storable};

use crate::error::{Result, ServerError};
use crate::session::Session;
use crate::state::AppState;

/// Session key holding the stored credentials.
pub const CREDENTIALS_KEY: &str = "credentials";

/// Session key holding the pending OAuth state during login.
pub const OAUTH_STATE_KEY: &str = "oauth_state";

const LOGIN_HINT: &str = "log in at /api/auth/login";

/// Build a provider client from the session's stored credentials.
///
/// Credentials that no longer decode are dropped from the session so the
/// next login starts clean.
pub async fn authorize(session: &Session, state: &AppState) -> Result<CalendarClient> {
    let Some(stored) = session.get(CREDENTIALS_KEY).await else {
        return Err(ServerError::Unauthenticated(LOGIN_HINT.to_string()));
    };

    let bundle = match from_storable(&stored) {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable stored credentials");
            session.remove(CREDENTIALS_KEY).await;
            return Err(ServerError::Unauthenticated(format!(
                "stored credentials are invalid, {LOGIN_HINT}"
            )));
        }
    };

    CalendarClient::builder()
        .base_url(state.config.google.calendar_api_base.as_str())
        .credentials(bundle)
        .build()
        .map_err(ServerError::from)
}

/// Save a fresh credential bundle into the session.
///
/// The session moves to a new id so an id handed out before login never
/// carries credentials.
pub async fn store_credentials(session: &Session, bundle: &CredentialBundle) {
    session.rotate().await;
    session.insert(CREDENTIALS_KEY, to_storable(bundle)).await;
}

/// Extractor yielding a provider client for the logged-in user.
///
/// Rejects with 401 when the session holds no usable credentials.
pub struct Authorized(pub CalendarClient);

impl FromRequestParts<AppState> for Authorized {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        authorize(&session, state).await.map(Authorized)
    }
}
