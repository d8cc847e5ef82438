//! Cookie-backed server-side sessions.
//!
//! The session middleware resolves the `calgate_session` cookie to a record
//! in the in-process [`SessionStore`](crate::state::SessionStore) and hands
//! handlers an explicit [`Session`] capability. Records are written back,
//! and the cookie (re)issued, only when a handler changed something.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::SESSION_COOKIE;
use crate::error::ServerError;
use crate::state::AppState;

/// Contents of one session: string keys, JSON values.
pub type SessionRecord = BTreeMap<String, Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Session handle
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct SessionInner {
    id: String,
    /// Id the request arrived with, once the session has been rotated.
    retired_id: Option<String>,
    record: SessionRecord,
    modified: bool,
}

/// Handle to the current request's session.
///
/// Cloning shares the same underlying record.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    fn new(id: String, record: SessionRecord) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                id,
                retired_id: None,
                record,
                modified: false,
            })),
        }
    }

    /// Start an empty session under a fresh id.
    pub fn fresh() -> Self {
        Self::new(Uuid::new_v4().to_string(), SessionRecord::new())
    }

    pub async fn id(&self) -> String {
        self.inner.lock().await.id.clone()
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().await.record.get(key).cloned()
    }

    pub async fn insert(&self, key: &str, value: Value) {
        let mut inner = self.inner.lock().await;
        inner.record.insert(key.to_string(), value);
        inner.modified = true;
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        let mut inner = self.inner.lock().await;
        let removed = inner.record.remove(key);
        if removed.is_some() {
            inner.modified = true;
        }
        removed
    }

    /// Move the record to a fresh id.
    ///
    /// The middleware drops the old id from the store and issues a cookie
    /// for the new one. Call on privilege changes such as login.
    pub async fn rotate(&self) {
        let mut inner = self.inner.lock().await;
        let old = std::mem::replace(&mut inner.id, Uuid::new_v4().to_string());
        if inner.retired_id.is_none() {
            inner.retired_id = Some(old);
        }
        inner.modified = true;
    }

    /// Whether a handler changed the record.
    pub async fn is_modified(&self) -> bool {
        self.inner.lock().await.modified
    }

    async fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock().await;
        Snapshot {
            id: inner.id.clone(),
            retired_id: inner.retired_id.clone(),
            record: inner.record.clone(),
            modified: inner.modified,
        }
    }
}

struct Snapshot {
    id: String,
    retired_id: Option<String>,
    record: SessionRecord,
    modified: bool,
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| ServerError::Internal("session middleware not installed".to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cookies
// ─────────────────────────────────────────────────────────────────────────────

/// Find the session id in the request's `Cookie` headers.
fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| Uuid::parse_str(value).is_ok())
}

fn session_cookie(id: &str, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Session middleware function.
///
/// Loads (or starts) the session, injects it into request extensions, and
/// persists it after the handler if it was modified.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let session = match session_id_from_headers(request.headers()) {
        Some(id) => match state.sessions.get(&id).await {
            Ok(record) => Session::new(id, record),
            Err(e) => {
                tracing::debug!(error = %e, "Starting a new session");
                Session::fresh()
            }
        },
        None => Session::fresh(),
    };

    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    let Snapshot {
        id,
        retired_id,
        record,
        modified,
    } = session.snapshot().await;
    if modified {
        if let Some(retired) = retired_id {
            state.sessions.remove(&retired).await;
            tracing::debug!("Session id rotated");
        }
        state.sessions.insert(&id, record).await;
        let cookie = session_cookie(&id, state.config.session.cookie_secure);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode session cookie"),
        }
    }

    response
}
