//! Application state shared across handlers.

use std::sync::Arc;

use calgate_oauth::{OAuthConfig, OAuthFlow};
use calgate_session::{CacheConfig, SessionCache};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::session::SessionRecord;

/// In-process session store keyed by session id.
pub type SessionStore = SessionCache<SessionRecord>;

/// Application state shared across all handlers.
///
/// Everything here is immutable apart from the session store.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// OAuth login flow.
    pub oauth: Arc<OAuthFlow>,

    /// Session records.
    pub sessions: SessionStore,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let oauth = OAuthFlow::new(OAuthConfig::from(&config.google))?;

        let cache_config = CacheConfig::new()
            .with_capacity(config.session.max_sessions)
            .with_idle_ttl(Some(config.session.ttl));
        let sessions = SessionCache::new(cache_config)
            .map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            oauth: Arc::new(oauth),
            sessions,
        })
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
