//! Server configuration.

use calgate_config::{GoogleSettings, SessionSettings, Settings};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "calgate_session";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` to bind.
    pub bind_address: String,

    /// OAuth client identity and provider endpoints.
    pub google: GoogleSettings,

    /// Session cache and cookie settings.
    pub session: SessionSettings,

    /// Serve Swagger UI at `/docs` and the document at `/openapi.json`.
    pub show_docs: bool,

    /// Enable request logging.
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ServerConfig {
    /// Derive server config from process settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bind_address: settings.bind_addr(),
            google: settings.google.clone(),
            session: settings.session.clone(),
            show_docs: settings.show_docs,
            request_logging: true,
        }
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: impl Into<String>) -> Self {
        self.bind_address = addr.into();
        self
    }

    /// Replace the Google settings.
    pub fn with_google(mut self, google: GoogleSettings) -> Self {
        self.google = google;
        self
    }

    /// Replace the session settings.
    pub fn with_session(mut self, session: SessionSettings) -> Self {
        self.session = session;
        self
    }

    /// Enable or disable the API docs.
    pub fn with_docs(mut self, enabled: bool) -> Self {
        self.show_docs = enabled;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }
}
