//! Service settings resolved from the environment.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, Result};

/// Google's OAuth consent-screen endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
/// Google's OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Google Calendar API v3 base.
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

/// Scopes requested at login.
pub const CALENDAR_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.events",
];

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_SESSION_MAX: usize = 10_000;

/// Google OAuth client identity and provider endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: Url,
    pub token_url: Url,
    pub calendar_api_base: Url,
    pub scopes: Vec<String>,
}

impl GoogleSettings {
    /// Names of the OAuth variables that are unset or blank.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("GOOGLE_CLIENT_ID", &self.client_id),
            ("GOOGLE_CLIENT_SECRET", &self.client_secret),
            ("GOOGLE_REDIRECT_URI", &self.redirect_uri),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect()
    }

    /// Fail with the first missing OAuth variable, if any.
    pub fn ensure_configured(&self) -> Result<()> {
        match self.missing().first() {
            Some(field) => Err(ConfigError::MissingField {
                field: (*field).to_string(),
                context: "Google OAuth settings".to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for GoogleSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("calendar_api_base", &self.calendar_api_base.as_str())
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Session cache and cookie settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Idle time after which a session is dropped.
    pub ttl: Duration,
    /// Maximum number of live sessions before LRU eviction.
    pub max_sessions: usize,
    /// Add `Secure` to the session cookie.
    pub cookie_secure: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            max_sessions: DEFAULT_SESSION_MAX,
            cookie_secure: false,
        }
    }
}

/// Effective configuration for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_host: String,
    pub api_port: u16,
    pub google: GoogleSettings,
    pub log_level: String,
    /// Directory for the JSON log file. Console only when unset.
    pub log_dir: Option<PathBuf>,
    pub show_docs: bool,
    pub session: SessionSettings,
    pub version: String,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let google = GoogleSettings {
            client_id: var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: var("GOOGLE_REDIRECT_URI").unwrap_or_default(),
            auth_url: parse_url("GOOGLE_AUTH_URL", var("GOOGLE_AUTH_URL"), DEFAULT_AUTH_URL)?,
            token_url: parse_url("GOOGLE_TOKEN_URL", var("GOOGLE_TOKEN_URL"), DEFAULT_TOKEN_URL)?,
            calendar_api_base: parse_url(
                "GOOGLE_CALENDAR_API_BASE",
                var("GOOGLE_CALENDAR_API_BASE"),
                DEFAULT_CALENDAR_API_BASE,
            )?,
            scopes: CALENDAR_SCOPES.iter().map(|s| s.to_string()).collect(),
        };

        let session = SessionSettings {
            ttl: Duration::from_secs(parse_num(
                "SESSION_TTL_SECS",
                var("SESSION_TTL_SECS"),
                DEFAULT_SESSION_TTL_SECS,
            )?),
            max_sessions: parse_num("SESSION_MAX", var("SESSION_MAX"), DEFAULT_SESSION_MAX)?,
            cookie_secure: parse_bool(
                "SESSION_COOKIE_SECURE",
                var("SESSION_COOKIE_SECURE"),
                false,
            )?,
        };
        if session.max_sessions == 0 {
            return Err(ConfigError::invalid("SESSION_MAX", "0", "must be at least 1"));
        }

        Ok(Self {
            api_host: var("API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            api_port: parse_num("API_PORT", var("API_PORT"), DEFAULT_PORT)?,
            google,
            log_level: var("LOG_LEVEL")
                .map(|v| v.to_lowercase())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: var("LOG_DIR").map(PathBuf::from),
            show_docs: parse_bool("SHOW_DOCS", var("SHOW_DOCS"), true)?,
            session,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// OAuth variables that still need to be set.
    pub fn oauth_missing(&self) -> Vec<&'static str> {
        self.google.missing()
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        // An empty lookup only yields defaults, all of which parse.
        match Self::from_lookup(|_| None) {
            Ok(settings) => settings,
            Err(e) => unreachable!("default settings failed to parse: {e}"),
        }
    }
}

/// Human-readable dump with secrets redacted.
impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = &self.google;
        writeln!(f, "version                  = {}", self.version)?;
        writeln!(f, "API_HOST                 = {}", self.api_host)?;
        writeln!(f, "API_PORT                 = {}", self.api_port)?;
        writeln!(f, "GOOGLE_CLIENT_ID         = {}", or_unset(&g.client_id))?;
        writeln!(f, "GOOGLE_CLIENT_SECRET     = {}", redact(&g.client_secret))?;
        writeln!(f, "GOOGLE_REDIRECT_URI      = {}", or_unset(&g.redirect_uri))?;
        writeln!(f, "GOOGLE_AUTH_URL          = {}", g.auth_url)?;
        writeln!(f, "GOOGLE_TOKEN_URL         = {}", g.token_url)?;
        writeln!(f, "GOOGLE_CALENDAR_API_BASE = {}", g.calendar_api_base)?;
        writeln!(f, "scopes                   = {}", g.scopes.join(" "))?;
        writeln!(f, "LOG_LEVEL                = {}", self.log_level)?;
        writeln!(
            f,
            "LOG_DIR                  = {}",
            self.log_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unset)".to_string())
        )?;
        writeln!(f, "SHOW_DOCS                = {}", self.show_docs)?;
        writeln!(f, "SESSION_TTL_SECS         = {}", self.session.ttl.as_secs())?;
        writeln!(f, "SESSION_MAX              = {}", self.session.max_sessions)?;
        write!(f, "SESSION_COOKIE_SECURE    = {}", self.session.cookie_secure)
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "(unset)" } else { "********" }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(unset)" } else { value }
}

fn parse_url(key: &str, value: Option<String>, default: &str) -> Result<Url> {
    let raw = value.as_deref().unwrap_or(default);
    Url::parse(raw).map_err(|e| ConfigError::invalid(key, raw, e))
}

fn parse_num<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid(key, &raw, e)),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, &raw, "expected a boolean")),
    }
}
