//! Configuration for the calgate service.
//!
//! Settings come from process environment variables, optionally seeded
//! from a `.env` file in the working directory. Every value has a default
//! except the Google OAuth client identity, whose absence is reported by
//! [`Settings::oauth_missing`] rather than treated as fatal.

pub mod error;
pub mod settings;

pub use error::{ConfigError, Result};
pub use settings::{
    CALENDAR_SCOPES, DEFAULT_AUTH_URL, DEFAULT_CALENDAR_API_BASE, DEFAULT_TOKEN_URL,
    GoogleSettings, SessionSettings, Settings,
};
