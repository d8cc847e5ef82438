//! Google OAuth 2.0 for calgate.
//!
//! - [`OAuthFlow`] builds the consent-screen URL and exchanges the returned
//!   authorization code for a [`CredentialBundle`].
//! - [`credentials`] converts a bundle to and from the plain record kept in
//!   the server-side session.
//!
//! Token refresh is deliberately absent: an expired access token surfaces
//! as a provider error and the user logs in again.

pub mod credentials;
pub mod error;
pub mod oauth;

pub use calgate_types::CredentialBundle;
pub use credentials::{from_storable, to_storable};
pub use error::{OAuthError, Result};
pub use oauth::{AuthorizationRequest, OAuthConfig, OAuthFlow, build_authorization_url, generate_state};
