//! OAuth credential bundle.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Token set and client identity needed to call the provider for one user.
///
/// The serde shape is the stored-credential record kept in the session:
/// exactly `token`, `refresh_token`, `token_uri`, `client_id`,
/// `client_secret` and `scopes`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBundle {
    #[serde(rename = "token")]
    pub access_token: String,
    /// Absent when the provider has already issued one for this grant.
    pub refresh_token: Option<String>,
    pub token_uri: Url,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
}

impl CredentialBundle {
    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_uri", &self.token_uri.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .finish()
    }
}
