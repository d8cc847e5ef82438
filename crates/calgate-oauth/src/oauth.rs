//! OAuth 2.0 authorization-code flow against Google.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use calgate_config::{DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL, GoogleSettings};
use calgate_types::CredentialBundle;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{OAuthError, Result};

const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth client identity and endpoints.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: Url,
    pub token_url: Url,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Config for Google's production endpoints.
    pub fn google(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        scopes: Vec<String>,
    ) -> Result<Self> {
        let parse = |raw: &str| Url::parse(raw).map_err(|e| OAuthError::Config(e.to_string()));
        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url: parse(DEFAULT_AUTH_URL)?,
            token_url: parse(DEFAULT_TOKEN_URL)?,
            scopes,
        })
    }
}

impl From<&GoogleSettings> for OAuthConfig {
    fn from(settings: &GoogleSettings) -> Self {
        Self {
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            redirect_uri: settings.redirect_uri.clone(),
            authorize_url: settings.auth_url.clone(),
            token_url: settings.token_url.clone(),
            scopes: settings.scopes.clone(),
        }
    }
}

/// Generate a random state string for CSRF protection.
pub fn generate_state() -> String {
    let mut state_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut state_bytes);
    URL_SAFE_NO_PAD.encode(state_bytes)
}

/// Build the consent-screen URL for the given state.
pub fn build_authorization_url(config: &OAuthConfig, state: &str) -> String {
    let scope = config.scopes.join(" ");
    let params = [
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", scope.as_str()),
        ("access_type", "offline"),
        ("include_granted_scopes", "true"),
        ("prompt", "consent"),
        ("state", state),
    ];

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if config.authorize_url.query().is_some() { '&' } else { '?' };
    format!("{}{}{}", config.authorize_url, separator, query)
}

/// Where to send the user, and the state to expect back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Drives login: consent URL out, credential bundle back.
///
/// Holds no per-user state. The caller persists the returned state and
/// bundle wherever it keeps sessions.
#[derive(Debug, Clone)]
pub struct OAuthFlow {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl OAuthFlow {
    pub fn new(config: OAuthConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(EXCHANGE_TIMEOUT)
            .build()
            .map_err(|e| OAuthError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Start a login with a fresh random state.
    pub fn begin_authorization(&self) -> AuthorizationRequest {
        let state = generate_state();
        AuthorizationRequest {
            url: build_authorization_url(&self.config, &state),
            state,
        }
    }

    /// Exchange an authorization code for credentials.
    pub async fn complete_authorization(&self, code: &str) -> Result<CredentialBundle> {
        let code = code.trim();
        if code.is_empty() {
            return Err(OAuthError::InvalidRequest(
                "authorization code is required".to_string(),
            ));
        }

        let form = TokenExchangeRequest {
            code,
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            redirect_uri: &self.config.redirect_uri,
            grant_type: "authorization_code",
        };

        tracing::debug!(token_url = %self.config.token_url, "Exchanging authorization code");

        let response = self
            .http
            .post(self.config.token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| OAuthError::Network(format!("Token exchange request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body: TokenErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .error_description
                .or(body.error)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            tracing::warn!(status = status.as_u16(), %message, "Token exchange rejected");
            return Err(OAuthError::Exchange {
                status: status.as_u16(),
                message,
            });
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::InvalidResponse(format!("Failed to parse token response: {}", e)))?;

        Ok(CredentialBundle {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_uri: self.config.token_url.clone(),
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.clone(),
            scopes: self.config.scopes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scopes() -> Vec<String> {
        calgate_config::CALENDAR_SCOPES
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn test_config(token_url: &str) -> OAuthConfig {
        OAuthConfig {
            token_url: Url::parse(token_url).unwrap(),
            ..OAuthConfig::google("cid", "secret", "http://localhost:8000/api/auth/callback", scopes())
                .unwrap()
        }
    }

    fn query_pairs(url: &str) -> Vec<(String, String)> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_state_generation() {
        let state1 = generate_state();
        let state2 = generate_state();
        assert_eq!(state1.len(), 43);
        assert_ne!(state1, state2);
    }

    #[test]
    fn test_authorization_url() {
        let config = test_config("https://oauth2.googleapis.com/token");
        let url = build_authorization_url(&config, "test_state");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        let pairs = query_pairs(&url);
        let get = |k: &str| pairs.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("client_id"), Some("cid"));
        assert_eq!(get("redirect_uri"), Some("http://localhost:8000/api/auth/callback"));
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(
            get("scope"),
            Some("https://www.googleapis.com/auth/calendar https://www.googleapis.com/auth/calendar.events")
        );
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("include_granted_scopes"), Some("true"));
        assert_eq!(get("prompt"), Some("consent"));
        assert_eq!(get("state"), Some("test_state"));
    }

    #[test]
    fn test_begin_twice_differs_only_in_state() {
        let flow = OAuthFlow::new(test_config("https://oauth2.googleapis.com/token")).unwrap();
        let first = flow.begin_authorization();
        let second = flow.begin_authorization();
        assert_ne!(first.state, second.state);

        let strip = |req: &AuthorizationRequest| {
            query_pairs(&req.url)
                .into_iter()
                .filter(|(k, _)| k != "state")
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&first), strip(&second));
        assert!(query_pairs(&first.url).contains(&("state".to_string(), first.state.clone())));
    }

    #[tokio::test]
    async fn test_complete_authorization_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=4%2F0Abc"))
            .and(body_string_contains("client_secret=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.access",
                "refresh_token": "1//refresh",
                "expires_in": 3599,
                "token_type": "Bearer",
                "scope": "https://www.googleapis.com/auth/calendar"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token_url = format!("{}/token", server.uri());
        let flow = OAuthFlow::new(test_config(&token_url)).unwrap();
        let bundle = flow.complete_authorization("4/0Abc").await.unwrap();

        assert_eq!(bundle.access_token, "ya29.access");
        assert_eq!(bundle.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(bundle.token_uri.as_str(), token_url);
        assert_eq!(bundle.client_id, "cid");
        assert_eq!(bundle.client_secret, "secret");
        assert_eq!(bundle.scopes, scopes());

        let restored = crate::from_storable(&crate::to_storable(&bundle)).unwrap();
        assert_eq!(restored, bundle);
    }

    #[tokio::test]
    async fn test_complete_authorization_without_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "ya29.only" })),
            )
            .mount(&server)
            .await;

        let flow = OAuthFlow::new(test_config(&format!("{}/token", server.uri()))).unwrap();
        let bundle = flow.complete_authorization("code").await.unwrap();
        assert!(bundle.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_complete_authorization_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Malformed auth code."
            })))
            .mount(&server)
            .await;

        let flow = OAuthFlow::new(test_config(&format!("{}/token", server.uri()))).unwrap();
        let err = flow.complete_authorization("bad").await.unwrap_err();
        match err {
            OAuthError::Exchange { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Malformed auth code.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_code_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let flow = OAuthFlow::new(test_config(&format!("{}/token", server.uri()))).unwrap();
        let err = flow.complete_authorization("  ").await.unwrap_err();
        assert!(matches!(err, OAuthError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_unreachable_token_endpoint() {
        let flow = OAuthFlow::new(test_config("http://127.0.0.1:1/token")).unwrap();
        let err = flow.complete_authorization("code").await.unwrap_err();
        assert!(matches!(err, OAuthError::Network(_)));
    }
}
