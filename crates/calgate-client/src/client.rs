//! `CalendarClient`: an authenticated handle on the Google Calendar v3 API.

use std::sync::Arc;
use std::time::Duration;

use calgate_types::CredentialBundle;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{CalendarsApi, EventsApi};
use crate::error::{Error, ErrorEnvelope, Result};

/// Google Calendar API v3 base.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3/";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Calendar client bound to one user's credentials.
///
/// Cheap to clone. Built per request by the server and never shared
/// between users.
#[derive(Clone)]
pub struct CalendarClient {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) user_agent: String,
    pub(crate) credentials: CredentialBundle,
}

impl std::fmt::Debug for CalendarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("credentials", &self.inner.credentials)
            .finish()
    }
}

impl CalendarClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Credentials the client currently acts with.
    pub fn credentials(&self) -> &CredentialBundle {
        &self.inner.credentials
    }

    /// Swap in new credentials. The HTTP handle is rebuilt so the new
    /// bearer token takes effect on the next call.
    pub fn set_credentials(&mut self, credentials: CredentialBundle) -> Result<()> {
        let inner = build_inner(
            self.inner.base_url.clone(),
            credentials,
            self.inner.timeout,
            self.inner.user_agent.clone(),
        )?;
        self.inner = Arc::new(inner);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the calendar list.
    pub fn calendars(&self) -> CalendarsApi {
        CalendarsApi::new(self.clone())
    }

    /// Access events.
    pub fn events(&self) -> EventsApi {
        EventsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for a path relative to the API base. Callers encode
    /// path segments themselves.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .query(query)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &[] as &[(&str, &str)]).await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        let response = self
            .inner
            .http
            .post(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a PUT request.
    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "PUT");
        let response = self
            .inner
            .http
            .put(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a DELETE request.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        tracing::debug!(%url, "DELETE");
        let response = self
            .inner
            .http
            .delete(url)
            .timeout(self.inner.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(())
    }

    /// Decode a 2xx body as `T`, anything else as a provider error.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Turn a non-2xx reply into `Error::Provider`, preferring Google's message.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("Unknown error");

        let message = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope
                .error
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| reason.to_string()),
            Err(_) => reason.to_string(),
        };

        tracing::warn!(status = status.as_u16(), %message, "Provider request failed");

        Error::Provider {
            status: status.as_u16(),
            message,
        }
    }
}

fn build_inner(
    base_url: Url,
    credentials: CredentialBundle,
    timeout: Duration,
    user_agent: String,
) -> Result<ClientInner> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let mut auth = HeaderValue::from_str(&credentials.bearer())
        .map_err(|_| Error::Config("Invalid access token".to_string()))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    let http = reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(user_agent.clone())
        .build()?;

    Ok(ClientInner {
        http,
        base_url,
        timeout,
        user_agent,
        credentials,
    })
}

/// Builder for creating a [`CalendarClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    credentials: Option<CredentialBundle>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Override the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the credentials to act with. Required.
    pub fn credentials(mut self, credentials: CredentialBundle) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CalendarClient> {
        let credentials = self
            .credentials
            .ok_or_else(|| Error::Config("credentials are required".to_string()))?;

        let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("calgate/{}", env!("CARGO_PKG_VERSION")));

        Ok(CalendarClient {
            inner: Arc::new(build_inner(base_url, credentials, self.timeout, user_agent)?),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
