//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, redirect};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use calgate_config::Settings;
use calgate_server::{Server, ServerConfig};

/// Access token the fake Google issues on a successful exchange.
pub const ACCESS_TOKEN: &str = "ya29.integration";

/// Authorization code the fake Google accepts.
pub const GOOD_CODE: &str = "4/good-code";

/// A test server that runs in the background against a fake Google.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// Cookie-keeping client that does not follow redirects.
    pub client: Client,
    /// Stand-in for both the token endpoint and the Calendar API.
    pub google: MockServer,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server wired to a fresh fake Google.
    pub async fn start() -> Result<Self> {
        let google = MockServer::start().await;
        mount_token_endpoint(&google).await;

        let settings = Settings::from_lookup(|key| match key {
            "GOOGLE_CLIENT_ID" => Some("integration-client".to_string()),
            "GOOGLE_CLIENT_SECRET" => Some("integration-secret".to_string()),
            "GOOGLE_REDIRECT_URI" => Some("http://localhost/api/auth/callback".to_string()),
            _ => None,
        })?;

        let mut google_settings = settings.google.clone();
        google_settings.token_url = Url::parse(&format!("{}/token", google.uri()))?;
        google_settings.calendar_api_base =
            Url::parse(&format!("{}/calendar/v3/", google.uri()))?;

        let config = ServerConfig::from_settings(&settings)
            .with_google(google_settings)
            .with_request_logging(false);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = Server::new(config)?;
        let handle = tokio::spawn(async move {
            let _ = server.serve(listener, std::future::pending()).await;
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()?;
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            google,
            _handle: handle,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url(), path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(format!("{}{}", self.base_url(), path))
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(format!("{}{}", self.base_url(), path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(format!("{}{}", self.base_url(), path))
    }

    /// Call `/api/auth/login` and return the `state` from the consent URL.
    pub async fn begin_login(&self) -> Result<String> {
        let body: serde_json::Value = self.get("/api/auth/login").send().await?.json().await?;
        let url = Url::parse(
            body["authorization_url"]
                .as_str()
                .context("authorization_url missing")?,
        )?;
        url.query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .context("state parameter missing")
    }

    /// Run the whole login flow so the client's session holds credentials.
    pub async fn login(&self) -> Result<()> {
        let state = self.begin_login().await?;
        let resp = self
            .get(&format!("/api/auth/callback?code={}&state={}", GOOD_CODE, state))
            .send()
            .await?;
        anyhow::ensure!(
            resp.status().as_u16() == 302,
            "callback returned {}",
            resp.status()
        );
        Ok(())
    }
}

/// Token endpoint that accepts only [`GOOD_CODE`].
async fn mount_token_endpoint(google: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=4%2Fgood-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "refresh_token": "1//refresh",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .with_priority(1)
        .mount(google)
        .await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Bad Request"
        })))
        .with_priority(10)
        .mount(google)
        .await;
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
