//! HTTP API for the calgate Google Calendar gateway.
//!
//! # Features
//!
//! - Google OAuth login, with credentials kept in a server-side session
//! - Calendar list and event CRUD forwarded to Google Calendar v3
//! - Provider errors mapped onto HTTP statuses with a JSON error body
//! - Request logging and optional Swagger UI
//!
//! # Example
//!
//! ```ignore
//! use calgate_config::Settings;
//! use calgate_server::{Server, ServerConfig};
//!
//! let settings = Settings::from_env()?;
//! let server = Server::new(ServerConfig::from_settings(&settings))?;
//! server.run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod session;
pub mod state;

pub use auth::{Authorized, authorize};
pub use config::{SESSION_COOKIE, ServerConfig};
pub use error::{ErrorResponse, Result, ServerError};
pub use logging::request_logging_middleware;
pub use session::{Session, SessionRecord, session_middleware};
pub use state::AppState;

use std::future::Future;

use axum::{Router, middleware};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// The calgate HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        Ok(Self {
            state: AppState::new(config)?,
        })
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Get the application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(routes::root_routes())
            .merge(routes::health_routes())
            .nest("/api", self.api_routes());

        if self.state.config.show_docs {
            router = router.merge(routes::openapi::swagger_ui());
        }

        router
            .fallback(not_found)
            // Session handling (innermost, wraps the handlers)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                session::session_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                logging::request_logging_middleware,
            ))
            // TraceLayer for detailed HTTP tracing
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(self.state.clone())
    }

    /// API routes, mounted under `/api`.
    ///
    /// Calendar and event handlers take the `Authorized` extractor, so they
    /// reject requests whose session holds no credentials.
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::{get, put};

        Router::new()
            .route("/auth/login", get(routes::login_handler))
            .route("/auth/callback", get(routes::callback_handler))
            .route("/calendars", get(routes::list_calendars_handler))
            .route(
                "/calendars/{calendar_id}/events",
                get(routes::list_events_handler).post(routes::create_event_handler),
            )
            .route(
                "/calendars/{calendar_id}/events/{event_id}",
                put(routes::update_event_handler).delete(routes::delete_event_handler),
            )
    }

    /// Run the server on the configured address until the process exits.
    pub async fn run(self) -> Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let addr = self.state.config.bind_address.clone();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind {}: {}", addr, e)))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already-bound listener (useful for testing).
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Failed to read local address: {}", e)))?;
        let router = self.router();
        let sweeper = self.state.sessions.spawn_sweeper();

        info!(addr = %local_addr, "Starting server");

        let result = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)));

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        info!("Server stopped");
        result
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> &str {
        &self.state.config.bind_address
    }
}

async fn not_found(uri: axum::http::Uri) -> ServerError {
    ServerError::NotFound(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use calgate_config::Settings;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> ServerConfig {
        let settings = Settings::from_lookup(|key| match key {
            "GOOGLE_CLIENT_ID" => Some("cid".to_string()),
            "GOOGLE_CLIENT_SECRET" => Some("secret".to_string()),
            "GOOGLE_REDIRECT_URI" => Some("http://localhost:8000/api/auth/callback".to_string()),
            _ => None,
        })
        .unwrap();
        ServerConfig::from_settings(&settings).with_request_logging(false)
    }

    fn server_with(config: ServerConfig) -> Server {
        Server::new(config).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// Seed a logged-in session and return its cookie header.
    async fn logged_in(server: &Server) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let mut record = SessionRecord::new();
        record.insert(
            auth::CREDENTIALS_KEY.to_string(),
            json!({
                "token": "ya29.token",
                "refresh_token": null,
                "token_uri": "https://oauth2.googleapis.com/token",
                "client_id": "cid",
                "client_secret": "secret",
                "scopes": ["https://www.googleapis.com/auth/calendar"]
            }),
        );
        server.state().sessions.insert(&id, record).await;
        format!("{}={}", SESSION_COOKIE, id)
    }

    async fn provider_server(config: ServerConfig) -> (Server, MockServer) {
        let provider = MockServer::start().await;
        let mut google = config.google.clone();
        google.calendar_api_base = format!("{}/calendar/v3/", provider.uri()).parse().unwrap();
        (server_with(config.with_google(google)), provider)
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let response = server_with(test_config())
            .router()
            .oneshot(get("/"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Google Calendar Microservice is running" })
        );
    }

    #[tokio::test]
    async fn test_server_health_endpoint() {
        let response = server_with(test_config())
            .router()
            .oneshot(get("/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn test_calendar_routes_require_login() {
        let server = server_with(test_config());
        let requests = [
            get("/api/calendars"),
            get("/api/calendars/primary/events"),
            Request::builder()
                .method("POST")
                .uri("/api/calendars/primary/events")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
            Request::builder()
                .method("PUT")
                .uri("/api/calendars/primary/events/evt1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
            Request::builder()
                .method("DELETE")
                .uri("/api/calendars/primary/events/evt1")
                .body(Body::empty())
                .unwrap(),
        ];

        for request in requests {
            let response = server.router().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body_json(response).await["code"], "unauthenticated");
        }
    }

    #[tokio::test]
    async fn test_login_returns_authorization_url_and_sets_cookie() {
        let response = server_with(test_config())
            .router()
            .oneshot(get("/api/auth/login"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("calgate_session="));
        assert!(cookie.contains("HttpOnly"));

        let body = body_json(response).await;
        let url = body["authorization_url"].as_str().unwrap();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=cid"));
    }

    #[tokio::test]
    async fn test_login_without_oauth_config_is_500() {
        let response = server_with(ServerConfig::default())
            .router()
            .oneshot(get("/api/auth/login"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["code"], "config_error");
    }

    #[tokio::test]
    async fn test_callback_rejects_denied_consent_and_missing_code() {
        let server = server_with(test_config());

        let response = server
            .router()
            .oneshot(get("/api/auth/callback?error=access_denied"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = server
            .router()
            .oneshot(get("/api/auth/callback"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_list_calendars_with_session() {
        let (server, provider) = provider_server(test_config()).await;
        Mock::given(method("GET"))
            .and(path("/calendar/v3/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "primary", "summary": "Me", "primary": true }]
            })))
            .expect(1)
            .mount(&provider)
            .await;

        let cookie = logged_in(&server).await;
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/calendars")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        // Unchanged sessions are not re-issued.
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = body_json(response).await;
        assert_eq!(body[0]["id"], "primary");
        assert_eq!(body[0]["primary"], true);
    }

    #[tokio::test]
    async fn test_provider_not_found_passes_through() {
        let (server, provider) = provider_server(test_config()).await;
        Mock::given(method("DELETE"))
            .and(path("/calendar/v3/calendars/primary/events/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "Not Found" }
            })))
            .mount(&provider)
            .await;

        let cookie = logged_in(&server).await;
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/calendars/primary/events/missing")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], "provider_error");
        assert_eq!(body["detail"], "Provider error: Not Found");
    }

    #[tokio::test]
    async fn test_create_event_rejects_bad_bodies_without_provider_call() {
        let (server, provider) = provider_server(test_config()).await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&provider)
            .await;
        let cookie = logged_in(&server).await;

        let post = |body: &'static str| {
            Request::builder()
                .method("POST")
                .uri("/api/calendars/primary/events")
                .header(header::COOKIE, cookie.clone())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap()
        };

        let response = server.router().oneshot(post("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = server.router().oneshot(post("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = server
            .router()
            .oneshot(post(
                r#"{"summary":" ","start":{"date":"2025-01-01"},"end":{"date":"2025-01-02"}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["code"], "validation_error");
    }

    #[tokio::test]
    async fn test_corrupted_credentials_are_cleared() {
        let server = server_with(test_config());
        let id = uuid::Uuid::new_v4().to_string();
        let mut record = SessionRecord::new();
        record.insert(auth::CREDENTIALS_KEY.to_string(), json!({ "token": 42 }));
        server.state().sessions.insert(&id, record).await;

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/calendars")
                    .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let record = server.state().sessions.peek(&id).await.unwrap();
        assert!(!record.contains_key(auth::CREDENTIALS_KEY));
    }

    #[tokio::test]
    async fn test_docs_toggle() {
        let response = server_with(test_config())
            .router()
            .oneshot(get("/openapi.json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = server_with(test_config().with_docs(false))
            .router()
            .oneshot(get("/openapi.json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "not_found");
    }

    #[test]
    fn test_server_config_builder() {
        let config = ServerConfig::default()
            .with_bind_address("127.0.0.1:9000")
            .with_docs(false)
            .with_request_logging(false);

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert!(!config.show_docs);
        assert!(!config.request_logging);
    }
}
