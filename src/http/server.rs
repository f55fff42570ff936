//! HTTP server setup.
//!
//! Builds the axum Router, wires the middleware stack (correlation/envelope
//! outermost, then tracing, request metrics, timeout and body limit), and
//! owns [`AppState`], the explicitly-constructed process-wide dependency set
//! injected into handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, patch, post};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthService, TokenSigner};
use crate::config::{AppConfig, ConfigError};
use crate::http::{correlation, handlers};
use crate::observability::metrics;
use crate::resilience::ResilientClient;
use crate::scoring::ScoreGateway;
use crate::store::MemoryStore;

/// Application state injected into handlers.
///
/// Constructed once at startup; the score gateway in particular must be a
/// single shared instance so its concurrency cap means something.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<MemoryStore>,
    pub auth: Arc<AuthService>,
    pub scoring: Arc<ScoreGateway>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let store = Arc::new(MemoryStore::new());
        let signer = TokenSigner::new(config.jwt_secret.clone(), config.auth.token_ttl_minutes);
        let auth = Arc::new(AuthService::new(store.clone(), signer));
        let client = ResilientClient::new(&config.upstream)?;
        let scoring = Arc::new(ScoreGateway::new(client));
        Ok(Self {
            config: Arc::new(config),
            store,
            auth,
            scoring,
        })
    }
}

/// HTTP server for the task-board API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the given state.
    pub fn new(state: AppState) -> Self {
        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);
        let max_body_bytes = state.config.server.max_body_bytes;

        let api = Router::new()
            .route("/auth/register", post(handlers::auth::register))
            .route("/auth/login", post(handlers::auth::login))
            .route("/auth/logout", post(handlers::auth::logout))
            .route(
                "/boards",
                post(handlers::boards::create).get(handlers::boards::list),
            )
            .route(
                "/cards",
                post(handlers::cards::create).get(handlers::cards::list),
            )
            .route(
                "/cards/{card_id}",
                get(handlers::cards::get)
                    .patch(handlers::cards::update)
                    .delete(handlers::cards::remove),
            )
            .route("/cards/{card_id}/move", patch(handlers::cards::move_card))
            .route("/cards/{card_id}/score", post(handlers::cards::score));

        Router::new()
            .route("/health", get(handlers::health))
            .nest("/api/v1", api)
            .route_layer(middleware::from_fn(metrics::track_requests))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestBodyLimitLayer::new(max_body_bytes))
                    .layer(TimeoutLayer::new(request_timeout)),
            )
            .layer(middleware::from_fn(correlation::propagate))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
