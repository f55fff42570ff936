//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use kanban_api::config::{
    AppConfig, AuthConfig, ObservabilityConfig, SecretValue, ServerConfig, UpstreamConfig,
};
use kanban_api::http::{AppState, HttpServer};
use kanban_api::lifecycle::Shutdown;

pub const TEST_PASSWORD: &str = "integration-password";

// ---------------------------------------------------------------------------
// Application under test

pub struct TestApp {
    pub addr: SocketAddr,
    pub base: String,
    pub client: reqwest::Client,
    _shutdown: Shutdown,
}

/// Start the API on an ephemeral port, pointed at the given upstream base.
pub async fn spawn_app(upstream_base: &str) -> TestApp {
    spawn_app_with(upstream_config(upstream_base)).await
}

pub fn upstream_config(upstream_base: &str) -> UpstreamConfig {
    UpstreamConfig {
        base_url: upstream_base.to_string(),
        timeout_ms: 1000,
        retries: 2,
        backoff_ms: 20,
        max_in_flight: 5,
        acquire_timeout_ms: None,
    }
}

pub async fn spawn_app_with(upstream: UpstreamConfig) -> TestApp {
    let config = AppConfig {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            ..ServerConfig::default()
        },
        upstream,
        auth: AuthConfig::default(),
        observability: ObservabilityConfig::default(),
        jwt_secret: SecretValue::new("JWT_SECRET", "integration-test-secret-0123456789"),
    };

    let state = AppState::new(config).expect("app state should build");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = HttpServer::new(state);
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    TestApp {
        addr,
        base: format!("http://{addr}"),
        client: reqwest::Client::new(),
        _shutdown: shutdown,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

/// Register an account and return a bearer token for it.
pub async fn register_and_login(app: &TestApp, email: &str) -> String {
    let response = app
        .client
        .post(app.url("/api/v1/auth/register"))
        .json(&json!({"email": email, "password": TEST_PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({"email": email, "password": TEST_PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

pub async fn create_board(app: &TestApp, token: &str, title: &str) -> i64 {
    let response = app
        .client
        .post(app.url("/api/v1/boards"))
        .bearer_auth(token)
        .json(&json!({"title": title}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

pub async fn create_card(app: &TestApp, token: &str, board_id: i64, order_idx: u32) -> i64 {
    let response = app
        .client
        .post(app.url("/api/v1/cards"))
        .bearer_auth(token)
        .json(&json!({
            "title": "Write the report",
            "column": "todo",
            "order_idx": order_idx,
            "board_id": board_id,
            "estimate_hours": 2.5,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Programmable scoring upstream

/// Behavior of the mock scoring upstream.
pub enum UpstreamMode {
    /// Always 200 with the given score.
    Score(f64),
    /// Always 200 with an empty JSON object.
    EmptyBody,
    /// Always 200 with `{"score": null}`.
    NullScore,
    /// Always the given status with no body.
    AlwaysStatus(u16),
    /// The first `failures` calls get `status`, later calls succeed.
    FailThen { failures: u32, status: u16, score: f64 },
    /// Sleep before answering 200 with the given score.
    Delay { ms: u64, score: f64 },
}

struct UpstreamInner {
    mode: UpstreamMode,
    hits: AtomicU32,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

pub struct MockUpstream {
    pub url: String,
    inner: Arc<UpstreamInner>,
}

impl MockUpstream {
    /// Total calls received, including ones the client gave up waiting for.
    pub fn hits(&self) -> u32 {
        self.inner.hits.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously active calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Start a mock scoring upstream with the given behavior.
pub async fn spawn_upstream(mode: UpstreamMode) -> MockUpstream {
    let inner = Arc::new(UpstreamInner {
        mode,
        hits: AtomicU32::new(0),
        in_flight: AtomicUsize::new(0),
        max_in_flight: AtomicUsize::new(0),
    });

    let app = Router::new()
        .route("/score", post(score_handler))
        .with_state(inner.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream {
        url: format!("http://{addr}"),
        inner,
    }
}

async fn score_handler(State(state): State<Arc<UpstreamInner>>) -> Response {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(current, Ordering::SeqCst);

    let response = match &state.mode {
        UpstreamMode::Score(score) => Json(json!({"score": score})).into_response(),
        UpstreamMode::EmptyBody => Json(json!({})).into_response(),
        UpstreamMode::NullScore => Json(json!({"score": null})).into_response(),
        UpstreamMode::AlwaysStatus(status) => status_response(*status),
        UpstreamMode::FailThen {
            failures,
            status,
            score,
        } => {
            if hit <= *failures {
                status_response(*status)
            } else {
                Json(json!({"score": score})).into_response()
            }
        }
        UpstreamMode::Delay { ms, score } => {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
            Json(json!({"score": score})).into_response()
        }
    };

    state.in_flight.fetch_sub(1, Ordering::SeqCst);
    response
}

fn status_response(status: u16) -> Response {
    StatusCode::from_u16(status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        .into_response()
}

/// An address nothing is listening on.
pub async fn dead_upstream_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
