//! Multi-tenant task-board API.
//!
//! Users own boards, boards hold cards, and cards can be scored through an
//! external service reached via a resilient outbound client (bounded
//! concurrency, timeout, retry with linear backoff). Every failure leaving
//! the API is normalized into one envelope shape carrying a per-request
//! correlation id.

pub mod auth;
pub mod boards;
pub mod cards;
pub mod config;
pub mod domain;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod scoring;
pub mod store;

pub use config::AppConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
