//! Inbound HTTP surface: router, middleware, extractors and the uniform
//! error envelope.

pub mod correlation;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorEnvelope};
pub use server::{AppState, HttpServer};
