//! Application configuration.
//!
//! Configuration is resolved once at startup from environment variables.
//! Secrets go through the loader in [`secrets`], which enforces a minimum
//! length and guarantees redacted rendering.

pub mod schema;
pub mod secrets;

use thiserror::Error;

pub use schema::{AppConfig, AuthConfig, ObservabilityConfig, ServerConfig, UpstreamConfig};
pub use secrets::{load_secret, SecretValue};

/// Error type for configuration resolution. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required secret was absent from the environment.
    #[error("secret '{0}' is not configured")]
    MissingSecret(String),

    /// A secret was present but shorter than the required minimum.
    #[error("secret '{0}' has insufficient length")]
    SecretTooShort(String),

    /// An environment variable could not be parsed into its target type.
    #[error("invalid value for '{0}'")]
    InvalidValue(String),

    /// The upstream base endpoint is not a valid URL.
    #[error("invalid upstream base URL")]
    InvalidUpstreamUrl(#[source] url::ParseError),

    /// The outbound HTTP client could not be constructed.
    #[error("failed to build the outbound HTTP client")]
    HttpClient(#[source] reqwest::Error),
}
