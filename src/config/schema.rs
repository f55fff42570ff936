//! Configuration schema definitions.
//!
//! All sections derive Serde traits and carry explicit defaults; values are
//! overridden from environment variables in [`AppConfig::from_env`].

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::secrets::{load_secret, SecretValue, MIN_SECRET_LENGTH};
use crate::config::ConfigError;

/// Root configuration for the API server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Inbound HTTP server settings.
    pub server: ServerConfig,

    /// Outbound scoring upstream settings.
    pub upstream: UpstreamConfig,

    /// Token issuance settings.
    pub auth: AuthConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// JWT signing secret. Required, minimum 16 characters after trimming.
    pub jwt_secret: SecretValue,
}

/// Inbound server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Outbound scoring upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base endpoint of the scoring service.
    pub base_url: String,

    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Number of attempts before giving up. Clamped to a minimum of 1.
    pub retries: u32,

    /// Linear backoff base in milliseconds (sleep = base * attempt number).
    pub backoff_ms: u64,

    /// Maximum concurrent in-flight requests through one client.
    pub max_in_flight: usize,

    /// Optional bound on how long a call may wait for an in-flight slot,
    /// in milliseconds. Unset means wait indefinitely.
    pub acquire_timeout_ms: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example.com".to_string(),
            timeout_ms: 3000,
            retries: 2,
            backoff_ms: 200,
            max_in_flight: 5,
            acquire_timeout_ms: None,
        }
    }
}

/// Token issuance configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Access token lifetime in minutes.
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_minutes: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is unset.
    pub log_filter: String,

    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Metrics exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "kanban_api=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl AppConfig {
    /// Resolve the full configuration from the environment.
    ///
    /// Fails fast on a missing or too-short `JWT_SECRET` and on any value
    /// that does not parse into its target type.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = load_secret("JWT_SECRET", None, MIN_SECRET_LENGTH)?;

        let server = ServerConfig {
            bind_address: env_string("KANBAN_BIND_ADDR", ServerConfig::default().bind_address),
            request_timeout_secs: env_parse(
                "KANBAN_REQUEST_TIMEOUT_SECS",
                ServerConfig::default().request_timeout_secs,
            )?,
            max_body_bytes: env_parse(
                "KANBAN_MAX_BODY_BYTES",
                ServerConfig::default().max_body_bytes,
            )?,
        };

        let upstream = UpstreamConfig {
            base_url: env_string("SCORE_API_BASE", UpstreamConfig::default().base_url),
            timeout_ms: env_parse("SCORE_API_TIMEOUT_MS", UpstreamConfig::default().timeout_ms)?,
            retries: env_parse("SCORE_API_RETRIES", UpstreamConfig::default().retries)?,
            backoff_ms: env_parse("SCORE_API_BACKOFF_MS", UpstreamConfig::default().backoff_ms)?,
            max_in_flight: env_parse(
                "SCORE_API_MAX_IN_FLIGHT",
                UpstreamConfig::default().max_in_flight,
            )?,
            acquire_timeout_ms: env_parse_opt("SCORE_API_ACQUIRE_TIMEOUT_MS")?,
        };

        let auth = AuthConfig {
            token_ttl_minutes: env_parse(
                "KANBAN_TOKEN_TTL_MINUTES",
                AuthConfig::default().token_ttl_minutes,
            )?,
        };

        let observability = ObservabilityConfig {
            log_filter: env_string(
                "KANBAN_LOG",
                ObservabilityConfig::default().log_filter,
            ),
            metrics_enabled: env_parse(
                "KANBAN_METRICS_ENABLED",
                ObservabilityConfig::default().metrics_enabled,
            )?,
            metrics_address: env_string(
                "KANBAN_METRICS_ADDR",
                ObservabilityConfig::default().metrics_address,
            ),
        };

        Ok(Self {
            server,
            upstream,
            auth,
            observability,
            jwt_secret,
        })
    }
}

fn env_string(name: &str, default: String) -> String {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => default,
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

fn env_parse_opt<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(None),
    }
}
