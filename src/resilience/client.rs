//! Resilient outbound HTTP client.
//!
//! Wraps a reqwest transport with a fixed-capacity admission gate, a
//! per-attempt timeout, and bounded retries with linear backoff. All
//! transport failure variants collapse into one opaque
//! [`UpstreamUnavailable`] kind once attempts are exhausted; the causal
//! fault is retained for diagnostics only.
//!
//! Each attempt is a value, not an exception: [`Attempt`] classifies the
//! outcome and the retry loop advances on it. A permit is held for the
//! duration of a single attempt and released before any backoff sleep, so
//! waiting callers are not starved by a retrying one.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::{ConfigError, UpstreamConfig};
use crate::resilience::backoff::linear_backoff;

/// Classified failure of a single attempt.
#[derive(Debug, Error)]
pub enum TransportFault {
    #[error("request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("connection failed")]
    Connect(#[source] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(StatusCode),

    #[error("response body was not valid JSON")]
    Decode(#[source] reqwest::Error),

    #[error("transport error")]
    Other(#[source] reqwest::Error),

    #[error("invalid request path")]
    BadPath(#[source] url::ParseError),

    #[error("timed out waiting for an in-flight slot")]
    AdmissionTimeout,

    #[error("admission gate closed")]
    AdmissionClosed,
}

impl TransportFault {
    /// Timeouts, connection failures and non-2xx statuses are worth another
    /// attempt; everything else fails the call immediately.
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportFault::Timeout(_) | TransportFault::Connect(_) | TransportFault::Status(_)
        )
    }
}

/// The single failure kind crossing the component boundary.
#[derive(Debug, Error)]
#[error("upstream unavailable after {attempts} attempt(s)")]
pub struct UpstreamUnavailable {
    pub attempts: u32,
    #[source]
    pub cause: TransportFault,
}

/// Outcome of one attempt.
enum Attempt {
    Success(Value),
    Retry(TransportFault),
    Fail(TransportFault),
}

/// Outbound client with bounded in-flight concurrency and bounded retries.
///
/// One instance per upstream base endpoint, shared across callers; the
/// admission gate is only meaningful when shared.
pub struct ResilientClient {
    http: reqwest::Client,
    base_url: url::Url,
    retries: u32,
    backoff: Duration,
    permits: Arc<Semaphore>,
    acquire_timeout: Option<Duration>,
}

impl ResilientClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ConfigError> {
        let base_url = url::Url::parse(&config.base_url).map_err(ConfigError::InvalidUpstreamUrl)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self {
            http,
            base_url,
            // No retries still performs exactly one attempt.
            retries: config.retries.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
            permits: Arc::new(Semaphore::new(config.max_in_flight)),
            acquire_timeout: config.acquire_timeout_ms.map(Duration::from_millis),
        })
    }

    /// In-flight slots currently free. Diagnostic only.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Perform a call, retrying retryable transport failures up to the
    /// configured attempt count.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, UpstreamUnavailable> {
        let mut attempt = 1u32;
        loop {
            match self.attempt_once(&method, path, body).await {
                Attempt::Success(value) => {
                    metrics::counter!("upstream_attempts_total", "outcome" => "success")
                        .increment(1);
                    return Ok(value);
                }
                Attempt::Retry(fault) if attempt < self.retries => {
                    metrics::counter!("upstream_attempts_total", "outcome" => "retry")
                        .increment(1);
                    let delay = linear_backoff(attempt, self.backoff);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retries,
                        delay_ms = delay.as_millis() as u64,
                        fault = %fault,
                        "Upstream attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Attempt::Retry(fault) | Attempt::Fail(fault) => {
                    metrics::counter!("upstream_attempts_total", "outcome" => "failure")
                        .increment(1);
                    tracing::warn!(
                        attempts = attempt,
                        fault = %fault,
                        "Upstream call gave up"
                    );
                    return Err(UpstreamUnavailable {
                        attempts: attempt,
                        cause: fault,
                    });
                }
            }
        }
    }

    /// One attempt: admission, the call itself, body parse. The permit is
    /// dropped when this returns, never held across a backoff sleep.
    async fn attempt_once(&self, method: &Method, path: &str, body: Option<&Value>) -> Attempt {
        let _permit = match self.acquire_permit().await {
            Ok(permit) => permit,
            Err(fault) => return Attempt::Fail(fault),
        };

        let url = match self.base_url.join(path) {
            Ok(url) => url,
            Err(err) => return Attempt::Fail(TransportFault::BadPath(err)),
        };

        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    return Attempt::Retry(TransportFault::Status(status));
                }
                match response.json::<Value>().await {
                    Ok(value) => Attempt::Success(value),
                    // The per-call timeout can also fire mid-body.
                    Err(err) if err.is_timeout() => Attempt::Retry(TransportFault::Timeout(err)),
                    Err(err) => Attempt::Fail(TransportFault::Decode(err)),
                }
            }
            Err(err) if err.is_timeout() => Attempt::Retry(TransportFault::Timeout(err)),
            Err(err) if err.is_connect() => Attempt::Retry(TransportFault::Connect(err)),
            Err(err) => Attempt::Fail(TransportFault::Other(err)),
        }
    }

    async fn acquire_permit(&self) -> Result<OwnedSemaphorePermit, TransportFault> {
        match self.acquire_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.permits.clone().acquire_owned())
                .await
            {
                Ok(Ok(permit)) => Ok(permit),
                Ok(Err(_)) => Err(TransportFault::AdmissionClosed),
                Err(_) => Err(TransportFault::AdmissionTimeout),
            },
            None => self
                .permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| TransportFault::AdmissionClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(retries: u32) -> ResilientClient {
        ResilientClient::new(&UpstreamConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            retries,
            ..UpstreamConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_retries_clamped_to_one() {
        assert_eq!(client(0).retries, 1);
        assert_eq!(client(3).retries, 3);
    }

    #[test]
    fn test_fault_classification() {
        assert!(TransportFault::Status(StatusCode::SERVICE_UNAVAILABLE).is_retryable());
        assert!(!TransportFault::AdmissionTimeout.is_retryable());
        assert!(!TransportFault::AdmissionClosed.is_retryable());
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(client(1).available_permits(), 5);
    }
}
