//! Correlation id propagation and error-envelope finalization.
//!
//! Attached as the outermost layer: every response, including those produced
//! by inner middleware (timeouts, body limits) and router fallbacks, passes
//! through here. The middleware reads `X-Correlation-Id` from the request
//! (generating a fresh token when absent or blank), echoes it on the
//! response header, and rewrites any error response into the uniform
//! envelope carrying that id.

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::json;
use uuid::Uuid;

use crate::http::error::{ErrorEnvelope, ErrorParts};

pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Largest foreign error body the finalizer will buffer for inspection.
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Per-request correlation id, available to handlers via request extensions.
#[derive(Debug, Clone)]
pub struct CorrelationId(pub String);

pub async fn propagate(mut request: Request, next: Next) -> Response {
    let correlation_id = extract_correlation_id(request.headers());
    request
        .extensions_mut()
        .insert(CorrelationId(correlation_id.clone()));

    let response = next.run(request).await;
    finalize(response, &correlation_id).await
}

/// Inbound header value when present and non-blank, otherwise a fresh token.
fn extract_correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}

/// Echo the correlation id and normalize error bodies into the envelope.
async fn finalize(response: Response, correlation_id: &str) -> Response {
    let (mut parts, body) = response.into_parts();

    if let Ok(value) = HeaderValue::from_str(correlation_id) {
        parts.headers.insert(CORRELATION_HEADER, value);
    }

    if !parts.status.is_client_error() && !parts.status.is_server_error() {
        return Response::from_parts(parts, body);
    }

    let envelope = match parts.extensions.remove::<ErrorParts>() {
        Some(error) => error.into_envelope(correlation_id),
        None => {
            let bytes = to_bytes(body, MAX_ERROR_BODY_BYTES)
                .await
                .unwrap_or_default();
            foreign_envelope(parts.status, &bytes, correlation_id)
        }
    };

    tracing::warn!(
        status = parts.status.as_u16(),
        code = %envelope.code,
        correlation_id,
        "Request failed"
    );

    let payload = serde_json::to_vec(&envelope).unwrap_or_default();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Response::from_parts(parts, Body::from(payload))
}

/// Envelope for an error response produced outside the application error
/// type: router fallbacks, extractor rejections that bypassed wrapping, or
/// inner middleware like the timeout and body-limit layers.
fn foreign_envelope(status: StatusCode, body: &[u8], correlation_id: &str) -> ErrorEnvelope {
    // A body that already is an envelope just gets the correlation id.
    if let Ok(mut envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        if !envelope.code.is_empty() {
            envelope.correlation_id = Some(correlation_id.to_string());
            return envelope;
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or("HTTP error").to_string()
    } else {
        text.to_string()
    };
    ErrorEnvelope {
        code: "HTTP_ERROR".to_string(),
        message,
        details: json!({}),
        correlation_id: Some(correlation_id.to_string()),
    }
}
