//! Uniform error envelope.
//!
//! Every failure leaving the API, whatever its origin, is rendered as
//! `{"code", "message", "details", "correlation_id"}` with a stable `code`
//! drawn from a fixed taxonomy. Handlers return [`ApiError`]; the correlation
//! middleware injects the per-request identifier and rewrites foreign error
//! responses (fallback 404s, timeout and body-limit layers) into the same
//! shape.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::scoring::ScoreError;

/// Wire shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default = "empty_details")]
    pub details: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

fn empty_details() -> Value {
    json!({})
}

/// Error parts attached to a response as an extension so the correlation
/// middleware can rebuild the body with the request's correlation id.
#[derive(Debug, Clone)]
pub struct ErrorParts {
    pub code: String,
    pub message: String,
    pub details: Value,
}

impl ErrorParts {
    pub fn into_envelope(self, correlation_id: &str) -> ErrorEnvelope {
        ErrorEnvelope {
            code: self.code,
            message: self.message,
            details: self.details,
            correlation_id: Some(correlation_id.to_string()),
        }
    }
}

/// Application failure taxonomy.
///
/// Messages are client-facing: they never carry secret values or internal
/// causes. Diagnostic detail stays in logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{0}")]
    Unauthorized(String),

    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("board not found")]
    BoardNotFound,

    #[error("card not found")]
    CardNotFound,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("a card already occupies this position")]
    CardOrderConflict,

    #[error("external scoring service unavailable")]
    ExternalServiceUnavailable,

    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    /// Validation failure with a single top-level message.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: json!({}),
        }
    }

    /// Validation failure carrying per-field violations.
    pub fn validation_fields(violations: Vec<(&str, String)>) -> Self {
        let errors: Vec<Value> = violations
            .into_iter()
            .map(|(field, message)| json!({"field": field, "message": message}))
            .collect();
        ApiError::Validation {
            message: "Request validation failed".to_string(),
            details: json!({ "errors": errors }),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BoardNotFound | ApiError::CardNotFound => StatusCode::NOT_FOUND,
            ApiError::UserAlreadyExists | ApiError::CardOrderConflict => StatusCode::CONFLICT,
            ApiError::ExternalServiceUnavailable => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::BoardNotFound => "BOARD_NOT_FOUND",
            ApiError::CardNotFound => "CARD_NOT_FOUND",
            ApiError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            ApiError::CardOrderConflict => "CARD_ORDER_CONFLICT",
            ApiError::ExternalServiceUnavailable => "EXTERNAL_SERVICE_UNAVAILABLE",
            ApiError::Internal(_) => "HTTP_ERROR",
        }
    }

    fn details(&self) -> Value {
        match self {
            ApiError::Validation { details, .. } => details.clone(),
            _ => json!({}),
        }
    }

    fn public_message(&self) -> String {
        match self {
            // The inner string is operator diagnostics, not client material.
            ApiError::Internal(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(detail) = &self {
            tracing::error!(detail = %detail, "Internal error");
        }

        let parts = ErrorParts {
            code: self.code().to_string(),
            message: self.public_message(),
            details: self.details(),
        };
        let envelope = ErrorEnvelope {
            code: parts.code.clone(),
            message: parts.message.clone(),
            details: parts.details.clone(),
            correlation_id: None,
        };

        let mut response = (status, Json(envelope)).into_response();
        response.extensions_mut().insert(parts);
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<ScoreError> for ApiError {
    fn from(err: ScoreError) -> Self {
        // Both score failure kinds render 502; the distinction lives in logs.
        match &err {
            ScoreError::Upstream(cause) => {
                tracing::warn!(cause = %cause, "Scoring upstream unavailable");
            }
            ScoreError::MalformedResponse => {
                tracing::warn!("Scoring upstream returned a malformed response");
            }
        }
        ApiError::ExternalServiceUnavailable
    }
}
