//! Gateway for the `/score` upstream operation.
//!
//! Owns the domain-specific use of the resilient client: one fixed path, one
//! payload shape, and validation that the upstream honored its response
//! contract. Transport unavailability and a malformed response body are
//! different failures; both end up as 502 for the caller, but a malformed
//! body is a contract violation by the upstream, not a connectivity problem.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::models::{Card, CardColumn};
use crate::resilience::{ResilientClient, UpstreamUnavailable};

const SCORE_PATH: &str = "/score";
const SCORE_FIELD: &str = "score";

/// Request body sent to the scoring upstream.
#[derive(Debug, Clone, Serialize)]
pub struct ScorePayload {
    pub title: String,
    pub column: CardColumn,
    pub estimate_hours: Option<f64>,
    pub due_date: Option<String>,
    pub context: Option<String>,
}

impl ScorePayload {
    pub fn from_card(card: &Card, context: Option<String>) -> Self {
        Self {
            title: card.title.clone(),
            column: card.column,
            estimate_hours: card.estimate_hours,
            due_date: card.due_date.map(|date| date.to_rfc3339()),
            context,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScoreError {
    /// Propagated unchanged from the resilient client.
    #[error(transparent)]
    Upstream(#[from] UpstreamUnavailable),

    /// Upstream answered 2xx but without a usable numeric `score` field.
    #[error("scoring response did not contain a numeric 'score' field")]
    MalformedResponse,
}

/// One gateway instance per process, shared across request handlers; the
/// client's concurrency cap only means something when shared.
pub struct ScoreGateway {
    client: ResilientClient,
}

impl ScoreGateway {
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    pub async fn fetch_score(&self, payload: &ScorePayload) -> Result<f64, ScoreError> {
        let body = serde_json::to_value(payload).unwrap_or(Value::Null);
        let response = self.client.request(Method::POST, SCORE_PATH, Some(&body)).await?;
        parse_score(&response).ok_or(ScoreError::MalformedResponse)
    }
}

/// Extract a finite `score` number from the upstream response body.
fn parse_score(response: &Value) -> Option<f64> {
    response
        .get(SCORE_FIELD)
        .and_then(Value::as_f64)
        .filter(|score| score.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_score_accepts_numbers() {
        assert_eq!(parse_score(&json!({"score": 7.5})), Some(7.5));
        assert_eq!(parse_score(&json!({"score": 3})), Some(3.0));
    }

    #[test]
    fn test_parse_score_rejects_contract_violations() {
        assert_eq!(parse_score(&json!({})), None);
        assert_eq!(parse_score(&json!({"score": null})), None);
        assert_eq!(parse_score(&json!({"score": "7.5"})), None);
        assert_eq!(parse_score(&json!([1, 2, 3])), None);
    }

    #[test]
    fn test_payload_shape() {
        use chrono::{TimeZone, Utc};

        let card = Card {
            id: 1,
            title: "Ship it".to_string(),
            column: CardColumn::InProgress,
            order_idx: 0,
            board_id: 1,
            owner_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            estimate_hours: Some(2.5),
            due_date: Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
        };
        let payload = ScorePayload::from_card(&card, Some("rush".to_string()));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["title"], "Ship it");
        assert_eq!(value["column"], "in_progress");
        assert_eq!(value["estimate_hours"], 2.5);
        assert_eq!(value["context"], "rush");
        assert!(value["due_date"].as_str().unwrap().starts_with("2026-03-01"));
    }
}
