//! Wire-level request and response shapes, with input normalization.
//!
//! Each inbound shape exposes a `validated()` method that trims, range-checks
//! and normalizes its fields, collecting per-field violations into one
//! validation failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::{Board, Card, CardColumn, Role, User};
use crate::http::error::ApiError;

const MAX_TITLE_LENGTH: usize = 255;
const MAX_EMAIL_LENGTH: usize = 255;
const MAX_CONTEXT_LENGTH: usize = 1024;
const MAX_ESTIMATE_HOURS: f64 = 1000.0;

// ---------------------------------------------------------------------------
// Auth

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Normalized registration input.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validated(self) -> Result<Credentials, ApiError> {
        let mut violations = Vec::new();
        let email = match normalize_email(&self.email) {
            Ok(email) => email,
            Err(message) => {
                violations.push(("email", message));
                String::new()
            }
        };
        let password_len = self.password.chars().count();
        if !(6..=128).contains(&password_len) {
            violations.push(("password", "must be between 6 and 128 characters".to_string()));
        }
        if !violations.is_empty() {
            return Err(ApiError::validation_fields(violations));
        }
        Ok(Credentials {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Boards

#[derive(Debug, Deserialize)]
pub struct BoardCreate {
    pub title: String,
}

impl BoardCreate {
    pub fn validated(self) -> Result<String, ApiError> {
        validate_title(&self.title)
            .map_err(|message| ApiError::validation_fields(vec![("title", message)]))
    }
}

#[derive(Debug, Serialize)]
pub struct BoardOut {
    pub id: i64,
    pub title: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Board> for BoardOut {
    fn from(board: &Board) -> Self {
        Self {
            id: board.id,
            title: board.title.clone(),
            owner_id: board.owner_id,
            created_at: board.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Cards

#[derive(Debug, Deserialize)]
pub struct CardCreate {
    pub title: String,
    pub column: CardColumn,
    pub order_idx: u32,
    pub board_id: i64,
    #[serde(default)]
    pub estimate_hours: Option<f64>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Normalized card creation input, ready for the store.
#[derive(Debug)]
pub struct NewCard {
    pub title: String,
    pub column: CardColumn,
    pub order_idx: u32,
    pub board_id: i64,
    pub estimate_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CardCreate {
    pub fn validated(self) -> Result<NewCard, ApiError> {
        let mut violations = Vec::new();
        let title = match validate_title(&self.title) {
            Ok(title) => title,
            Err(message) => {
                violations.push(("title", message));
                String::new()
            }
        };
        let estimate_hours = match normalize_estimate(self.estimate_hours) {
            Ok(estimate) => estimate,
            Err(message) => {
                violations.push(("estimate_hours", message));
                None
            }
        };
        if !violations.is_empty() {
            return Err(ApiError::validation_fields(violations));
        }
        Ok(NewCard {
            title,
            column: self.column,
            order_idx: self.order_idx,
            board_id: self.board_id,
            estimate_hours,
            due_date: self.due_date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CardUpdate {
    pub title: Option<String>,
    pub column: Option<CardColumn>,
    pub order_idx: Option<u32>,
    #[serde(default)]
    pub estimate_hours: Option<f64>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Field-level changes to apply to an existing card. Absent fields are
/// left untouched.
#[derive(Debug, Default, Clone)]
pub struct CardPatch {
    pub title: Option<String>,
    pub column: Option<CardColumn>,
    pub order_idx: Option<u32>,
    pub estimate_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CardUpdate {
    pub fn validated(self) -> Result<CardPatch, ApiError> {
        let mut violations = Vec::new();
        let title = match self.title {
            Some(raw) => match validate_title(&raw) {
                Ok(title) => Some(title),
                Err(message) => {
                    violations.push(("title", message));
                    None
                }
            },
            None => None,
        };
        let estimate_hours = match normalize_estimate(self.estimate_hours) {
            Ok(estimate) => estimate,
            Err(message) => {
                violations.push(("estimate_hours", message));
                None
            }
        };
        if !violations.is_empty() {
            return Err(ApiError::validation_fields(violations));
        }
        Ok(CardPatch {
            title,
            column: self.column,
            order_idx: self.order_idx,
            estimate_hours,
            due_date: self.due_date,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CardMove {
    pub column: CardColumn,
    pub order_idx: u32,
}

impl CardMove {
    pub fn into_patch(self) -> CardPatch {
        CardPatch {
            column: Some(self.column),
            order_idx: Some(self.order_idx),
            ..CardPatch::default()
        }
    }
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct CardListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub column: Option<CardColumn>,
    #[serde(default)]
    pub board_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CardOut {
    pub id: i64,
    pub title: String,
    pub column: CardColumn,
    pub order_idx: u32,
    pub board_id: i64,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub estimate_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl From<&Card> for CardOut {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            title: card.title.clone(),
            column: card.column,
            order_idx: card.order_idx,
            board_id: card.board_id,
            owner_id: card.owner_id,
            created_at: card.created_at,
            updated_at: card.updated_at,
            estimate_hours: card.estimate_hours,
            due_date: card.due_date,
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring

#[derive(Debug, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub context: Option<String>,
}

impl ScoreRequest {
    pub fn validated(self) -> Result<Option<String>, ApiError> {
        if let Some(context) = &self.context {
            if context.chars().count() > MAX_CONTEXT_LENGTH {
                return Err(ApiError::validation_fields(vec![(
                    "context",
                    format!("must be at most {MAX_CONTEXT_LENGTH} characters"),
                )]));
            }
        }
        Ok(self.context)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Field validators

fn validate_title(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!("must be at most {MAX_TITLE_LENGTH} characters"));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(raw: &str) -> Result<String, String> {
    let email = raw.trim().to_ascii_lowercase();
    if email.is_empty() || email.chars().count() > MAX_EMAIL_LENGTH {
        return Err("must be a valid email address".to_string());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err("must be a valid email address".to_string());
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err("must be a valid email address".to_string());
    }
    Ok(email)
}

/// Range-check an estimate and round it to two decimal places.
fn normalize_estimate(raw: Option<f64>) -> Result<Option<f64>, String> {
    let Some(value) = raw else { return Ok(None) };
    if !value.is_finite() || !(0.0..=MAX_ESTIMATE_HOURS).contains(&value) {
        return Err(format!("must be between 0 and {MAX_ESTIMATE_HOURS}"));
    }
    Ok(Some((value * 100.0).round() / 100.0))
}
