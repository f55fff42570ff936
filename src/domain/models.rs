//! Persistent entities.
//!
//! These are the row shapes held by the in-process store. Wire-level input
//! and output shapes live in [`crate::domain::dto`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Column a card sits in. Serialized in snake_case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardColumn {
    Backlog,
    Todo,
    InProgress,
    Done,
}

impl CardColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            CardColumn::Backlog => "backlog",
            CardColumn::Todo => "todo",
            CardColumn::InProgress => "in_progress",
            CardColumn::Done => "done",
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Board {
    pub id: i64,
    pub title: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Card {
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

/// Position of a card within a board. Unique across the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardSlot {
    pub board_id: i64,
    pub column: CardColumn,
    pub order_idx: u32,
}

impl Card {
    pub fn slot(&self) -> CardSlot {
        CardSlot {
            board_id: self.board_id,
            column: self.column,
            order_idx: self.order_idx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_wire_names() {
        assert_eq!(
            serde_json::to_string(&CardColumn::InProgress).unwrap(),
            "\"in_progress\""
        );
        let parsed: CardColumn = serde_json::from_str("\"backlog\"").unwrap();
        assert_eq!(parsed, CardColumn::Backlog);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(Role::User.as_str(), "user");
        assert!(!Role::User.is_admin());
    }
}
