//! In-process persistence.
//!
//! Stands in for the out-of-scope ORM layer: concurrent maps with atomic id
//! sequences, enforcing the email and card-position uniqueness invariants.

pub mod memory;

use thiserror::Error;

pub use memory::MemoryStore;

/// Uniqueness violations surfaced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email is already registered")]
    DuplicateEmail,

    #[error("a card already occupies that (board, column, position)")]
    SlotTaken,
}
