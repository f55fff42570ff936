//! Board operations with ownership enforcement.

use crate::domain::models::{Board, User};
use crate::http::error::ApiError;
use crate::store::MemoryStore;

pub fn create_board(store: &MemoryStore, owner: &User, title: String) -> Board {
    store.insert_board(title, owner.id)
}

/// Boards visible to the requester. Admins see everything.
pub fn list_boards(store: &MemoryStore, requester: &User) -> Vec<Board> {
    let owner = if requester.role.is_admin() {
        None
    } else {
        Some(requester.id)
    };
    store.list_boards(owner)
}

/// Resolve a board the requester may attach cards to.
pub fn ensure_board_access(
    store: &MemoryStore,
    board_id: i64,
    requester: &User,
) -> Result<Board, ApiError> {
    let board = store.board_by_id(board_id).ok_or(ApiError::BoardNotFound)?;
    if board.owner_id != requester.id && !requester.role.is_admin() {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }
    Ok(board)
}
