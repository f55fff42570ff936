//! Card operations: ownership-enforced CRUD, ordering and moves.

use crate::boards;
use crate::domain::dto::{CardListQuery, CardPatch, NewCard};
use crate::domain::models::{Card, User};
use crate::http::error::ApiError;
use crate::store::memory::CardFilter;
use crate::store::{MemoryStore, StoreError};

pub fn create_card(
    store: &MemoryStore,
    requester: &User,
    new: NewCard,
) -> Result<Card, ApiError> {
    boards::ensure_board_access(store, new.board_id, requester)?;
    store
        .insert_card(new, requester.id)
        .map_err(conflict_from_store)
}

/// Resolve a card the requester may act on. Owners and admins only.
pub fn get_card(store: &MemoryStore, card_id: i64, requester: &User) -> Result<Card, ApiError> {
    let card = store.card_by_id(card_id).ok_or(ApiError::CardNotFound)?;
    if card.owner_id != requester.id && !requester.role.is_admin() {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }
    Ok(card)
}

pub fn list_cards(store: &MemoryStore, requester: &User, query: &CardListQuery) -> Vec<Card> {
    let owner = if requester.role.is_admin() {
        None
    } else {
        Some(requester.id)
    };
    store.list_cards(&CardFilter {
        owner,
        column: query.column,
        board_id: query.board_id,
        limit: query.limit,
        offset: query.offset,
    })
}

pub fn update_card(
    store: &MemoryStore,
    card_id: i64,
    requester: &User,
    patch: CardPatch,
) -> Result<Card, ApiError> {
    get_card(store, card_id, requester)?;
    store
        .patch_card(card_id, patch)
        .map_err(conflict_from_store)?
        .ok_or(ApiError::CardNotFound)
}

pub fn delete_card(store: &MemoryStore, card_id: i64, requester: &User) -> Result<(), ApiError> {
    get_card(store, card_id, requester)?;
    store.delete_card(card_id).ok_or(ApiError::CardNotFound)?;
    Ok(())
}

fn conflict_from_store(err: StoreError) -> ApiError {
    match err {
        StoreError::SlotTaken => ApiError::CardOrderConflict,
        other => ApiError::Internal(other.to_string()),
    }
}
