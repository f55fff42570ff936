//! Concurrent in-memory tables for users, boards and cards.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::dto::{CardPatch, NewCard};
use crate::domain::models::{Board, Card, CardColumn, CardSlot, Role, User};
use crate::store::StoreError;

/// Filters for card listing. `owner` of `None` means no ownership filter
/// (admin view).
#[derive(Debug, Default, Clone)]
pub struct CardFilter {
    pub owner: Option<i64>,
    pub column: Option<CardColumn>,
    pub board_id: Option<i64>,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<i64, User>,
    users_by_email: DashMap<String, i64>,
    boards: DashMap<i64, Board>,
    cards: DashMap<i64, Card>,
    card_slots: DashMap<CardSlot, i64>,
    next_user_id: AtomicI64,
    next_board_id: AtomicI64,
    next_card_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- users --------------------------------------------------------------

    pub fn insert_user(
        &self,
        email: &str,
        password_hash: String,
        role: Role,
    ) -> Result<User, StoreError> {
        // The email index entry is the uniqueness gate; it is reserved before
        // the row is written.
        match self.users_by_email.entry(email.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateEmail),
            Entry::Vacant(slot) => {
                let id = self.next_user_id.fetch_add(1, Ordering::Relaxed) + 1;
                let user = User {
                    id,
                    email: email.to_string(),
                    password_hash,
                    role,
                    is_active: true,
                    created_at: Utc::now(),
                };
                self.users.insert(id, user.clone());
                slot.insert(id);
                Ok(user)
            }
        }
    }

    pub fn user_by_id(&self, id: i64) -> Option<User> {
        self.users.get(&id).map(|user| user.value().clone())
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let id = *self.users_by_email.get(email)?;
        self.user_by_id(id)
    }

    // -- boards -------------------------------------------------------------

    pub fn insert_board(&self, title: String, owner_id: i64) -> Board {
        let id = self.next_board_id.fetch_add(1, Ordering::Relaxed) + 1;
        let board = Board {
            id,
            title,
            owner_id,
            created_at: Utc::now(),
        };
        self.boards.insert(id, board.clone());
        board
    }

    pub fn board_by_id(&self, id: i64) -> Option<Board> {
        self.boards.get(&id).map(|board| board.value().clone())
    }

    /// Boards visible to the given owner, or all boards when `owner` is
    /// `None`, ordered by id.
    pub fn list_boards(&self, owner: Option<i64>) -> Vec<Board> {
        let mut boards: Vec<Board> = self
            .boards
            .iter()
            .filter(|entry| owner.is_none_or(|owner_id| entry.owner_id == owner_id))
            .map(|entry| entry.value().clone())
            .collect();
        boards.sort_by_key(|board| board.id);
        boards
    }

    // -- cards --------------------------------------------------------------

    pub fn insert_card(&self, new: NewCard, owner_id: i64) -> Result<Card, StoreError> {
        let id = self.next_card_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();
        let card = Card {
            id,
            title: new.title,
            column: new.column,
            order_idx: new.order_idx,
            board_id: new.board_id,
            owner_id,
            created_at: now,
            updated_at: now,
            estimate_hours: new.estimate_hours,
            due_date: new.due_date,
        };
        match self.card_slots.entry(card.slot()) {
            Entry::Occupied(_) => Err(StoreError::SlotTaken),
            Entry::Vacant(slot) => {
                slot.insert(id);
                self.cards.insert(id, card.clone());
                Ok(card)
            }
        }
    }

    pub fn card_by_id(&self, id: i64) -> Option<Card> {
        self.cards.get(&id).map(|card| card.value().clone())
    }

    /// Apply a patch to an existing card, enforcing position uniqueness when
    /// the patch relocates the card. Returns the updated card.
    ///
    /// Slot reservation happens before the row lock is taken, so this never
    /// holds locks on both maps at once.
    pub fn patch_card(&self, id: i64, patch: CardPatch) -> Result<Option<Card>, StoreError> {
        let Some(current) = self.card_by_id(id) else {
            return Ok(None);
        };

        let old_slot = current.slot();
        let new_slot = CardSlot {
            board_id: old_slot.board_id,
            column: patch.column.unwrap_or(old_slot.column),
            order_idx: patch.order_idx.unwrap_or(old_slot.order_idx),
        };

        if new_slot != old_slot {
            match self.card_slots.entry(new_slot) {
                Entry::Occupied(existing) if *existing.get() != id => {
                    return Err(StoreError::SlotTaken);
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.card_slots.remove_if(&old_slot, |_, owner| *owner == id);
        }

        let Some(mut card) = self.cards.get_mut(&id) else {
            // Deleted while relocating; give the reservation back.
            self.card_slots.remove_if(&new_slot, |_, owner| *owner == id);
            return Ok(None);
        };

        if let Some(title) = patch.title {
            card.title = title;
        }
        if let Some(column) = patch.column {
            card.column = column;
        }
        if let Some(order_idx) = patch.order_idx {
            card.order_idx = order_idx;
        }
        if let Some(estimate) = patch.estimate_hours {
            card.estimate_hours = Some(estimate);
        }
        if let Some(due_date) = patch.due_date {
            card.due_date = Some(due_date);
        }
        card.updated_at = Utc::now();

        Ok(Some(card.value().clone()))
    }

    pub fn delete_card(&self, id: i64) -> Option<Card> {
        let (_, card) = self.cards.remove(&id)?;
        self.card_slots
            .remove_if(&card.slot(), |_, owner| *owner == id);
        Some(card)
    }

    /// Cards matching the filter, ordered by (board, column name, position,
    /// id) with offset/limit pagination.
    pub fn list_cards(&self, filter: &CardFilter) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .cards
            .iter()
            .filter(|entry| {
                filter.owner.is_none_or(|owner| entry.owner_id == owner)
                    && filter.column.is_none_or(|column| entry.column == column)
                    && filter.board_id.is_none_or(|board| entry.board_id == board)
            })
            .map(|entry| entry.value().clone())
            .collect();
        cards.sort_by(|a, b| {
            (a.board_id, a.column.as_str(), a.order_idx, a.id)
                .cmp(&(b.board_id, b.column.as_str(), b.order_idx, b.id))
        });
        cards.into_iter().skip(filter.offset).take(filter.limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_card(board_id: i64, column: CardColumn, order_idx: u32) -> NewCard {
        NewCard {
            title: "card".to_string(),
            column,
            order_idx,
            board_id,
            estimate_hours: None,
            due_date: None,
        }
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store
            .insert_user("ada@example.com", "hash".into(), Role::User)
            .unwrap();
        let err = store
            .insert_user("ada@example.com", "hash".into(), Role::User)
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[test]
    fn test_card_slot_uniqueness_on_insert() {
        let store = MemoryStore::new();
        store.insert_card(new_card(1, CardColumn::Todo, 0), 1).unwrap();
        let err = store
            .insert_card(new_card(1, CardColumn::Todo, 0), 1)
            .unwrap_err();
        assert!(matches!(err, StoreError::SlotTaken));

        // A different column or position is fine.
        store.insert_card(new_card(1, CardColumn::Todo, 1), 1).unwrap();
        store
            .insert_card(new_card(1, CardColumn::Done, 0), 1)
            .unwrap();
    }

    #[test]
    fn test_patch_relocates_and_frees_old_slot() {
        let store = MemoryStore::new();
        let card = store.insert_card(new_card(1, CardColumn::Todo, 0), 1).unwrap();

        let moved = store
            .patch_card(
                card.id,
                CardPatch {
                    column: Some(CardColumn::Done),
                    order_idx: Some(3),
                    ..CardPatch::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(moved.column, CardColumn::Done);
        assert_eq!(moved.order_idx, 3);

        // Old position is free again.
        store.insert_card(new_card(1, CardColumn::Todo, 0), 1).unwrap();
    }

    #[test]
    fn test_patch_into_occupied_slot_conflicts() {
        let store = MemoryStore::new();
        store.insert_card(new_card(1, CardColumn::Todo, 0), 1).unwrap();
        let second = store.insert_card(new_card(1, CardColumn::Todo, 1), 1).unwrap();

        let err = store
            .patch_card(
                second.id,
                CardPatch {
                    order_idx: Some(0),
                    ..CardPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::SlotTaken));
    }

    #[test]
    fn test_list_cards_ordering_and_pagination() {
        let store = MemoryStore::new();
        store.insert_card(new_card(2, CardColumn::Todo, 0), 1).unwrap();
        store.insert_card(new_card(1, CardColumn::Todo, 1), 1).unwrap();
        store.insert_card(new_card(1, CardColumn::Todo, 0), 1).unwrap();
        store.insert_card(new_card(1, CardColumn::Backlog, 5), 1).unwrap();

        let all = store.list_cards(&CardFilter {
            owner: Some(1),
            limit: 10,
            ..CardFilter::default()
        });
        let keys: Vec<(i64, &str, u32)> = all
            .iter()
            .map(|card| (card.board_id, card.column.as_str(), card.order_idx))
            .collect();
        assert_eq!(
            keys,
            vec![
                (1, "backlog", 5),
                (1, "todo", 0),
                (1, "todo", 1),
                (2, "todo", 0),
            ]
        );

        let page = store.list_cards(&CardFilter {
            owner: Some(1),
            limit: 2,
            offset: 1,
            ..CardFilter::default()
        });
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].column, CardColumn::Todo);
    }

    #[test]
    fn test_delete_frees_slot() {
        let store = MemoryStore::new();
        let card = store.insert_card(new_card(1, CardColumn::Todo, 0), 1).unwrap();
        assert!(store.delete_card(card.id).is_some());
        assert!(store.card_by_id(card.id).is_none());
        store.insert_card(new_card(1, CardColumn::Todo, 0), 1).unwrap();
    }

    #[test]
    fn test_ownership_filter() {
        let store = MemoryStore::new();
        store.insert_card(new_card(1, CardColumn::Todo, 0), 1).unwrap();
        store.insert_card(new_card(1, CardColumn::Todo, 1), 2).unwrap();

        let mine = store.list_cards(&CardFilter {
            owner: Some(1),
            limit: 10,
            ..CardFilter::default()
        });
        assert_eq!(mine.len(), 1);

        let all = store.list_cards(&CardFilter {
            owner: None,
            limit: 10,
            ..CardFilter::default()
        });
        assert_eq!(all.len(), 2);
    }
}
