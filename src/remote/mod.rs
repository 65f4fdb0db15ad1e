use crate::{
    domain::{Board, BoardId, Card, CardDraft, CardId, ListId},
    error::{BoardError, Result},
};
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(feature = "file-remote")]
pub mod file;
pub mod memory;

/// The order-of-record the drag engine reconciles against.
///
/// Implementations own the wire format; the engine only needs these
/// operations to either succeed or fail.
#[async_trait]
pub trait RemoteBoardService: Send + Sync {
    /// Loads the read model for a board
    async fn load_board(&self, board_id: &BoardId) -> Result<Board>;

    /// Persists the full list order of a board
    async fn persist_list_order(&self, board_id: &BoardId, list_order: &[ListId]) -> Result<()>;

    /// Moves a card into `target_list` at `target_index`
    async fn move_card(&self, card_id: &CardId, target_list: &ListId, target_index: usize)
        -> Result<()>;

    /// Persists the card order of one list
    async fn persist_card_order(&self, list_id: &ListId, card_order: &[CardId]) -> Result<()>;

    /// Creates a card from a draft and returns the stored entity
    async fn create_card(
        &self,
        list_id: &ListId,
        draft: &CardDraft,
        insert_index: usize,
    ) -> Result<Card>;
}

#[async_trait]
impl<T> RemoteBoardService for Arc<T>
where
    T: RemoteBoardService + ?Sized,
{
    async fn load_board(&self, board_id: &BoardId) -> Result<Board> {
        (**self).load_board(board_id).await
    }

    async fn persist_list_order(&self, board_id: &BoardId, list_order: &[ListId]) -> Result<()> {
        (**self).persist_list_order(board_id, list_order).await
    }

    async fn move_card(&self, card_id: &CardId, target_list: &ListId, target_index: usize)
        -> Result<()> {
        (**self).move_card(card_id, target_list, target_index).await
    }

    async fn persist_card_order(&self, list_id: &ListId, card_order: &[CardId]) -> Result<()> {
        (**self).persist_card_order(list_id, card_order).await
    }

    async fn create_card(
        &self,
        list_id: &ListId,
        draft: &CardDraft,
        insert_index: usize,
    ) -> Result<Card> {
        (**self).create_card(list_id, draft, insert_index).await
    }
}

/// Applies a move the way the order-of-record does: the card leaves its
/// current list and is inserted at `target_index` clamped to the target
/// length. Works for same-list moves too.
pub(crate) fn apply_move(
    board: &Board,
    card_id: &CardId,
    target_list: &ListId,
    target_index: usize,
) -> Result<Board> {
    let source = board
        .find_list_by_card(card_id)
        .ok_or_else(|| BoardError::CardNotFound(card_id.to_string()))?;

    if &source.id == target_list {
        let mut order = source.card_order.clone();
        order.retain(|id| id != card_id);
        let index = target_index.min(order.len());
        order.insert(index, card_id.clone());
        return board.reorder_cards_in_list(target_list, &order);
    }

    let source_id = source.id.clone();
    board.move_card(card_id, &source_id, target_list, target_index)
}

/// Replaces a list's card order; `card_order` must be a permutation of the
/// list's current cards.
pub(crate) fn apply_card_order(board: &Board, list_id: &ListId, card_order: &[CardId]) -> Result<Board> {
    let list = board
        .list(list_id)
        .ok_or_else(|| BoardError::ListNotFound(list_id.to_string()))?;

    let mut current: Vec<&CardId> = list.card_order.iter().collect();
    let mut proposed: Vec<&CardId> = card_order.iter().collect();
    current.sort();
    proposed.sort();
    if current != proposed {
        return Err(BoardError::InvalidOrder(format!(
            "card order for list {} is not a permutation of its cards",
            list_id
        )));
    }

    board.reorder_cards_in_list(list_id, card_order)
}

/// Creates a card with a fresh id at `insert_index` (appending when out of range)
pub(crate) fn apply_create(
    board: &Board,
    list_id: &ListId,
    draft: &CardDraft,
    insert_index: usize,
) -> Result<(Board, Card)> {
    let card = draft.to_card(CardId::generate(), list_id.clone());
    let next = board.insert_card(list_id, card.clone(), insert_index)?;
    Ok((next, card))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::List;

    fn board() -> Board {
        Board::new("b1", "Board")
            .with_list(List::new("l1", "One").with_cards(vec![
                Card::new("c1", "1", "l1"),
                Card::new("c2", "2", "l1"),
                Card::new("c3", "3", "l1"),
            ]))
            .with_list(List::new("l2", "Two"))
    }

    fn card_ids<'a>(board: &'a Board, list: &str) -> Vec<&'a str> {
        board.list(&ListId::from(list)).unwrap().card_order.iter().map(CardId::as_str).collect()
    }

    #[test]
    fn test_apply_move_clamps_index() {
        let next = apply_move(&board(), &CardId::from("c1"), &ListId::from("l2"), 40).unwrap();
        assert_eq!(card_ids(&next, "l2"), vec!["c1"]);
        assert_eq!(card_ids(&next, "l1"), vec!["c2", "c3"]);
    }

    #[test]
    fn test_apply_move_within_list() {
        let next = apply_move(&board(), &CardId::from("c1"), &ListId::from("l1"), 2).unwrap();
        assert_eq!(card_ids(&next, "l1"), vec!["c2", "c3", "c1"]);
    }

    #[test]
    fn test_apply_card_order_rejects_foreign_ids() {
        let result = apply_card_order(
            &board(),
            &ListId::from("l1"),
            &[CardId::from("c1"), CardId::from("c2"), CardId::from("c9")],
        );
        assert!(matches!(result, Err(BoardError::InvalidOrder(_))));
    }

    #[test]
    fn test_apply_create_inserts_at_index() {
        let (next, card) = apply_create(&board(), &ListId::from("l1"), &CardDraft::new("New"), 1).unwrap();
        assert_eq!(card.title, "New");
        assert_eq!(next.list(&ListId::from("l1")).unwrap().position_of(&card.id), Some(1));
    }
}
