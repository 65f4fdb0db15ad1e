use crate::{
    domain::{Board, BoardId, Card, CardDraft, CardId, ListId},
    error::{BoardError, Result},
    remote::{apply_card_order, apply_create, apply_move, RemoteBoardService},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

/// Operations of [`RemoteBoardService`], used to inject failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    LoadBoard,
    PersistListOrder,
    MoveCard,
    PersistCardOrder,
    CreateCard,
}

/// A call received by [`InMemoryRemote`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    LoadBoard(BoardId),
    PersistListOrder(BoardId, Vec<ListId>),
    MoveCard(CardId, ListId, usize),
    PersistCardOrder(ListId, Vec<CardId>),
    CreateCard(ListId, String, usize),
}

/// Order-of-record kept in memory, with a call log and one-shot failure
/// injection per operation
#[derive(Default)]
pub struct InMemoryRemote {
    boards: Mutex<HashMap<BoardId, Board>>,
    failures: Mutex<HashSet<RemoteOp>>,
    calls: Mutex<Vec<RemoteCall>>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a remote seeded with one board
    pub async fn with_board(board: Board) -> Self {
        let remote = Self::new();
        remote.insert_board(board).await;
        remote
    }

    pub async fn insert_board(&self, board: Board) {
        let board = board.strip_placeholders().normalized();
        self.boards.lock().await.insert(board.id.clone(), board);
    }

    /// Current stored state of a board
    pub async fn board(&self, board_id: &BoardId) -> Option<Board> {
        self.boards.lock().await.get(board_id).cloned()
    }

    /// Makes the next call of `op` fail
    pub async fn fail_next(&self, op: RemoteOp) {
        self.failures.lock().await.insert(op);
    }

    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, op: RemoteOp, call: RemoteCall) -> Result<()> {
        self.calls.lock().await.push(call);
        if self.failures.lock().await.remove(&op) {
            return Err(BoardError::Remote(anyhow::anyhow!(
                "injected failure for {:?}",
                op
            )));
        }
        Ok(())
    }
}

fn board_with_list<'a>(
    boards: &'a mut HashMap<BoardId, Board>,
    list_id: &ListId,
) -> Result<&'a mut Board> {
    boards
        .values_mut()
        .find(|b| b.list(list_id).is_some())
        .ok_or_else(|| BoardError::ListNotFound(list_id.to_string()))
}

#[async_trait]
impl RemoteBoardService for InMemoryRemote {
    async fn load_board(&self, board_id: &BoardId) -> Result<Board> {
        self.record(RemoteOp::LoadBoard, RemoteCall::LoadBoard(board_id.clone()))
            .await?;
        self.board(board_id)
            .await
            .ok_or_else(|| BoardError::BoardNotFound(board_id.to_string()))
    }

    async fn persist_list_order(&self, board_id: &BoardId, list_order: &[ListId]) -> Result<()> {
        self.record(
            RemoteOp::PersistListOrder,
            RemoteCall::PersistListOrder(board_id.clone(), list_order.to_vec()),
        )
        .await?;

        let mut boards = self.boards.lock().await;
        let board = boards
            .get_mut(board_id)
            .ok_or_else(|| BoardError::BoardNotFound(board_id.to_string()))?;
        *board = board.with_list_order(list_order)?;
        Ok(())
    }

    async fn move_card(
        &self,
        card_id: &CardId,
        target_list: &ListId,
        target_index: usize,
    ) -> Result<()> {
        self.record(
            RemoteOp::MoveCard,
            RemoteCall::MoveCard(card_id.clone(), target_list.clone(), target_index),
        )
        .await?;

        let mut boards = self.boards.lock().await;
        let owner = boards
            .values()
            .find(|b| b.card(card_id).is_some())
            .map(|b| b.id.clone())
            .ok_or_else(|| BoardError::CardNotFound(card_id.to_string()))?;

        if let Some(other) = boards
            .values()
            .find(|b| b.id != owner && b.list(target_list).is_some())
        {
            return Err(BoardError::BoardMismatch {
                list: target_list.to_string(),
                expected: owner.to_string(),
                actual: other.id.to_string(),
            });
        }

        let board = boards
            .get_mut(&owner)
            .ok_or_else(|| BoardError::BoardNotFound(owner.to_string()))?;
        *board = apply_move(board, card_id, target_list, target_index)?;
        Ok(())
    }

    async fn persist_card_order(&self, list_id: &ListId, card_order: &[CardId]) -> Result<()> {
        self.record(
            RemoteOp::PersistCardOrder,
            RemoteCall::PersistCardOrder(list_id.clone(), card_order.to_vec()),
        )
        .await?;

        let mut boards = self.boards.lock().await;
        let board = board_with_list(&mut boards, list_id)?;
        *board = apply_card_order(board, list_id, card_order)?;
        Ok(())
    }

    async fn create_card(
        &self,
        list_id: &ListId,
        draft: &CardDraft,
        insert_index: usize,
    ) -> Result<Card> {
        self.record(
            RemoteOp::CreateCard,
            RemoteCall::CreateCard(list_id.clone(), draft.title.clone(), insert_index),
        )
        .await?;

        let mut boards = self.boards.lock().await;
        let board = board_with_list(&mut boards, list_id)?;
        let (next, card) = apply_create(board, list_id, draft, insert_index)?;
        *board = next;
        Ok(card)
    }
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
            ]))
            .with_list(List::new("l2", "Two"))
    }

    #[tokio::test]
    async fn test_persist_list_order() {
        let remote = InMemoryRemote::with_board(board()).await;
        let order = vec![ListId::from("l2"), ListId::from("l1")];

        remote.persist_list_order(&BoardId::from("b1"), &order).await.unwrap();

        let stored = remote.board(&BoardId::from("b1")).await.unwrap();
        assert_eq!(stored.list_order, order);
        assert_eq!(remote.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let remote = InMemoryRemote::with_board(board()).await;
        remote.fail_next(RemoteOp::MoveCard).await;

        let target = ListId::from("l2");
        let first = remote.move_card(&CardId::from("c1"), &target, 0).await;
        assert!(matches!(first, Err(BoardError::Remote(_))));

        // state untouched by the failed call
        let stored = remote.board(&BoardId::from("b1")).await.unwrap();
        assert!(stored.list(&target).unwrap().is_empty());

        remote.move_card(&CardId::from("c1"), &target, 0).await.unwrap();
        let stored = remote.board(&BoardId::from("b1")).await.unwrap();
        assert!(stored.list(&target).unwrap().contains(&CardId::from("c1")));
    }

    #[tokio::test]
    async fn test_move_card_rejects_list_of_other_board() {
        let remote = InMemoryRemote::with_board(board()).await;
        remote
            .insert_board(Board::new("b2", "Other").with_list(List::new("x1", "Foreign")))
            .await;

        let result = remote.move_card(&CardId::from("c1"), &ListId::from("x1"), 0).await;
        assert!(matches!(result, Err(BoardError::BoardMismatch { .. })));

        let result = remote.move_card(&CardId::from("c1"), &ListId::from("nowhere"), 0).await;
        assert!(matches!(result, Err(BoardError::ListNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_card_returns_stored_card() {
        let remote = InMemoryRemote::with_board(board()).await;
        let card = remote
            .create_card(&ListId::from("l2"), &CardDraft::new("From chat"), 0)
            .await
            .unwrap();

        let stored = remote.board(&BoardId::from("b1")).await.unwrap();
        assert_eq!(stored.card(&card.id).unwrap().title, "From chat");
        assert_eq!(
            remote.calls().await,
            vec![RemoteCall::CreateCard(ListId::from("l2"), "From chat".to_string(), 0)]
        );
    }

    #[tokio::test]
    async fn test_load_unknown_board() {
        let remote = InMemoryRemote::new();
        let result = remote.load_board(&BoardId::from("missing")).await;
        assert!(matches!(result, Err(BoardError::BoardNotFound(_))));
    }
}
