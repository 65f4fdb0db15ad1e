use crate::{
    domain::{Board, BoardId, Card, CardDraft, CardId, ListId},
    error::{BoardError, Result},
    remote::{apply_card_order, apply_create, apply_move, RemoteBoardService},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based order-of-record: one JSON document per board
pub struct FileRemote {
    root_path: PathBuf,
}

impl FileRemote {
    const ROOT_DIR: &'static str = ".taskboard";
    const BOARDS_DIR: &'static str = "boards";

    /// Creates a FileRemote rooted at the given project directory
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::ROOT_DIR),
        }
    }

    fn boards_dir(&self) -> PathBuf {
        self.root_path.join(Self::BOARDS_DIR)
    }

    fn board_file(&self, id: &BoardId) -> PathBuf {
        self.boards_dir().join(format!("{}.json", id.as_str()))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Creates the directory layout
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.boards_dir()).await
    }

    pub async fn is_initialized(&self) -> bool {
        self.boards_dir().exists()
    }

    /// Writes a board document; placeholders are never persisted
    pub async fn save_board(&self, board: &Board) -> Result<()> {
        self.ensure_directory_exists(&self.boards_dir()).await?;

        let board = board.strip_placeholders();
        let json = serde_json::to_string_pretty(&board)?;
        fs::write(self.board_file(&board.id), json).await?;
        Ok(())
    }

    async fn read_board(&self, id: &BoardId) -> Result<Board> {
        let file_path = self.board_file(id);

        if !file_path.exists() {
            return Err(BoardError::BoardNotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&file_path).await?;
        let board: Board = serde_json::from_str(&contents)?;
        Ok(board.normalized())
    }

    /// Lists the ids of all stored boards
    pub async fn list_board_ids(&self) -> Result<Vec<BoardId>> {
        let boards_dir = self.boards_dir();

        if !boards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&boards_dir).await?;
        let mut ids: Vec<BoardId> = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(BoardId::from(stem));
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    async fn find_board(&self, matches: impl Fn(&Board) -> bool) -> Result<Option<Board>> {
        for id in self.list_board_ids().await? {
            let board = self.read_board(&id).await?;
            if matches(&board) {
                return Ok(Some(board));
            }
        }
        Ok(None)
    }

    async fn board_with_list(&self, list_id: &ListId) -> Result<Board> {
        self.find_board(|b| b.list(list_id).is_some())
            .await?
            .ok_or_else(|| BoardError::ListNotFound(list_id.to_string()))
    }
}

#[async_trait]
impl RemoteBoardService for FileRemote {
    async fn load_board(&self, board_id: &BoardId) -> Result<Board> {
        self.read_board(board_id).await
    }

    async fn persist_list_order(&self, board_id: &BoardId, list_order: &[ListId]) -> Result<()> {
        let board = self.read_board(board_id).await?;
        self.save_board(&board.with_list_order(list_order)?).await
    }

    async fn move_card(
        &self,
        card_id: &CardId,
        target_list: &ListId,
        target_index: usize,
    ) -> Result<()> {
        let board = self
            .find_board(|b| b.card(card_id).is_some())
            .await?
            .ok_or_else(|| BoardError::CardNotFound(card_id.to_string()))?;

        if board.list(target_list).is_none() {
            return match self.find_board(|b| b.list(target_list).is_some()).await? {
                Some(other) => Err(BoardError::BoardMismatch {
                    list: target_list.to_string(),
                    expected: board.id.to_string(),
                    actual: other.id.to_string(),
                }),
                None => Err(BoardError::ListNotFound(target_list.to_string())),
            };
        }

        let next = apply_move(&board, card_id, target_list, target_index)?;
        self.save_board(&next).await
    }

    async fn persist_card_order(&self, list_id: &ListId, card_order: &[CardId]) -> Result<()> {
        let board = self.board_with_list(list_id).await?;
        let next = apply_card_order(&board, list_id, card_order)?;
        self.save_board(&next).await
    }

    async fn create_card(
        &self,
        list_id: &ListId,
        draft: &CardDraft,
        insert_index: usize,
    ) -> Result<Card> {
        let board = self.board_with_list(list_id).await?;
        let (next, card) = apply_create(&board, list_id, draft, insert_index)?;
        self.save_board(&next).await?;
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::List;
    use tempfile::TempDir;

    fn board() -> Board {
        Board::new("b1", "Board")
            .with_list(List::new("l1", "One").with_cards(vec![
                Card::new("c1", "1", "l1"),
                Card::new("c2", "2", "l1"),
            ]))
            .with_list(List::new("l2", "Two"))
    }

    async fn remote(temp_dir: &TempDir) -> FileRemote {
        let remote = FileRemote::new(temp_dir.path());
        remote.initialize().await.unwrap();
        remote.save_board(&board()).await.unwrap();
        remote
    }

    #[tokio::test]
    async fn test_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let remote = FileRemote::new(temp_dir.path());

        assert!(!remote.is_initialized().await);
        remote.initialize().await.unwrap();
        assert!(remote.is_initialized().await);
        assert!(remote.list_board_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_board_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let remote = remote(&temp_dir).await;

        let loaded = remote.load_board(&BoardId::from("b1")).await.unwrap();
        assert_eq!(loaded, board());
        assert_eq!(remote.list_board_ids().await.unwrap(), vec![BoardId::from("b1")]);
    }

    #[tokio::test]
    async fn test_load_missing_board() {
        let temp_dir = TempDir::new().unwrap();
        let remote = remote(&temp_dir).await;

        let result = remote.load_board(&BoardId::from("nope")).await;
        assert!(matches!(result, Err(BoardError::BoardNotFound(_))));
    }

    #[tokio::test]
    async fn test_persist_list_order() {
        let temp_dir = TempDir::new().unwrap();
        let remote = remote(&temp_dir).await;
        let order = vec![ListId::from("l2"), ListId::from("l1")];

        remote.persist_list_order(&BoardId::from("b1"), &order).await.unwrap();

        let loaded = remote.load_board(&BoardId::from("b1")).await.unwrap();
        assert_eq!(loaded.list_order, order);
        assert_eq!(loaded.lists[0].id.as_str(), "l2");
    }

    #[tokio::test]
    async fn test_move_card_and_persist_card_order() {
        let temp_dir = TempDir::new().unwrap();
        let remote = remote(&temp_dir).await;

        remote
            .move_card(&CardId::from("c1"), &ListId::from("l2"), 5)
            .await
            .unwrap();
        let loaded = remote.load_board(&BoardId::from("b1")).await.unwrap();
        assert_eq!(loaded.find_list_by_card(&CardId::from("c1")).unwrap().id.as_str(), "l2");

        remote
            .move_card(&CardId::from("c1"), &ListId::from("l1"), 0)
            .await
            .unwrap();
        remote
            .persist_card_order(&ListId::from("l1"), &[CardId::from("c2"), CardId::from("c1")])
            .await
            .unwrap();
        let loaded = remote.load_board(&BoardId::from("b1")).await.unwrap();
        assert_eq!(
            loaded.list(&ListId::from("l1")).unwrap().card_order,
            vec![CardId::from("c2"), CardId::from("c1")]
        );
    }

    #[tokio::test]
    async fn test_move_card_to_other_board_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let remote = remote(&temp_dir).await;
        remote
            .save_board(&Board::new("b2", "Other").with_list(List::new("x1", "Foreign")))
            .await
            .unwrap();

        let result = remote.move_card(&CardId::from("c1"), &ListId::from("x1"), 0).await;
        assert!(matches!(result, Err(BoardError::BoardMismatch { .. })));
    }

    #[tokio::test]
    async fn test_create_card_never_persists_placeholders() {
        let temp_dir = TempDir::new().unwrap();
        let remote = remote(&temp_dir).await;

        let draft = CardDraft::new("Preview");
        let with_placeholder = board()
            .insert_card(
                &ListId::from("l2"),
                Card::placeholder(CardId::from("chat-card-1"), &draft, ListId::from("l2")),
                0,
            )
            .unwrap();
        remote.save_board(&with_placeholder).await.unwrap();

        let card = remote.create_card(&ListId::from("l2"), &draft, 0).await.unwrap();
        let loaded = remote.load_board(&BoardId::from("b1")).await.unwrap();
        assert_eq!(loaded.placeholder_count(), 0);
        assert_eq!(loaded.list(&ListId::from("l2")).unwrap().card_order, vec![card.id]);
    }
}
