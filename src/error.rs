use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("No board is loaded")]
    BoardNotLoaded,

    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Card {card} cannot be moved within list {list}; use a same-list reorder")]
    SameListMove { card: String, list: String },

    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("List {list} belongs to board {actual}, not {expected}")]
    BoardMismatch {
        list: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("A drag is already in progress")]
    DragInProgress,

    #[error("Remote error: {0}")]
    Remote(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
