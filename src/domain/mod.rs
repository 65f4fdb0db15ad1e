pub mod board;
pub mod card;
pub mod ids;
pub mod list;

pub use board::{array_move, Board};
pub use card::{Card, CardDraft};
pub use ids::{BoardId, CardId, ListId};
pub use list::List;
