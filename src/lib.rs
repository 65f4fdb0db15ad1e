//! # Taskboard Core
//!
//! Drag-and-drop ordering engine for kanban task boards.
//!
//! Lists and cards are reordered optimistically while a drag is in flight,
//! then reconciled with a remote order-of-record when it ends: confirmed on
//! success, rolled back to the drag-start snapshot on failure. Cards dragged
//! in from outside the board are shown as placeholders until the remote
//! service materializes them.
//!
//! The crate has no dependency on a particular UI toolkit. Hosts feed
//! [`DragEngine`] the drag events and droppable geometry they observe and
//! render whatever [`Board`] it holds afterwards.

pub mod config;
pub mod dnd;
pub mod domain;
pub mod error;
pub mod notify;
pub mod remote;

// Re-export commonly used types
pub use config::{ActivationConfig, EngineConfig};
pub use dnd::{
    CollisionArgs, DragEngine, DragGeometry, DragItem, DragPhase, DropOutcome, DropTarget,
    Droppable, Point, Rect,
};
pub use domain::{Board, BoardId, Card, CardDraft, CardId, List, ListId};
pub use error::{BoardError, Result};
pub use notify::{Notification, NotificationLevel};
#[cfg(feature = "file-remote")]
pub use remote::file::FileRemote;
pub use remote::{memory::InMemoryRemote, RemoteBoardService};
