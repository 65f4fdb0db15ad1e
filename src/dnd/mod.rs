pub mod activation;
pub mod collision;
pub mod engine;
pub mod geometry;
pub mod mutator;
pub mod reconcile;
pub mod session;

pub use activation::{ActivationState, ActivationTracker, Sensor};
pub use collision::{CollisionArgs, DropTarget, Droppable};
pub use engine::DragEngine;
pub use geometry::{Point, Rect};
pub use reconcile::{DropOutcome, Settlement};
pub use session::{DragGeometry, DragItem, DragKind, DragPhase, DragSession};
