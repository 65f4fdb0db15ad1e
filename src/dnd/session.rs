use crate::{
    config::EngineConfig,
    dnd::geometry::Rect,
    domain::{Board, CardDraft, CardId, ListId},
    error::{BoardError, Result},
};

/// What kind of container is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    List,
    Card,
}

/// The item handed over by the UI layer when a drag starts
#[derive(Debug, Clone, PartialEq)]
pub enum DragItem {
    List(ListId),
    Card(CardId),
    /// A card dragged in from outside the board, e.g. a chat attachment.
    /// `source_id` identifies it in its origin and keys the placeholder id.
    External { source_id: String, draft: CardDraft },
}

impl DragItem {
    pub fn kind(&self) -> DragKind {
        match self {
            Self::List(_) => DragKind::List,
            Self::Card(_) | Self::External { .. } => DragKind::Card,
        }
    }
}

/// Drag state machine: `Idle -> Dragging -> {Committing, RollingBack} -> Idle`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    Committing,
    RollingBack,
}

#[derive(Debug, Clone)]
pub struct ListDrag {
    pub list_id: ListId,
    pub from_index: usize,
    pub snapshot: Board,
}

#[derive(Debug, Clone)]
pub struct CardDrag {
    pub card_id: CardId,
    pub source_list: ListId,
    pub source_index: usize,
    pub snapshot: Board,
}

#[derive(Debug, Clone)]
pub struct ExternalCardDrag {
    pub placeholder_id: CardId,
    pub draft: CardDraft,
    pub snapshot: Board,
}

/// An in-flight drag together with the board snapshot taken when it started
#[derive(Debug, Clone)]
pub enum DragSession {
    List(ListDrag),
    Card(CardDrag),
    External(ExternalCardDrag),
}

impl DragSession {
    /// Captures the drag origin and a rollback snapshot of `board`
    pub fn start(board: &Board, item: DragItem, config: &EngineConfig) -> Result<Self> {
        let snapshot = board.clone();
        match item {
            DragItem::List(list_id) => {
                let from_index = board
                    .list_index(&list_id)
                    .ok_or_else(|| BoardError::ListNotFound(list_id.to_string()))?;
                Ok(Self::List(ListDrag {
                    list_id,
                    from_index,
                    snapshot,
                }))
            }
            DragItem::Card(card_id) => {
                let list = board
                    .find_list_by_card(&card_id)
                    .ok_or_else(|| BoardError::CardNotFound(card_id.to_string()))?;
                let source_index = list.position_of(&card_id).unwrap_or_default();
                Ok(Self::Card(CardDrag {
                    source_list: list.id.clone(),
                    card_id,
                    source_index,
                    snapshot,
                }))
            }
            DragItem::External { source_id, draft } => Ok(Self::External(ExternalCardDrag {
                placeholder_id: CardId::placeholder(&config.placeholder_prefix, &source_id),
                draft,
                snapshot: snapshot.strip_placeholders(),
            })),
        }
    }

    pub fn kind(&self) -> DragKind {
        match self {
            Self::List(_) => DragKind::List,
            Self::Card(_) | Self::External(_) => DragKind::Card,
        }
    }

    /// Id of the dragged item as the UI layer knows it
    pub fn active_id(&self) -> &str {
        match self {
            Self::List(drag) => drag.list_id.as_str(),
            Self::Card(drag) => drag.card_id.as_str(),
            Self::External(drag) => drag.placeholder_id.as_str(),
        }
    }

    pub fn is_active(&self, active_id: &str) -> bool {
        self.active_id() == active_id
    }

    pub fn snapshot(&self) -> &Board {
        match self {
            Self::List(drag) => &drag.snapshot,
            Self::Card(drag) => &drag.snapshot,
            Self::External(drag) => &drag.snapshot,
        }
    }

    pub fn into_snapshot(self) -> Board {
        match self {
            Self::List(drag) => drag.snapshot,
            Self::Card(drag) => drag.snapshot,
            Self::External(drag) => drag.snapshot,
        }
    }
}

/// Geometry reported with a drag-over event
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragGeometry {
    /// Translated rectangle of the dragged item
    pub active_rect: Option<Rect>,
    /// Rectangle of the container currently under the item
    pub over_rect: Option<Rect>,
}

impl DragGeometry {
    pub fn new(active_rect: Rect, over_rect: Rect) -> Self {
        Self {
            active_rect: Some(active_rect),
            over_rect: Some(over_rect),
        }
    }

    /// Whether the dragged item's top edge is past the vertical midpoint of
    /// the container it is over
    pub fn is_below_over(&self) -> bool {
        match (self.active_rect, self.over_rect) {
            (Some(active), Some(over)) => active.top > over.mid_y(),
            _ => false,
        }
    }
}
