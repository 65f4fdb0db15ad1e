//! Confirms or reverts the speculative board state once a drag ends.

use crate::{
    config::EngineConfig,
    dnd::{
        collision::DropTarget,
        mutator::{insertion_index, target_list},
        session::{CardDrag, DragGeometry, DragSession, ExternalCardDrag, ListDrag},
    },
    domain::{array_move, Board, Card, CardId, ListId},
    error::BoardError,
    notify::Notification,
    remote::RemoteBoardService,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How a finished drag was settled
#[derive(Debug)]
pub enum DropOutcome {
    /// No session matched the event
    Ignored,
    /// Dropped outside any valid target; the drag-start state was restored
    RolledBack,
    /// The drag ended where it started; nothing was persisted
    Unchanged,
    ListsReordered { list_order: Vec<ListId> },
    CardMoved { card_id: CardId, list_id: ListId, index: usize },
    CardsReordered { list_id: ListId, card_order: Vec<CardId> },
    CardCreated { card: Card, index: usize },
    /// The order-of-record rejected the change
    Failed { error: BoardError, rolled_back: bool },
}

impl DropOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of reconciliation: the board to show next and what happened
#[derive(Debug)]
pub struct Settlement {
    pub board: Board,
    pub outcome: DropOutcome,
    pub notification: Option<Notification>,
}

impl Settlement {
    fn quiet(board: Board, outcome: DropOutcome) -> Self {
        Self {
            board,
            outcome,
            notification: None,
        }
    }
}

pub struct Reconciler<'a, R: ?Sized> {
    remote: &'a R,
    config: &'a EngineConfig,
}

impl<'a, R> Reconciler<'a, R>
where
    R: RemoteBoardService + ?Sized,
{
    pub fn new(remote: &'a R, config: &'a EngineConfig) -> Self {
        Self { remote, config }
    }

    fn ttl(&self) -> Duration {
        Duration::from_millis(self.config.notification_ttl_ms)
    }

    fn success(&self, message: &str) -> Option<Notification> {
        Some(Notification::success(message, self.ttl()))
    }

    fn error(&self, message: &str) -> Option<Notification> {
        Some(Notification::error(message, self.ttl()))
    }

    /// Settles a drag that ended over `over` with `board` as the speculative state
    pub async fn settle(
        &self,
        session: DragSession,
        board: Board,
        over: Option<&DropTarget>,
    ) -> Settlement {
        match session {
            DragSession::List(drag) => self.settle_list(drag, board, over).await,
            DragSession::Card(drag) => self.settle_card(drag, board, over).await,
            DragSession::External(drag) => self.settle_external(drag, board, over).await,
        }
    }

    async fn settle_list(&self, drag: ListDrag, board: Board, over: Option<&DropTarget>) -> Settlement {
        if over.is_none() {
            debug!(list = %drag.list_id, "list dropped outside any target, rolling back");
            return Settlement::quiet(drag.snapshot, DropOutcome::RolledBack);
        }

        let current = board.list_index(&drag.list_id);
        if current.is_none() || current == Some(drag.from_index) {
            debug!(list = %drag.list_id, "list position unchanged, skipping persistence");
            return Settlement::quiet(drag.snapshot, DropOutcome::Unchanged);
        }

        match self
            .remote
            .persist_list_order(&board.id, &board.list_order)
            .await
        {
            Ok(()) => {
                info!(board = %board.id, list = %drag.list_id, "list order saved");
                let list_order = board.list_order.clone();
                Settlement {
                    board,
                    outcome: DropOutcome::ListsReordered { list_order },
                    notification: self.success("List order saved"),
                }
            }
            Err(error) => {
                warn!(board = %board.id, %error, "failed to save list order, rolling back");
                Settlement {
                    board: drag.snapshot,
                    outcome: DropOutcome::Failed {
                        error,
                        rolled_back: true,
                    },
                    notification: self.error("Failed to save list order"),
                }
            }
        }
    }

    async fn settle_card(&self, drag: CardDrag, board: Board, over: Option<&DropTarget>) -> Settlement {
        let Some(over) = over else {
            debug!(card = %drag.card_id, "card dropped outside any target, rolling back");
            return Settlement::quiet(drag.snapshot, DropOutcome::RolledBack);
        };

        let (Some(current), Some(target)) = (
            board.find_list_by_card(&drag.card_id).map(|l| l.id.clone()),
            target_list(&board, over).map(|l| l.id.clone()),
        ) else {
            debug!(card = %drag.card_id, over = over.id(), "drop target vanished, rolling back");
            return Settlement::quiet(drag.snapshot, DropOutcome::RolledBack);
        };

        // a drop that skipped the final drag-over still lands in the target list
        let board = if current != target {
            let moved = board.list(&target).and_then(|list| {
                let index = insertion_index(list, over, &DragGeometry::default());
                board.move_card(&drag.card_id, &current, &target, index).ok()
            });
            match moved {
                Some(moved) => moved,
                None => return Settlement::quiet(drag.snapshot, DropOutcome::RolledBack),
            }
        } else {
            board
        };

        if target != drag.source_list {
            self.persist_cross_list(drag, board, target).await
        } else {
            self.persist_same_list(drag, board, target, over).await
        }
    }

    async fn persist_cross_list(&self, drag: CardDrag, board: Board, target: ListId) -> Settlement {
        let index = board
            .list(&target)
            .and_then(|l| l.position_of(&drag.card_id))
            .unwrap_or_default();

        match self.remote.move_card(&drag.card_id, &target, index).await {
            Ok(()) => {
                info!(card = %drag.card_id, list = %target, index, "card moved");
                Settlement {
                    board,
                    outcome: DropOutcome::CardMoved {
                        card_id: drag.card_id,
                        list_id: target,
                        index,
                    },
                    notification: self.success("Card moved"),
                }
            }
            Err(error) => {
                let rolled_back = self.config.rollback_cross_list_on_failure;
                warn!(card = %drag.card_id, %error, rolled_back, "failed to move card");
                Settlement {
                    board: if rolled_back { drag.snapshot } else { board },
                    outcome: DropOutcome::Failed { error, rolled_back },
                    notification: self.error("Failed to move card"),
                }
            }
        }
    }

    async fn persist_same_list(
        &self,
        drag: CardDrag,
        board: Board,
        list_id: ListId,
        over: &DropTarget,
    ) -> Settlement {
        let Some(list) = board.list(&list_id) else {
            return Settlement::quiet(drag.snapshot, DropOutcome::RolledBack);
        };
        let Some(old_index) = list.position_of(&drag.card_id) else {
            return Settlement::quiet(drag.snapshot, DropOutcome::RolledBack);
        };
        let new_index = match over {
            DropTarget::Card(card_id) => list.position_of(card_id).unwrap_or(old_index),
            DropTarget::List(_) => list.len() - 1,
        };

        // diffed against the drag-start slot; the card may have left and
        // re-entered the list mid-drag
        if new_index == drag.source_index {
            debug!(card = %drag.card_id, "card position unchanged, skipping persistence");
            return Settlement::quiet(drag.snapshot, DropOutcome::Unchanged);
        }

        let mut card_order = list.card_order.clone();
        if array_move(&mut card_order, old_index, new_index).is_err() {
            return Settlement::quiet(drag.snapshot, DropOutcome::RolledBack);
        }

        let board = match board.reorder_cards_in_list(&list_id, &card_order) {
            Ok(board) => board,
            Err(_) => return Settlement::quiet(drag.snapshot, DropOutcome::RolledBack),
        };

        match self.remote.persist_card_order(&list_id, &card_order).await {
            Ok(()) => {
                info!(list = %list_id, card = %drag.card_id, "card order saved");
                Settlement {
                    board,
                    outcome: DropOutcome::CardsReordered { list_id, card_order },
                    notification: self.success("Card reordered"),
                }
            }
            Err(error) => {
                warn!(list = %list_id, %error, "failed to save card order, rolling back");
                Settlement {
                    board: drag.snapshot,
                    outcome: DropOutcome::Failed {
                        error,
                        rolled_back: true,
                    },
                    notification: self.error("Failed to reorder card"),
                }
            }
        }
    }

    async fn settle_external(
        &self,
        drag: ExternalCardDrag,
        board: Board,
        over: Option<&DropTarget>,
    ) -> Settlement {
        let cleaned = board.strip_placeholders();

        let target = over.and_then(|over| target_list(&board, over).map(|l| (l, over)));
        let Some((list, over)) = target else {
            debug!(placeholder = %drag.placeholder_id, "external card dropped outside any target");
            return Settlement::quiet(cleaned, DropOutcome::RolledBack);
        };

        let list_id = list.id.clone();
        let index = match list.position_of(&drag.placeholder_id) {
            Some(index) => index,
            None => cleaned
                .list(&list_id)
                .map(|l| insertion_index(l, over, &DragGeometry::default()))
                .unwrap_or_default(),
        };

        match self.remote.create_card(&list_id, &drag.draft, index).await {
            Ok(card) => {
                info!(card = %card.id, list = %list_id, index, "external card materialized");
                let board = cleaned
                    .replace_placeholder(&list_id, card.clone(), index)
                    .unwrap_or(cleaned);
                Settlement {
                    board,
                    outcome: DropOutcome::CardCreated { card, index },
                    notification: self.success("Card copied to board"),
                }
            }
            Err(error) => {
                warn!(list = %list_id, %error, "failed to materialize external card");
                Settlement {
                    board: cleaned,
                    outcome: DropOutcome::Failed {
                        error,
                        rolled_back: true,
                    },
                    notification: self.error("Failed to copy card"),
                }
            }
        }
    }
}
