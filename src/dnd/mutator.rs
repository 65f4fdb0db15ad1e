//! Speculative board updates applied while a drag is in progress.

use crate::{
    dnd::{
        collision::DropTarget,
        session::{CardDrag, DragGeometry, DragSession, ExternalCardDrag, ListDrag},
    },
    domain::{Board, Card, List, ListId},
};
use tracing::debug;

/// List that a drop target belongs to
pub fn target_list<'a>(board: &'a Board, over: &DropTarget) -> Option<&'a List> {
    match over {
        DropTarget::List(list_id) => board.list(list_id),
        DropTarget::Card(card_id) => board.find_list_by_card(card_id),
    }
}

/// Insertion index within `list` for a drop on `over`.
///
/// Dropping on the list itself appends. Dropping on a card takes that card's
/// slot, or the one after it when the dragged item is past the card's
/// vertical midpoint.
pub fn insertion_index(list: &List, over: &DropTarget, geometry: &DragGeometry) -> usize {
    match over {
        DropTarget::List(_) => list.len(),
        DropTarget::Card(card_id) => match list.position_of(card_id) {
            Some(index) if geometry.is_below_over() => index + 1,
            Some(index) => index,
            None => list.len(),
        },
    }
}

/// Computes the board for one drag-over event; `None` means no change
pub fn apply_drag_over(
    board: &Board,
    session: &DragSession,
    over: Option<&DropTarget>,
    geometry: &DragGeometry,
) -> Option<Board> {
    match session {
        DragSession::List(drag) => over.and_then(|over| reorder_list(board, drag, over)),
        DragSession::Card(drag) => over.and_then(|over| move_card_across(board, drag, over, geometry)),
        DragSession::External(drag) => place_placeholder(board, drag, over, geometry),
    }
}

fn reorder_list(board: &Board, drag: &ListDrag, over: &DropTarget) -> Option<Board> {
    let DropTarget::List(over_id) = over else {
        return None;
    };
    let from = board.list_index(&drag.list_id)?;
    let to = board.list_index(over_id)?;
    if from == to {
        return None;
    }

    debug!(list = %drag.list_id, from, to, "speculative list reorder");
    board.reorder_lists(from, to).ok()
}

fn move_card_across(
    board: &Board,
    drag: &CardDrag,
    over: &DropTarget,
    geometry: &DragGeometry,
) -> Option<Board> {
    let current = board.find_list_by_card(&drag.card_id)?;
    let target = target_list(board, over)?;

    // same-list reorders are settled once, at drag end
    if current.id == target.id {
        return None;
    }

    let index = insertion_index(target, over, geometry);
    debug!(card = %drag.card_id, from = %current.id, to = %target.id, index, "speculative card move");
    board
        .move_card(&drag.card_id, &current.id, &target.id, index)
        .ok()
}

fn place_placeholder(
    board: &Board,
    drag: &ExternalCardDrag,
    over: Option<&DropTarget>,
    geometry: &DragGeometry,
) -> Option<Board> {
    let Some(over) = over else {
        // left every valid target
        return (board.placeholder_count() > 0).then(|| board.strip_placeholders());
    };

    if matches!(over, DropTarget::Card(id) if id == &drag.placeholder_id) {
        return None;
    }

    let target_id: ListId = target_list(board, over)?.id.clone();
    let cleaned = board.strip_placeholders();
    let target = cleaned.list(&target_id)?;
    let index = insertion_index(target, over, geometry).min(target.len());

    let current = board
        .find_list_by_card(&drag.placeholder_id)
        .and_then(|l| l.position_of(&drag.placeholder_id).map(|i| (l.id.clone(), i)));
    if current.as_ref() == Some(&(target_id.clone(), index)) && board.placeholder_count() == 1 {
        return None;
    }

    debug!(placeholder = %drag.placeholder_id, list = %target_id, index, "placing placeholder");
    let placeholder = Card::placeholder(drag.placeholder_id.clone(), &drag.draft, target_id.clone());
    cleaned.insert_card(&target_id, placeholder, index).ok()
}
