//! Maps drag geometry to the droppable container under the dragged item.

use crate::{
    dnd::{
        geometry::{Point, Rect},
        session::DragKind,
    },
    domain::{Board, CardId, ListId},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Distances closer than this are treated as equal
const TIE_EPSILON: f64 = 1e-4;

/// A container a dragged item can be dropped onto
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum DropTarget {
    List(ListId),
    Card(CardId),
}

impl DropTarget {
    pub fn id(&self) -> &str {
        match self {
            Self::List(id) => id.as_str(),
            Self::Card(id) => id.as_str(),
        }
    }
}

/// A registered droppable region
#[derive(Debug, Clone, PartialEq)]
pub struct Droppable {
    pub target: DropTarget,
    pub rect: Rect,
}

impl Droppable {
    pub fn list(id: impl Into<ListId>, rect: Rect) -> Self {
        Self {
            target: DropTarget::List(id.into()),
            rect,
        }
    }

    pub fn card(id: impl Into<CardId>, rect: Rect) -> Self {
        Self {
            target: DropTarget::Card(id.into()),
            rect,
        }
    }
}

/// Geometry snapshot for one collision pass
#[derive(Debug, Clone, Copy)]
pub struct CollisionArgs<'a> {
    /// Translated rectangle of the dragged item
    pub active_rect: Rect,
    pub pointer: Option<Point>,
    pub droppables: &'a [Droppable],
}

/// Picks the unique minimum; a tie for first place yields nothing
fn unique_nearest<'a>(
    scored: impl Iterator<Item = (f64, &'a Droppable)>,
) -> Option<&'a Droppable> {
    let mut ranked: Vec<(f64, &'a Droppable)> = scored.filter(|(d, _)| d.is_finite()).collect();
    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    match ranked.as_slice() {
        [] => None,
        [(_, only)] => Some(*only),
        [(best, first), (next, second), ..] => {
            if (next - best).abs() < TIE_EPSILON && first.target != second.target {
                tracing::debug!(
                    first = first.target.id(),
                    second = second.target.id(),
                    "collision tie, no target"
                );
                None
            } else {
                Some(*first)
            }
        }
    }
}

/// Nearest droppable by mean corner distance to `rect`
pub fn closest_corners<'a>(
    rect: &Rect,
    candidates: impl Iterator<Item = &'a Droppable>,
) -> Option<&'a Droppable> {
    unique_nearest(candidates.map(|d| (rect.corner_distance(&d.rect), d)))
}

/// Nearest droppable among those containing the pointer
pub fn pointer_within<'a>(
    pointer: &Point,
    candidates: impl Iterator<Item = &'a Droppable>,
) -> Option<&'a Droppable> {
    unique_nearest(
        candidates
            .filter(|d| d.rect.contains(pointer))
            .map(|d| (d.rect.pointer_distance(pointer), d)),
    )
}

/// Resolves the drop target for the current drag.
///
/// List drags only ever see list containers. Card drags prefer the container
/// under the pointer: an empty list is returned as is, a populated list is
/// narrowed to its nearest card. When the pointer is outside every droppable
/// the nearest container of any kind wins.
pub fn resolve(board: &Board, kind: DragKind, args: &CollisionArgs<'_>) -> Option<DropTarget> {
    match kind {
        DragKind::List => closest_corners(
            &args.active_rect,
            args.droppables
                .iter()
                .filter(|d| matches!(d.target, DropTarget::List(_))),
        )
        .map(|d| d.target.clone()),
        DragKind::Card => resolve_card(board, args),
    }
}

fn resolve_card(board: &Board, args: &CollisionArgs<'_>) -> Option<DropTarget> {
    let under_pointer = args
        .pointer
        .filter(|p| args.droppables.iter().any(|d| d.rect.contains(p)));

    // only a pointer outside every droppable falls back to corner distance;
    // a tie under the pointer means no target
    let hit = match under_pointer {
        Some(pointer) => pointer_within(&pointer, args.droppables.iter())?,
        None => {
            return closest_corners(&args.active_rect, args.droppables.iter())
                .map(|d| d.target.clone());
        }
    };

    let DropTarget::List(list_id) = &hit.target else {
        return Some(hit.target.clone());
    };
    let Some(list) = board.list(list_id) else {
        return Some(hit.target.clone());
    };

    if list.is_empty() {
        return Some(hit.target.clone());
    }

    let cards_in_list: Vec<&Droppable> = args
        .droppables
        .iter()
        .filter(|d| match &d.target {
            DropTarget::Card(card_id) => list.card_order.contains(card_id),
            DropTarget::List(_) => false,
        })
        .collect();
    if cards_in_list.is_empty() {
        return Some(hit.target.clone());
    }
    closest_corners(&args.active_rect, cards_in_list.into_iter()).map(|d| d.target.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Card, List};

    // Two columns 200px wide; l1 holds c1 and c2, l2 is empty.
    fn board() -> Board {
        Board::new("b1", "Board")
            .with_list(List::new("l1", "One").with_cards(vec![
                Card::new("c1", "1", "l1"),
                Card::new("c2", "2", "l1"),
            ]))
            .with_list(List::new("l2", "Two"))
    }

    fn droppables() -> Vec<Droppable> {
        vec![
            Droppable::list("l1", Rect::new(0.0, 0.0, 200.0, 600.0)),
            Droppable::card("c1", Rect::new(10.0, 50.0, 180.0, 60.0)),
            Droppable::card("c2", Rect::new(10.0, 120.0, 180.0, 60.0)),
            Droppable::list("l2", Rect::new(220.0, 0.0, 200.0, 600.0)),
        ]
    }

    #[test]
    fn test_list_drag_ignores_cards() {
        let droppables = droppables();
        // dragged column sits right on top of c1
        let args = CollisionArgs {
            active_rect: Rect::new(10.0, 50.0, 180.0, 60.0),
            pointer: Some(Point::new(50.0, 70.0)),
            droppables: &droppables,
        };
        assert_eq!(
            resolve(&board(), DragKind::List, &args),
            Some(DropTarget::List(ListId::from("l1")))
        );
    }

    #[test]
    fn test_list_drag_picks_nearest_column() {
        let droppables = droppables();
        let args = CollisionArgs {
            active_rect: Rect::new(200.0, 10.0, 200.0, 600.0),
            pointer: None,
            droppables: &droppables,
        };
        assert_eq!(
            resolve(&board(), DragKind::List, &args),
            Some(DropTarget::List(ListId::from("l2")))
        );
    }

    #[test]
    fn test_card_over_empty_list_returns_list() {
        let droppables = droppables();
        let args = CollisionArgs {
            active_rect: Rect::new(230.0, 300.0, 180.0, 60.0),
            pointer: Some(Point::new(300.0, 320.0)),
            droppables: &droppables,
        };
        assert_eq!(
            resolve(&board(), DragKind::Card, &args),
            Some(DropTarget::List(ListId::from("l2")))
        );
    }

    #[test]
    fn test_card_over_populated_list_narrows_to_card() {
        let droppables = droppables();
        // pointer in l1 below both cards; nearest card is c2
        let args = CollisionArgs {
            active_rect: Rect::new(10.0, 200.0, 180.0, 60.0),
            pointer: Some(Point::new(100.0, 400.0)),
            droppables: &droppables,
        };
        assert_eq!(
            resolve(&board(), DragKind::Card, &args),
            Some(DropTarget::Card(CardId::from("c2")))
        );
    }

    #[test]
    fn test_card_pointer_directly_on_card() {
        let droppables = droppables();
        let args = CollisionArgs {
            active_rect: Rect::new(10.0, 60.0, 180.0, 60.0),
            pointer: Some(Point::new(100.0, 80.0)),
            droppables: &droppables,
        };
        assert_eq!(
            resolve(&board(), DragKind::Card, &args),
            Some(DropTarget::Card(CardId::from("c1")))
        );
    }

    #[test]
    fn test_card_falls_back_to_closest_corners() {
        let droppables = droppables();
        // pointer outside every container
        let args = CollisionArgs {
            active_rect: Rect::new(225.0, 5.0, 200.0, 600.0),
            pointer: Some(Point::new(900.0, 900.0)),
            droppables: &droppables,
        };
        assert_eq!(
            resolve(&board(), DragKind::Card, &args),
            Some(DropTarget::List(ListId::from("l2")))
        );
    }

    #[test]
    fn test_tie_resolves_to_nothing() {
        let droppables = vec![
            Droppable::list("l1", Rect::new(0.0, 0.0, 100.0, 100.0)),
            Droppable::list("l2", Rect::new(200.0, 0.0, 100.0, 100.0)),
        ];
        let args = CollisionArgs {
            active_rect: Rect::new(100.0, 0.0, 100.0, 100.0),
            pointer: None,
            droppables: &droppables,
        };
        assert_eq!(resolve(&board(), DragKind::List, &args), None);
    }

    #[test]
    fn test_tie_under_pointer_does_not_fall_back() {
        let board = Board::new("b1", "Board")
            .with_list(List::new("l2", "Two"))
            .with_list(List::new("l3", "Three"));
        // overlapping empty lists, mirrored around the pointer
        let droppables = vec![
            Droppable::list("l2", Rect::new(0.0, 0.0, 100.0, 100.0)),
            Droppable::list("l3", Rect::new(50.0, 0.0, 100.0, 100.0)),
        ];
        let args = CollisionArgs {
            active_rect: Rect::new(60.0, 0.0, 100.0, 100.0),
            pointer: Some(Point::new(75.0, 50.0)),
            droppables: &droppables,
        };
        assert_eq!(resolve(&board, DragKind::Card, &args), None);
    }

    #[test]
    fn test_no_droppables_resolves_to_nothing() {
        let args = CollisionArgs {
            active_rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            pointer: Some(Point::new(5.0, 5.0)),
            droppables: &[],
        };
        assert_eq!(resolve(&board(), DragKind::Card, &args), None);
        assert_eq!(resolve(&board(), DragKind::List, &args), None);
    }

    #[test]
    fn test_drop_target_serializes_tagged() {
        let json = serde_json::to_string(&DropTarget::Card(CardId::from("c1"))).unwrap();
        assert_eq!(json, r#"{"type":"card","id":"c1"}"#);
    }
}
