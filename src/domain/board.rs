use crate::domain::card::Card;
use crate::domain::ids::{BoardId, CardId, ListId};
use crate::domain::list::List;
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Moves the element at `from` so that it ends up at `to`
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<()> {
    let len = items.len();
    if from >= len {
        return Err(BoardError::IndexOutOfBounds { index: from, len });
    }
    if to >= len {
        return Err(BoardError::IndexOutOfBounds { index: to, len });
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

/// Board order model: lists in board order, cards in list order.
///
/// Lists are shared behind `Arc`, so cloning a board for a rollback snapshot
/// copies one pointer per list. Every operation below leaves `self` untouched
/// and returns the next snapshot; only the lists an operation actually
/// touches are copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(rename = "listOrderIds", default)]
    pub list_order: Vec<ListId>,
    #[serde(default)]
    pub lists: Vec<Arc<List>>,
}

impl Board {
    pub fn new(id: impl Into<BoardId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            background: None,
            list_order: Vec::new(),
            lists: Vec::new(),
        }
    }

    /// Appends a list (builder form of [`Board::insert_list`])
    pub fn with_list(self, list: List) -> Self {
        self.insert_list(list)
    }

    /// Brings a board received from the read model into settled shape:
    /// lists follow `list_order`, lists without an order entry are dropped,
    /// dangling or duplicate order ids are dropped, and every list's cards
    /// follow its `card_order`.
    pub fn normalized(mut self) -> Self {
        let mut seen = HashSet::new();
        let lists = std::mem::take(&mut self.lists);
        let mut ordered = Vec::with_capacity(self.list_order.len());
        for id in &self.list_order {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(list) = lists.iter().find(|l| &l.id == id) {
                ordered.push(Arc::clone(list));
            }
        }
        self.list_order = ordered.iter().map(|l| l.id.clone()).collect();
        self.lists = ordered
            .into_iter()
            .map(|mut list| {
                if !list.is_consistent() {
                    let order = list.card_order.clone();
                    Arc::make_mut(&mut list).reorder_cards(&order);
                }
                list
            })
            .collect();
        self
    }

    pub fn list(&self, list_id: &ListId) -> Option<&List> {
        self.lists.iter().find(|l| &l.id == list_id).map(Arc::as_ref)
    }

    /// Position of a list within `list_order`
    pub fn list_index(&self, list_id: &ListId) -> Option<usize> {
        self.list_order.iter().position(|id| id == list_id)
    }

    /// Returns the list holding `card_id`
    pub fn find_list_by_card(&self, card_id: &CardId) -> Option<&List> {
        self.lists
            .iter()
            .find(|l| l.contains(card_id))
            .map(Arc::as_ref)
    }

    pub fn card(&self, card_id: &CardId) -> Option<&Card> {
        self.lists.iter().find_map(|l| l.card(card_id))
    }

    pub fn placeholder_count(&self) -> usize {
        self.lists
            .iter()
            .map(|l| l.cards.iter().filter(|c| c.is_placeholder()).count())
            .sum()
    }

    fn list_mut(&mut self, list_id: &ListId) -> Result<&mut List> {
        self.lists
            .iter_mut()
            .find(|l| &l.id == list_id)
            .map(Arc::make_mut)
            .ok_or_else(|| BoardError::ListNotFound(list_id.to_string()))
    }

    fn rebuild_lists_from_order(&mut self) {
        let lists = std::mem::take(&mut self.lists);
        self.lists = self
            .list_order
            .iter()
            .filter_map(|id| lists.iter().find(|l| &l.id == id).cloned())
            .collect();
    }

    /// Moves the list at `from_index` to `to_index`
    pub fn reorder_lists(&self, from_index: usize, to_index: usize) -> Result<Board> {
        let mut next = self.clone();
        array_move(&mut next.list_order, from_index, to_index)?;
        next.rebuild_lists_from_order();
        Ok(next)
    }

    /// Replaces the list order wholesale; `order` must be a permutation of the
    /// board's list ids.
    pub fn with_list_order(&self, order: &[ListId]) -> Result<Board> {
        let current: HashSet<&ListId> = self.list_order.iter().collect();
        let proposed: HashSet<&ListId> = order.iter().collect();
        if proposed.len() != order.len() || current != proposed {
            return Err(BoardError::InvalidOrder(format!(
                "list order for board {} is not a permutation of its lists",
                self.id
            )));
        }
        let mut next = self.clone();
        next.list_order = order.to_vec();
        next.rebuild_lists_from_order();
        Ok(next)
    }

    /// Moves a card between two different lists, inserting it at `to_index`
    /// (clamped to the end of the target list).
    pub fn move_card(
        &self,
        card_id: &CardId,
        from_list: &ListId,
        to_list: &ListId,
        to_index: usize,
    ) -> Result<Board> {
        if from_list == to_list {
            return Err(BoardError::SameListMove {
                card: card_id.to_string(),
                list: from_list.to_string(),
            });
        }
        if self.list(to_list).is_none() {
            return Err(BoardError::ListNotFound(to_list.to_string()));
        }

        let mut next = self.clone();
        let (_, card) = next
            .list_mut(from_list)?
            .remove_card(card_id)
            .ok_or_else(|| BoardError::CardNotFound(card_id.to_string()))?;
        next.list_mut(to_list)?.insert_card(to_index, card);
        Ok(next)
    }

    /// Replaces one list's card order, rebuilding its cards to match
    pub fn reorder_cards_in_list(&self, list_id: &ListId, new_order: &[CardId]) -> Result<Board> {
        let mut next = self.clone();
        next.list_mut(list_id)?.reorder_cards(new_order);
        Ok(next)
    }

    /// Appends a list to the end of the board
    pub fn insert_list(&self, mut list: List) -> Board {
        let mut next = self.clone();
        list.board_id = Some(self.id.clone());
        next.list_order.push(list.id.clone());
        next.lists.push(Arc::new(list));
        next
    }

    pub fn remove_list(&self, list_id: &ListId) -> Result<Board> {
        if self.list(list_id).is_none() {
            return Err(BoardError::ListNotFound(list_id.to_string()));
        }
        let mut next = self.clone();
        next.list_order.retain(|id| id != list_id);
        next.lists.retain(|l| &l.id != list_id);
        Ok(next)
    }

    /// Inserts a card into a list; past-the-end indices append
    pub fn insert_card(&self, list_id: &ListId, card: Card, index: usize) -> Result<Board> {
        let mut next = self.clone();
        next.list_mut(list_id)?.insert_card(index, card);
        Ok(next)
    }

    pub fn remove_card(&self, card_id: &CardId) -> Result<Board> {
        let list_id = self
            .find_list_by_card(card_id)
            .map(|l| l.id.clone())
            .ok_or_else(|| BoardError::CardNotFound(card_id.to_string()))?;
        let mut next = self.clone();
        next.list_mut(&list_id)?.remove_card(card_id);
        Ok(next)
    }

    /// Removes every placeholder from every list in one step
    pub fn strip_placeholders(&self) -> Board {
        let mut next = self.clone();
        for list in &mut next.lists {
            if list.has_placeholder() {
                Arc::make_mut(list).strip_placeholders();
            }
        }
        next
    }

    /// Swaps the placeholders for a materialized card: all placeholders are
    /// removed, then `card` is inserted into `list_id` at `index`.
    pub fn replace_placeholder(&self, list_id: &ListId, card: Card, index: usize) -> Result<Board> {
        if self.list(list_id).is_none() {
            return Err(BoardError::ListNotFound(list_id.to_string()));
        }
        self.strip_placeholders().insert_card(list_id, card, index)
    }

    /// Checks the settled-board invariants
    pub fn validate(&self) -> Result<()> {
        let order: HashSet<&ListId> = self.list_order.iter().collect();
        if order.len() != self.list_order.len() {
            return Err(BoardError::InvalidOrder(
                "list order contains duplicates".to_string(),
            ));
        }
        if self.lists.len() != self.list_order.len()
            || self
                .lists
                .iter()
                .zip(&self.list_order)
                .any(|(list, id)| &list.id != id)
        {
            return Err(BoardError::InvalidOrder(
                "lists do not follow the list order".to_string(),
            ));
        }

        let mut cards = HashSet::new();
        for list in &self.lists {
            if !list.is_consistent() {
                return Err(BoardError::InvalidOrder(format!(
                    "cards of list {} do not follow its card order",
                    list.id
                )));
            }
            for card in &list.cards {
                if card.list_id != list.id {
                    return Err(BoardError::InvalidOrder(format!(
                        "card {} is in list {} but points at {}",
                        card.id, list.id, card.list_id
                    )));
                }
                if !cards.insert(&card.id) {
                    return Err(BoardError::InvalidOrder(format!(
                        "card {} appears more than once",
                        card.id
                    )));
                }
            }
        }
        Ok(())
    }
}
