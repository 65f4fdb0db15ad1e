use crate::domain::card::Card;
use crate::domain::ids::{BoardId, CardId, ListId};
use serde::{Deserialize, Serialize};

/// An ordered column of cards
///
/// `cards` mirrors `card_order` position by position at every settle point;
/// all mutators keep the two in lockstep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: ListId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<BoardId>,
    #[serde(rename = "cardOrderIds", default)]
    pub card_order: Vec<CardId>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl List {
    pub fn new(id: impl Into<ListId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            board_id: None,
            card_order: Vec::new(),
            cards: Vec::new(),
        }
    }

    /// Appends cards in the given order, rewriting their owning list id
    pub fn with_cards(mut self, cards: impl IntoIterator<Item = Card>) -> Self {
        for card in cards {
            let len = self.cards.len();
            self.insert_card(len, card);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card_id: &CardId) -> bool {
        self.cards.iter().any(|c| &c.id == card_id)
    }

    pub fn position_of(&self, card_id: &CardId) -> Option<usize> {
        self.cards.iter().position(|c| &c.id == card_id)
    }

    pub fn card(&self, card_id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|c| &c.id == card_id)
    }

    pub fn has_placeholder(&self) -> bool {
        self.cards.iter().any(Card::is_placeholder)
    }

    /// Inserts a card at `index`, appending when the index is past the end.
    /// Returns the index actually used.
    pub fn insert_card(&mut self, index: usize, mut card: Card) -> usize {
        let index = index.min(self.cards.len());
        card.list_id = self.id.clone();
        self.card_order.insert(index, card.id.clone());
        self.cards.insert(index, card);
        index
    }

    /// Removes a card from both `cards` and `card_order`
    pub fn remove_card(&mut self, card_id: &CardId) -> Option<(usize, Card)> {
        let index = self.position_of(card_id)?;
        let card = self.cards.remove(index);
        self.card_order.retain(|id| id != card_id);
        Some((index, card))
    }

    /// Removes every placeholder; returns whether anything was removed
    pub fn strip_placeholders(&mut self) -> bool {
        if !self.has_placeholder() {
            return false;
        }
        let removed: Vec<CardId> = self
            .cards
            .iter()
            .filter(|c| c.is_placeholder())
            .map(|c| c.id.clone())
            .collect();
        self.cards.retain(|c| !c.is_placeholder());
        self.card_order.retain(|id| !removed.contains(id));
        true
    }

    /// Replaces the card order and rebuilds `cards` to match it.
    ///
    /// Ids that do not resolve to a card of this list are dropped from both.
    pub fn reorder_cards(&mut self, new_order: &[CardId]) {
        let mut remaining = std::mem::take(&mut self.cards);
        let mut cards = Vec::with_capacity(new_order.len());
        for id in new_order {
            if let Some(pos) = remaining.iter().position(|c| &c.id == id) {
                cards.push(remaining.swap_remove(pos));
            }
        }
        self.card_order = cards.iter().map(|c| c.id.clone()).collect();
        self.cards = cards;
    }

    /// Checks that `cards` mirrors `card_order` exactly
    pub fn is_consistent(&self) -> bool {
        self.cards.len() == self.card_order.len()
            && self
                .cards
                .iter()
                .zip(&self.card_order)
                .all(|(card, id)| &card.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::CardDraft;

    fn ids(list: &List) -> Vec<&str> {
        list.cards.iter().map(|c| c.id.as_str()).collect()
    }

    fn sample() -> List {
        List::new("l1", "Todo").with_cards(vec![
            Card::new("c1", "One", "x"),
            Card::new("c2", "Two", "x"),
            Card::new("c3", "Three", "x"),
        ])
    }

    #[test]
    fn test_with_cards_rewrites_list_id() {
        let list = sample();
        assert!(list.cards.iter().all(|c| c.list_id.as_str() == "l1"));
        assert!(list.is_consistent());
    }

    #[test]
    fn test_insert_clamps_to_end() {
        let mut list = sample();
        let used = list.insert_card(99, Card::new("c4", "Four", "l1"));
        assert_eq!(used, 3);
        assert_eq!(ids(&list), vec!["c1", "c2", "c3", "c4"]);
        assert!(list.is_consistent());
    }

    #[test]
    fn test_remove_card_keeps_lockstep() {
        let mut list = sample();
        let (index, card) = list.remove_card(&CardId::from("c2")).unwrap();
        assert_eq!(index, 1);
        assert_eq!(card.title, "Two");
        assert_eq!(ids(&list), vec!["c1", "c3"]);
        assert!(list.is_consistent());
        assert!(list.remove_card(&CardId::from("c2")).is_none());
    }

    #[test]
    fn test_reorder_cards_drops_unknown_ids() {
        let mut list = sample();
        list.reorder_cards(&[
            CardId::from("c3"),
            CardId::from("ghost"),
            CardId::from("c1"),
            CardId::from("c2"),
        ]);
        assert_eq!(ids(&list), vec!["c3", "c1", "c2"]);
        assert_eq!(list.card_order.len(), 3);
        assert!(list.is_consistent());
    }

    #[test]
    fn test_strip_placeholders() {
        let mut list = sample();
        let placeholder = Card::placeholder(
            CardId::from("chat-card-1"),
            &CardDraft::new("Preview"),
            ListId::from("l1"),
        );
        list.insert_card(1, placeholder);
        assert!(list.has_placeholder());

        assert!(list.strip_placeholders());
        assert_eq!(ids(&list), vec!["c1", "c2", "c3"]);
        assert!(list.is_consistent());
        assert!(!list.strip_placeholders());
    }
}
