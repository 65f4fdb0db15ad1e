use crate::domain::ids::{CardId, ListId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task card belonging to exactly one list
///
/// Only `id` and `list_id` matter to ordering; the remaining attributes are
/// carried through moves untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub list_id: ListId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    /// Transient preview entry; never persisted
    #[serde(skip)]
    pub placeholder: bool,
}

impl Card {
    pub fn new(id: impl Into<CardId>, title: impl Into<String>, list_id: impl Into<ListId>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            list_id: list_id.into(),
            description: None,
            cover: None,
            labels: Vec::new(),
            start_date: None,
            due_date: None,
            completed: false,
            placeholder: false,
        }
    }

    /// Builds a non-persistent preview card from an external drag payload
    pub fn placeholder(id: CardId, draft: &CardDraft, list_id: ListId) -> Self {
        let mut card = draft.to_card(id, list_id);
        card.placeholder = true;
        card
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Card data carried by a drag that originates outside the board
/// (e.g. a card shared as a chat attachment)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl CardDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Materializes the draft as an (incomplete) card
    pub fn to_card(&self, id: CardId, list_id: ListId) -> Card {
        Card {
            id,
            title: self.title.clone(),
            list_id,
            description: self.description.clone(),
            cover: self.cover.clone(),
            labels: self.labels.clone(),
            start_date: self.start_date,
            due_date: self.due_date,
            completed: false,
            placeholder: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_carries_preview_data() {
        let mut draft = CardDraft::new("Write report");
        draft.labels.push("urgent".to_string());

        let card = Card::placeholder(CardId::from("chat-card-1"), &draft, ListId::from("l1"));

        assert!(card.is_placeholder());
        assert_eq!(card.title, "Write report");
        assert_eq!(card.labels, vec!["urgent".to_string()]);
        assert_eq!(card.list_id.as_str(), "l1");
    }

    #[test]
    fn test_draft_materializes_incomplete() {
        let draft = CardDraft::new("Task");
        let card = draft.to_card(CardId::from("c1"), ListId::from("l1"));
        assert!(!card.completed);
        assert!(!card.is_placeholder());
    }

    #[test]
    fn test_placeholder_flag_is_not_serialized() {
        let card = Card::placeholder(
            CardId::from("chat-card-1"),
            &CardDraft::new("Preview"),
            ListId::from("l1"),
        );
        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("placeholder"));

        let back: Card = serde_json::from_str(&json).unwrap();
        assert!(!back.is_placeholder());
    }

    #[test]
    fn test_card_deserializes_with_missing_optional_fields() {
        let json = r#"{"id":"c1","title":"Old","listId":"l1"}"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.id.as_str(), "c1");
        assert!(card.labels.is_empty());
        assert!(card.due_date.is_none());
    }
}
