use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Root aggregate: one board per session, holding lists in display order.
///
/// The serialized shape is the persistence contract: a stored snapshot is
/// exactly this tree as JSON, under the single storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub title: String,
    pub lists: Vec<List>,
}

/// Named ordered container of cards within a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub title: String,
    pub cards: Vec<Card>,
    /// Cached position among siblings. Equals the index in `Board.lists`
    /// after every completed mutation; the reducer renumbers it.
    pub order: usize,
}

/// A task unit owned by exactly one list at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    /// Back-reference to the owning list. Kept consistent by the reducer
    /// (moving a card is exclusively the reorder operation's job).
    #[serde(rename = "listId")]
    pub list_id: String,
    /// Cached position within the owning list's `cards`.
    pub order: usize,
    pub comments: Vec<Comment>,
}

/// Immutable timestamped text attached to a card. Append-only per card;
/// nothing in this crate edits or removes one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl List {
    /// Creates an empty list with the placeholder title the UI expects.
    /// `order` starts at 0; the reducer assigns the real position on insert.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: "New List".to_string(),
            cards: Vec::new(),
            order: 0,
        }
    }

    /// Returns the position of a card in this list, if present.
    pub fn card_index(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|card| card.id == card_id)
    }
}

impl Card {
    /// Creates an empty card owned by the given list. Titles start empty so
    /// the UI can drop straight into edit mode.
    pub fn new(id: impl Into<String>, list_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            list_id: list_id.into(),
            order: 0,
            comments: Vec::new(),
        }
    }
}

impl Comment {
    /// Creates a comment stamped with the current time.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

impl Board {
    /// Finds a list by id.
    pub fn find_list(&self, list_id: &str) -> Option<&List> {
        self.lists.iter().find(|list| list.id == list_id)
    }

    /// Returns the position of a list in the board, if present.
    pub fn list_index(&self, list_id: &str) -> Option<usize> {
        self.lists.iter().position(|list| list.id == list_id)
    }

    /// Finds a card by id, searched across all lists.
    pub fn find_card(&self, card_id: &str) -> Option<&Card> {
        self.lists
            .iter()
            .flat_map(|list| list.cards.iter())
            .find(|card| card.id == card_id)
    }

    /// Finds the list that owns a card, resolved through the card's live
    /// `list_id` back-reference.
    pub fn find_card_list(&self, card_id: &str) -> Option<&List> {
        self.find_card(card_id)
            .and_then(|card| self.find_list(&card.list_id))
    }

    /// Total number of cards across all lists.
    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|list| list.cards.len()).sum()
    }

    /// Verifies the structural invariants that must hold after every
    /// completed mutation: `order` fields match array positions, each card's
    /// `list_id` names the list containing it, and ids are unique within
    /// their entity class. Reports the first violation in plain words.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let mut list_ids: HashSet<&str> = HashSet::new();
        let mut card_ids: HashSet<&str> = HashSet::new();
        let mut comment_ids: HashSet<&str> = HashSet::new();

        for (index, list) in self.lists.iter().enumerate() {
            if list.order != index {
                return Err(format!(
                    "list {} has order {} but sits at index {}",
                    list.id, list.order, index
                ));
            }
            if !list_ids.insert(&list.id) {
                return Err(format!("duplicate list id {}", list.id));
            }
            for (position, card) in list.cards.iter().enumerate() {
                if card.order != position {
                    return Err(format!(
                        "card {} has order {} but sits at index {} of list {}",
                        card.id, card.order, position, list.id
                    ));
                }
                if card.list_id != list.id {
                    return Err(format!(
                        "card {} is held by list {} but points at list {}",
                        card.id, list.id, card.list_id
                    ));
                }
                if !card_ids.insert(&card.id) {
                    return Err(format!("duplicate card id {}", card.id));
                }
                for comment in &card.comments {
                    if !comment_ids.insert(&comment.id) {
                        return Err(format!("duplicate comment id {}", comment.id));
                    }
                }
            }
        }
        Ok(())
    }

    /// The seeded demo board used whenever no valid snapshot exists: three
    /// lists with four sample cards and two sample comments, timestamped
    /// relative to now.
    pub fn seeded() -> Self {
        let comment = |id: &str, text: &str, age: Duration| Comment {
            id: id.to_string(),
            text: text.to_string(),
            created_at: Utc::now() - age,
        };
        let card = |id: &str, title: &str, list_id: &str, order: usize, comments: Vec<Comment>| {
            Card {
                id: id.to_string(),
                title: title.to_string(),
                list_id: list_id.to_string(),
                order,
                comments,
            }
        };

        Self {
            id: "board-1".to_string(),
            title: "Demo Board".to_string(),
            lists: vec![
                List {
                    id: "list-1".to_string(),
                    title: "To Do".to_string(),
                    order: 0,
                    cards: vec![
                        card(
                            "card-1",
                            "Plan project structure",
                            "list-1",
                            0,
                            vec![comment(
                                "comment-1",
                                "Need to define the main components and their relationships",
                                Duration::days(1),
                            )],
                        ),
                        card("card-2", "Set up development environment", "list-1", 1, vec![]),
                    ],
                },
                List {
                    id: "list-2".to_string(),
                    title: "In Progress".to_string(),
                    order: 1,
                    cards: vec![card(
                        "card-3",
                        "Implement drag and drop",
                        "list-2",
                        0,
                        vec![comment(
                            "comment-2",
                            "Drag previews work; drop targets on empty lists still need testing",
                            Duration::hours(1),
                        )],
                    )],
                },
                List {
                    id: "list-3".to_string(),
                    title: "Done".to_string(),
                    order: 2,
                    cards: vec![card("card-4", "Create basic layout", "list-3", 0, vec![])],
                },
            ],
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Test support. Seeded boards stamp comment timestamps relative to the
/// current instant, so two freshly built copies never compare equal;
/// pinning `created_at` makes snapshots comparable with `assert_eq!`.
#[cfg(test)]
pub(crate) fn pin_timestamps(mut board: Board) -> Board {
    for list in &mut board.lists {
        for card in &mut list.cards {
            for comment in &mut card.comments {
                comment.created_at = DateTime::<Utc>::UNIX_EPOCH;
            }
        }
    }
    board
}
