//! Drag gesture resolution.
//!
//! The rendering layer reports raw drag events as entity-id strings; it does
//! not know whether an id names a list or a card. This module resolves those
//! ids once, at the input boundary, into typed intents the reducer
//! understands, and guards against the duplicate events real input layers
//! deliver at the end of a gesture.

use crate::domain::board::{Board, Card, List};
use std::time::{Duration, Instant};
use tracing::debug;

/// What a raw drag id refers to on the current board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragNode<'a> {
    List(&'a List),
    Card(&'a Card),
    /// The id matches nothing, typically a stale reference from a gesture
    /// that outlived the entity.
    Unknown,
}

impl<'a> DragNode<'a> {
    /// Looks an id up against the live board. List ids are checked before
    /// card ids, mirroring how the gesture layer tells containers apart
    /// from their contents.
    pub fn resolve(board: &'a Board, id: &str) -> Self {
        if let Some(list) = board.find_list(id) {
            return DragNode::List(list);
        }
        if let Some(card) = board.find_card(id) {
            return DragNode::Card(card);
        }
        DragNode::Unknown
    }
}

/// A resolved, typed drag instruction, ready for the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragIntent {
    /// Move the list at `source_index` to `dest_index`.
    ReorderLists {
        source_index: usize,
        dest_index: usize,
    },
    /// Move a card, within one list or across two.
    ReorderCards {
        source_list_id: String,
        dest_list_id: String,
        source_index: usize,
        dest_index: usize,
    },
}

/// State machine over one drag gesture.
///
/// `begin` arms the tracker with the dragged entity's id; `end` resolves at
/// most one intent per gesture, then starts a cool-down during which the
/// tracker stays disarmed so duplicate end events from the input layer are
/// absorbed rather than dispatched twice.
#[derive(Debug)]
pub struct DragTracker {
    active: Option<String>,
    cooldown: Duration,
    rearm_at: Option<Instant>,
}

impl DragTracker {
    /// Matches the duplicate-event window observed in pointer input layers.
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self::with_cooldown(Self::DEFAULT_COOLDOWN)
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            active: None,
            cooldown,
            rearm_at: None,
        }
    }

    /// Whether a gesture is currently in flight.
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Records the dragged entity at gesture start. Ignored while the
    /// cool-down from the previous gesture is still absorbing events.
    pub fn begin(&mut self, active_id: impl Into<String>) {
        if self.in_cooldown() {
            debug!("drag start absorbed during cool-down");
            return;
        }
        self.active = Some(active_id.into());
    }

    /// Resolves the gesture against the live board.
    ///
    /// No drop target, a target equal to the source, or ids that no longer
    /// resolve all end the gesture with no intent. An end without a
    /// matching `begin` (the duplicate-event case) resolves to nothing.
    pub fn end(&mut self, board: &Board, over_id: Option<&str>) -> Option<DragIntent> {
        let Some(active_id) = self.active.take() else {
            debug!("drag end without a gesture in flight; absorbed");
            return None;
        };
        self.rearm_at = Some(Instant::now() + self.cooldown);

        let over_id = over_id?;
        if active_id == over_id {
            return None;
        }
        debug!(active = %active_id, over = %over_id, "resolving drag end");
        resolve_intent(board, &active_id, over_id)
    }

    fn in_cooldown(&self) -> bool {
        self.rearm_at
            .is_some_and(|rearm_at| Instant::now() < rearm_at)
    }
}

impl Default for DragTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Disambiguation order: a dragged list reorders only over another list; a
/// dragged card reorders over a card (taking that card's list and position)
/// or appends onto a list dropped over its empty area; anything else is a
/// no-op. The card's owning list is re-read from the live board, not cached
/// at drag start, because the board may have changed mid-gesture.
fn resolve_intent(board: &Board, active_id: &str, over_id: &str) -> Option<DragIntent> {
    match DragNode::resolve(board, active_id) {
        DragNode::List(active_list) => match DragNode::resolve(board, over_id) {
            DragNode::List(over_list) => {
                let source_index = board.list_index(&active_list.id)?;
                let dest_index = board.list_index(&over_list.id)?;
                Some(DragIntent::ReorderLists {
                    source_index,
                    dest_index,
                })
            }
            _ => {
                debug!(over = %over_id, "list dropped over a non-list; no-op");
                None
            }
        },
        DragNode::Card(active_card) => {
            let source_list = board.find_list(&active_card.list_id)?;
            let source_index = source_list.card_index(&active_card.id)?;

            match DragNode::resolve(board, over_id) {
                DragNode::Card(over_card) => {
                    let dest_list = board.find_list(&over_card.list_id)?;
                    let dest_index = dest_list.card_index(&over_card.id)?;
                    Some(DragIntent::ReorderCards {
                        source_list_id: source_list.id.clone(),
                        dest_list_id: dest_list.id.clone(),
                        source_index,
                        dest_index,
                    })
                }
                DragNode::List(over_list) => Some(DragIntent::ReorderCards {
                    source_list_id: source_list.id.clone(),
                    dest_list_id: over_list.id.clone(),
                    source_index,
                    // Empty-area drop: the card goes to the end.
                    dest_index: over_list.cards.len(),
                }),
                DragNode::Unknown => None,
            }
        }
        DragNode::Unknown => {
            debug!(active = %active_id, "dragged id matches nothing; no-op");
            None
        }
    }
}
