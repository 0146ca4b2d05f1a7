//! Pure board mutations.
//!
//! Every function takes the current snapshot by reference and returns a
//! fresh tree; nothing mutates its input. Operations whose inputs can be
//! rejected (unknown ids, out-of-range indices) return `Option<Board>`,
//! where `None` means the operation did not apply and the caller keeps
//! the snapshot it already has. Nothing here panics or errors: impossible
//! inputs are absorbed, not reported.

use crate::domain::board::{Board, Card, Comment, List};
use tracing::{debug, warn};

/// Partial update for a list. Only the title is patchable; `order` and the
/// card sequence are reducer-managed.
#[derive(Debug, Clone, Default)]
pub struct ListPatch {
    pub title: Option<String>,
}

/// Partial update for a card. Only the title is patchable; `order` and
/// `list_id` are reducer-managed, so a patch can never move a card between
/// lists.
#[derive(Debug, Clone, Default)]
pub struct CardPatch {
    pub title: Option<String>,
}

/// Replaces the board title. No trimming; empty titles are allowed.
pub fn update_board_title(board: &Board, title: impl Into<String>) -> Board {
    let mut next = board.clone();
    next.title = title.into();
    next
}

/// Appends a new list with the given fresh id at the end of the board.
pub fn add_list(board: &Board, id: impl Into<String>) -> Board {
    let mut next = board.clone();
    let mut list = List::new(id);
    list.order = next.lists.len();
    next.lists.push(list);
    next
}

/// Merges patch fields into the matching list. `None` if the id is unknown.
pub fn update_list(board: &Board, list_id: &str, patch: ListPatch) -> Option<Board> {
    let index = board.list_index(list_id)?;
    let mut next = board.clone();
    if let Some(title) = patch.title {
        next.lists[index].title = title;
    }
    Some(next)
}

/// Removes a list together with its cards. `None` if the id is unknown.
///
/// Surviving lists are renumbered immediately, so the order invariant holds
/// after removal rather than waiting for the next reorder to repair it.
pub fn delete_list(board: &Board, list_id: &str) -> Option<Board> {
    let index = board.list_index(list_id)?;
    let mut next = board.clone();
    next.lists.remove(index);
    renumber_lists(&mut next.lists);
    Some(next)
}

/// Moves the list at `source_index` to `dest_index` and renumbers every
/// list's `order` to its new position. Both indices must be within the
/// current list range; anything else is rejected rather than clamped.
pub fn reorder_lists(board: &Board, source_index: usize, dest_index: usize) -> Option<Board> {
    let len = board.lists.len();
    if source_index >= len || dest_index >= len {
        warn!(
            source_index,
            dest_index, len, "list reorder rejected: index out of range"
        );
        return None;
    }

    let mut next = board.clone();
    let moved = next.lists.remove(source_index);
    next.lists.insert(dest_index, moved);
    renumber_lists(&mut next.lists);
    Some(next)
}

/// Appends a new empty-titled card to the given list. `None` if the list id
/// is unknown.
pub fn add_card(board: &Board, list_id: &str, id: impl Into<String>) -> Option<Board> {
    let index = board.list_index(list_id)?;
    let mut next = board.clone();
    let list = &mut next.lists[index];
    let mut card = Card::new(id, list_id);
    card.order = list.cards.len();
    list.cards.push(card);
    Some(next)
}

/// Merges patch fields into the card with the given id, searched across all
/// lists. `None` if no card matches.
pub fn update_card(board: &Board, card_id: &str, patch: CardPatch) -> Option<Board> {
    let (list_index, card_index) = locate_card(board, card_id)?;
    let mut next = board.clone();
    if let Some(title) = patch.title {
        next.lists[list_index].cards[card_index].title = title;
    }
    Some(next)
}

/// Moves a card between positions, within one list or across two.
///
/// The card at `source_index` leaves `source_list_id`, takes on the
/// destination's `list_id` when the lists differ, lands at `dest_index`,
/// and both affected card sequences are renumbered. `dest_index` may equal
/// the destination's length (append position); every other out-of-range
/// input and any unknown list id is rejected with the prior board kept.
pub fn reorder_cards(
    board: &Board,
    source_list_id: &str,
    dest_list_id: &str,
    source_index: usize,
    dest_index: usize,
) -> Option<Board> {
    debug!(
        source_list_id,
        dest_list_id, source_index, dest_index, "reordering cards"
    );

    let (Some(source_pos), Some(dest_pos)) = (
        board.list_index(source_list_id),
        board.list_index(dest_list_id),
    ) else {
        warn!(
            source_list_id,
            dest_list_id, "card reorder rejected: unknown list"
        );
        return None;
    };

    let source_len = board.lists[source_pos].cards.len();
    if source_index >= source_len {
        warn!(
            source_index,
            source_len, "card reorder rejected: source index out of range"
        );
        return None;
    }
    let dest_len = board.lists[dest_pos].cards.len();
    if dest_index > dest_len {
        warn!(
            dest_index,
            dest_len, "card reorder rejected: destination index out of range"
        );
        return None;
    }

    let mut next = board.clone();
    if source_pos == dest_pos {
        let cards = &mut next.lists[source_pos].cards;
        let moved = cards.remove(source_index);
        // `dest_index` was measured before the card left the list; the
        // append position shifts down by one once it has.
        let insert_at = dest_index.min(cards.len());
        cards.insert(insert_at, moved);
        renumber_cards(cards);
    } else {
        let mut moved = next.lists[source_pos].cards.remove(source_index);
        moved.list_id = dest_list_id.to_string();
        next.lists[dest_pos].cards.insert(dest_index, moved);
        renumber_cards(&mut next.lists[source_pos].cards);
        renumber_cards(&mut next.lists[dest_pos].cards);
    }
    Some(next)
}

/// Appends a comment stamped now to the card with the given id. `None` if no
/// card matches. Text is stored as given; callers trim and reject blank
/// input at the edit boundary.
pub fn add_comment(
    board: &Board,
    card_id: &str,
    comment_id: impl Into<String>,
    text: impl Into<String>,
) -> Option<Board> {
    let (list_index, card_index) = locate_card(board, card_id)?;
    let mut next = board.clone();
    next.lists[list_index].cards[card_index]
        .comments
        .push(Comment::new(comment_id, text));
    Some(next)
}

/// Locates a card as (list index, card index), searched across all lists.
fn locate_card(board: &Board, card_id: &str) -> Option<(usize, usize)> {
    board
        .lists
        .iter()
        .enumerate()
        .find_map(|(list_index, list)| {
            list.card_index(card_id)
                .map(|card_index| (list_index, card_index))
        })
}

fn renumber_lists(lists: &mut [List]) {
    for (index, list) in lists.iter_mut().enumerate() {
        list.order = index;
    }
}

fn renumber_cards(cards: &mut [Card]) {
    for (index, card) in cards.iter_mut().enumerate() {
        card.order = index;
    }
}
