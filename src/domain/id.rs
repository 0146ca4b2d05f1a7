use crate::domain::board::Board;

/// Mints fresh entity ids for one board's lifetime.
///
/// Ids are `<class>-<n>` with a monotonic counter per entity class. Seeding
/// scans a snapshot for the largest numeric suffix in each class, so ids
/// minted after a reload can never collide with persisted ones and deleted
/// ids are never reused. This replaces wall-clock-derived ids, which collide
/// under rapid successive calls within the same clock tick.
#[derive(Debug, Clone)]
pub struct IdMinter {
    next_list: u64,
    next_card: u64,
    next_comment: u64,
}

impl IdMinter {
    const LIST_PREFIX: &'static str = "list-";
    const CARD_PREFIX: &'static str = "card-";
    const COMMENT_PREFIX: &'static str = "comment-";

    /// Creates a minter for a brand-new board with no prior ids.
    pub fn new() -> Self {
        Self {
            next_list: 1,
            next_card: 1,
            next_comment: 1,
        }
    }

    /// Creates a minter whose counters start past every numeric id suffix
    /// already present in the snapshot. Ids in other formats (imported or
    /// hand-edited snapshots) cannot collide with minted ones and are
    /// ignored. Counters saturate at `u64::MAX` rather than wrapping back
    /// over persisted ids.
    pub fn seeded_from(board: &Board) -> Self {
        let mut minter = Self::new();
        for list in &board.lists {
            minter.next_list = minter
                .next_list
                .max(suffix(&list.id, Self::LIST_PREFIX).saturating_add(1));
            for card in &list.cards {
                minter.next_card = minter
                    .next_card
                    .max(suffix(&card.id, Self::CARD_PREFIX).saturating_add(1));
                for comment in &card.comments {
                    minter.next_comment = minter
                        .next_comment
                        .max(suffix(&comment.id, Self::COMMENT_PREFIX).saturating_add(1));
                }
            }
        }
        minter
    }

    /// Mints the next list id.
    pub fn next_list_id(&mut self) -> String {
        let id = format!("{}{}", Self::LIST_PREFIX, self.next_list);
        self.next_list = self.next_list.saturating_add(1);
        id
    }

    /// Mints the next card id.
    pub fn next_card_id(&mut self) -> String {
        let id = format!("{}{}", Self::CARD_PREFIX, self.next_card);
        self.next_card = self.next_card.saturating_add(1);
        id
    }

    /// Mints the next comment id.
    pub fn next_comment_id(&mut self) -> String {
        let id = format!("{}{}", Self::COMMENT_PREFIX, self.next_comment);
        self.next_comment = self.next_comment.saturating_add(1);
        id
    }
}

impl Default for IdMinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric suffix of `<prefix><n>` ids; 0 for anything else.
fn suffix(id: &str, prefix: &str) -> u64 {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.parse::<u64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_minter_counts_from_one() {
        let mut minter = IdMinter::new();

        assert_eq!(minter.next_list_id(), "list-1");
        assert_eq!(minter.next_list_id(), "list-2");
        assert_eq!(minter.next_card_id(), "card-1");
        assert_eq!(minter.next_comment_id(), "comment-1");
    }

    #[test]
    fn test_seeding_continues_past_snapshot_ids() {
        let mut minter = IdMinter::seeded_from(&Board::seeded());

        // Seeded board holds list-1..3, card-1..4, comment-1..2.
        assert_eq!(minter.next_list_id(), "list-4");
        assert_eq!(minter.next_card_id(), "card-5");
        assert_eq!(minter.next_comment_id(), "comment-3");
    }

    #[test]
    fn test_seeding_ignores_foreign_id_formats() {
        let mut board = Board::seeded();
        board.lists[0].id = "imported-list-aa01".to_string();
        // Wall-clock-style id from an older snapshot.
        board.lists[1].cards[0].id = "card-1755100000000".to_string();

        let mut minter = IdMinter::seeded_from(&board);
        assert_eq!(minter.next_list_id(), "list-4");
        assert_eq!(minter.next_card_id(), "card-1755100000001");
    }

    #[test]
    fn test_minted_ids_never_repeat() {
        let mut minter = IdMinter::seeded_from(&Board::seeded());
        let a = minter.next_card_id();
        let b = minter.next_card_id();

        assert_ne!(a, b);
    }

    #[test]
    fn test_seeding_saturates_on_a_maximal_suffix() {
        let mut board = Board::seeded();
        board.lists[0].cards[0].id = format!("card-{}", u64::MAX);

        let mut minter = IdMinter::seeded_from(&board);

        // The card counter pins at the ceiling instead of wrapping to 0
        // and re-minting low persisted ids.
        let id = minter.next_card_id();
        assert_eq!(id, format!("card-{}", u64::MAX));
        assert_eq!(minter.next_card_id(), id);
        // Other classes are unaffected.
        assert_eq!(minter.next_list_id(), "list-4");
    }
}
