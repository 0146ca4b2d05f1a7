use crate::domain::Board;
use crate::error::Result;
use async_trait::async_trait;
use tracing::warn;

pub mod file_store;
pub mod memory_store;

#[cfg(feature = "sqlite-store")]
pub mod sqlite_store;

/// Key under which the board snapshot is stored, shared by every backend.
pub const STORAGE_KEY: &str = "trello-clone-board";

/// Storage trait for persisting the board snapshot.
///
/// Loading is fail-open: a missing, unreadable, or malformed snapshot
/// yields the seeded default board instead of an error, so the caller
/// always has something to render. Saving reports its failures, classified
/// so the caller can tell a full backend from a denied one.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Loads the persisted board, or the seeded default when the backend
    /// has nothing usable.
    async fn load(&self) -> Board;

    /// Persists the full board snapshot.
    async fn save(&self, board: &Board) -> Result<()>;

    /// Removes the persisted snapshot. Best effort; failures are logged,
    /// never surfaced.
    async fn clear(&self);

    /// Probes whether the backend can currently accept writes.
    async fn is_available(&self) -> bool;
}

/// Decodes a raw snapshot, falling back to the seeded board when the
/// payload does not describe one. The snapshot is replaced wholesale on
/// the next save, so a partial rescue would only preserve broken state.
pub(crate) fn decode_snapshot(raw: &str) -> Board {
    match serde_json::from_str(raw) {
        Ok(board) => board,
        Err(err) => {
            warn!(%err, "stored board snapshot is unreadable; starting from the default board");
            Board::seeded()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::pin_timestamps;

    #[test]
    fn test_decode_snapshot_round_trips_a_board() {
        let board = Board::seeded();
        let json = serde_json::to_string(&board).unwrap();

        assert_eq!(decode_snapshot(&json), board);
    }

    #[test]
    fn test_decode_snapshot_falls_back_on_garbage() {
        let want = pin_timestamps(Board::seeded());
        assert_eq!(pin_timestamps(decode_snapshot("{not json")), want);
        assert_eq!(pin_timestamps(decode_snapshot("")), want);
    }

    #[test]
    fn test_decode_snapshot_falls_back_on_wrong_shape() {
        let want = pin_timestamps(Board::seeded());

        // Valid JSON, but not a board.
        assert_eq!(pin_timestamps(decode_snapshot(r#"{"id": 1}"#)), want);
        assert_eq!(pin_timestamps(decode_snapshot(r#"[1, 2, 3]"#)), want);

        // A board whose lists are malformed is rejected wholesale.
        let broken = r#"{"id": "board-1", "title": "Demo Board", "lists": [{"id": "list-1"}]}"#;
        assert_eq!(pin_timestamps(decode_snapshot(broken)), want);
    }

    #[test]
    fn test_decode_snapshot_ignores_unknown_fields() {
        let board = Board::seeded();
        let mut value = serde_json::to_value(&board).unwrap();
        value["theme"] = serde_json::json!("dark");

        assert_eq!(decode_snapshot(&value.to_string()), board);
    }
}
