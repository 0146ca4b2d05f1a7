use crate::{
    domain::Board,
    error::{Result, TavlaError},
    storage::{decode_snapshot, BoardStore, STORAGE_KEY},
};
use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

/// SQLite-based board store. The snapshot lives as a single row in a
/// key-value table, keyed by [`STORAGE_KEY`]. Wrapping the connection in a
/// Mutex makes the store `Send + Sync` for use from async contexts.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates the database at the given path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(classify_sqlite)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    /// Opens a database that lives only as long as the store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(classify_sqlite)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("SqliteStore mutex poisoned")
    }

    fn create_schema(&self) -> Result<()> {
        self.conn()
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS snapshots (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(classify_sqlite)?;
        Ok(())
    }
}

#[async_trait]
impl BoardStore for SqliteStore {
    async fn load(&self) -> Board {
        let row: std::result::Result<Option<String>, _> = self
            .conn()
            .query_row(
                "SELECT value FROM snapshots WHERE key = ?1;",
                [STORAGE_KEY],
                |row| row.get(0),
            )
            .optional();

        match row {
            Ok(Some(raw)) => decode_snapshot(&raw),
            Ok(None) => {
                debug!("no stored board; starting from the default board");
                Board::seeded()
            }
            Err(err) => {
                warn!(%err, "failed to read stored board; starting from the default board");
                Board::seeded()
            }
        }
    }

    async fn save(&self, board: &Board) -> Result<()> {
        let json = serde_json::to_string_pretty(board)?;
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO snapshots (key, value) VALUES (?1, ?2);",
                params![STORAGE_KEY, json],
            )
            .map_err(classify_sqlite)?;
        debug!("board snapshot saved");
        Ok(())
    }

    async fn clear(&self) {
        match self
            .conn()
            .execute("DELETE FROM snapshots WHERE key = ?1;", [STORAGE_KEY])
        {
            Ok(_) => debug!("stored board cleared"),
            Err(err) => warn!(%err, "failed to clear stored board"),
        }
    }

    async fn is_available(&self) -> bool {
        // Write-then-delete probe against a throwaway key, like the other
        // stores.
        let probe_key = format!("probe-{}", Uuid::new_v4());
        let conn = self.conn();
        let wrote = conn
            .execute(
                "INSERT OR REPLACE INTO snapshots (key, value) VALUES (?1, ?1);",
                [&probe_key],
            )
            .is_ok();
        if wrote {
            let _ = conn.execute("DELETE FROM snapshots WHERE key = ?1;", [&probe_key]);
        }
        wrote
    }
}

/// Maps SQLite failures onto the classified save errors.
fn classify_sqlite(err: rusqlite::Error) -> TavlaError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DiskFull) => TavlaError::QuotaExceeded,
        Some(ErrorCode::PermissionDenied | ErrorCode::ReadOnly | ErrorCode::CannotOpen) => {
            TavlaError::AccessDenied
        }
        _ => TavlaError::Storage(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::pin_timestamps;
    use crate::domain::reducer;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_database_loads_the_default_board() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(
            pin_timestamps(store.load().await),
            pin_timestamps(Board::seeded())
        );
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let board = reducer::update_board_title(&Board::seeded(), "Sprint 12");

        store.save(&board).await.unwrap();

        assert_eq!(store.load().await, board);
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("board.db");
        let board = reducer::update_board_title(&Board::seeded(), "Sprint 12");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.save(&board).await.unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.load().await, board);
    }

    #[tokio::test]
    async fn test_repeated_saves_keep_a_single_row() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.save(&Board::seeded()).await.unwrap();
        store
            .save(&reducer::update_board_title(&Board::seeded(), "Renamed"))
            .await
            .unwrap();

        let rows: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM snapshots;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_corrupt_row_falls_back_to_the_default_board() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn()
            .execute(
                "INSERT OR REPLACE INTO snapshots (key, value) VALUES (?1, ?2);",
                params![STORAGE_KEY, "{ definitely not a board"],
            )
            .unwrap();

        assert_eq!(
            pin_timestamps(store.load().await),
            pin_timestamps(Board::seeded())
        );
    }

    #[tokio::test]
    async fn test_clear_removes_the_snapshot() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save(&Board::seeded()).await.unwrap();

        store.clear().await;

        let rows: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM snapshots;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_probe_leaves_no_rows_behind() {
        let store = SqliteStore::open_in_memory().unwrap();

        assert!(store.is_available().await);

        let rows: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM snapshots;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }
}
