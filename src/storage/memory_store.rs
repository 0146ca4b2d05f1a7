use crate::{
    domain::Board,
    error::{Result, TavlaError},
    storage::{decode_snapshot, BoardStore},
};
use async_trait::async_trait;
use std::sync::RwLock;
use tracing::{debug, warn};

/// In-memory board store, modeling the constrained media the classified
/// save errors exist for: a single key-value slot that can be capped to a
/// byte capacity, flipped read-only, or preseeded with a raw snapshot. Used
/// in tests and as a fallback when no durable backend is wanted.
pub struct MemoryStore {
    slot: RwLock<Option<String>>,
    capacity: Option<usize>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            capacity: None,
            read_only: false,
        }
    }

    /// Caps the serialized snapshot at `bytes`. A larger save fails the
    /// way a full medium does.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            capacity: Some(bytes),
            ..Self::new()
        }
    }

    /// Rejects every write the way a denied medium does.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::new()
        }
    }

    /// Preseeds the slot with a raw snapshot, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let store = Self::new();
        *store.slot.write().unwrap() = Some(raw.into());
        store
    }

    /// The raw snapshot as stored, if any.
    pub fn raw(&self) -> Option<String> {
        self.slot.read().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn load(&self) -> Board {
        match self.slot.read().unwrap().as_deref() {
            Some(raw) => decode_snapshot(raw),
            None => {
                debug!("no stored board; starting from the default board");
                Board::seeded()
            }
        }
    }

    async fn save(&self, board: &Board) -> Result<()> {
        if self.read_only {
            return Err(TavlaError::AccessDenied);
        }
        let json = serde_json::to_string(board)?;
        if let Some(capacity) = self.capacity {
            if json.len() > capacity {
                return Err(TavlaError::QuotaExceeded);
            }
        }
        *self.slot.write().unwrap() = Some(json);
        Ok(())
    }

    async fn clear(&self) {
        if self.read_only {
            warn!("failed to clear stored board: store is read-only");
            return;
        }
        *self.slot.write().unwrap() = None;
        debug!("stored board cleared");
    }

    async fn is_available(&self) -> bool {
        // A byte cap does not make the slot unavailable; only writes that
        // exceed it fail, the same way a nearly full medium behaves.
        !self.read_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::pin_timestamps;
    use crate::domain::reducer;

    #[tokio::test]
    async fn test_empty_store_loads_the_default_board() {
        let store = MemoryStore::new();
        assert_eq!(
            pin_timestamps(store.load().await),
            pin_timestamps(Board::seeded())
        );
        assert!(store.raw().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let store = MemoryStore::new();
        let board = reducer::update_board_title(&Board::seeded(), "Sprint 12");

        store.save(&board).await.unwrap();

        assert_eq!(store.load().await, board);
        assert!(store.raw().is_some());
    }

    #[tokio::test]
    async fn test_preseeded_snapshot_is_served() {
        let board = reducer::update_board_title(&Board::seeded(), "Sprint 12");
        let store = MemoryStore::with_raw(serde_json::to_string(&board).unwrap());

        assert_eq!(store.load().await, board);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_falls_back_to_the_default_board() {
        let store = MemoryStore::with_raw("{ definitely not a board");
        assert_eq!(
            pin_timestamps(store.load().await),
            pin_timestamps(Board::seeded())
        );
    }

    #[tokio::test]
    async fn test_capped_store_reports_quota_exhaustion() {
        let store = MemoryStore::with_capacity(16);

        let err = store.save(&Board::seeded()).await.unwrap_err();
        assert!(matches!(err, TavlaError::QuotaExceeded));

        // Nothing was stored; the next load still seeds.
        assert!(store.raw().is_none());
        assert_eq!(
            pin_timestamps(store.load().await),
            pin_timestamps(Board::seeded())
        );
    }

    #[tokio::test]
    async fn test_read_only_store_reports_access_denial() {
        let store = MemoryStore::read_only();

        let err = store.save(&Board::seeded()).await.unwrap_err();
        assert!(matches!(err, TavlaError::AccessDenied));
        assert!(!store.is_available().await);
    }

    #[tokio::test]
    async fn test_clear_drops_the_snapshot() {
        let store = MemoryStore::new();
        let board = reducer::update_board_title(&Board::seeded(), "Sprint 12");

        store.save(&board).await.unwrap();
        store.clear().await;

        assert!(store.raw().is_none());
        assert_eq!(
            pin_timestamps(store.load().await),
            pin_timestamps(Board::seeded())
        );
    }

    #[tokio::test]
    async fn test_clear_on_a_read_only_store_keeps_the_snapshot() {
        let board = Board::seeded();
        let raw = serde_json::to_string(&board).unwrap();
        let store = MemoryStore {
            slot: RwLock::new(Some(raw.clone())),
            capacity: None,
            read_only: true,
        };

        store.clear().await;
        assert_eq!(store.raw(), Some(raw));
    }

    #[tokio::test]
    async fn test_capped_store_is_still_available() {
        let store = MemoryStore::with_capacity(8);
        assert!(store.is_available().await);
    }
}
