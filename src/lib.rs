//! # Tavla Core
//!
//! Core board logic for a Trello-style task board: ordered lists of
//! ordered cards with append-only comments.
//!
//! This crate provides the board model and its pure mutation functions,
//! drag gesture resolution, and snapshot persistence behind a storage
//! trait, without any dependency on specific UI implementations. The whole
//! board is one snapshot: it loads fail-open (a missing or unreadable
//! snapshot yields a seeded demo board) and saves atomically under a
//! single fixed key.

pub mod domain;
pub mod error;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use domain::{
    board::{Board, Card, Comment, List},
    drag::{DragIntent, DragNode, DragTracker},
    id::IdMinter,
    reducer::{CardPatch, ListPatch},
};
pub use error::{Result, TavlaError};
pub use session::BoardSession;
pub use storage::{file_store::FileStore, memory_store::MemoryStore, BoardStore, STORAGE_KEY};

#[cfg(feature = "sqlite-store")]
pub use storage::sqlite_store::SqliteStore;
