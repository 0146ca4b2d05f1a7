use crate::{
    domain::Board,
    error::{Result, TavlaError},
    storage::{decode_snapshot, BoardStore, STORAGE_KEY},
};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// File-based board store. The whole board lives in a single
/// pretty-printed JSON snapshot under the store's root directory.
pub struct FileStore {
    root_path: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at the given directory. The directory itself
    /// is created on the first save.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root_path: root.as_ref().to_path_buf(),
        }
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(format!("{STORAGE_KEY}.json"))
    }

    /// Writes through a uniquely named sibling and renames it into place,
    /// so a concurrent reader never observes a half-written snapshot.
    async fn write_atomic(&self, path: &Path, contents: &str) -> std::io::Result<()> {
        let tmp = self
            .root_path
            .join(format!("{STORAGE_KEY}.json.tmp-{}", Uuid::new_v4()));
        // The sibling must not linger after a failed write or rename;
        // every save mints a fresh name, so leftovers accumulate.
        if let Err(err) = fs::write(&tmp, contents).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err);
        }
        if let Err(err) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl BoardStore for FileStore {
    async fn load(&self) -> Board {
        match fs::read_to_string(self.board_file()).await {
            Ok(raw) => decode_snapshot(&raw),
            Err(err) if err.kind() == ErrorKind::NotFound => {
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
        fs::create_dir_all(&self.root_path)
            .await
            .map_err(classify_io)?;

        let json = serde_json::to_string_pretty(board)?;
        self.write_atomic(&self.board_file(), &json)
            .await
            .map_err(classify_io)?;

        debug!(path = %self.board_file().display(), "board snapshot saved");
        Ok(())
    }

    async fn clear(&self) {
        match fs::remove_file(self.board_file()).await {
            Ok(()) => debug!("stored board cleared"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!(%err, "failed to clear stored board"),
        }
    }

    async fn is_available(&self) -> bool {
        if fs::create_dir_all(&self.root_path).await.is_err() {
            return false;
        }
        let probe = self.root_path.join(format!(".probe-{}", Uuid::new_v4()));
        if fs::write(&probe, b"probe").await.is_err() {
            return false;
        }
        let _ = fs::remove_file(&probe).await;
        true
    }
}

/// Maps raw filesystem failures onto the classified save errors. A full
/// medium and a denied one get their own variants so callers can phrase
/// the failure; everything else stays an IO error.
fn classify_io(err: std::io::Error) -> TavlaError {
    match err.kind() {
        ErrorKind::StorageFull | ErrorKind::QuotaExceeded => TavlaError::QuotaExceeded,
        ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem => TavlaError::AccessDenied,
        _ => TavlaError::Io(err),
    }
}
