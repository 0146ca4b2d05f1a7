use thiserror::Error;

pub type Result<T> = std::result::Result<T, TavlaError>;

#[derive(Debug, Error)]
pub enum TavlaError {
    /// The storage medium is out of space; the snapshot was not written.
    #[error("Storage quota exceeded. Unable to save board data.")]
    QuotaExceeded,

    /// The storage medium refused the write (permissions, read-only mount).
    #[error("Storage access denied. Unable to save board data.")]
    AccessDenied,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
