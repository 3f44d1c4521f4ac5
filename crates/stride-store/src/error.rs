use thiserror::Error;

/// Errors produced by the cache layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the cache directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another holder of the connection panicked.
    #[error("Cache lock poisoned")]
    LockPoisoned,

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// An inbox entry would point at the signed-in user.
    #[error("Inbox entry refers to the current user")]
    SelfChat,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
