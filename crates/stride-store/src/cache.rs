//! Cache connection management and change broadcasting.
//!
//! The [`LocalCache`] handle owns a shared [`rusqlite::Connection`] and a
//! broadcast channel. Cloning the handle shares both, so a write through one
//! clone is observed by subscribers of every other clone.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Capacity of the change channel. Slow subscribers that fall further behind
/// see a lag and are told to reload.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Set,
    Removed,
}

/// Notification emitted after every successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheChange {
    pub key: String,
    pub kind: ChangeKind,
}

/// Cloneable handle to the durable cache.
#[derive(Clone)]
pub struct LocalCache {
    conn: Arc<Mutex<Connection>>,
    changes: broadcast::Sender<CacheChange>,
}

impl LocalCache {
    /// Open (or create) the cache in the platform data directory:
    /// - Linux:   `~/.local/share/stride/stride-cache.db`
    /// - macOS:   `~/Library/Application Support/com.stride.stride/stride-cache.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\stride\stride\data\stride-cache.db`
    pub fn open_default() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "stride", "stride").ok_or(StoreError::NoDataDir)?;
        Self::open_at(&project_dirs.data_dir().join("stride-cache.db"))
    }

    /// Open (or create) the cache at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "opening local cache");

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    /// Cache that lives only as long as the handle (tests, ephemeral sessions).
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            changes,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Filesystem path of the backing database, if any.
    pub fn path(&self) -> Option<PathBuf> {
        self.conn()
            .ok()
            .and_then(|c| c.path().filter(|p| !p.is_empty()).map(PathBuf::from))
    }

    // ------------------------------------------------------------------
    // Raw access
    // ------------------------------------------------------------------

    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()?
            .query_row(
                "SELECT value FROM cache_entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO cache_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        self.broadcast(key, ChangeKind::Set);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Typed access
    // ------------------------------------------------------------------

    /// Read and decode an entry.
    ///
    /// An entry that no longer decodes as `T` is treated as absent; corrupt
    /// persisted state must never take the caller down.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding corrupt cache entry");
                Ok(None)
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json)
    }

    /// Delete an entry. Returns whether something was removed; only actual
    /// removals are broadcast.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()?
            .execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
        if affected > 0 {
            self.broadcast(key, ChangeKind::Removed);
        }
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Change notifications
    // ------------------------------------------------------------------

    /// Subscribe to every change made through any clone of this handle.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheChange> {
        self.changes.subscribe()
    }

    /// Subscribe to changes of a single key.
    pub fn watch(&self, key: &str) -> KeyWatch {
        KeyWatch {
            key: key.to_string(),
            rx: self.subscribe(),
        }
    }

    fn broadcast(&self, key: &str, kind: ChangeKind) {
        // No subscribers is not an error.
        let _ = self.changes.send(CacheChange {
            key: key.to_string(),
            kind,
        });
    }
}

/// Change stream filtered to one key.
pub struct KeyWatch {
    key: String,
    rx: broadcast::Receiver<CacheChange>,
}

impl KeyWatch {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Wait for the next change of the watched key.
    ///
    /// If the subscriber lagged behind, a `Set` is reported so the caller
    /// reloads. Returns `None` once every cache handle is gone.
    pub async fn changed(&mut self) -> Option<CacheChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.key == self.key => return Some(change),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(key = %self.key, skipped, "cache watcher lagged");
                    return Some(CacheChange {
                        key: self.key.clone(),
                        kind: ChangeKind::Set,
                    });
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
