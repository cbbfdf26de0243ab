//! Historical Snapshot Store
//!
//! Bounded, append-mostly log of daily metric snapshots, persisted as one
//! JSON-serialized list under a single configurable key in a pluggable
//! key-value backend.
//!
//! The error posture is catch-and-degrade throughout: the backing store
//! can be absent, quota-limited, or corrupted, so every operation returns
//! `false`/empty/`None` instead of propagating failures. Failures are
//! logged via `tracing` and the dashboard keeps showing prior history.

use crate::config::{Config, StorageConfig};
use crate::types::DataSnapshot;
use chrono::{DateTime, Duration, Local, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;

/// Failure modes of a storage backend write.
///
/// Only `QuotaExceeded` is distinguished by callers: it decides whether
/// the space-reclamation retry in [`SnapshotStore::save_snapshot`] is
/// worth attempting at all.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend is out of space
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// Any other IO failure
    #[error("storage IO error: {0}")]
    Io(#[from] io::Error),
}

/// A key-value mechanism storing one string value per key.
///
/// Mirrors the reliability profile of browser-local storage: reads can
/// come back empty, writes can fail for quota reasons, and in some
/// environments there is no persistence at all ([`NullBackend`]).
pub trait StorageBackend: Send + Sync {
    /// Read the raw string stored under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`.
    fn remove(&self, key: &str);
}

impl<T: StorageBackend> StorageBackend for Arc<T> {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// File-per-key backend storing `<key>.json` files in a directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open a backend rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

/// ENOSPC and EDQUOT are the quota cases worth a reclamation retry; there
/// is no stable `io::ErrorKind` for either yet.
fn map_write_error(e: io::Error) -> StorageError {
    match e.raw_os_error() {
        Some(28) | Some(122) => StorageError::QuotaExceeded,
        _ => StorageError::Io(e),
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        // Write-then-rename so a failed write never clobbers the old list
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(map_write_error)?;
        std::fs::rename(&tmp, &path).map_err(map_write_error)
    }

    fn remove(&self, key: &str) {
        let _ = std::fs::remove_file(self.path_for(key));
    }
}

/// In-memory backend with an optional byte capacity.
///
/// The capacity exists so tests can provoke the quota-exceeded recovery
/// path deterministically.
#[derive(Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
    capacity_bytes: Mutex<Option<usize>>,
}

impl MemoryBackend {
    /// Unlimited in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend refusing writes larger than `bytes`.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            capacity_bytes: Mutex::new(Some(bytes)),
        }
    }

    /// Change the capacity of an existing backend.
    pub fn set_capacity(&self, bytes: Option<usize>) {
        *self.capacity_bytes.lock().unwrap() = bytes;
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(capacity) = *self.capacity_bytes.lock().unwrap() {
            if value.len() > capacity {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

/// Backend for environments with no persistent store at all.
///
/// Writes are accepted as successful no-ops: data appears saved but does
/// not survive a restart. Best-effort degradation, not an error.
pub struct NullBackend;

impl StorageBackend for NullBackend {
    fn read(&self, _key: &str) -> Option<String> {
        None
    }

    fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn remove(&self, _key: &str) {}
}

/// Counters reported by [`SnapshotStore::storage_stats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    /// Number of stored snapshots
    pub snapshot_count: usize,
    /// Timestamp of the first stored entry (append order, not sorted)
    pub oldest_snapshot: Option<DateTime<Utc>>,
    /// Timestamp of the last stored entry (append order, not sorted)
    pub newest_snapshot: Option<DateTime<Utc>>,
    /// Serialized size of the raw stored value, in KB (2 decimals)
    pub estimated_size_kb: f64,
}

/// The Historical Snapshot Store.
///
/// Entries are kept in caller-supplied append order; `latest_snapshot`
/// and the oldest/newest stats rely on append order matching
/// chronological order and the store never re-sorts. The read-modify-
/// write cycle in `save_snapshot` is serialized behind an internal mutex
/// so concurrent writers cannot lose updates within one process.
pub struct SnapshotStore {
    config: StorageConfig,
    backend: Box<dyn StorageBackend>,
    write_lock: Mutex<()>,
}

impl SnapshotStore {
    /// Create a store over the given backend and retention config.
    pub fn new(backend: Box<dyn StorageBackend>, config: StorageConfig) -> Self {
        Self {
            config,
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Store backed by files in the XDG data directory with default
    /// retention, degrading to a [`NullBackend`] when the directory
    /// cannot be created.
    pub fn open_default() -> Self {
        let config = StorageConfig::default();
        match FileBackend::open(Config::data_dir()) {
            Ok(backend) => Self::new(Box::new(backend), config),
            Err(e) => {
                tracing::warn!(error = %e, "No persistent storage available; snapshots will not survive restart");
                Self::new(Box::new(NullBackend), config)
            }
        }
    }

    /// Retention configuration of this store.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Append a snapshot, enforce retention, and write the list back.
    ///
    /// On a quota-exceeded write the newest `ceil(n/2)` of the existing
    /// entries are kept and the append-and-write is retried exactly once.
    /// Every failure path returns `false`; this never panics or errors.
    pub fn save_snapshot(&self, snapshot: &DataSnapshot) -> bool {
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut snapshots = self.read_list();
        snapshots.push(snapshot.clone());
        let cleaned = self.cleanup_old_data(snapshots);

        match self.write_list(&cleaned) {
            Ok(()) => true,
            Err(StorageError::QuotaExceeded) => {
                tracing::warn!(
                    key = %self.config.storage_key,
                    "Storage quota exceeded; keeping newest half and retrying"
                );
                let existing = self.read_list();
                let keep = (existing.len() + 1) / 2;
                let mut trimmed = existing[existing.len() - keep..].to_vec();
                trimmed.push(snapshot.clone());
                let cleaned = self.cleanup_old_data(trimmed);
                match self.write_list(&cleaned) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, "Snapshot save failed after quota recovery");
                        false
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot save failed");
                false
            }
        }
    }

    /// All stored snapshots in the order they were last written.
    ///
    /// Absent, malformed, or non-list stored values yield an empty list.
    pub fn all_snapshots(&self) -> Vec<DataSnapshot> {
        self.read_list()
    }

    /// Snapshots with `timestamp` in the inclusive range `[start, end]`.
    pub fn snapshots_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<DataSnapshot> {
        self.read_list()
            .into_iter()
            .filter(|s| s.timestamp >= start && s.timestamp <= end)
            .collect()
    }

    /// Last stored snapshot by append order (not by timestamp).
    pub fn latest_snapshot(&self) -> Option<DataSnapshot> {
        self.read_list().pop()
    }

    /// Remove the entire stored list.
    pub fn clear_all(&self) {
        self.backend.remove(&self.config.storage_key);
    }

    /// Counters about the stored list and its serialized size.
    pub fn storage_stats(&self) -> StorageStats {
        let raw = self.backend.read(&self.config.storage_key);
        let size_bytes = raw.as_ref().map(|r| r.len()).unwrap_or(0);
        let snapshots = raw
            .as_deref()
            .and_then(|r| serde_json::from_str::<Vec<DataSnapshot>>(r).ok())
            .unwrap_or_default();

        StorageStats {
            snapshot_count: snapshots.len(),
            oldest_snapshot: snapshots.first().map(|s| s.timestamp),
            newest_snapshot: snapshots.last().map(|s| s.timestamp),
            estimated_size_kb: (size_bytes as f64 / 1024.0 * 100.0).round() / 100.0,
        }
    }

    /// Advisory one-snapshot-per-day check: `true` when the candidate
    /// falls on a different local calendar day than the latest stored
    /// snapshot (or when nothing is stored yet).
    ///
    /// `save_snapshot` does not enforce this; callers consult it first.
    pub fn should_save_snapshot(&self, candidate: DateTime<Utc>) -> bool {
        match self.latest_snapshot() {
            None => true,
            Some(latest) => {
                candidate.with_timezone(&Local).date_naive()
                    != latest.timestamp.with_timezone(&Local).date_naive()
            }
        }
    }

    /// Retention policy: drop entries older than the retention window,
    /// then cap at `max_snapshots` keeping the newest (assumes ascending
    /// append order, dropping from the front).
    fn cleanup_old_data(&self, snapshots: Vec<DataSnapshot>) -> Vec<DataSnapshot> {
        let cutoff = Utc::now() - Duration::days(self.config.retention_days);
        let mut kept: Vec<DataSnapshot> = snapshots
            .into_iter()
            .filter(|s| s.timestamp >= cutoff)
            .collect();

        if kept.len() > self.config.max_snapshots {
            let excess = kept.len() - self.config.max_snapshots;
            tracing::debug!(dropped = excess, "Snapshot cap reached, evicting oldest entries");
            kept.drain(..excess);
        }
        kept
    }

    fn read_list(&self) -> Vec<DataSnapshot> {
        let Some(raw) = self.backend.read(&self.config.storage_key) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<DataSnapshot>>(&raw) {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::warn!(
                    key = %self.config.storage_key,
                    error = %e,
                    "Stored snapshot list is unreadable, treating as empty"
                );
                Vec::new()
            }
        }
    }

    fn write_list(&self, snapshots: &[DataSnapshot]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(snapshots)
            .map_err(|e| StorageError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        self.backend.write(&self.config.storage_key, &raw)
    }
}

static DEFAULT_STORE: OnceLock<SnapshotStore> = OnceLock::new();

/// Process-wide store instance with default config, constructed on first
/// use and living for the application lifetime.
///
/// Callers needing isolation (tests, embedders) construct their own
/// [`SnapshotStore`] instead.
pub fn default_store() -> &'static SnapshotStore {
    DEFAULT_STORE.get_or_init(SnapshotStore::open_default)
}
