use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use serde_json::Value;

use course_core::model::{ProgressMap, VideoId, WatchRecord};
use course_core::progress::PlayedFraction;
use storage::repository::{KeyValueStore, StorageError};

use crate::error::ProgressStoreError;

/// Storage key the progress map is persisted under.
pub const PROGRESS_STORAGE_KEY: &str = "videoWatchStatus";

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// A copy of the progress map taken right after a mutation.
///
/// Revisions increase with every mutation, so a persister can tell which of
/// two snapshots is newer regardless of the order their writes complete in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    revision: u64,
    map: ProgressMap,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn map(&self) -> &ProgressMap {
        &self.map
    }
}

//
// ─── PERSISTENCE ───────────────────────────────────────────────────────────────
//

/// Reads and writes the serialized progress map in local storage.
///
/// Cheap to clone; clones share the revision counter and write lock.
#[derive(Clone)]
pub struct ProgressPersistence {
    store: Arc<dyn KeyValueStore>,
    revisions: Arc<AtomicU64>,
    last_written: Arc<Mutex<u64>>,
}

impl ProgressPersistence {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            revisions: Arc::new(AtomicU64::new(0)),
            last_written: Arc::new(Mutex::new(0)),
        }
    }

    fn next_revision(&self) -> u64 {
        self.revisions.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Load the persisted map.
    ///
    /// Missing, unreadable, or unparsable data yields an empty map. A single
    /// damaged entry is dropped on its own so the other records survive.
    /// Failures are logged and never returned.
    pub async fn load(&self) -> ProgressMap {
        let raw = match self.store.get(PROGRESS_STORAGE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = PROGRESS_STORAGE_KEY, "no saved progress, starting empty");
                return ProgressMap::new();
            }
            Err(err) => {
                warn!(key = PROGRESS_STORAGE_KEY, error = %err, "failed to read saved progress");
                return ProgressMap::new();
            }
        };

        let entries = match serde_json::from_str::<HashMap<String, Value>>(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(key = PROGRESS_STORAGE_KEY, error = %err, "failed to parse saved progress");
                return ProgressMap::new();
            }
        };

        let map: ProgressMap = entries.into_iter().filter_map(parse_entry).collect();
        debug!(key = PROGRESS_STORAGE_KEY, records = map.len(), "loaded saved progress");
        map
    }

    /// Write a snapshot, best effort.
    ///
    /// Writes are serialized; a snapshot older than the last one written is
    /// dropped. Returns whether the snapshot reached storage.
    pub async fn save(&self, snapshot: &ProgressSnapshot) -> bool {
        let mut last_written = self.last_written.lock().await;
        if snapshot.revision <= *last_written {
            debug!(
                revision = snapshot.revision,
                last_written = *last_written,
                "skipping stale progress snapshot"
            );
            return false;
        }

        let payload = match serde_json::to_string(&snapshot.map) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to serialize progress");
                return false;
            }
        };

        match self.store.set(PROGRESS_STORAGE_KEY, &payload).await {
            Ok(()) => {
                *last_written = snapshot.revision;
                true
            }
            Err(err) => {
                warn!(key = PROGRESS_STORAGE_KEY, error = %err, "failed to persist progress");
                false
            }
        }
    }

    /// Remove all persisted progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key cannot be removed.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(PROGRESS_STORAGE_KEY).await?;
        info!(key = PROGRESS_STORAGE_KEY, "cleared saved progress");
        Ok(())
    }
}

fn parse_entry((key, value): (String, Value)) -> Option<(VideoId, WatchRecord)> {
    let id = match VideoId::new(key.as_str()) {
        Ok(id) => id,
        Err(err) => {
            warn!(key = %key, error = %err, "dropping saved progress with invalid id");
            return None;
        }
    };
    match serde_json::from_value::<WatchRecord>(value) {
        Ok(record) => Some((id, record)),
        Err(err) => {
            warn!(video = %id, error = %err, "dropping malformed saved progress");
            None
        }
    }
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// In-memory progress map plus its persistence.
///
/// The map is only mutated through [`ProgressStore::record_progress`], and
/// only after [`ProgressStore::hydrate`] has run, so an empty map can never
/// overwrite progress saved by an earlier session.
pub struct ProgressStore {
    persistence: ProgressPersistence,
    map: ProgressMap,
    loaded: bool,
}

impl ProgressStore {
    #[must_use]
    pub fn new(persistence: ProgressPersistence) -> Self {
        Self {
            persistence,
            map: ProgressMap::new(),
            loaded: false,
        }
    }

    /// Load saved progress. Runs once; later calls are no-ops.
    pub async fn hydrate(&mut self) {
        if self.loaded {
            return;
        }
        self.map = self.persistence.load().await;
        self.loaded = true;
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub fn map(&self) -> &ProgressMap {
        &self.map
    }

    #[must_use]
    pub fn record(&self, id: &VideoId) -> WatchRecord {
        self.map.record(id)
    }

    #[must_use]
    pub fn persistence(&self) -> &ProgressPersistence {
        &self.persistence
    }

    /// Apply a fractional progress report for one video.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::NotLoaded` before hydration and
    /// `ProgressStoreError::Progress` for a non-finite fraction. Neither
    /// mutates the map.
    pub fn record_progress(
        &mut self,
        id: &VideoId,
        fraction: f64,
    ) -> Result<WatchRecord, ProgressStoreError> {
        if !self.loaded {
            return Err(ProgressStoreError::NotLoaded);
        }
        let played = PlayedFraction::new(fraction)?;
        let before = self.map.record(id);
        let after = self.map.record_progress(id, played);
        if before.status() != after.status() {
            info!(video = %id, progress = after.progress(), "video watched");
        }
        Ok(after)
    }

    /// Copy the current map for persisting.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            revision: self.persistence.next_revision(),
            map: self.map.clone(),
        }
    }

    /// `record_progress` followed by an awaited persist.
    ///
    /// # Errors
    ///
    /// Same as [`ProgressStore::record_progress`]; persistence failures are
    /// logged, not returned.
    pub async fn record_and_persist(
        &mut self,
        id: &VideoId,
        fraction: f64,
    ) -> Result<WatchRecord, ProgressStoreError> {
        let record = self.record_progress(id, fraction)?;
        let snapshot = self.snapshot();
        self.persistence.save(&snapshot).await;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use course_core::model::WatchStatus;
    use storage::repository::InMemoryStore;

    fn id(raw: &str) -> VideoId {
        VideoId::new(raw).unwrap()
    }

    async fn hydrated(store: &InMemoryStore) -> ProgressStore {
        let mut progress = ProgressStore::new(ProgressPersistence::new(Arc::new(store.clone())));
        progress.hydrate().await;
        progress
    }

    #[tokio::test]
    async fn hydrate_missing_key_starts_empty() {
        let progress = hydrated(&InMemoryStore::new()).await;
        assert!(progress.is_loaded());
        assert!(progress.map().is_empty());
    }

    #[tokio::test]
    async fn hydrate_corrupted_data_starts_empty() {
        let store = InMemoryStore::new()
            .with_entry(PROGRESS_STORAGE_KEY, "{not json")
            .unwrap();
        let progress = hydrated(&store).await;
        assert!(progress.is_loaded());
        assert!(progress.map().is_empty());
    }

    #[tokio::test]
    async fn hydrate_keeps_valid_records_next_to_damaged_ones() {
        let store = InMemoryStore::new()
            .with_entry(
                PROGRESS_STORAGE_KEY,
                r#"{
                    "1": {"progress": 100, "status": "Watched"},
                    "2": {"progress": 12.5, "status": "Unwatched"},
                    "3": {"progress": 40, "status": "Skipped"},
                    "4": "watched",
                    " ": {"progress": 90, "status": "Watched"}
                }"#,
            )
            .unwrap();
        let progress = hydrated(&store).await;

        assert_eq!(progress.map().len(), 2);
        assert_eq!(progress.record(&id("1")).status(), WatchStatus::Watched);
        assert_eq!(progress.record(&id("1")).progress(), 100);
        assert_eq!(progress.record(&id("2")).progress(), 13);
        assert_eq!(progress.record(&id("3")), WatchRecord::default());
        assert_eq!(progress.record(&id("4")), WatchRecord::default());
    }

    #[tokio::test]
    async fn hydrate_non_object_json_starts_empty() {
        let store = InMemoryStore::new()
            .with_entry(PROGRESS_STORAGE_KEY, "[1, 2, 3]")
            .unwrap();
        let progress = hydrated(&store).await;
        assert!(progress.is_loaded());
        assert!(progress.map().is_empty());
    }

    #[tokio::test]
    async fn record_before_hydrate_is_rejected() {
        let store = InMemoryStore::new();
        let mut progress = ProgressStore::new(ProgressPersistence::new(Arc::new(store.clone())));
        let err = progress.record_progress(&id("1"), 0.5).unwrap_err();
        assert!(matches!(err, ProgressStoreError::NotLoaded));
        assert!(progress.map().is_empty());
        assert!(store.get(PROGRESS_STORAGE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn nan_fraction_is_rejected_without_mutation() {
        let mut progress = hydrated(&InMemoryStore::new()).await;
        let err = progress.record_progress(&id("1"), f64::NAN).unwrap_err();
        assert!(matches!(err, ProgressStoreError::Progress(_)));
        assert!(progress.map().is_empty());
    }

    #[tokio::test]
    async fn watched_status_survives_lower_reports() {
        let mut progress = hydrated(&InMemoryStore::new()).await;
        progress.record_progress(&id("1"), 0.85).unwrap();
        let record = progress.record_progress(&id("1"), 0.2).unwrap();
        assert_eq!(record.progress(), 20);
        assert_eq!(record.status(), WatchStatus::Watched);
    }

    #[tokio::test]
    async fn record_and_persist_round_trips() {
        let store = InMemoryStore::new();
        let mut first = hydrated(&store).await;
        first.record_and_persist(&id("1"), 0.3).await.unwrap();
        first.record_and_persist(&id("2"), 0.9).await.unwrap();

        let second = hydrated(&store).await;
        assert_eq!(second.map(), first.map());
    }

    #[tokio::test]
    async fn stale_snapshot_is_not_written() {
        let store = InMemoryStore::new();
        let mut progress = hydrated(&store).await;
        progress.record_progress(&id("1"), 0.1).unwrap();
        let older = progress.snapshot();
        progress.record_progress(&id("1"), 0.2).unwrap();
        let newer = progress.snapshot();

        let persistence = progress.persistence().clone();
        assert!(persistence.save(&newer).await);
        assert!(!persistence.save(&older).await);

        let reloaded = hydrated(&store).await;
        assert_eq!(reloaded.record(&id("1")).progress(), 20);
    }

    #[tokio::test]
    async fn hydrate_runs_once() {
        let store = InMemoryStore::new();
        let mut progress = hydrated(&store).await;
        progress.record_progress(&id("1"), 0.4).unwrap();

        store
            .set(PROGRESS_STORAGE_KEY, r#"{"9":{"progress":1,"status":"Unwatched"}}"#)
            .await
            .unwrap();
        progress.hydrate().await;
        assert_eq!(progress.record(&id("1")).progress(), 40);
        assert_eq!(progress.map().len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_saved_progress() {
        let store = InMemoryStore::new();
        let mut progress = hydrated(&store).await;
        progress.record_and_persist(&id("1"), 0.9).await.unwrap();
        assert!(store.get(PROGRESS_STORAGE_KEY).await.unwrap().is_some());

        ProgressPersistence::new(Arc::new(store.clone()))
            .clear()
            .await
            .unwrap();
        assert!(store.get(PROGRESS_STORAGE_KEY).await.unwrap().is_none());
        assert!(hydrated(&store).await.map().is_empty());
    }

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("unavailable".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("quota exceeded".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn storage_failures_never_escape() {
        let mut progress = ProgressStore::new(ProgressPersistence::new(Arc::new(FailingStore)));
        progress.hydrate().await;
        assert!(progress.is_loaded());

        let record = progress.record_and_persist(&id("1"), 0.9).await.unwrap();
        assert!(record.is_watched());
        assert!(progress.persistence().clear().await.is_err());
    }
}
