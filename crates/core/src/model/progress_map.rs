use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::ids::VideoId;
use crate::model::playlist::Playlist;
use crate::model::watch::{WatchRecord, WatchStatus};
use crate::progress::{PlayedFraction, course_progress};

/// Watch records for every video that has reported progress.
///
/// Serializes as a flat JSON object keyed by video id:
/// `{"2": {"progress": 81, "status": "Watched"}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressMap {
    records: HashMap<VideoId, WatchRecord>,
}

impl ProgressMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record for `id`, or the implicit `{0, Unwatched}` record.
    #[must_use]
    pub fn record(&self, id: &VideoId) -> WatchRecord {
        self.records.get(id).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn status(&self, id: &VideoId) -> WatchStatus {
        self.record(id).status()
    }

    /// Applies a progress report to one video and returns its new record.
    ///
    /// All other records are left untouched.
    pub fn record_progress(&mut self, id: &VideoId, played: PlayedFraction) -> WatchRecord {
        let next = self.record(id).advanced(played);
        self.records.insert(id.clone(), next);
        next
    }

    /// Number of playlist entries whose record is `Watched`.
    ///
    /// Records for ids that are no longer in the playlist are not counted.
    #[must_use]
    pub fn watched_count(&self, playlist: &Playlist) -> usize {
        playlist
            .iter()
            .filter(|entry| self.status(entry.id()).is_watched())
            .count()
    }

    #[must_use]
    pub fn course_progress(&self, playlist: &Playlist) -> u8 {
        course_progress(self.watched_count(playlist), playlist.len())
    }
}

/// Collects records read one by one, e.g. when skipping damaged entries.
impl FromIterator<(VideoId, WatchRecord)> for ProgressMap {
    fn from_iter<I: IntoIterator<Item = (VideoId, WatchRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
