use std::sync::Arc;

use tracing::debug;

use course_core::model::{Playlist, ProgressMap, VideoEntry, VideoId, WatchRecord, WatchStatus};
use course_core::progress::course_progress;

use crate::error::PlayerError;
use crate::progress_store::{ProgressPersistence, ProgressSnapshot, ProgressStore};

//
// ─── TYPES ─────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerPhase {
    Loading,
    Ready,
}

/// Something the playback capability reported about one video.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackEvent {
    Progress { video: VideoId, fraction: f64 },
    Ended { video: VideoId },
}

impl PlaybackEvent {
    #[must_use]
    pub fn video(&self) -> &VideoId {
        match self {
            PlaybackEvent::Progress { video, .. } | PlaybackEvent::Ended { video } => video,
        }
    }
}

/// Result of a progress-recording transition.
///
/// `snapshot` should be handed to [`ProgressPersistence::save`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub video: VideoId,
    pub record: WatchRecord,
    pub snapshot: ProgressSnapshot,
}

/// Result of an `ended` transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndedOutcome {
    pub update: ProgressUpdate,
    /// The video that became active, or `None` at the end of the playlist.
    pub advanced_to: Option<VideoId>,
}

/// Result of dispatching a [`PlaybackEvent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Progress(ProgressUpdate),
    Ended(EndedOutcome),
    /// The event came from a video that is no longer active.
    Ignored,
}

impl EventOutcome {
    /// The snapshot to persist, if the event mutated progress.
    #[must_use]
    pub fn snapshot(&self) -> Option<&ProgressSnapshot> {
        match self {
            EventOutcome::Progress(update) | EventOutcome::Ended(EndedOutcome { update, .. }) => {
                Some(&update.snapshot)
            }
            EventOutcome::Ignored => None,
        }
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Session state for the course player.
///
/// Owns the active selection and the progress store. Every transition is a
/// plain synchronous method; persisting is left to the caller through the
/// returned snapshots so the controller can live inside UI state.
pub struct PlayerController {
    playlist: Arc<Playlist>,
    store: ProgressStore,
    active: usize,
    playing: bool,
    activation: u64,
}

impl PlayerController {
    #[must_use]
    pub fn new(playlist: Arc<Playlist>, persistence: ProgressPersistence) -> Self {
        Self {
            playlist,
            store: ProgressStore::new(persistence),
            active: 0,
            playing: true,
            activation: 0,
        }
    }

    /// Build a controller and hydrate it in one step.
    pub async fn load(playlist: Arc<Playlist>, persistence: ProgressPersistence) -> Self {
        let mut controller = Self::new(playlist, persistence);
        controller.hydrate().await;
        controller
    }

    pub async fn hydrate(&mut self) {
        self.store.hydrate().await;
        debug!(
            watched = self.watched_count(),
            total = self.total_videos(),
            "player ready"
        );
    }

    #[must_use]
    pub fn phase(&self) -> PlayerPhase {
        if self.store.is_loaded() {
            PlayerPhase::Ready
        } else {
            PlayerPhase::Loading
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    #[must_use]
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    #[must_use]
    pub fn active_video(&self) -> &VideoEntry {
        // `active` only ever holds an index produced from the playlist.
        &self.playlist.entries()[self.active]
    }

    #[must_use]
    pub fn is_active(&self, id: &VideoId) -> bool {
        self.active_video().id() == id
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Bumped on every change of the active video.
    #[must_use]
    pub fn activation(&self) -> u64 {
        self.activation
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressMap {
        self.store.map()
    }

    #[must_use]
    pub fn record(&self, id: &VideoId) -> WatchRecord {
        self.store.record(id)
    }

    #[must_use]
    pub fn watch_status(&self, id: &VideoId) -> WatchStatus {
        self.store.record(id).status()
    }

    #[must_use]
    pub fn persistence(&self) -> &ProgressPersistence {
        self.store.persistence()
    }

    #[must_use]
    pub fn total_videos(&self) -> usize {
        self.playlist.len()
    }

    #[must_use]
    pub fn watched_count(&self) -> usize {
        self.store.map().watched_count(&self.playlist)
    }

    #[must_use]
    pub fn course_progress(&self) -> u8 {
        course_progress(self.watched_count(), self.total_videos())
    }

    fn ensure_ready(&self) -> Result<(), PlayerError> {
        if self.store.is_loaded() {
            Ok(())
        } else {
            Err(PlayerError::NotReady)
        }
    }

    fn activate(&mut self, index: usize) {
        self.active = index;
        self.playing = true;
        self.activation += 1;
        debug!(video = %self.active_video().id(), "active video changed");
    }

    /// Make any playlist entry active and start playing it.
    ///
    /// Selection is free: watch status never gates it.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::NotReady` while loading and
    /// `PlayerError::UnknownVideo` for ids outside the playlist.
    pub fn select_video(&mut self, id: &VideoId) -> Result<(), PlayerError> {
        self.ensure_ready()?;
        let index = self
            .playlist
            .position(id)
            .ok_or_else(|| PlayerError::UnknownVideo(id.clone()))?;
        self.activate(index);
        Ok(())
    }

    /// Record fractional progress for the active video.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::NotReady` while loading and
    /// `PlayerError::Progress` for a non-finite fraction.
    pub fn on_progress(&mut self, fraction: f64) -> Result<ProgressUpdate, PlayerError> {
        self.ensure_ready()?;
        let video = self.active_video().id().clone();
        let record = self.store.record_progress(&video, fraction)?;
        Ok(ProgressUpdate {
            video,
            record,
            snapshot: self.store.snapshot(),
        })
    }

    /// Mark the active video complete and move to the next one, if any.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::NotReady` while loading.
    pub fn on_ended(&mut self) -> Result<EndedOutcome, PlayerError> {
        let update = self.on_progress(1.0)?;
        let advanced_to = self
            .playlist
            .next_after(&update.video)
            .map(|entry| entry.id().clone());
        if let Some(index) = advanced_to.as_ref().and_then(|id| self.playlist.position(id)) {
            self.activate(index);
        }
        Ok(EndedOutcome {
            update,
            advanced_to,
        })
    }

    /// Mirror the playback capability's own play/pause state.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::NotReady` while loading.
    pub fn set_playing(&mut self, playing: bool) -> Result<(), PlayerError> {
        self.ensure_ready()?;
        self.playing = playing;
        Ok(())
    }

    /// Dispatch an event tagged with the video that produced it.
    ///
    /// Events from a video other than the active one are ignored.
    ///
    /// # Errors
    ///
    /// Same as [`PlayerController::on_progress`] and [`PlayerController::on_ended`].
    pub fn handle_playback(&mut self, event: PlaybackEvent) -> Result<EventOutcome, PlayerError> {
        self.ensure_ready()?;
        if !self.is_active(event.video()) {
            debug!(video = %event.video(), "ignoring event from inactive video");
            return Ok(EventOutcome::Ignored);
        }
        match event {
            PlaybackEvent::Progress { fraction, .. } => {
                self.on_progress(fraction).map(EventOutcome::Progress)
            }
            PlaybackEvent::Ended { .. } => self.on_ended().map(EventOutcome::Ended),
        }
    }
}
