//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use course_core::model::{ParseIdError, PlaylistError, VideoError, VideoId};
use course_core::progress::ProgressError;

/// Errors emitted by `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressStoreError {
    #[error("progress store has not finished loading")]
    NotLoaded,
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted by `PlayerController` transitions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayerError {
    #[error("player is still loading saved progress")]
    NotReady,
    #[error("video {0} is not in the playlist")]
    UnknownVideo(VideoId),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

impl From<ProgressStoreError> for PlayerError {
    fn from(err: ProgressStoreError) -> Self {
        match err {
            ProgressStoreError::NotLoaded => PlayerError::NotReady,
            ProgressStoreError::Progress(inner) => PlayerError::Progress(inner),
        }
    }
}

/// Errors emitted while loading a playlist file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlaylistLoadError {
    #[error("failed to read playlist {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("playlist is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("playlist entry {index}: {source}")]
    InvalidId {
        index: usize,
        #[source]
        source: ParseIdError,
    },
    #[error("playlist entry {index}: {source}")]
    InvalidEntry {
        index: usize,
        #[source]
        source: VideoError,
    },
    #[error(transparent)]
    Playlist(#[from] PlaylistError),
}
