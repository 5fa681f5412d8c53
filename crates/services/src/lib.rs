#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod player;
pub mod playlist_loader;
pub mod progress_store;

pub use app_services::AppServices;
pub use error::{PlayerError, PlaylistLoadError, ProgressStoreError};
pub use player::{
    EndedOutcome, EventOutcome, PlaybackEvent, PlayerController, PlayerPhase, ProgressUpdate,
};
pub use playlist_loader::{load_playlist_file, parse_playlist};
pub use progress_store::{
    PROGRESS_STORAGE_KEY, ProgressPersistence, ProgressSnapshot, ProgressStore,
};
