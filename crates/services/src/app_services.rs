use std::sync::Arc;

use course_core::model::Playlist;
use storage::repository::Storage;

use crate::player::PlayerController;
use crate::progress_store::ProgressPersistence;

/// Assembles app-facing services around one playlist and one storage backend.
#[derive(Clone)]
pub struct AppServices {
    playlist: Arc<Playlist>,
    progress: ProgressPersistence,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, playlist: Playlist) -> Self {
        Self {
            playlist: Arc::new(playlist),
            progress: ProgressPersistence::new(Arc::clone(&storage.local)),
        }
    }

    #[must_use]
    pub fn in_memory(playlist: Playlist) -> Self {
        Self::new(&Storage::in_memory(), playlist)
    }

    #[must_use]
    pub fn playlist(&self) -> Arc<Playlist> {
        Arc::clone(&self.playlist)
    }

    #[must_use]
    pub fn progress(&self) -> ProgressPersistence {
        self.progress.clone()
    }

    /// A controller with saved progress already hydrated.
    pub async fn load_player(&self) -> PlayerController {
        PlayerController::load(self.playlist(), self.progress()).await
    }
}
