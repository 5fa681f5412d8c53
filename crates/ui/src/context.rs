use std::sync::Arc;

use course_core::model::Playlist;
use services::{PlayerController, ProgressPersistence};

pub trait UiApp: Send + Sync {
    fn playlist(&self) -> Arc<Playlist>;
    fn progress(&self) -> ProgressPersistence;
}

#[derive(Clone)]
pub struct AppContext {
    playlist: Arc<Playlist>,
    progress: ProgressPersistence,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            playlist: app.playlist(),
            progress: app.progress(),
        }
    }

    #[must_use]
    pub fn playlist(&self) -> Arc<Playlist> {
        Arc::clone(&self.playlist)
    }

    #[must_use]
    pub fn progress(&self) -> ProgressPersistence {
        self.progress.clone()
    }

    /// A controller with saved progress hydrated.
    pub async fn load_player(&self) -> PlayerController {
        PlayerController::load(self.playlist(), self.progress()).await
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
