use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use course_core::model::{Playlist, VideoId};
use services::{PlaybackEvent, ProgressPersistence};
use storage::repository::{InMemoryStore, KeyValueStore};

use super::player::PlayerTestHandles;
use crate::context::{UiApp, build_app_context};
use crate::views::PlayerView;

#[derive(Clone)]
struct TestApp {
    playlist: Arc<Playlist>,
    progress: ProgressPersistence,
}

impl UiApp for TestApp {
    fn playlist(&self) -> Arc<Playlist> {
        Arc::clone(&self.playlist)
    }

    fn progress(&self) -> ProgressPersistence {
        self.progress.clone()
    }
}

#[derive(Props, Clone)]
struct PlayerHarnessProps {
    app: Arc<TestApp>,
    handles: PlayerTestHandles,
}

impl PartialEq for PlayerHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn PlayerHarness(props: PlayerHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.handles.clone());
    rsx! { PlayerView {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    handles: PlayerTestHandles,
}

impl ViewHarness {
    /// Feeds a playback event through the view's own dispatcher.
    pub fn dispatch(&mut self, event: PlaybackEvent) {
        let dispatch = self.handles.dispatch();
        self.dom.in_runtime(|| dispatch.call(event));
        drive_dom(&mut self.dom);
    }

    /// Clicks a playlist row by id.
    pub fn select(&mut self, id: &str) {
        let select = self.handles.select();
        let id = VideoId::new(id).expect("valid video id");
        self.dom.in_runtime(|| select.call(id));
        drive_dom(&mut self.dom);
    }

    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drives pending tasks until the player has left its loading state.
    pub async fn settle(&mut self) -> String {
        for _ in 0..10 {
            let html = self.render();
            if !html.contains("Loading...") {
                return html;
            }
            self.drive_async().await;
        }
        self.render()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_player_harness() -> ViewHarness {
    setup_player_harness_with_store(Arc::new(InMemoryStore::new()))
}

pub fn setup_player_harness_with_store(store: Arc<dyn KeyValueStore>) -> ViewHarness {
    let progress = ProgressPersistence::new(store);
    let app = Arc::new(TestApp {
        playlist: Arc::new(Playlist::sample_course()),
        progress,
    });
    let handles = PlayerTestHandles::default();
    let dom = VirtualDom::new_with_props(
        PlayerHarness,
        PlayerHarnessProps {
            app,
            handles: handles.clone(),
        },
    );
    ViewHarness { dom, handles }
}
