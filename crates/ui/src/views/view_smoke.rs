use std::sync::Arc;

use course_core::model::VideoId;
use services::{PROGRESS_STORAGE_KEY, PlaybackEvent};
use storage::repository::{InMemoryStore, KeyValueStore, StorageError};

use super::test_harness::{setup_player_harness, setup_player_harness_with_store};

/// A store whose reads never complete, pinning the player in its loading state.
struct StalledStore;

#[async_trait::async_trait]
impl KeyValueStore for StalledStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

#[tokio::test(flavor = "current_thread")]
async fn player_view_shows_loading_until_progress_is_read() {
    let mut harness = setup_player_harness_with_store(Arc::new(StalledStore));
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Loading..."), "missing loading text in {html}");
    assert!(!html.contains("Topics for This Course"), "rendered too early: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn player_view_renders_playlist_when_ready() {
    let mut harness = setup_player_harness();
    harness.rebuild();
    let html = harness.settle().await;

    assert!(html.contains("Topics for This Course"), "missing sidebar in {html}");
    assert!(html.contains("Introduction"), "missing first title in {html}");
    assert!(html.contains("Course Overview"), "missing second title in {html}");
    assert!(html.contains("1 QUESTION"), "missing question badge in {html}");
    assert!(html.contains("0%"), "missing progress in {html}");
    assert!(html.contains("playlist-row--active"), "missing active row in {html}");
    assert!(!html.contains("icon-watched"), "nothing is watched yet: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn player_view_reflects_saved_progress() {
    let store = InMemoryStore::new()
        .with_entry(
            PROGRESS_STORAGE_KEY,
            r#"{"1":{"progress":92,"status":"Watched"}}"#,
        )
        .expect("seed store");
    let mut harness = setup_player_harness_with_store(Arc::new(store));
    harness.rebuild();
    let html = harness.settle().await;

    assert!(html.contains("33%"), "missing course progress in {html}");
    assert!(html.contains("icon-watched"), "missing watched icon in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn player_view_treats_corrupt_progress_as_empty() {
    let store = InMemoryStore::new()
        .with_entry(PROGRESS_STORAGE_KEY, "{not json")
        .expect("seed store");
    let mut harness = setup_player_harness_with_store(Arc::new(store));
    harness.rebuild();
    let html = harness.settle().await;

    assert!(html.contains("Topics for This Course"), "missing sidebar in {html}");
    assert!(html.contains("0%"), "missing progress in {html}");
    assert!(!html.contains("icon-watched"), "unexpected watched icon in {html}");
}

fn id(raw: &str) -> VideoId {
    VideoId::new(raw).unwrap()
}

/// Markup of the highlighted playlist row.
fn active_row(html: &str) -> &str {
    let start = html
        .find("playlist-row--active")
        .unwrap_or_else(|| panic!("no active row in {html}"));
    let rest = &html[start..];
    let end = rest.find("</li>").unwrap_or(rest.len());
    &rest[..end]
}

async fn saved_progress(store: &InMemoryStore) -> Option<String> {
    store.get(PROGRESS_STORAGE_KEY).await.expect("read store")
}

#[tokio::test(flavor = "current_thread")]
async fn progress_event_marks_watched_and_persists() {
    let store = InMemoryStore::new();
    let mut harness = setup_player_harness_with_store(Arc::new(store.clone()));
    harness.rebuild();
    harness.settle().await;

    harness.dispatch(PlaybackEvent::Progress {
        video: id("1"),
        fraction: 0.85,
    });
    harness.drive_async().await;
    harness.drive_async().await;

    assert_eq!(
        saved_progress(&store).await.as_deref(),
        Some(r#"{"1":{"progress":85,"status":"Watched"}}"#)
    );
    let html = harness.render();
    assert!(html.contains("33%"), "missing course progress in {html}");
    assert!(html.contains("icon-watched"), "missing watched icon in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn ended_event_advances_to_next_row() {
    let store = InMemoryStore::new();
    let mut harness = setup_player_harness_with_store(Arc::new(store.clone()));
    harness.rebuild();
    let html = harness.settle().await;
    assert!(active_row(&html).contains("Introduction"), "{html}");

    harness.dispatch(PlaybackEvent::Ended { video: id("1") });
    harness.drive_async().await;
    harness.drive_async().await;

    let html = harness.render();
    assert!(active_row(&html).contains("Course Overview"), "{html}");
    assert_eq!(
        saved_progress(&store).await.as_deref(),
        Some(r#"{"1":{"progress":100,"status":"Watched"}}"#)
    );
}

#[tokio::test(flavor = "current_thread")]
async fn selecting_a_row_ignores_late_events_from_previous_video() {
    let store = InMemoryStore::new();
    let mut harness = setup_player_harness_with_store(Arc::new(store.clone()));
    harness.rebuild();
    harness.settle().await;

    harness.select("3");
    harness.dispatch(PlaybackEvent::Progress {
        video: id("1"),
        fraction: 0.9,
    });
    harness.drive_async().await;

    let html = harness.render();
    assert!(
        active_row(&html).contains("Code Editor Installation (Optional)"),
        "{html}"
    );
    assert!(html.contains("0%"), "missing progress in {html}");
    assert_eq!(saved_progress(&store).await, None);
}
