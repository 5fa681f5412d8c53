#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

use dioxus::prelude::*;
use tracing::debug;

use course_core::model::VideoId;
use course_core::progress::PlayedFraction;
use services::{PlaybackEvent, PlayerController, ProgressPersistence, ProgressSnapshot};

use super::scripts::{VIDEO_ELEMENT_ID, read_playback_position, resume_playback, scroll_to_top};
use super::sidebar::CourseSidebar;
use crate::context::AppContext;
use crate::vm::{map_active_video, map_course_progress, map_playlist_rows};

fn persist(progress: &ProgressPersistence, snapshot: &ProgressSnapshot) {
    let progress = progress.clone();
    let snapshot = snapshot.clone();
    spawn(async move {
        progress.save(&snapshot).await;
    });
}

#[component]
pub fn PlayerView() -> Element {
    let ctx = use_context::<AppContext>();
    let progress = ctx.progress();
    let player = use_signal(|| None::<PlayerController>);

    use_future(move || {
        let ctx = ctx.clone();
        let mut player = player;
        async move {
            let loaded = ctx.load_player().await;
            player.set(Some(loaded));
        }
    });

    let dispatch = use_callback(move |event: PlaybackEvent| {
        let mut player = player;
        let result = player
            .write()
            .as_mut()
            .map(|controller| controller.handle_playback(event));
        match result {
            Some(Ok(outcome)) => {
                if let Some(snapshot) = outcome.snapshot() {
                    persist(&progress, snapshot);
                }
            }
            Some(Err(err)) => debug!(error = %err, "playback event not recorded"),
            None => {}
        }
    });

    let select = use_callback(move |id: VideoId| {
        let mut player = player;
        if let Some(controller) = player.write().as_mut() {
            if let Err(err) = controller.select_video(&id) {
                debug!(error = %err, "selection rejected");
            }
        }
    });

    let set_playing = use_callback(move |playing: bool| {
        let mut player = player;
        if let Some(controller) = player.write().as_mut() {
            if let Err(err) = controller.set_playing(playing) {
                debug!(error = %err, playing, "play state not updated");
            }
        }
    });

    // Every change of the active video scrolls back to the player.
    let activation = use_memo(move || player.read().as_ref().map(PlayerController::activation));
    use_effect(move || {
        if activation().is_some() {
            spawn(scroll_to_top());
        }
    });

    let playback_state = use_memo(move || {
        player
            .read()
            .as_ref()
            .map(|controller| (controller.activation(), controller.is_playing()))
    });
    use_effect(move || {
        if let Some((_, true)) = playback_state() {
            spawn(resume_playback());
        }
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<PlayerTestHandles>() {
                handles.register(dispatch, select);
            }
        }
    }

    let guard = player.read();
    let Some(controller) = guard.as_ref() else {
        return rsx! {
            div { class: "page player-loading", "Loading..." }
        };
    };

    let active = map_active_video(controller);
    let course = map_course_progress(controller);
    let rows = map_playlist_rows(controller);
    drop(guard);

    let progress_video = active.id.clone();
    let ended_video = active.id.clone();

    rsx! {
        div { class: "page player-page",
            section { class: "player-main",
                video {
                    key: "{active.id}",
                    id: VIDEO_ELEMENT_ID,
                    class: "player-video",
                    src: "{active.src}",
                    autoplay: active.playing,
                    controls: true,
                    ontimeupdate: move |_| {
                        let video = progress_video.clone();
                        spawn(async move {
                            let Some((current, duration)) = read_playback_position().await else {
                                return;
                            };
                            let Ok(played) = PlayedFraction::from_position(current, duration) else {
                                return;
                            };
                            dispatch.call(PlaybackEvent::Progress {
                                video,
                                fraction: played.value(),
                            });
                        });
                    },
                    onended: move |_| {
                        dispatch.call(PlaybackEvent::Ended {
                            video: ended_video.clone(),
                        });
                    },
                    onplay: move |_| set_playing.call(true),
                    onpause: move |_| set_playing.call(false),
                }
                h1 { class: "player-title", "{active.title}" }
            }

            CourseSidebar { progress: course, rows, on_select: move |id| select.call(id) }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct PlayerTestHandles {
    dispatch: Rc<RefCell<Option<Callback<PlaybackEvent>>>>,
    select: Rc<RefCell<Option<Callback<VideoId>>>>,
}

#[cfg(test)]
impl PlayerTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<PlaybackEvent>, select: Callback<VideoId>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.select.borrow_mut() = Some(select);
    }

    pub(crate) fn dispatch(&self) -> Callback<PlaybackEvent> {
        (*self.dispatch.borrow()).expect("player dispatch registered")
    }

    pub(crate) fn select(&self) -> Callback<VideoId> {
        (*self.select.borrow()).expect("player select registered")
    }
}
