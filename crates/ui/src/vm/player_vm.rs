use course_core::model::{VideoEntry, VideoId, VideoSource};
use services::PlayerController;

/// One row of the playlist sidebar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistRowVm {
    pub id: VideoId,
    pub title: String,
    pub duration_label: String,
    pub question_badge: Option<String>,
    pub watched: bool,
    pub active: bool,
}

/// Course completion header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CourseProgressVm {
    pub percent: u8,
    pub watched: usize,
    pub total: usize,
}

/// What the video pane needs to render the active entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveVideoVm {
    pub id: VideoId,
    pub title: String,
    pub src: String,
    pub playing: bool,
}

#[must_use]
pub fn map_playlist_rows(player: &PlayerController) -> Vec<PlaylistRowVm> {
    player
        .playlist()
        .iter()
        .map(|entry| PlaylistRowVm {
            id: entry.id().clone(),
            title: entry.title().to_owned(),
            duration_label: entry.duration_label().to_owned(),
            question_badge: question_badge(entry),
            watched: player.watch_status(entry.id()).is_watched(),
            active: player.is_active(entry.id()),
        })
        .collect()
}

#[must_use]
pub fn map_course_progress(player: &PlayerController) -> CourseProgressVm {
    CourseProgressVm {
        percent: player.course_progress(),
        watched: player.watched_count(),
        total: player.total_videos(),
    }
}

#[must_use]
pub fn map_active_video(player: &PlayerController) -> ActiveVideoVm {
    let entry = player.active_video();
    ActiveVideoVm {
        id: entry.id().clone(),
        title: entry.title().to_owned(),
        src: video_src(entry.source()),
        playing: player.is_playing(),
    }
}

fn question_badge(entry: &VideoEntry) -> Option<String> {
    match entry.question_count() {
        0 => None,
        count => Some(format!("{count} QUESTION")),
    }
}

/// The `src` attribute for a `<video>` element.
#[must_use]
pub fn video_src(source: &VideoSource) -> String {
    match source {
        VideoSource::Url(url) => url.to_string(),
        VideoSource::FilePath(path) => path.display().to_string(),
    }
}
