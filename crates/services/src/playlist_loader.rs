use std::path::Path;

use serde::Deserialize;
use tracing::info;

use course_core::model::{Playlist, VideoEntry, VideoId, VideoSource};

use crate::error::PlaylistLoadError;

/// One playlist entry as written in a playlist file.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistEntryDraft {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub questions: u32,
}

impl PlaylistEntryDraft {
    fn into_entry(self, index: usize) -> Result<VideoEntry, PlaylistLoadError> {
        let id = VideoId::new(self.id)
            .map_err(|source| PlaylistLoadError::InvalidId { index, source })?;
        let source = VideoSource::parse(&self.url)
            .map_err(|source| PlaylistLoadError::InvalidEntry { index, source })?;
        VideoEntry::new(id, source, self.title, self.duration, self.questions)
            .map_err(|source| PlaylistLoadError::InvalidEntry { index, source })
    }
}

/// Parse a playlist from a JSON array of entries.
///
/// # Errors
///
/// Returns `PlaylistLoadError` for invalid JSON, an invalid entry, or a
/// playlist that is empty or repeats an id.
pub fn parse_playlist(json: &str) -> Result<Playlist, PlaylistLoadError> {
    let drafts: Vec<PlaylistEntryDraft> = serde_json::from_str(json)?;
    let entries = drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| draft.into_entry(index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Playlist::new(entries)?)
}

/// Read and parse a playlist file.
///
/// # Errors
///
/// Returns `PlaylistLoadError::Io` if the file cannot be read, otherwise the
/// same errors as [`parse_playlist`].
pub fn load_playlist_file(path: &Path) -> Result<Playlist, PlaylistLoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| PlaylistLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let playlist = parse_playlist(&json)?;
    info!(path = %path.display(), videos = playlist.len(), "loaded playlist");
    Ok(playlist)
}
