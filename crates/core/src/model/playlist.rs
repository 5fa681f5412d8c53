use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::VideoId;
use crate::model::video::{VideoEntry, VideoSource};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlaylistError {
    #[error("playlist must contain at least one video")]
    Empty,

    #[error("duplicate video id in playlist: {0}")]
    DuplicateId(VideoId),
}

//
// ─── PLAYLIST ──────────────────────────────────────────────────────────────────
//

/// Ordered, non-empty list of videos with unique ids.
///
/// Order defines what plays next when a video ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<VideoEntry>,
}

impl Playlist {
    /// Creates a playlist from entries in play order.
    ///
    /// # Errors
    ///
    /// Returns `PlaylistError::Empty` for an empty list and
    /// `PlaylistError::DuplicateId` when two entries share an id.
    pub fn new(entries: Vec<VideoEntry>) -> Result<Self, PlaylistError> {
        if entries.is_empty() {
            return Err(PlaylistError::Empty);
        }
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id()) {
                return Err(PlaylistError::DuplicateId(entry.id().clone()));
            }
        }
        Ok(Self { entries })
    }

    /// The three-video sample course bundled with the app.
    ///
    /// # Panics
    ///
    /// Never in practice: the bundled entries are constants that validate.
    #[must_use]
    pub fn sample_course() -> Self {
        const SAMPLE: [(&str, &str, &str, &str, u32); 3] = [
            (
                "1",
                "https://www.youtube.com/watch?v=TgOgzIqG1p4",
                "Introduction",
                "5 MINUTES",
                0,
            ),
            (
                "2",
                "https://www.w3schools.com/html/mov_bbb.mp4",
                "Course Overview",
                "10 MINUTES",
                1,
            ),
            (
                "3",
                "https://www.learningcontainer.com/wp-content/uploads/2020/05/sample-mp4-file.mp4",
                "Code Editor Installation (Optional)",
                "7 MINUTES",
                0,
            ),
        ];

        let entries = SAMPLE
            .iter()
            .map(|(id, url, title, duration, questions)| {
                VideoEntry::new(
                    VideoId::new(*id).expect("sample id is non-empty"),
                    VideoSource::from_url(url).expect("sample url is valid"),
                    *title,
                    *duration,
                    *questions,
                )
                .expect("sample entry is valid")
            })
            .collect();
        Self::new(entries).expect("sample playlist is valid")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> &VideoEntry {
        &self.entries[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn entries(&self) -> &[VideoEntry] {
        &self.entries
    }

    #[must_use]
    pub fn position(&self, id: &VideoId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }

    #[must_use]
    pub fn at(&self, index: usize) -> Option<&VideoEntry> {
        self.entries.get(index)
    }

    /// The entry immediately after `id` in play order, if any.
    #[must_use]
    pub fn next_after(&self, id: &VideoId) -> Option<&VideoEntry> {
        self.position(id)
            .and_then(|index| self.entries.get(index + 1))
    }
}
