use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

use crate::model::ids::VideoId;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VideoError {
    #[error("video source cannot be empty")]
    EmptySource,

    #[error("video source is not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("video title cannot be empty")]
    EmptyTitle,
}

//
// ─── SOURCE LOCATOR ────────────────────────────────────────────────────────────
//

/// Where the playback capability should load a video from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    FilePath(PathBuf),
    Url(Url),
}

impl VideoSource {
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, VideoError> {
        let p = path.into();
        if p.as_os_str().is_empty() {
            return Err(VideoError::EmptySource);
        }
        Ok(VideoSource::FilePath(p))
    }

    pub fn from_url(url: impl AsRef<str>) -> Result<Self, VideoError> {
        let s = url.as_ref().trim();
        if s.is_empty() {
            return Err(VideoError::EmptySource);
        }
        let u = Url::parse(s).map_err(|err| VideoError::InvalidUrl(err.to_string()))?;
        Ok(VideoSource::Url(u))
    }

    /// Parses a locator as supplied in a playlist file.
    ///
    /// Anything with a URL scheme (`https:`, `file:`, ...) is a URL; everything
    /// else is treated as a local file path.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, VideoError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(VideoError::EmptySource);
        }
        match Url::parse(s) {
            // Single-letter schemes are Windows drive letters (`C:\...`).
            Ok(u) if u.scheme().len() > 1 => Ok(VideoSource::Url(u)),
            Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => Self::from_file(s),
            Err(err) => Err(VideoError::InvalidUrl(err.to_string())),
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            VideoSource::FilePath(p) => Some(p.as_path()),
            VideoSource::Url(_) => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            VideoSource::Url(u) => Some(u),
            VideoSource::FilePath(_) => None,
        }
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSource::FilePath(p) => write!(f, "{}", p.display()),
            VideoSource::Url(u) => write!(f, "{u}"),
        }
    }
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// Static descriptor of one playlist item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
    id: VideoId,
    source: VideoSource,
    title: String,
    duration_label: String,
    question_count: u32,
}

impl VideoEntry {
    /// Creates a new entry.
    ///
    /// # Errors
    ///
    /// Returns `VideoError::EmptyTitle` if the title is blank.
    pub fn new(
        id: VideoId,
        source: VideoSource,
        title: impl Into<String>,
        duration_label: impl Into<String>,
        question_count: u32,
    ) -> Result<Self, VideoError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(VideoError::EmptyTitle);
        }
        Ok(Self {
            id,
            source,
            title,
            duration_label: duration_label.into().trim().to_owned(),
            question_count,
        })
    }

    #[must_use]
    pub fn id(&self) -> &VideoId {
        &self.id
    }

    #[must_use]
    pub fn source(&self) -> &VideoSource {
        &self.source
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Human-readable length, e.g. "5 MINUTES". Free-form; never parsed.
    #[must_use]
    pub fn duration_label(&self) -> &str {
        &self.duration_label
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }
}
