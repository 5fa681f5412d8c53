use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a video in a playlist.
///
/// Ids are opaque strings supplied with the playlist ("1", "intro", ...).
/// The only requirement is that they are non-empty and stable across sessions,
/// since persisted watch records are keyed by them.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Creates a new `VideoId`.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the id is empty or only whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, ParseIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                kind: "VideoId".to_string(),
            });
        }
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VideoId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        VideoId::new(value)
    }
}

impl From<VideoId> for String {
    fn from(value: VideoId) -> Self {
        value.0
    }
}

impl Borrow<str> for VideoId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VideoId({})", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for VideoId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VideoId::new(s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_display() {
        let id = VideoId::new("42").unwrap();
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_video_id_from_str_trims() {
        let id: VideoId = "  intro ".parse().unwrap();
        assert_eq!(id.as_str(), "intro");
    }

    #[test]
    fn test_video_id_from_str_empty() {
        assert!("".parse::<VideoId>().is_err());
        assert!("   ".parse::<VideoId>().is_err());
    }

    #[test]
    fn test_video_id_serializes_as_plain_string() {
        let id = VideoId::new("2").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"2\"");
    }
}
