use serde::{Deserialize, Deserializer, Serialize};

use crate::progress::{PlayedFraction, reaches_watched_threshold};

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Whether a video counts as watched.
///
/// Only ever upgrades: once `Watched`, a record stays `Watched`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WatchStatus {
    #[default]
    Unwatched,
    Watched,
}

impl WatchStatus {
    #[must_use]
    pub fn is_watched(self) -> bool {
        matches!(self, WatchStatus::Watched)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WatchStatus::Unwatched => "Unwatched",
            WatchStatus::Watched => "Watched",
        }
    }
}

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

/// Per-video watch progress as persisted.
///
/// `progress` is the last reported whole percentage (0-100). It follows the
/// playback position, so seeking backwards lowers it; `status` never
/// downgrades.
///
/// Reading is lenient about the number: any JSON number is rounded and
/// clamped to 0-100, and a missing field falls back to the default record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRecord {
    #[serde(default, deserialize_with = "deserialize_percentage")]
    progress: u8,
    #[serde(default)]
    status: WatchStatus,
}

impl WatchRecord {
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub fn status(&self) -> WatchStatus {
        self.status
    }

    #[must_use]
    pub fn is_watched(&self) -> bool {
        self.status.is_watched()
    }

    /// Returns the record that results from reporting `played`.
    ///
    /// The new status is `Watched` when the percentage reaches the threshold,
    /// otherwise the current status is kept.
    #[must_use]
    pub fn advanced(self, played: PlayedFraction) -> Self {
        let percentage = played.percentage();
        let status = if reaches_watched_threshold(percentage) {
            WatchStatus::Watched
        } else {
            self.status
        };
        Self {
            progress: percentage,
            status,
        }
    }
}

fn deserialize_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Ok(0);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percentage = raw.round().clamp(0.0, 100.0) as u8;
    Ok(percentage)
}
