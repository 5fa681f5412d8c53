use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("played fraction must be finite, got {provided}")]
    InvalidFraction { provided: f64 },
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// A record flips to `Watched` once this much of the video has been played.
pub const WATCHED_THRESHOLD_PERCENT: u8 = 80;

/// Fraction of a video that has been played, always within `[0, 1]`.
///
/// # Examples
///
/// ```
/// # use course_core::progress::PlayedFraction;
/// let played = PlayedFraction::new(0.794).unwrap();
/// assert_eq!(played.percentage(), 79);
/// assert_eq!(PlayedFraction::new(1.7).unwrap().percentage(), 100);
/// assert!(PlayedFraction::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PlayedFraction(f64);

impl PlayedFraction {
    pub const COMPLETE: Self = Self(1.0);

    /// Validates a fraction reported by the playback capability.
    ///
    /// Finite values outside `[0, 1]` are clamped; players occasionally report
    /// a position slightly past the duration.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidFraction` for NaN or infinite values.
    pub fn new(value: f64) -> Result<Self, ProgressError> {
        if !value.is_finite() {
            return Err(ProgressError::InvalidFraction { provided: value });
        }
        Ok(Self(value.clamp(0.0, 1.0)))
    }

    /// Builds a fraction from a playback position and total duration (seconds).
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidFraction` when the duration is unknown
    /// (zero, NaN, or infinite as for live streams).
    pub fn from_position(current_secs: f64, duration_secs: f64) -> Result<Self, ProgressError> {
        if !(duration_secs.is_finite() && duration_secs > 0.0) {
            return Err(ProgressError::InvalidFraction {
                provided: current_secs / duration_secs,
            });
        }
        Self::new(current_secs / duration_secs)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Whole percentage, `round(fraction * 100)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percentage(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

/// Whether a percentage is enough to count a video as watched.
#[must_use]
pub fn reaches_watched_threshold(percentage: u8) -> bool {
    percentage >= WATCHED_THRESHOLD_PERCENT
}

/// Course completion as a whole percentage: `round(100 * watched / total)`.
///
/// An empty course reports 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn course_progress(watched: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let watched = watched.min(total);
    ((watched as f64 / total as f64) * 100.0).round() as u8
}
