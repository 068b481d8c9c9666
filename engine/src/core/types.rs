//! CaptionFlow Core Type Definitions
//!
//! Defines fundamental types used throughout the engine.
//! Wire-facing types derive `specta::Type` so TypeScript bindings can be generated.

use serde::{Deserialize, Serialize};
use specta::Type;
use tracing::warn;

// =============================================================================
// ID Types
// =============================================================================

/// Caption unique identifier (ULID)
pub type CaptionId = String;

/// Operation unique identifier (ULID)
pub type OpId = String;

/// Generates a fresh ULID string.
pub fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

// =============================================================================
// Time Types
// =============================================================================

/// Time in milliseconds (non-negative integer)
pub type TimeMs = u64;

/// Signed millisecond delta, used for shifts and raw caller input before clamping
pub type DeltaMs = i64;

/// Shortest span any timing-mutating operation may leave on a caption.
pub const MIN_CAPTION_DURATION_MS: TimeMs = 100;

/// Clamps a signed caller-supplied timestamp to the valid range.
pub fn clamp_time_ms(value: DeltaMs) -> TimeMs {
    if value < 0 {
        0
    } else {
        value as TimeMs
    }
}

/// Half-open millisecond range `[start_ms, end_ms)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct TimeRangeMs {
    pub start_ms: TimeMs,
    pub end_ms: TimeMs,
}

impl TimeRangeMs {
    pub fn new(start_ms: TimeMs, end_ms: TimeMs) -> Self {
        if start_ms > end_ms {
            warn!(
                "TimeRangeMs created with start > end ({} > {}), swapping",
                start_ms, end_ms
            );
            return Self {
                start_ms: end_ms,
                end_ms: start_ms,
            };
        }
        Self { start_ms, end_ms }
    }

    /// Returns duration in milliseconds
    pub fn duration(&self) -> TimeMs {
        self.end_ms - self.start_ms
    }

    /// Checks if a given time is within range
    pub fn contains(&self, time_ms: TimeMs) -> bool {
        time_ms >= self.start_ms && time_ms < self.end_ms
    }

    /// Checks if two ranges overlap
    pub fn overlaps(&self, other: &TimeRangeMs) -> bool {
        self.start_ms < other.end_ms && self.end_ms > other.start_ms
    }

    /// Extends the end so the range lasts at least `min_ms`.
    pub fn with_min_duration(self, min_ms: TimeMs) -> Self {
        if self.duration() >= min_ms {
            return self;
        }
        Self {
            start_ms: self.start_ms,
            end_ms: self.start_ms.saturating_add(min_ms),
        }
    }
}

// =============================================================================
// Colors
// =============================================================================

/// Checks a CSS-style hex color (`#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`).
///
/// The keyword `transparent` is also accepted since the style panel emits it
/// for "no background".
pub fn is_css_color(value: &str) -> bool {
    if value.eq_ignore_ascii_case("transparent") {
        return true;
    }
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 4 | 6 | 8) && hex.bytes().all(|b| b.is_ascii_hexdigit())
}
