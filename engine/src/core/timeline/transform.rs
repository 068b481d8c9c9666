//! Timeline Transform
//!
//! Pure coordinate math for a zoomable, pannable timeline.
//!
//! Coordinates:
//! - screen x: pixels relative to the visible viewport
//! - world x: `screen x + offset`, in the zoomed content space of width
//!   `width_px * scale`
//!
//! Every function takes the current transform by value and returns a new
//! value; nothing here holds state.

use serde::{Deserialize, Serialize};
use specta::Type;

/// Zoom multiplier applied per wheel notch
pub const ZOOM_FACTOR: f64 = 1.2;

/// Maximum zoom level
pub const MAX_SCALE: f64 = 100.0;

/// Minimum zoom level (whole duration fits the viewport)
pub const MIN_SCALE: f64 = 1.0;

/// Zoom level and horizontal scroll of the timeline viewport
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Type)]
pub struct TimelineTransform {
    /// Zoom level, `MIN_SCALE..=MAX_SCALE`
    pub scale: f64,
    /// Scroll offset in pixels, `0..=width * (scale - 1)`
    pub offset: f64,
}

impl Default for TimelineTransform {
    fn default() -> Self {
        Self {
            scale: MIN_SCALE,
            offset: 0.0,
        }
    }
}

fn valid_width(width_px: f64) -> bool {
    width_px.is_finite() && width_px > 0.0
}

/// Largest offset allowed for a viewport width at a zoom level
pub fn max_offset(width_px: f64, scale: f64) -> f64 {
    if !valid_width(width_px) {
        return 0.0;
    }
    (width_px * (scale - 1.0)).max(0.0)
}

impl TimelineTransform {
    pub fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    /// Returns this transform with scale and offset clamped into range.
    ///
    /// Non-finite components fall back to the default value.
    pub fn normalized(self, width_px: f64) -> Self {
        let scale = if self.scale.is_finite() {
            self.scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            MIN_SCALE
        };
        let offset = if self.offset.is_finite() {
            self.offset.clamp(0.0, max_offset(width_px, scale))
        } else {
            0.0
        };
        Self { scale, offset }
    }
}

/// Zooms in (`delta_y < 0`) or out (`delta_y > 0`) around `mouse_x`.
///
/// The time under the pointer stays under the pointer unless the offset has
/// to be clamped at either end of the timeline.
pub fn handle_wheel(
    transform: TimelineTransform,
    _duration_ms: f64,
    width_px: f64,
    mouse_x: f64,
    delta_y: f64,
) -> TimelineTransform {
    let current = transform.normalized(width_px);
    if !valid_width(width_px) || !mouse_x.is_finite() || !delta_y.is_finite() || delta_y == 0.0 {
        return current;
    }

    let factor = if delta_y < 0.0 {
        ZOOM_FACTOR
    } else {
        1.0 / ZOOM_FACTOR
    };
    let new_scale = (current.scale * factor).clamp(MIN_SCALE, MAX_SCALE);

    let world_x = mouse_x + current.offset;
    let new_offset = world_x * (new_scale / current.scale) - mouse_x;

    TimelineTransform {
        scale: new_scale,
        offset: new_offset.clamp(0.0, max_offset(width_px, new_scale)),
    }
}

/// Pans relative to the transform captured when the drag started.
pub fn handle_pan_move(
    start: TimelineTransform,
    width_px: f64,
    start_mouse_x: f64,
    current_mouse_x: f64,
) -> TimelineTransform {
    let start = start.normalized(width_px);
    let drag = current_mouse_x - start_mouse_x;
    if !drag.is_finite() {
        return start;
    }

    TimelineTransform {
        scale: start.scale,
        offset: (start.offset - drag).clamp(0.0, max_offset(width_px, start.scale)),
    }
}

/// Maps a viewport x coordinate to a time, clamped to `[0, duration_ms]`.
pub fn get_time_from_click(
    transform: TimelineTransform,
    duration_ms: f64,
    width_px: f64,
    mouse_x: f64,
) -> f64 {
    if !valid_width(width_px) || !duration_ms.is_finite() || duration_ms <= 0.0 {
        return 0.0;
    }
    let t = transform.normalized(width_px);
    let world_x = mouse_x + t.offset;
    let time_ms = world_x / (width_px * t.scale) * duration_ms;
    if time_ms.is_nan() {
        return 0.0;
    }
    time_ms.clamp(0.0, duration_ms)
}

/// Maps a time to a viewport x coordinate (may fall outside `[0, width_px]`).
pub fn get_x_from_time(
    transform: TimelineTransform,
    duration_ms: f64,
    width_px: f64,
    time_ms: f64,
) -> f64 {
    if !valid_width(width_px) || !duration_ms.is_finite() || duration_ms <= 0.0 {
        return 0.0;
    }
    let t = transform.normalized(width_px);
    let x = time_ms / duration_ms * width_px * t.scale - t.offset;
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Time span currently visible in the viewport
pub fn visible_range(transform: TimelineTransform, duration_ms: f64, width_px: f64) -> (f64, f64) {
    (
        get_time_from_click(transform, duration_ms, width_px, 0.0),
        get_time_from_click(transform, duration_ms, width_px, width_px),
    )
}
