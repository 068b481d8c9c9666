//! Timeline Module
//!
//! Viewport math for the caption timeline: zoom, pan, and conversions
//! between screen coordinates and time.

mod transform;

pub use transform::*;
