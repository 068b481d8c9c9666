//! CaptionFlow Core Engine
//!
//! Caption store, undoable edit commands, subtitle formats, timeline math and
//! waveform peaks. Everything here is synchronous and single-owner; the
//! [`CaptionEditor`] facade is the entry point for callers.

pub mod captions;
pub mod commands;
pub mod settings;
pub mod timeline;
pub mod waveform;

mod editor;
pub use editor::CaptionEditor;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

#[cfg(test)]
mod tests_destructive;
