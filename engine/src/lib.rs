//! CaptionFlow Core Library
//!
//! Caption editing engine: a caption store with undoable edits, subtitle
//! import/export, timeline coordinate math and waveform peaks.
//!
//! ## TypeScript Bindings
//!
//! Wire types derive `specta::Type` so a UI shell can generate TypeScript
//! definitions for them.
//!
//! ## Example
//!
//! ```
//! use captionflow_lib::core::CaptionEditor;
//!
//! let mut editor = CaptionEditor::new();
//! let id = editor.add_caption(0, 3000, "Hello world").unwrap();
//! editor.split_caption(&id, 1500).unwrap();
//! assert_eq!(editor.captions().len(), 2);
//!
//! editor.undo().unwrap();
//! assert_eq!(editor.captions()[0].text, "Hello world");
//! ```

pub mod core;
pub mod ipc;
