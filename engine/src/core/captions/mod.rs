//! Caption System Module
//!
//! Provides the caption data model and the pure operations the editor builds on:
//! - Caption data models (Caption, CaptionStyle, CaptionState)
//! - Style resolution and validation
//! - JSON, SRT and VTT parsing and export
//! - Text tools (find/replace, profanity filter, punctuation, reading speed)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Caption System                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  models.rs     - Data structures (Caption, Style, State)        │
//! │  style.rs      - Override resolution and validation             │
//! │  formats.rs    - JSON/SRT/VTT parsing and export                │
//! │  text.rs       - Text transformations and reading speed         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use captionflow_lib::core::captions::{parse_srt, export_vtt, Caption, CaptionStyle};
//!
//! let cues = parse_srt(&std::fs::read_to_string("subtitles.srt")?)?;
//! let captions: Vec<Caption> = cues
//!     .into_iter()
//!     .map(|cue| Caption::create(cue.start_ms, cue.end_ms, &cue.text, CaptionStyle::default()))
//!     .collect();
//! let vtt_content = export_vtt(&captions);
//! ```

mod formats;
mod models;
mod style;
pub mod text;

pub use formats::{
    export_json, export_srt, export_vtt, format_timestamp, parse_json, parse_srt,
    parse_timestamp, parse_vtt, CaptionFormat, Cue, ParseError,
};
pub use models::{
    AnimationType, Caption, CaptionPosition, CaptionState, CaptionStyle, TextAlign, WordHighlight,
    WordTiming,
};
pub use style::{resolve_style, StyleOverrides};
pub use text::{ReadingSpeedEntry, ReadingSpeedFlag};
