//! Caption Data Models
//!
//! Defines data structures for captions and subtitles.
//!
//! # Overview
//!
//! - Every caption carries a complete, resolved `CaptionStyle`
//! - Word timings are optional and only used for word-level highlighting
//! - `CaptionState` keeps captions ordered by start time (stable for ties)
//!
//! Field names are the canonical JSON schema: they are serialized as-is
//! (snake_case) and must not be renamed.

use serde::{Deserialize, Serialize};
use specta::Type;

use crate::core::{new_id, CaptionId, TimeMs, TimeRangeMs};

// =============================================================================
// Caption Positioning
// =============================================================================

/// Placement of the caption box on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Type, Default)]
pub enum CaptionPosition {
    /// Bottom of screen (default for subtitles)
    #[default]
    Bottom,
    /// Top of screen
    Top,
    /// Vertically centered
    Middle,
    /// Explicit pixel anchor
    Custom { x: i32, y: i32 },
}

/// Horizontal alignment of caption text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Type, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Entrance animation played when a caption appears
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Type, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnimationType {
    #[default]
    None,
    Fade,
    Slide,
    Bounce,
    Zoom,
    Typewriter,
}

// =============================================================================
// Caption Styling
// =============================================================================

/// Styling applied to the word currently being spoken
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Type)]
#[serde(default)]
pub struct WordHighlight {
    pub enabled: bool,
    pub color: String,
    pub background: String,
    pub underline: bool,
    pub bold: bool,
    /// Scale factor applied to the highlighted word (1.0 = unchanged)
    pub scale: f32,
}

impl Default for WordHighlight {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#FFFF00".to_string(),
            background: "#FF000080".to_string(),
            underline: true,
            bold: true,
            scale: 1.1,
        }
    }
}

/// Complete caption style record
///
/// Missing fields fall back to `CaptionStyle::default()` on deserialization,
/// so a stored style is always complete.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Type)]
#[serde(default)]
pub struct CaptionStyle {
    pub position: CaptionPosition,
    pub alignment: TextAlign,
    pub font_family: String,
    /// Font size in pixels
    pub font_size: u32,
    /// Text color (CSS hex)
    pub color: String,
    /// Box background color (CSS hex or `transparent`)
    pub background: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub outline_color: Option<String>,
    pub outline_width: u32,
    pub shadow_color: Option<String>,
    pub shadow_offset_x: i32,
    pub shadow_offset_y: i32,
    pub shadow_blur: f32,
    pub letter_spacing: f32,
    /// Corner radius of the background box
    pub border_radius: f32,
    pub animation_type: AnimationType,
    /// Animation duration in seconds
    pub animation_duration: f32,
    pub highlight: WordHighlight,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            position: CaptionPosition::Bottom,
            alignment: TextAlign::Center,
            font_family: "Arial".to_string(),
            font_size: 16,
            color: "#FFFFFF".to_string(),
            background: "#000000CC".to_string(),
            bold: false,
            italic: false,
            underline: false,
            outline_color: None,
            outline_width: 0,
            shadow_color: None,
            shadow_offset_x: 0,
            shadow_offset_y: 0,
            shadow_blur: 0.0,
            letter_spacing: 0.0,
            border_radius: 0.0,
            animation_type: AnimationType::None,
            animation_duration: 0.3,
            highlight: WordHighlight::default(),
        }
    }
}

// =============================================================================
// Caption Entry
// =============================================================================

/// Timing of a single spoken word inside a caption
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Type)]
pub struct WordTiming {
    pub word: String,
    pub start_ms: TimeMs,
    pub end_ms: TimeMs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl WordTiming {
    pub fn new(word: &str, start_ms: TimeMs, end_ms: TimeMs) -> Self {
        Self {
            word: word.to_string(),
            start_ms,
            end_ms,
            confidence: None,
        }
    }
}

/// A single caption entry with text, timing and resolved style
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Type)]
pub struct Caption {
    pub id: CaptionId,
    pub start_ms: TimeMs,
    pub end_ms: TimeMs,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Recognition confidence in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub style: CaptionStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_timings: Option<Vec<WordTiming>>,
}

impl Caption {
    /// Creates a new caption with the given identity, timing, text and style
    pub fn new(id: &str, start_ms: TimeMs, end_ms: TimeMs, text: &str, style: CaptionStyle) -> Self {
        Self {
            id: id.to_string(),
            start_ms,
            end_ms,
            text: text.to_string(),
            speaker: None,
            confidence: None,
            style,
            word_timings: None,
        }
    }

    /// Creates a caption with auto-generated ID
    pub fn create(start_ms: TimeMs, end_ms: TimeMs, text: &str, style: CaptionStyle) -> Self {
        Self::new(&new_id(), start_ms, end_ms, text, style)
    }

    /// Returns the duration of this caption in milliseconds
    pub fn duration(&self) -> TimeMs {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn range(&self) -> TimeRangeMs {
        TimeRangeMs::new(self.start_ms, self.end_ms)
    }

    /// Number of whitespace-separated words in the text
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Returns true if the caption is visible at the given time
    pub fn is_visible_at(&self, time_ms: TimeMs) -> bool {
        self.range().contains(time_ms)
    }

    /// Returns true if this caption overlaps with another
    pub fn overlaps(&self, other: &Caption) -> bool {
        self.range().overlaps(&other.range())
    }

    pub fn with_speaker(mut self, speaker: &str) -> Self {
        self.speaker = Some(speaker.to_string());
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_word_timings(mut self, timings: Vec<WordTiming>) -> Self {
        self.word_timings = Some(timings);
        self
    }
}

// =============================================================================
// Caption Store
// =============================================================================

/// The authoritative caption collection plus the global style template
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaptionState {
    /// Captions ordered by `start_ms`
    pub captions: Vec<Caption>,
    /// Template applied to newly created captions
    pub global_style: CaptionStyle,
}

impl CaptionState {
    /// Creates an empty store with the default global style
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    pub fn contains(&self, caption_id: &str) -> bool {
        self.index_of(caption_id).is_some()
    }

    /// Gets a caption by ID
    pub fn get(&self, caption_id: &str) -> Option<&Caption> {
        self.captions.iter().find(|c| c.id == caption_id)
    }

    /// Gets a mutable caption by ID
    ///
    /// Callers that change `start_ms` must call `reposition` afterwards.
    pub fn get_mut(&mut self, caption_id: &str) -> Option<&mut Caption> {
        self.captions.iter_mut().find(|c| c.id == caption_id)
    }

    pub fn index_of(&self, caption_id: &str) -> Option<usize> {
        self.captions.iter().position(|c| c.id == caption_id)
    }

    /// Inserts a caption after every caption starting at or before it.
    /// Returns the index it landed at.
    pub fn insert_sorted(&mut self, caption: Caption) -> usize {
        let index = self
            .captions
            .partition_point(|c| c.start_ms <= caption.start_ms);
        self.captions.insert(index, caption);
        index
    }

    /// Inserts a caption at an exact index (used to restore undo state).
    pub fn insert_at(&mut self, index: usize, caption: Caption) {
        if index <= self.captions.len() {
            self.captions.insert(index, caption);
        } else {
            self.captions.push(caption);
        }
    }

    /// Removes a caption by ID, returning its former index and value
    pub fn remove(&mut self, caption_id: &str) -> Option<(usize, Caption)> {
        let index = self.index_of(caption_id)?;
        Some((index, self.captions.remove(index)))
    }

    /// Moves a caption to its sorted slot after its start time changed.
    pub fn reposition(&mut self, caption_id: &str) {
        if let Some((_, caption)) = self.remove(caption_id) {
            self.insert_sorted(caption);
        }
    }

    /// Stable sort by start time
    pub fn sort_captions(&mut self) {
        self.captions.sort_by_key(|c| c.start_ms);
    }

    /// Returns captions visible at the given time
    pub fn captions_at(&self, time_ms: TimeMs) -> Vec<&Caption> {
        self.captions
            .iter()
            .filter(|c| c.is_visible_at(time_ms))
            .collect()
    }

    /// Pairs of captions whose spans intersect, earlier caption first.
    ///
    /// Overlaps are allowed in the store; this only reports them.
    pub fn overlapping_pairs(&self) -> Vec<(CaptionId, CaptionId)> {
        let mut pairs = Vec::new();
        for (i, caption) in self.captions.iter().enumerate() {
            for other in &self.captions[i + 1..] {
                // Sorted by start, so nothing further along can overlap
                if other.start_ms >= caption.end_ms {
                    break;
                }
                if caption.overlaps(other) {
                    pairs.push((caption.id.clone(), other.id.clone()));
                }
            }
        }
        pairs
    }

    /// Returns the end of the last-ending caption
    pub fn duration(&self) -> TimeMs {
        self.captions.iter().map(|c| c.end_ms).max().unwrap_or(0)
    }
}

// =============================================================================
// Tests
// =============================================================================
