//! Transcript Ingestion
//!
//! Speech recognition runs outside the engine and hands back timestamped
//! segments. Each segment becomes one `add_caption` call, so every caption it
//! produces can be undone on its own.

use serde::{Deserialize, Serialize};
use specta::Type;
use tracing::{info, warn};

use crate::core::captions::{parse_srt, parse_vtt, CaptionFormat, Cue, ParseError};
use crate::core::{CaptionEditor, CaptionId, CoreError, CoreResult, DeltaMs};

/// One recognized utterance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    #[serde(alias = "start_ms")]
    pub start_ms: DeltaMs,
    #[serde(alias = "end_ms")]
    pub end_ms: DeltaMs,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start_ms: DeltaMs, end_ms: DeltaMs, text: &str) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.to_string(),
        }
    }
}

impl From<Cue> for TranscriptSegment {
    fn from(cue: Cue) -> Self {
        Self {
            start_ms: cue.start_ms as DeltaMs,
            end_ms: cue.end_ms as DeltaMs,
            text: cue.text,
        }
    }
}

/// Reads a transcript delivered as a cue stream (SRT/VTT) or a JSON array of
/// segments.
pub fn parse_transcript(format: CaptionFormat, content: &str) -> CoreResult<Vec<TranscriptSegment>> {
    let segments = match format {
        CaptionFormat::Srt => parse_srt(content)?.into_iter().map(Into::into).collect(),
        CaptionFormat::Vtt => parse_vtt(content)?.into_iter().map(Into::into).collect(),
        CaptionFormat::Json => serde_json::from_str(content)
            .map_err(|e| ParseError::InvalidFormat(format!("Invalid transcript JSON: {}", e)))?,
    };
    Ok(segments)
}

/// Adds one caption per segment, in the order given.
///
/// Segments whose end is not after their start are skipped. Recognizer text
/// is trimmed. Returns the ids of the captions created.
pub fn ingest_transcript(
    editor: &mut CaptionEditor,
    segments: &[TranscriptSegment],
) -> CoreResult<Vec<CaptionId>> {
    let mut created = Vec::with_capacity(segments.len());
    for segment in segments {
        match editor.add_caption(segment.start_ms, segment.end_ms, segment.text.trim()) {
            Ok(id) => created.push(id),
            Err(CoreError::InvalidRange(reason)) => {
                warn!(
                    start_ms = segment.start_ms,
                    end_ms = segment.end_ms,
                    "Skipping transcript segment: {}",
                    reason
                );
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        segments = segments.len(),
        created = created.len(),
        "Ingested transcript"
    );
    Ok(created)
}
