//! Structural Caption Commands
//!
//! Split and merge: commands that change how many captions exist while
//! carrying text, style and word timings across.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    captions::{text::split_words, Caption, CaptionState, WordTiming},
    clamp_time_ms,
    commands::{Command, CommandResult, StateChange},
    new_id, CaptionId, CoreError, CoreResult, DeltaMs, TimeMs, MIN_CAPTION_DURATION_MS,
};

/// Partitions word timings by start time around `split_ms`.
///
/// Words starting before the split stay left and are clipped to it; the rest
/// go right and start no earlier than the split.
fn partition_word_timings(
    timings: &[WordTiming],
    split_ms: TimeMs,
) -> (Vec<WordTiming>, Vec<WordTiming>) {
    let (mut left, mut right): (Vec<_>, Vec<_>) =
        timings.iter().cloned().partition(|w| w.start_ms < split_ms);
    for word in &mut left {
        word.end_ms = word.end_ms.min(split_ms);
    }
    for word in &mut right {
        word.start_ms = word.start_ms.max(split_ms);
        word.end_ms = word.end_ms.max(word.start_ms);
    }
    (left, right)
}

fn non_empty(timings: Vec<WordTiming>) -> Option<Vec<WordTiming>> {
    if timings.is_empty() {
        None
    } else {
        Some(timings)
    }
}

// =============================================================================
// SplitCaptionCommand
// =============================================================================

/// Command to split a caption in two at a point in time.
///
/// The first half keeps the original id; the second half gets a new id that is
/// reused on redo.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitCaptionCommand {
    pub caption_id: CaptionId,
    pub split_ms: DeltaMs,
    #[serde(skip)]
    second_id: Option<CaptionId>,
    #[serde(skip)]
    original: Option<(usize, Caption)>,
}

impl SplitCaptionCommand {
    pub fn new(caption_id: &str, split_ms: DeltaMs) -> Self {
        Self {
            caption_id: caption_id.to_string(),
            split_ms,
            second_id: None,
            original: None,
        }
    }

    /// Id of the second half, once executed
    pub fn second_id(&self) -> Option<&str> {
        self.second_id.as_deref()
    }
}

impl Command for SplitCaptionCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        let index = state
            .index_of(&self.caption_id)
            .ok_or_else(|| CoreError::NotFound(self.caption_id.clone()))?;
        let original = state.captions[index].clone();

        let split_ms = clamp_time_ms(self.split_ms);
        if split_ms <= original.start_ms || split_ms >= original.end_ms {
            return Err(CoreError::InvalidRange(format!(
                "Split point {} is outside caption [{}, {})",
                self.split_ms, original.start_ms, original.end_ms
            )));
        }
        if split_ms - original.start_ms < MIN_CAPTION_DURATION_MS
            || original.end_ms - split_ms < MIN_CAPTION_DURATION_MS
        {
            return Err(CoreError::InvalidRange(format!(
                "Splitting at {} would leave a half shorter than {} ms",
                split_ms, MIN_CAPTION_DURATION_MS
            )));
        }

        let fraction =
            (split_ms - original.start_ms) as f64 / original.duration() as f64;
        let (left_text, right_text) = split_words(&original.text, fraction);

        let (left_words, right_words) = match &original.word_timings {
            Some(timings) => {
                let (left, right) = partition_word_timings(timings, split_ms);
                (non_empty(left), non_empty(right))
            }
            None => (None, None),
        };

        let second_id = self.second_id.clone().unwrap_or_else(new_id);

        let mut first = original.clone();
        first.end_ms = split_ms;
        first.text = left_text;
        first.word_timings = left_words;

        let mut second = original.clone();
        second.id = second_id.clone();
        second.start_ms = split_ms;
        second.text = right_text;
        second.word_timings = right_words;

        // Same start as the original, so the first half keeps its slot
        state.captions[index] = first;
        state.insert_sorted(second);

        debug!(
            caption_id = %self.caption_id,
            second_id = %second_id,
            split_ms,
            "Split caption"
        );

        self.second_id = Some(second_id.clone());
        self.original = Some((index, original));

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_modified([self.caption_id.as_str()])
            .with_change(StateChange::CaptionCreated {
                caption_id: second_id.clone(),
            })
            .with_created_id(&second_id))
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        let Some((index, original)) = &self.original else {
            return Ok(());
        };
        if let Some(second_id) = &self.second_id {
            state.remove(second_id);
        }
        state.remove(&original.id);
        state.insert_at(*index, original.clone());
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "SplitCaption"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// MergeCaptionsCommand
// =============================================================================

/// Command to merge two or more captions into one.
///
/// The merged caption keeps the id, style and speaker of the earliest input and
/// spans from the earliest start to the latest end.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCaptionsCommand {
    pub caption_ids: Vec<CaptionId>,
    /// Removed inputs with their original indices, ascending
    #[serde(skip)]
    removed: Vec<(usize, Caption)>,
    #[serde(skip)]
    merged_id: Option<CaptionId>,
}

impl MergeCaptionsCommand {
    pub fn new(caption_ids: &[CaptionId]) -> Self {
        Self {
            caption_ids: caption_ids.to_vec(),
            removed: Vec::new(),
            merged_id: None,
        }
    }
}

fn merge_inputs(inputs: &[&Caption]) -> Option<Caption> {
    let earliest = inputs.first()?;
    let mut merged = (*earliest).clone();

    merged.end_ms = inputs.iter().map(|c| c.end_ms).max().unwrap_or(merged.end_ms);
    merged.text = inputs
        .iter()
        .map(|c| c.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if inputs.iter().any(|c| c.word_timings.is_some()) {
        let words: Vec<WordTiming> = inputs
            .iter()
            .filter_map(|c| c.word_timings.as_ref())
            .flatten()
            .cloned()
            .collect();
        merged.word_timings = non_empty(words);
    }

    Some(merged)
}

impl Command for MergeCaptionsCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        let mut seen = HashSet::new();
        let mut indices: Vec<usize> = self
            .caption_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| state.index_of(id))
            .collect();

        if indices.len() < 2 {
            return Err(CoreError::InvalidSelection(format!(
                "Merge needs at least 2 existing captions, found {}",
                indices.len()
            )));
        }

        // Store order is start order (stable for ties)
        indices.sort_unstable();
        let inputs: Vec<&Caption> = indices.iter().map(|&i| &state.captions[i]).collect();
        let merged = merge_inputs(&inputs)
            .ok_or_else(|| CoreError::Internal("Merge produced no caption".to_string()))?;

        let removed: Vec<(usize, Caption)> = indices
            .iter()
            .map(|&i| (i, state.captions[i].clone()))
            .collect();
        for &index in indices.iter().rev() {
            state.captions.remove(index);
        }
        state.insert_sorted(merged.clone());

        debug!(
            merged_id = %merged.id,
            inputs = removed.len(),
            start_ms = merged.start_ms,
            end_ms = merged.end_ms,
            "Merged captions"
        );

        let op_id = ulid::Ulid::new().to_string();
        let mut result = CommandResult::new(&op_id).with_modified([merged.id.as_str()]);
        for (_, caption) in removed.iter().filter(|(_, c)| c.id != merged.id) {
            result = result
                .with_change(StateChange::CaptionDeleted {
                    caption_id: caption.id.clone(),
                })
                .with_deleted_id(&caption.id);
        }

        self.merged_id = Some(merged.id);
        self.removed = removed;
        Ok(result)
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        if let Some(merged_id) = &self.merged_id {
            state.remove(merged_id);
        }
        for (index, caption) in &self.removed {
            state.insert_at(*index, caption.clone());
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "MergeCaptions"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// Tests
// =============================================================================
