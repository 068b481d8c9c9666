//! Caption Commands Module
//!
//! Implements single-caption editing commands: creation, deletion, and
//! text/timing/style updates.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{
    captions::{resolve_style, Caption, CaptionState, CaptionStyle},
    clamp_time_ms,
    commands::{Command, CommandResult, StateChange},
    new_id, CaptionId, CoreError, CoreResult, DeltaMs, TimeMs, TimeRangeMs,
    MIN_CAPTION_DURATION_MS,
};

fn restore_at(state: &mut CaptionState, index: usize, caption: &Caption) {
    state.remove(&caption.id);
    state.insert_at(index, caption.clone());
}

// =============================================================================
// AddCaptionCommand
// =============================================================================

/// Command to add a caption styled from the global template.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCaptionCommand {
    pub start_ms: DeltaMs,
    pub end_ms: DeltaMs,
    pub text: String,
    /// Caption produced by the first execution, reused on redo
    #[serde(skip)]
    created_caption: Option<Caption>,
}

impl AddCaptionCommand {
    pub fn new(start_ms: DeltaMs, end_ms: DeltaMs, text: &str) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.to_string(),
            created_caption: None,
        }
    }

    /// Id of the created caption, once executed
    pub fn caption_id(&self) -> Option<&str> {
        self.created_caption.as_ref().map(|c| c.id.as_str())
    }

    fn build_caption(&self, global_style: &CaptionStyle) -> CoreResult<Caption> {
        if self.end_ms <= self.start_ms {
            return Err(CoreError::InvalidRange(format!(
                "Caption end ({}) must be after start ({})",
                self.end_ms, self.start_ms
            )));
        }

        let requested = TimeRangeMs::new(clamp_time_ms(self.start_ms), clamp_time_ms(self.end_ms));
        let range = requested.with_min_duration(MIN_CAPTION_DURATION_MS);
        if range != requested || self.start_ms < 0 {
            warn!(
                start_ms = self.start_ms,
                end_ms = self.end_ms,
                normalized_start = range.start_ms,
                normalized_end = range.end_ms,
                "Normalized caption timing"
            );
        }

        Ok(Caption::new(
            &new_id(),
            range.start_ms,
            range.end_ms,
            &self.text,
            resolve_style(global_style, None),
        ))
    }
}

impl Command for AddCaptionCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        let caption = match &self.created_caption {
            Some(caption) => caption.clone(),
            None => self.build_caption(&state.global_style)?,
        };

        let caption_id = caption.id.clone();
        let index = state.insert_sorted(caption.clone());
        self.created_caption = Some(caption);

        debug!(
            caption_id = %caption_id,
            index,
            start_ms = self.start_ms,
            end_ms = self.end_ms,
            "Added caption"
        );

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::CaptionCreated {
                caption_id: caption_id.clone(),
            })
            .with_created_id(&caption_id))
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        if let Some(caption) = &self.created_caption {
            state.remove(&caption.id);
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "AddCaption"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// DeleteCaptionsCommand
// =============================================================================

/// Command to delete a set of captions. Ids that are not present are ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCaptionsCommand {
    pub caption_ids: Vec<CaptionId>,
    /// Removed captions with their index at removal time, in removal order
    #[serde(skip)]
    removed: Vec<(usize, Caption)>,
}

impl DeleteCaptionsCommand {
    pub fn new(caption_ids: &[CaptionId]) -> Self {
        Self {
            caption_ids: caption_ids.to_vec(),
            removed: Vec::new(),
        }
    }
}

impl Command for DeleteCaptionsCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        self.removed.clear();
        for caption_id in &self.caption_ids {
            if let Some(entry) = state.remove(caption_id) {
                self.removed.push(entry);
            }
        }

        debug!(
            requested = self.caption_ids.len(),
            removed = self.removed.len(),
            "Deleted captions"
        );

        let op_id = ulid::Ulid::new().to_string();
        let mut result = CommandResult::new(&op_id).with_count(self.removed.len());
        for (_, caption) in &self.removed {
            result = result
                .with_change(StateChange::CaptionDeleted {
                    caption_id: caption.id.clone(),
                })
                .with_deleted_id(&caption.id);
        }
        Ok(result)
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        for (index, caption) in self.removed.iter().rev() {
            state.insert_at(*index, caption.clone());
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "DeleteCaptions"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// UpdateCaptionTextCommand
// =============================================================================

/// Command to replace a caption's text verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaptionTextCommand {
    pub caption_id: CaptionId,
    pub text: String,
    #[serde(skip)]
    previous_text: Option<String>,
}

impl UpdateCaptionTextCommand {
    pub fn new(caption_id: &str, text: &str) -> Self {
        Self {
            caption_id: caption_id.to_string(),
            text: text.to_string(),
            previous_text: None,
        }
    }
}

impl Command for UpdateCaptionTextCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        let caption = state
            .get_mut(&self.caption_id)
            .ok_or_else(|| CoreError::NotFound(self.caption_id.clone()))?;

        self.previous_text = Some(std::mem::replace(&mut caption.text, self.text.clone()));

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id).with_modified([self.caption_id.as_str()]))
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        if let (Some(previous), Some(caption)) =
            (&self.previous_text, state.get_mut(&self.caption_id))
        {
            caption.text = previous.clone();
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "UpdateCaptionText"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// UpdateCaptionTimingCommand
// =============================================================================

/// Command to retime a caption.
///
/// Inputs are clamped to zero. When the span is shorter than the minimum
/// duration, the start moves earlier if only the start changed, otherwise the
/// end moves later. Neighbouring captions are not consulted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaptionTimingCommand {
    pub caption_id: CaptionId,
    pub start_ms: DeltaMs,
    pub end_ms: DeltaMs,
    #[serde(skip)]
    previous: Option<(usize, Caption)>,
}

impl UpdateCaptionTimingCommand {
    pub fn new(caption_id: &str, start_ms: DeltaMs, end_ms: DeltaMs) -> Self {
        Self {
            caption_id: caption_id.to_string(),
            start_ms,
            end_ms,
            previous: None,
        }
    }
}

/// Normalizes a requested span against the caption's current one.
fn normalize_timing(current: TimeRangeMs, start_ms: TimeMs, end_ms: TimeMs) -> TimeRangeMs {
    if end_ms >= start_ms.saturating_add(MIN_CAPTION_DURATION_MS) {
        return TimeRangeMs { start_ms, end_ms };
    }

    let only_start_changed = start_ms != current.start_ms && end_ms == current.end_ms;
    if only_start_changed && end_ms >= MIN_CAPTION_DURATION_MS {
        TimeRangeMs {
            start_ms: end_ms - MIN_CAPTION_DURATION_MS,
            end_ms,
        }
    } else {
        TimeRangeMs {
            start_ms,
            end_ms: start_ms.saturating_add(MIN_CAPTION_DURATION_MS),
        }
    }
}

impl Command for UpdateCaptionTimingCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        let index = state
            .index_of(&self.caption_id)
            .ok_or_else(|| CoreError::NotFound(self.caption_id.clone()))?;
        let original = state.captions[index].clone();

        let range = normalize_timing(
            original.range(),
            clamp_time_ms(self.start_ms),
            clamp_time_ms(self.end_ms),
        );
        if range.start_ms as DeltaMs != self.start_ms || range.end_ms as DeltaMs != self.end_ms {
            warn!(
                caption_id = %self.caption_id,
                start_ms = self.start_ms,
                end_ms = self.end_ms,
                normalized_start = range.start_ms,
                normalized_end = range.end_ms,
                "Normalized caption timing"
            );
        }

        let caption = &mut state.captions[index];
        caption.start_ms = range.start_ms;
        caption.end_ms = range.end_ms;
        if range.start_ms != original.start_ms {
            state.reposition(&self.caption_id);
        }
        self.previous = Some((index, original));

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id).with_modified([self.caption_id.as_str()]))
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        if let Some((index, caption)) = &self.previous {
            restore_at(state, *index, caption);
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "UpdateCaptionTiming"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// UpdateCaptionStyleCommand
// =============================================================================

/// Command to replace the complete style of one or more captions.
///
/// Every id must resolve before any caption is touched, so a failed call
/// leaves the store as it was.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaptionStyleCommand {
    pub caption_ids: Vec<CaptionId>,
    pub style: CaptionStyle,
    #[serde(skip)]
    previous_styles: Vec<(CaptionId, CaptionStyle)>,
}

impl UpdateCaptionStyleCommand {
    pub fn new(caption_id: &str, style: CaptionStyle) -> Self {
        Self::for_captions(&[caption_id.to_string()], style)
    }

    pub fn for_captions(caption_ids: &[CaptionId], style: CaptionStyle) -> Self {
        let mut unique: Vec<CaptionId> = Vec::with_capacity(caption_ids.len());
        for id in caption_ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }
        Self {
            caption_ids: unique,
            style,
            previous_styles: Vec::new(),
        }
    }
}

impl Command for UpdateCaptionStyleCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        self.style.validate()?;
        if self.caption_ids.is_empty() {
            return Err(CoreError::InvalidSelection(
                "No captions selected for style update".to_string(),
            ));
        }
        if let Some(missing) = self.caption_ids.iter().find(|id| !state.contains(id)) {
            return Err(CoreError::NotFound(missing.clone()));
        }

        let mut previous_styles = Vec::with_capacity(self.caption_ids.len());
        for id in &self.caption_ids {
            if let Some(caption) = state.get_mut(id) {
                let previous = std::mem::replace(&mut caption.style, self.style.clone());
                previous_styles.push((id.clone(), previous));
            }
        }
        self.previous_styles = previous_styles;

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_modified(self.caption_ids.iter().map(String::as_str))
            .with_count(self.caption_ids.len()))
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        for (id, previous) in &self.previous_styles {
            if let Some(caption) = state.get_mut(id) {
                caption.style = previous.clone();
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "UpdateCaptionStyle"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// Tests
// =============================================================================
