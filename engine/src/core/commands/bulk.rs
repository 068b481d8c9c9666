//! Bulk Caption Commands
//!
//! Commands that rewrite many captions at once (timing transforms, text
//! tools, global restyle, import). Each one keeps a snapshot of the state it
//! replaced and restores it on undo.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{
    captions::{
        parse_json, parse_srt, parse_vtt, resolve_style, text, Caption, CaptionFormat,
        CaptionState, CaptionStyle,
    },
    commands::{Command, CommandResult, StateChange},
    CoreError, CoreResult, DeltaMs, TimeMs, MIN_CAPTION_DURATION_MS,
};

fn restore_snapshot(state: &mut CaptionState, snapshot: &Option<CaptionState>) {
    if let Some(snapshot) = snapshot {
        *state = snapshot.clone();
    }
}

fn shift_time(value: TimeMs, delta_ms: DeltaMs) -> TimeMs {
    if delta_ms >= 0 {
        value.saturating_add(delta_ms as TimeMs)
    } else {
        value.saturating_sub(delta_ms.unsigned_abs())
    }
}

fn scale_time(value: TimeMs, factor: f64) -> TimeMs {
    let scaled = (value as f64 * factor).round();
    if scaled >= TimeMs::MAX as f64 {
        TimeMs::MAX
    } else {
        scaled as TimeMs
    }
}

// =============================================================================
// ShiftCaptionsCommand
// =============================================================================

/// Command to move every caption by a signed offset.
///
/// A caption whose start would become negative starts at 0 and keeps its
/// duration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftCaptionsCommand {
    pub delta_ms: DeltaMs,
    #[serde(skip)]
    snapshot: Option<CaptionState>,
}

impl ShiftCaptionsCommand {
    pub fn new(delta_ms: DeltaMs) -> Self {
        Self {
            delta_ms,
            snapshot: None,
        }
    }
}

impl Command for ShiftCaptionsCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        self.snapshot = Some(state.clone());

        let mut clamped = 0usize;
        for caption in &mut state.captions {
            let duration = caption.duration();
            let new_start = shift_time(caption.start_ms, self.delta_ms);
            if self.delta_ms < 0 && caption.start_ms < self.delta_ms.unsigned_abs() {
                clamped += 1;
            }

            let effective = new_start as i128 - caption.start_ms as i128;
            caption.start_ms = new_start;
            caption.end_ms = new_start.saturating_add(duration);

            if let Some(words) = &mut caption.word_timings {
                let effective = effective.clamp(DeltaMs::MIN as i128, DeltaMs::MAX as i128) as DeltaMs;
                for word in words.iter_mut() {
                    word.start_ms = shift_time(word.start_ms, effective);
                    word.end_ms = shift_time(word.end_ms, effective);
                }
            }
        }
        state.sort_captions();

        debug!(delta_ms = self.delta_ms, clamped, "Shifted all captions");

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_modified(state.captions.iter().map(|c| c.id.as_str())))
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        restore_snapshot(state, &self.snapshot);
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "ShiftCaptions"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// StretchCaptionsCommand
// =============================================================================

/// Command to scale every timestamp by a factor (e.g. frame-rate conversion).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StretchCaptionsCommand {
    pub factor: f64,
    #[serde(skip)]
    snapshot: Option<CaptionState>,
}

impl StretchCaptionsCommand {
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            snapshot: None,
        }
    }
}

impl Command for StretchCaptionsCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(CoreError::InvalidArgument(format!(
                "Stretch factor must be a positive finite number, got {}",
                self.factor
            )));
        }
        self.snapshot = Some(state.clone());

        for caption in &mut state.captions {
            caption.start_ms = scale_time(caption.start_ms, self.factor);
            caption.end_ms = scale_time(caption.end_ms, self.factor)
                .max(caption.start_ms.saturating_add(MIN_CAPTION_DURATION_MS));

            if let Some(words) = &mut caption.word_timings {
                for word in words.iter_mut() {
                    word.start_ms = scale_time(word.start_ms, self.factor);
                    word.end_ms = scale_time(word.end_ms, self.factor);
                }
            }
        }
        state.sort_captions();

        debug!(factor = self.factor, "Stretched all captions");

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_modified(state.captions.iter().map(|c| c.id.as_str())))
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        restore_snapshot(state, &self.snapshot);
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "StretchCaptions"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// Text Tools
// =============================================================================

/// Command to replace a literal string in every caption's text.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindReplaceCommand {
    pub find: String,
    pub replace: String,
    pub case_sensitive: bool,
    #[serde(skip)]
    snapshot: Option<CaptionState>,
}

impl FindReplaceCommand {
    pub fn new(find: &str, replace: &str, case_sensitive: bool) -> Self {
        Self {
            find: find.to_string(),
            replace: replace.to_string(),
            case_sensitive,
            snapshot: None,
        }
    }
}

impl Command for FindReplaceCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        if self.find.is_empty() {
            return Err(CoreError::InvalidArgument(
                "Search text must not be empty".to_string(),
            ));
        }
        let matcher = text::literal_matcher(&self.find, self.case_sensitive)?;
        self.snapshot = Some(state.clone());

        let mut total = 0;
        let mut modified = Vec::new();
        for caption in &mut state.captions {
            let (replaced, count) = text::replace_matches(&caption.text, &matcher, &self.replace);
            if count > 0 {
                caption.text = replaced;
                total += count;
                modified.push(caption.id.clone());
            }
        }

        debug!(
            find = %self.find,
            replacements = total,
            captions = modified.len(),
            "Find and replace"
        );

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_modified(modified.iter().map(String::as_str))
            .with_count(total))
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        restore_snapshot(state, &self.snapshot);
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "FindReplace"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

/// Command to tidy and punctuate caption text.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AutoPunctuateCommand {
    #[serde(skip)]
    snapshot: Option<CaptionState>,
}

impl AutoPunctuateCommand {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Command for AutoPunctuateCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        self.snapshot = Some(state.clone());

        let texts: Vec<&str> = state.captions.iter().map(|c| c.text.as_str()).collect();
        let punctuated = text::auto_punctuate_texts(&texts);

        let mut modified = Vec::new();
        for (caption, new_text) in state.captions.iter_mut().zip(punctuated) {
            if caption.text != new_text {
                caption.text = new_text;
                modified.push(caption.id.clone());
            }
        }

        debug!(captions = modified.len(), "Auto-punctuated captions");

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_modified(modified.iter().map(String::as_str))
            .with_count(modified.len()))
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        restore_snapshot(state, &self.snapshot);
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "AutoPunctuate"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({})
    }
}

/// Command to mask or remove profanity across all captions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfanityFilterCommand {
    pub bleep: bool,
    #[serde(skip)]
    snapshot: Option<CaptionState>,
}

impl ProfanityFilterCommand {
    pub fn new(bleep: bool) -> Self {
        Self {
            bleep,
            snapshot: None,
        }
    }
}

impl Command for ProfanityFilterCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        let matcher = text::profanity_matcher()?;
        self.snapshot = Some(state.clone());

        let mut total = 0;
        let mut modified = Vec::new();
        for caption in &mut state.captions {
            let (filtered, count) = text::filter_profanity(&caption.text, &matcher, self.bleep);
            if count > 0 {
                caption.text = filtered;
                total += count;
                modified.push(caption.id.clone());
            }
        }

        debug!(bleep = self.bleep, matches = total, "Applied profanity filter");

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_modified(modified.iter().map(String::as_str))
            .with_count(total))
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        restore_snapshot(state, &self.snapshot);
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "ProfanityFilter"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// UpdateGlobalStyleCommand
// =============================================================================

/// Command to replace the global style and overwrite every caption's style.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateGlobalStyleCommand {
    pub style: CaptionStyle,
    #[serde(skip)]
    snapshot: Option<CaptionState>,
}

impl UpdateGlobalStyleCommand {
    pub fn new(style: CaptionStyle) -> Self {
        Self {
            style,
            snapshot: None,
        }
    }
}

impl Command for UpdateGlobalStyleCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        self.style.validate()?;
        self.snapshot = Some(state.clone());

        state.global_style = self.style.clone();
        for caption in &mut state.captions {
            caption.style = resolve_style(&state.global_style, None);
        }

        debug!(captions = state.len(), "Replaced global caption style");

        let op_id = ulid::Ulid::new().to_string();
        Ok(CommandResult::new(&op_id)
            .with_change(StateChange::GlobalStyleChanged)
            .with_modified(state.captions.iter().map(|c| c.id.as_str())))
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        restore_snapshot(state, &self.snapshot);
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "UpdateGlobalStyle"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// ImportCaptionsCommand
// =============================================================================

/// Command to replace the whole caption set with parsed content.
///
/// Content is parsed on first execution; the resulting captions (and their
/// generated ids) are reused on redo.
#[derive(Clone, Debug)]
pub struct ImportCaptionsCommand {
    pub format: CaptionFormat,
    content: String,
    imported: Option<Vec<Caption>>,
    snapshot: Option<CaptionState>,
}

impl ImportCaptionsCommand {
    pub fn new(format: CaptionFormat, content: &str) -> Self {
        Self {
            format,
            content: content.to_string(),
            imported: None,
            snapshot: None,
        }
    }

    fn parse(&self, global_style: &CaptionStyle) -> CoreResult<Vec<Caption>> {
        let captions = match self.format {
            CaptionFormat::Json => parse_json(&self.content)?,
            CaptionFormat::Srt | CaptionFormat::Vtt => {
                let cues = if self.format == CaptionFormat::Srt {
                    parse_srt(&self.content)?
                } else {
                    parse_vtt(&self.content)?
                };
                let mut captions: Vec<Caption> = cues
                    .into_iter()
                    .map(|cue| {
                        Caption::create(
                            cue.start_ms,
                            cue.end_ms,
                            &cue.text,
                            resolve_style(global_style, None),
                        )
                    })
                    .collect();
                captions.sort_by_key(|c| c.start_ms);
                captions
            }
        };
        Ok(captions)
    }
}

impl Command for ImportCaptionsCommand {
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        let captions = match &self.imported {
            Some(captions) => captions.clone(),
            None => self.parse(&state.global_style)?,
        };

        self.snapshot = Some(state.clone());
        let replaced = state.captions.len();
        state.captions = captions.clone();
        self.imported = Some(captions);

        info!(
            format = %self.format,
            imported = state.len(),
            replaced,
            "Imported captions"
        );

        let op_id = ulid::Ulid::new().to_string();
        let mut result = CommandResult::new(&op_id)
            .with_change(StateChange::CaptionsReplaced { count: state.len() })
            .with_count(state.len());
        for caption in &state.captions {
            result = result.with_created_id(&caption.id);
        }
        Ok(result)
    }

    fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
        restore_snapshot(state, &self.snapshot);
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "ImportCaptions"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "format": self.format,
            "contentLength": self.content.len(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
