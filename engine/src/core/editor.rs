//! Caption Editor
//!
//! The engine facade: owns the caption store and its undo history, and turns
//! each call into exactly one command routed through the executor. Queries
//! (`captions`, `export_captions`, `analyze_reading_speed`) never touch history.

use tracing::{debug, info};

use crate::core::{
    captions::{
        export_json, export_srt, export_vtt, text, Caption, CaptionFormat, CaptionState,
        CaptionStyle, ReadingSpeedEntry,
    },
    commands::{
        AddCaptionCommand, AutoPunctuateCommand, Command, CommandExecutor, CommandResult,
        DeleteCaptionsCommand, FindReplaceCommand, ImportCaptionsCommand, MergeCaptionsCommand,
        ProfanityFilterCommand, ShiftCaptionsCommand, SplitCaptionCommand, StateChange,
        StretchCaptionsCommand, UpdateCaptionStyleCommand, UpdateCaptionTextCommand,
        UpdateCaptionTimingCommand, UpdateGlobalStyleCommand,
    },
    settings::EngineSettings,
    CaptionId, CoreError, CoreResult, DeltaMs,
};

/// Single-owner caption editing engine
pub struct CaptionEditor {
    state: CaptionState,
    executor: CommandExecutor,
    settings: EngineSettings,
}

impl Default for CaptionEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptionEditor {
    /// Creates an empty editor with default settings
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    /// Creates an empty editor; settings are normalized first
    pub fn with_settings(mut settings: EngineSettings) -> Self {
        settings.normalize();
        let executor = CommandExecutor::new().with_max_history(settings.history.max_entries);
        Self {
            state: CaptionState::new(),
            executor,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All captions ordered by start time
    pub fn captions(&self) -> &[Caption] {
        &self.state.captions
    }

    pub fn caption(&self, caption_id: &str) -> Option<&Caption> {
        self.state.get(caption_id)
    }

    pub fn global_style(&self) -> &CaptionStyle {
        &self.state.global_style
    }

    pub fn state(&self) -> &CaptionState {
        &self.state
    }

    /// Serializes the store in the named format (`json`, `srt`, `vtt`)
    pub fn export_captions(&self, format: &str) -> CoreResult<String> {
        let format: CaptionFormat = format.parse()?;
        let captions = self.captions();
        let output = match format {
            CaptionFormat::Json => export_json(captions)?,
            CaptionFormat::Srt => export_srt(captions),
            CaptionFormat::Vtt => export_vtt(captions),
        };
        debug!(format = %format, captions = captions.len(), "Exported captions");
        Ok(output)
    }

    /// Words-per-minute report using the configured thresholds
    pub fn analyze_reading_speed(&self) -> Vec<ReadingSpeedEntry> {
        let thresholds = &self.settings.reading_speed;
        text::analyze_reading_speed(self.captions(), thresholds.max_wpm, thresholds.min_wpm)
    }

    /// Caption pairs whose spans intersect
    pub fn overlapping_pairs(&self) -> Vec<(CaptionId, CaptionId)> {
        self.state.overlapping_pairs()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn execute(&mut self, command: Box<dyn Command>) -> CoreResult<CommandResult> {
        self.executor.execute(command, &mut self.state)
    }

    fn first_created(result: &CommandResult) -> CoreResult<CaptionId> {
        result
            .created_ids
            .first()
            .cloned()
            .ok_or_else(|| CoreError::Internal("Command created no caption".to_string()))
    }

    /// Adds a caption styled from the global template; returns its id
    pub fn add_caption(&mut self, start_ms: DeltaMs, end_ms: DeltaMs, text: &str) -> CoreResult<CaptionId> {
        let result = self.execute(Box::new(AddCaptionCommand::new(start_ms, end_ms, text)))?;
        Self::first_created(&result)
    }

    /// Adds an empty caption of the default duration at `start_ms`
    pub fn create_caption(&mut self, start_ms: DeltaMs) -> CoreResult<CaptionId> {
        let duration = self.settings.captions.default_duration_ms as DeltaMs;
        self.add_caption(start_ms, start_ms.saturating_add(duration), "")
    }

    /// Deletes every listed caption that exists; returns how many were removed
    pub fn delete_captions(&mut self, caption_ids: &[CaptionId]) -> CoreResult<usize> {
        let result = self.execute(Box::new(DeleteCaptionsCommand::new(caption_ids)))?;
        Ok(result.count)
    }

    pub fn update_caption_text(&mut self, caption_id: &str, text: &str) -> CoreResult<()> {
        self.execute(Box::new(UpdateCaptionTextCommand::new(caption_id, text)))?;
        Ok(())
    }

    pub fn update_caption_timing(
        &mut self,
        caption_id: &str,
        start_ms: DeltaMs,
        end_ms: DeltaMs,
    ) -> CoreResult<()> {
        self.execute(Box::new(UpdateCaptionTimingCommand::new(
            caption_id, start_ms, end_ms,
        )))?;
        Ok(())
    }

    /// Splits a caption at `split_ms`; returns the id of the second half
    pub fn split_caption(&mut self, caption_id: &str, split_ms: DeltaMs) -> CoreResult<CaptionId> {
        let result = self.execute(Box::new(SplitCaptionCommand::new(caption_id, split_ms)))?;
        Self::first_created(&result)
    }

    /// Merges the selected captions; returns the id of the merged caption
    pub fn merge_selected(&mut self, caption_ids: &[CaptionId]) -> CoreResult<CaptionId> {
        let result = self.execute(Box::new(MergeCaptionsCommand::new(caption_ids)))?;
        result
            .changes
            .iter()
            .find_map(|change| match change {
                StateChange::CaptionModified { caption_id } => Some(caption_id.clone()),
                _ => None,
            })
            .ok_or_else(|| CoreError::Internal("Merge reported no caption".to_string()))
    }

    pub fn shift_all_captions(&mut self, delta_ms: DeltaMs) -> CoreResult<()> {
        self.execute(Box::new(ShiftCaptionsCommand::new(delta_ms)))?;
        Ok(())
    }

    pub fn stretch_captions(&mut self, factor: f64) -> CoreResult<()> {
        self.execute(Box::new(StretchCaptionsCommand::new(factor)))?;
        Ok(())
    }

    /// Literal find/replace across all captions; returns the replacement count.
    ///
    /// An empty search string does nothing and records no history.
    pub fn find_replace(&mut self, find: &str, replace: &str, case_sensitive: bool) -> CoreResult<usize> {
        if find.is_empty() {
            return Ok(0);
        }
        let result = self.execute(Box::new(FindReplaceCommand::new(
            find,
            replace,
            case_sensitive,
        )))?;
        Ok(result.count)
    }

    /// Tidies and punctuates all captions; returns how many changed
    pub fn auto_punctuate(&mut self) -> CoreResult<usize> {
        let result = self.execute(Box::new(AutoPunctuateCommand::new()))?;
        Ok(result.count)
    }

    /// Masks (`bleep`) or removes profanity; returns the match count
    pub fn apply_profanity_filter(&mut self, bleep: bool) -> CoreResult<usize> {
        let result = self.execute(Box::new(ProfanityFilterCommand::new(bleep)))?;
        Ok(result.count)
    }

    pub fn update_caption_style(&mut self, caption_id: &str, style: CaptionStyle) -> CoreResult<()> {
        self.execute(Box::new(UpdateCaptionStyleCommand::new(caption_id, style)))?;
        Ok(())
    }

    /// Restyles several captions as one undoable step; returns how many
    /// distinct captions changed. Nothing changes if any id is missing.
    pub fn update_captions_style(
        &mut self,
        caption_ids: &[CaptionId],
        style: CaptionStyle,
    ) -> CoreResult<usize> {
        let result = self.execute(Box::new(UpdateCaptionStyleCommand::for_captions(
            caption_ids,
            style,
        )))?;
        Ok(result.count)
    }

    /// Replaces the global style and overwrites every caption's style with it
    pub fn update_global_style(&mut self, style: CaptionStyle) -> CoreResult<()> {
        self.execute(Box::new(UpdateGlobalStyleCommand::new(style)))?;
        Ok(())
    }

    /// Replaces the whole caption set with parsed content; returns the new count
    pub fn import_captions(&mut self, format: &str, content: &str) -> CoreResult<usize> {
        let format: CaptionFormat = format.parse()?;
        let result = self.execute(Box::new(ImportCaptionsCommand::new(format, content)))?;
        Ok(result.count)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Reverts the most recent command; `false` when there is nothing to undo
    pub fn undo(&mut self) -> CoreResult<bool> {
        self.executor.undo(&mut self.state)
    }

    /// Re-applies the most recently undone command; `false` when there is none
    pub fn redo(&mut self) -> CoreResult<bool> {
        self.executor.redo(&mut self.state)
    }

    pub fn can_undo(&self) -> bool {
        self.executor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.executor.can_redo()
    }

    pub fn undo_count(&self) -> usize {
        self.executor.undo_count()
    }

    pub fn redo_count(&self) -> usize {
        self.executor.redo_count()
    }

    pub fn last_command_type(&self) -> Option<&'static str> {
        self.executor.last_command_type()
    }

    pub fn clear_history(&mut self) {
        info!(
            undo = self.executor.undo_count(),
            redo = self.executor.redo_count(),
            "Clearing caption history"
        );
        self.executor.clear_history();
    }
}
