//! IPC Command Handlers
//!
//! Synchronous entry points for the UI layer. Each handler takes the single
//! owned editor, performs one call and maps errors to display strings.

use tracing::debug;

use crate::core::captions::ReadingSpeedEntry;
use crate::core::CaptionEditor;
use crate::ipc::{CommandPayload, CommandResultDto, UndoRedoResult};

/// Executes an edit command
pub fn execute_command(
    editor: &mut CaptionEditor,
    command_type: String,
    payload: serde_json::Value,
) -> Result<CommandResultDto, String> {
    debug!(command_type = %command_type, "IPC execute_command");
    let command = CommandPayload::parse(command_type, payload)?;
    let outcome = command.apply(editor).map_err(|e| e.to_ipc_error())?;

    Ok(CommandResultDto {
        created_ids: outcome.created_ids,
        count: outcome.count,
        captions: editor.captions().to_vec(),
        can_undo: editor.can_undo(),
        can_redo: editor.can_redo(),
    })
}

/// Undoes the last command
pub fn undo(editor: &mut CaptionEditor) -> Result<UndoRedoResult, String> {
    let success = editor.undo().map_err(|e| e.to_ipc_error())?;
    Ok(UndoRedoResult::from_editor(success, editor))
}

/// Redoes the last undone command
pub fn redo(editor: &mut CaptionEditor) -> Result<UndoRedoResult, String> {
    let success = editor.redo().map_err(|e| e.to_ipc_error())?;
    Ok(UndoRedoResult::from_editor(success, editor))
}

/// Serializes the store for export or clipboard
pub fn export_captions(editor: &CaptionEditor, format: &str) -> Result<String, String> {
    editor.export_captions(format).map_err(|e| e.to_ipc_error())
}

pub fn analyze_reading_speed(editor: &CaptionEditor) -> Vec<ReadingSpeedEntry> {
    editor.analyze_reading_speed()
}
