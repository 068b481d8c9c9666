//! Command Executor Module
//!
//! Handles command execution and undo/redo history.
//! This is the central hub for all caption state changes.

use std::collections::VecDeque;

use tracing::debug;

use crate::core::{
    captions::CaptionState,
    commands::{Command, CommandResult},
    CoreResult, OpId,
};

/// Default number of undoable entries kept
pub const DEFAULT_MAX_HISTORY: usize = 100;

// =============================================================================
// History Entry
// =============================================================================

/// Entry in the undo/redo history
pub struct HistoryEntry {
    /// Operation ID
    pub op_id: OpId,
    /// Command that was executed
    pub command: Box<dyn Command>,
    /// Result from command execution
    pub result: CommandResult,
    /// Timestamp when command was executed
    pub timestamp: String,
}

impl std::fmt::Debug for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("op_id", &self.op_id)
            .field("command", &self.command.type_name())
            .field("result", &self.result)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl HistoryEntry {
    /// Creates a new history entry
    fn new(command: Box<dyn Command>, result: CommandResult) -> Self {
        Self {
            op_id: result.op_id.clone(),
            command,
            result,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// =============================================================================
// Command Executor
// =============================================================================

/// Executes commands and manages undo/redo history
pub struct CommandExecutor {
    /// Undo stack (most recent last)
    undo_stack: VecDeque<HistoryEntry>,
    /// Redo stack (most recent last)
    redo_stack: VecDeque<HistoryEntry>,
    /// Maximum history size
    max_history_size: usize,
}

impl CommandExecutor {
    /// Creates a new command executor
    pub fn new() -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: DEFAULT_MAX_HISTORY,
        }
    }

    /// Sets the maximum history size (at least one entry is always kept)
    pub fn with_max_history(mut self, size: usize) -> Self {
        self.max_history_size = size.max(1);
        self
    }

    pub fn max_history(&self) -> usize {
        self.max_history_size
    }

    /// Executes a command and adds it to history
    ///
    /// A failed command leaves both the state and the history untouched.
    pub fn execute(
        &mut self,
        mut command: Box<dyn Command>,
        state: &mut CaptionState,
    ) -> CoreResult<CommandResult> {
        let result = command.execute(state)?;

        debug!(
            command = command.type_name(),
            op_id = %result.op_id,
            params = %command.to_json(),
            "Executed command"
        );

        // Clear redo stack when a new command is executed
        self.redo_stack.clear();

        self.undo_stack
            .push_back(HistoryEntry::new(command, result.clone()));

        while self.undo_stack.len() > self.max_history_size {
            if let Some(dropped) = self.undo_stack.pop_front() {
                debug!(
                    command = dropped.command.type_name(),
                    op_id = %dropped.op_id,
                    "History full, dropping oldest entry"
                );
            }
        }

        Ok(result)
    }

    /// Undoes the last command
    ///
    /// Returns `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self, state: &mut CaptionState) -> CoreResult<bool> {
        let Some(entry) = self.undo_stack.pop_back() else {
            return Ok(false);
        };

        if let Err(e) = entry.command.undo(state) {
            // Keep the entry so history still mirrors the state
            self.undo_stack.push_back(entry);
            return Err(e);
        }

        debug!(
            command = entry.command.type_name(),
            op_id = %entry.op_id,
            "Undid command"
        );
        self.redo_stack.push_back(entry);

        Ok(true)
    }

    /// Redoes the last undone command
    ///
    /// Returns `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self, state: &mut CaptionState) -> CoreResult<bool> {
        let Some(mut entry) = self.redo_stack.pop_back() else {
            return Ok(false);
        };

        let result = match entry.command.redo(state) {
            Ok(result) => result,
            Err(e) => {
                self.redo_stack.push_back(entry);
                return Err(e);
            }
        };

        debug!(
            command = entry.command.type_name(),
            op_id = %result.op_id,
            "Redid command"
        );

        // Move back to undo stack with updated result
        entry.op_id = result.op_id.clone();
        entry.result = result;
        entry.timestamp = chrono::Utc::now().to_rfc3339();
        self.undo_stack.push_back(entry);

        Ok(true)
    }

    /// Returns true if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Returns the number of commands in the undo stack
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of commands in the redo stack
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clears all history (undo and redo)
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Gets the last executed command type name
    pub fn last_command_type(&self) -> Option<&'static str> {
        self.undo_stack.back().map(|e| e.command.type_name())
    }

    /// Gets the last undone command type name (for redo)
    pub fn last_undone_command_type(&self) -> Option<&'static str> {
        self.redo_stack.back().map(|e| e.command.type_name())
    }

    /// Iterates the undo history, oldest first
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo_stack.iter()
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
