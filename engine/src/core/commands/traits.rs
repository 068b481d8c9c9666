//! Command Trait Definition
//!
//! Defines the trait that all caption edit commands must implement.

use serde::{Deserialize, Serialize};
use specta::Type;

use crate::core::{captions::CaptionState, CaptionId, CoreResult, OpId};

/// Command execution result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    /// Generated Operation ID
    pub op_id: OpId,

    /// List of state changes
    pub changes: Vec<StateChange>,

    /// Newly created caption IDs
    pub created_ids: Vec<CaptionId>,

    /// Deleted caption IDs
    pub deleted_ids: Vec<CaptionId>,

    /// Items affected, for operations that report one (replacements, filtered words)
    pub count: usize,
}

impl CommandResult {
    /// Creates a new empty command result with the given operation ID
    pub fn new(op_id: &str) -> Self {
        Self {
            op_id: op_id.to_string(),
            changes: vec![],
            created_ids: vec![],
            deleted_ids: vec![],
            count: 0,
        }
    }

    /// Adds a state change
    pub fn with_change(mut self, change: StateChange) -> Self {
        self.changes.push(change);
        self
    }

    /// Adds a created ID
    pub fn with_created_id(mut self, id: &str) -> Self {
        self.created_ids.push(id.to_string());
        self
    }

    /// Adds a deleted ID
    pub fn with_deleted_id(mut self, id: &str) -> Self {
        self.deleted_ids.push(id.to_string());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Records a `CaptionModified` change for each id
    pub fn with_modified<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.changes
            .extend(ids.into_iter().map(|id| StateChange::CaptionModified {
                caption_id: id.to_string(),
            }));
        self
    }
}

/// State change types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateChange {
    CaptionCreated { caption_id: CaptionId },
    CaptionModified { caption_id: CaptionId },
    CaptionDeleted { caption_id: CaptionId },
    GlobalStyleChanged,
    CaptionsReplaced { count: usize },
}

/// Trait that all edit commands must implement
///
/// # Core Principles
/// - All caption state changes must go through Commands.
/// - All Commands must be undoable.
/// - Redo must reproduce the exact state of the first execution, including
///   any ids the command generated.
///
/// # Example
/// ```rust,ignore
/// pub struct UpdateCaptionTextCommand {
///     pub caption_id: CaptionId,
///     pub text: String,
///     previous_text: Option<String>,
/// }
///
/// impl Command for UpdateCaptionTextCommand {
///     fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
///         // Swap text, remember previous
///     }
///
///     fn undo(&self, state: &mut CaptionState) -> CoreResult<()> {
///         // Restore previous text
///     }
///
///     fn type_name(&self) -> &'static str {
///         "UpdateCaptionText"
///     }
///
///     fn to_json(&self) -> serde_json::Value {
///         serde_json::json!({ "captionId": self.caption_id, "text": self.text })
///     }
/// }
/// ```
pub trait Command: Send + Sync {
    /// Execute the command
    ///
    /// Modifies state and returns the result.
    /// On failure, state must remain unchanged.
    /// Uses &mut self to allow storing undo state during execution.
    fn execute(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult>;

    /// Undo the command
    ///
    /// Inverse operation of execute.
    /// Only called after execute succeeds.
    fn undo(&self, state: &mut CaptionState) -> CoreResult<()>;

    /// Redo the command
    ///
    /// Default implementation is identical to execute.
    fn redo(&mut self, state: &mut CaptionState) -> CoreResult<CommandResult> {
        self.execute(state)
    }

    /// Command type name
    ///
    /// Used for history queries and debugging.
    fn type_name(&self) -> &'static str;

    /// JSON description of the command's parameters
    fn to_json(&self) -> serde_json::Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_change_serialization() {
        let change = StateChange::CaptionCreated {
            caption_id: "01HZCAPTION".to_string(),
        };
        let json = serde_json::to_string(&change).unwrap();
        assert!(json.contains("captionCreated"));
        assert!(json.contains("caption_id"));

        let json = serde_json::to_string(&StateChange::CaptionsReplaced { count: 3 }).unwrap();
        assert_eq!(json, r#"{"type":"captionsReplaced","count":3}"#);
    }

    #[test]
    fn test_command_result_builder() {
        let result = CommandResult::new("op_001")
            .with_change(StateChange::CaptionCreated {
                caption_id: "cap_001".to_string(),
            })
            .with_created_id("cap_001")
            .with_modified(["cap_002", "cap_003"])
            .with_count(2);

        assert_eq!(result.op_id, "op_001");
        assert_eq!(result.changes.len(), 3);
        assert_eq!(result.created_ids, vec!["cap_001".to_string()]);
        assert_eq!(result.count, 2);
    }
}
