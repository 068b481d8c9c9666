//! IPC DTO helpers
//!
//! Response shapes returned to the UI layer. Every mutating response carries
//! the full caption list so the UI can re-sync without a diff protocol.

use serde::{Deserialize, Serialize};
use specta::Type;

use crate::core::captions::Caption;
use crate::core::{CaptionEditor, CaptionId};

/// Result of a routed edit command
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct CommandResultDto {
    pub created_ids: Vec<CaptionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub captions: Vec<Caption>,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Result of an undo or redo request
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct UndoRedoResult {
    /// `false` when the stack was empty
    pub success: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub captions: Vec<Caption>,
}

impl UndoRedoResult {
    pub fn from_editor(success: bool, editor: &CaptionEditor) -> Self {
        Self {
            success,
            can_undo: editor.can_undo(),
            can_redo: editor.can_redo(),
            captions: editor.captions().to_vec(),
        }
    }
}

/// Serializes a serde value expected to become a JSON string.
///
/// This is primarily used for enums with `#[serde(rename_all = ...)]` where
/// `Debug` formatting is not a stable wire format.
pub fn serialize_to_json_string<T: Serialize>(value: &T) -> Result<String, String> {
    let json_value = serde_json::to_value(value).map_err(|e| e.to_string())?;
    json_value
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| "Expected value to serialize as a JSON string".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::{AnimationType, CaptionFormat, ReadingSpeedFlag};

    #[test]
    fn serializes_reading_speed_flags_with_snake_case() {
        assert_eq!(
            serialize_to_json_string(&ReadingSpeedFlag::TooFast).unwrap(),
            "too_fast"
        );
        assert_eq!(
            serialize_to_json_string(&ReadingSpeedFlag::TooSlow).unwrap(),
            "too_slow"
        );
        assert_eq!(serialize_to_json_string(&ReadingSpeedFlag::Ok).unwrap(), "ok");
    }

    #[test]
    fn serializes_format_and_animation_enums_with_expected_wire_values() {
        assert_eq!(serialize_to_json_string(&CaptionFormat::Vtt).unwrap(), "vtt");
        assert_eq!(
            serialize_to_json_string(&AnimationType::Typewriter).unwrap(),
            "typewriter"
        );
    }

    #[test]
    fn rejects_non_string_values() {
        assert!(serialize_to_json_string(&42).is_err());
    }

    #[test]
    fn undo_redo_result_uses_camel_case() {
        let editor = CaptionEditor::new();
        let result = UndoRedoResult::from_editor(false, &editor);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["canUndo"], false);
        assert_eq!(json["captions"].as_array().unwrap().len(), 0);
    }
}
