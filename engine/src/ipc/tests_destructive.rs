use crate::core::CaptionEditor;
use crate::ipc::payloads::CommandPayload;
use crate::ipc::execute_command;
use serde_json::json;

#[test]
fn test_destructive_invalid_payload_injection() {
    // The UI sends "startMs" as a string; it must not be coerced to 0.
    let payload = json!({
        "startMs": "NOT_A_NUMBER",
        "endMs": 1000,
        "text": "x"
    });

    let result = CommandPayload::parse("addCaption".to_string(), payload);

    assert!(
        result.is_err(),
        "Should have rejected invalid type for startMs"
    );
    let error = result.unwrap_err();
    assert!(
        error.contains("invalid type"),
        "Error message should mention type mismatch, got: {}",
        error
    );
}

#[test]
fn test_destructive_missing_field() {
    let payload = json!({ "captionId": "cap_1" });

    let result = CommandPayload::parse("splitCaption".to_string(), payload);
    assert!(result.is_err(), "Should have rejected missing splitMs");
    assert!(
        result.unwrap_err().contains("missing field"),
        "Error should mention missing field"
    );
}

#[test]
fn test_destructive_bad_style_is_rejected_without_history() {
    let mut editor = CaptionEditor::new();
    let id = editor.add_caption(0, 1000, "x").unwrap();

    let err = execute_command(
        &mut editor,
        "updateCaptionStyle".to_string(),
        json!({ "captionId": id, "style": { "color": "not-a-color" } }),
    )
    .unwrap_err();
    assert!(err.starts_with("Validation error"), "{err}");
    assert_eq!(editor.undo_count(), 1);
}

#[test]
fn test_destructive_style_update_with_unknown_id_changes_nothing() {
    let mut editor = CaptionEditor::new();
    let id = editor.add_caption(0, 1000, "x").unwrap();

    let err = execute_command(
        &mut editor,
        "updateCaptionStyle".to_string(),
        json!({ "captionId": [id.clone(), "missing"], "style": { "fontSize": 40 } }),
    )
    .unwrap_err();
    assert!(err.contains("missing"), "{err}");
    assert_eq!(editor.caption(&id).unwrap().style.font_size, 16);
    assert_eq!(editor.undo_count(), 1);
}

#[test]
fn test_destructive_non_finite_stretch_is_rejected() {
    let mut editor = CaptionEditor::new();
    editor.add_caption(0, 1000, "x").unwrap();

    let err = execute_command(
        &mut editor,
        "stretchCaptions".to_string(),
        json!({ "factor": 0 }),
    )
    .unwrap_err();
    assert!(err.starts_with("Invalid argument"), "{err}");
}

#[test]
fn test_happy_path_parsing() {
    let payload = json!({
        "captionId": "cap_1",
        "splitTime": 1500
    });

    let result = CommandPayload::parse("SplitCaption".to_string(), payload);
    assert!(result.is_ok(), "Parse error: {:?}", result.err());
}
