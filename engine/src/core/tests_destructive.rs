//! Destructive and Edge Case Tests for the Caption Engine
//!
//! End-to-end scenarios through the editor facade plus the store-wide
//! properties that must survive any sequence of edits.

use crate::core::captions::{parse_json, CaptionStyle, WordTiming};
use crate::core::timeline::{
    get_time_from_click, handle_pan_move, handle_wheel, max_offset, TimelineTransform,
};
use crate::core::{CaptionEditor, CaptionId, CoreError, MIN_CAPTION_DURATION_MS};

fn assert_store_invariants(editor: &CaptionEditor) {
    let captions = editor.captions();
    let mut ids = std::collections::HashSet::new();
    for caption in captions {
        assert!(caption.end_ms > caption.start_ms, "{caption:?}");
        assert!(ids.insert(caption.id.clone()), "duplicate id {}", caption.id);
    }
    assert!(captions.windows(2).all(|w| w[0].start_ms <= w[1].start_ms));
}

#[test]
fn test_scenario_add_and_export() {
    let mut editor = CaptionEditor::new();
    editor.add_caption(0, 3000, "Hello world").unwrap();

    let captions = editor.captions();
    assert_eq!(captions.len(), 1);
    assert_eq!((captions[0].start_ms, captions[0].end_ms), (0, 3000));

    let exported = parse_json(&editor.export_captions("json").unwrap()).unwrap();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].text, "Hello world");
}

#[test]
fn test_scenario_split_in_half() {
    let mut editor = CaptionEditor::new();
    let id = editor.add_caption(0, 3000, "Hello world").unwrap();
    editor.split_caption(&id, 1500).unwrap();

    let spans: Vec<_> = editor
        .captions()
        .iter()
        .map(|c| (c.start_ms, c.end_ms, c.text.as_str()))
        .collect();
    assert_eq!(spans, vec![(0, 1500, "Hello"), (1500, 3000, "world")]);
}

#[test]
fn test_scenario_zoom_anchor() {
    let start = TimelineTransform::new(1.0, 0.0);
    let before = get_time_from_click(start, 60_000.0, 1000.0, 500.0);
    let zoomed = handle_wheel(start, 60_000.0, 1000.0, 500.0, -100.0);
    let after = get_time_from_click(zoomed, 60_000.0, 1000.0, 500.0);

    assert!(zoomed.scale > 1.0);
    assert!((before - after).abs() < 1.0);
}

#[test]
fn test_scenario_timing_clamped_to_minimum() {
    let mut editor = CaptionEditor::new();
    let id = editor.add_caption(0, 3000, "text").unwrap();
    editor.update_caption_timing(&id, 5000, 5050).unwrap();

    let caption = editor.caption(&id).unwrap();
    assert_eq!(caption.start_ms, 5000);
    assert_eq!(caption.end_ms - caption.start_ms, MIN_CAPTION_DURATION_MS);
}

#[test]
fn test_scenario_undo_redo_three_adds() {
    let mut editor = CaptionEditor::new();
    editor.add_caption(0, 1000, "one").unwrap();
    editor.add_caption(1000, 2000, "two").unwrap();
    editor.add_caption(2000, 3000, "three").unwrap();
    let before = editor.captions().to_vec();

    for _ in 0..3 {
        assert!(editor.undo().unwrap());
    }
    assert!(editor.captions().is_empty());
    assert!(!editor.undo().unwrap());

    for _ in 0..3 {
        assert!(editor.redo().unwrap());
    }
    assert_eq!(editor.captions(), before.as_slice());
    assert!(!editor.redo().unwrap());
}

#[test]
fn test_destructive_undo_redo_mixed_sequence() {
    let mut editor = CaptionEditor::new();
    let initial = editor.state().clone();

    let a = editor.add_caption(0, 2000, "hello there world").unwrap();
    let b = editor.add_caption(2500, 4000, "damn it").unwrap();
    let c = editor.create_caption(6000).unwrap();
    editor.update_caption_text(&c, "what is this").unwrap();
    let a2 = editor.split_caption(&a, 1000).unwrap();
    editor.update_caption_timing(&a2, 900, 950).unwrap();
    editor.merge_selected(&[a2.clone(), b.clone()]).unwrap();
    editor.shift_all_captions(-500).unwrap();
    editor.stretch_captions(1.5).unwrap();
    editor.find_replace("HELLO", "Hi", false).unwrap();
    editor.apply_profanity_filter(true).unwrap();
    editor.auto_punctuate().unwrap();
    let mut style = CaptionStyle::default();
    style.font_size = 32;
    editor.update_global_style(style.clone()).unwrap();
    style.bold = true;
    editor.update_caption_style(&c, style).unwrap();
    editor.delete_captions(&[a.clone(), "missing".to_string()]).unwrap();
    editor
        .import_captions("srt", "1\n00:00:01,000 --> 00:00:02,000\nImported\n")
        .unwrap();

    let final_state = editor.state().clone();
    let steps = editor.undo_count();
    assert_eq!(steps, 16);
    assert_store_invariants(&editor);

    for _ in 0..steps {
        assert!(editor.undo().unwrap());
        assert_store_invariants(&editor);
    }
    assert_eq!(editor.state(), &initial);

    for _ in 0..steps {
        assert!(editor.redo().unwrap());
        assert_store_invariants(&editor);
    }
    assert_eq!(editor.state(), &final_state);
}

#[test]
fn test_destructive_new_edit_clears_redo() {
    let mut editor = CaptionEditor::new();
    editor.add_caption(0, 1000, "one").unwrap();
    editor.add_caption(1000, 2000, "two").unwrap();
    editor.undo().unwrap();
    assert!(editor.can_redo());

    editor.add_caption(5000, 6000, "three").unwrap();
    assert!(!editor.can_redo());
    assert_eq!(editor.captions().len(), 2);
}

#[test]
fn test_destructive_json_round_trip_is_lossless() {
    let mut editor = CaptionEditor::new();
    let id = editor.add_caption(100, 2500, "Full \"fidelity\"\nline two").unwrap();
    editor.add_caption(100, 900, "overlapping start").unwrap();
    editor.add_caption(4000, 5000, "ünïcödé ✓").unwrap();
    let mut style = CaptionStyle::default();
    style.italic = true;
    style.outline_width = 2;
    editor.update_caption_style(&id, style).unwrap();

    let exported = editor.export_captions("json").unwrap();
    let mut other = CaptionEditor::new();
    other.import_captions("json", &exported).unwrap();
    assert_eq!(other.captions(), editor.captions());
    assert_eq!(other.export_captions("json").unwrap(), exported);
}

#[test]
fn test_destructive_json_keeps_word_timings() {
    let mut editor = CaptionEditor::new();
    let id = editor.add_caption(0, 2000, "alpha beta").unwrap();
    let json = editor.export_captions("json").unwrap();

    let mut captions = parse_json(&json).unwrap();
    captions[0].word_timings = Some(vec![
        WordTiming::new("alpha", 0, 900),
        WordTiming::new("beta", 900, 2000),
    ]);
    let with_words = serde_json::to_string(&captions).unwrap();

    editor.import_captions("json", &with_words).unwrap();
    let caption = editor.caption(&id).unwrap();
    assert_eq!(caption.word_timings.as_ref().map(Vec::len), Some(2));

    // Split partitions the word timings
    let second = editor.split_caption(&id, 1000).unwrap();
    let first_words = editor.caption(&id).unwrap().word_timings.clone().unwrap();
    let second_words = editor.caption(&second).unwrap().word_timings.clone().unwrap();
    assert_eq!(first_words[0].word, "alpha");
    assert_eq!(second_words[0].word, "beta");
}

#[test]
fn test_destructive_srt_and_vtt_keep_timing_and_text() {
    let mut editor = CaptionEditor::new();
    editor.add_caption(0, 1500, "First").unwrap();
    editor.add_caption(3_600_000, 3_601_234, "Two\nlines").unwrap();

    for format in ["srt", "vtt"] {
        let exported = editor.export_captions(format).unwrap();
        let mut other = CaptionEditor::new();
        assert_eq!(other.import_captions(format, &exported).unwrap(), 2);

        let left: Vec<_> = editor
            .captions()
            .iter()
            .map(|c| (c.start_ms, c.end_ms, c.text.clone()))
            .collect();
        let right: Vec<_> = other
            .captions()
            .iter()
            .map(|c| (c.start_ms, c.end_ms, c.text.clone()))
            .collect();
        assert_eq!(left, right, "{format}");
    }
}

#[test]
fn test_destructive_failed_import_leaves_store_untouched() {
    let mut editor = CaptionEditor::new();
    editor.add_caption(0, 1000, "keep me").unwrap();
    let before = editor.state().clone();

    let err = editor
        .import_captions("srt", "1\n00:00:xx,000 --> 00:00:01,000\nbad\n")
        .unwrap_err();
    assert!(matches!(err, CoreError::ParseError(_)));
    let err = editor.import_captions("vtt", "not a vtt file").unwrap_err();
    assert!(matches!(err, CoreError::ParseError(_)));
    let err = editor.import_captions("json", "{\"not\": \"an array\"}").unwrap_err();
    assert!(matches!(err, CoreError::ParseError(_) | CoreError::JsonError(_)));

    assert_eq!(editor.state(), &before);
    assert_eq!(editor.undo_count(), 1);
}

#[test]
fn test_destructive_hostile_timestamps_fail_cleanly() {
    let mut editor = CaptionEditor::new();
    editor.add_caption(0, 1000, "keep me").unwrap();
    let before = editor.state().clone();

    let hostile = [
        "1\n00:00:01.\u{e9}\u{e9} --> 00:00:02,000\nhi\n",
        "1\n99999999999999:00:00,000 --> 99999999999999:00:01,000\nhi\n",
    ];
    for content in hostile {
        let err = editor.import_captions("srt", content).unwrap_err();
        assert!(matches!(err, CoreError::ParseError(_)), "{err:?}");
    }
    let err = editor
        .import_captions("vtt", "WEBVTT\n\n00:01.\u{e9} --> 00:02.000\nhi\n")
        .unwrap_err();
    assert!(matches!(err, CoreError::ParseError(_)), "{err:?}");

    assert_eq!(editor.state(), &before);
    assert_eq!(editor.undo_count(), 1);
}

#[test]
fn test_destructive_shift_clamps_at_zero_preserving_duration() {
    let mut editor = CaptionEditor::new();
    let a = editor.add_caption(500, 1500, "a").unwrap();
    let b = editor.add_caption(5000, 7000, "b").unwrap();

    editor.shift_all_captions(-2000).unwrap();
    let a_caption = editor.caption(&a).unwrap();
    assert_eq!((a_caption.start_ms, a_caption.end_ms), (0, 1000));
    let b_caption = editor.caption(&b).unwrap();
    assert_eq!((b_caption.start_ms, b_caption.end_ms), (3000, 5000));
}

#[test]
fn test_destructive_invalid_inputs() {
    let mut editor = CaptionEditor::new();
    let id = editor.add_caption(0, 1000, "x").unwrap();

    assert!(matches!(editor.add_caption(10, 10, ""), Err(CoreError::InvalidRange(_))));
    assert!(matches!(editor.split_caption(&id, 0), Err(CoreError::InvalidRange(_))));
    assert!(matches!(editor.split_caption(&id, 1000), Err(CoreError::InvalidRange(_))));
    assert!(matches!(editor.split_caption("nope", 500), Err(CoreError::NotFound(_))));
    assert!(matches!(
        editor.merge_selected(&[id.clone(), id.clone()]),
        Err(CoreError::InvalidSelection(_))
    ));
    assert!(matches!(
        editor.stretch_captions(-1.0),
        Err(CoreError::InvalidArgument(_))
    ));
    assert!(matches!(
        editor.stretch_captions(f64::NAN),
        Err(CoreError::InvalidArgument(_))
    ));
    let mut style = CaptionStyle::default();
    style.font_size = 0;
    assert!(matches!(
        editor.update_caption_style(&id, style.clone()),
        Err(CoreError::ValidationError(_))
    ));
    assert!(matches!(
        editor.update_global_style(style),
        Err(CoreError::ValidationError(_))
    ));

    assert_eq!(editor.undo_count(), 1);
    assert_store_invariants(&editor);
}

#[test]
fn test_destructive_delete_missing_ids_is_not_an_error() {
    let mut editor = CaptionEditor::new();
    let id = editor.add_caption(0, 1000, "x").unwrap();
    let ids: Vec<CaptionId> = vec!["ghost".into(), id.clone(), id.clone()];

    assert_eq!(editor.delete_captions(&ids).unwrap(), 1);
    assert!(editor.captions().is_empty());
    assert_eq!(editor.delete_captions(&ids).unwrap(), 0);
}

#[test]
fn test_destructive_transform_offset_always_in_bounds() {
    let width = 800.0;
    let mut t = TimelineTransform::default();
    let moves = [
        (-3.0, 10.0),
        (-1.0, 790.0),
        (-50.0, 400.0),
        (2.0, 0.0),
        (-7.0, 800.0),
        (1e9, 200.0),
        (-1e-9, 1.0),
    ];
    for (delta, mouse_x) in moves {
        t = handle_wheel(t, 30_000.0, width, mouse_x, delta);
        assert!(t.offset >= 0.0 && t.offset <= max_offset(width, t.scale) + 1e-9);

        t = handle_pan_move(t, width, mouse_x, mouse_x - 333.0);
        assert!(t.offset >= 0.0 && t.offset <= max_offset(width, t.scale) + 1e-9);
    }
}
