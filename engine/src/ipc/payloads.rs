use serde::{Deserialize, Serialize};

use crate::core::{CaptionEditor, CaptionId, CoreResult, DeltaMs};
use crate::ipc::{ingest_transcript, TranscriptSegment, UiCaptionStyle};

/// A mutating engine call as sent by the UI: `{commandType, payload}`
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "commandType", content = "payload", rename_all = "camelCase")]
pub enum CommandPayload {
    #[serde(alias = "AddCaption", rename_all = "camelCase")]
    AddCaption {
        start_ms: DeltaMs,
        end_ms: DeltaMs,
        #[serde(default)]
        text: String,
    },
    #[serde(alias = "CreateCaption", rename_all = "camelCase")]
    CreateCaption { start_ms: DeltaMs },
    #[serde(
        alias = "DeleteCaptions",
        alias = "deleteCaption",
        alias = "DeleteCaption",
        rename_all = "camelCase"
    )]
    DeleteCaptions {
        #[serde(alias = "captionId")]
        caption_ids: OneOrMany,
    },
    #[serde(alias = "UpdateCaptionText", rename_all = "camelCase")]
    UpdateCaptionText { caption_id: CaptionId, text: String },
    #[serde(alias = "UpdateCaptionTiming", rename_all = "camelCase")]
    UpdateCaptionTiming {
        caption_id: CaptionId,
        start_ms: DeltaMs,
        end_ms: DeltaMs,
    },
    #[serde(alias = "SplitCaption", rename_all = "camelCase")]
    SplitCaption {
        caption_id: CaptionId,
        #[serde(alias = "splitTime", alias = "splitTimeMs")]
        split_ms: DeltaMs,
    },
    #[serde(
        alias = "MergeCaptions",
        alias = "mergeSelected",
        alias = "MergeSelected",
        rename_all = "camelCase"
    )]
    MergeCaptions { caption_ids: Vec<CaptionId> },
    #[serde(alias = "ShiftCaptions", alias = "shiftAllCaptions", rename_all = "camelCase")]
    ShiftCaptions { delta_ms: DeltaMs },
    #[serde(alias = "StretchCaptions", rename_all = "camelCase")]
    StretchCaptions { factor: f64 },
    #[serde(alias = "FindReplace", rename_all = "camelCase")]
    FindReplace {
        find: String,
        #[serde(default)]
        replace: String,
        #[serde(default)]
        case_sensitive: bool,
    },
    #[serde(alias = "AutoPunctuate")]
    AutoPunctuate {},
    #[serde(
        alias = "ProfanityFilter",
        alias = "applyProfanityFilter",
        rename_all = "camelCase"
    )]
    ProfanityFilter {
        #[serde(default = "default_bleep")]
        bleep: bool,
    },
    #[serde(alias = "UpdateCaptionStyle", rename_all = "camelCase")]
    UpdateCaptionStyle {
        #[serde(alias = "captionIds")]
        caption_id: OneOrMany,
        style: UiCaptionStyle,
    },
    #[serde(alias = "UpdateGlobalStyle", rename_all = "camelCase")]
    UpdateGlobalStyle { style: UiCaptionStyle },
    #[serde(alias = "ImportCaptions", rename_all = "camelCase")]
    ImportCaptions { format: String, content: String },
    #[serde(alias = "IngestTranscript", rename_all = "camelCase")]
    IngestTranscript { segments: Vec<TranscriptSegment> },
}

fn default_bleep() -> bool {
    true
}

/// Accepts either a single id or a list of ids
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(CaptionId),
    Many(Vec<CaptionId>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<CaptionId> {
        match self {
            Self::One(id) => vec![id],
            Self::Many(ids) => ids,
        }
    }
}

/// What a command reported back, beyond the new caption list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutcome {
    pub created_ids: Vec<CaptionId>,
    pub count: Option<usize>,
}

impl CommandOutcome {
    fn created(id: CaptionId) -> Self {
        Self {
            created_ids: vec![id],
            count: None,
        }
    }

    fn counted(count: usize) -> Self {
        Self {
            created_ids: Vec::new(),
            count: Some(count),
        }
    }
}

impl CommandPayload {
    pub fn parse(command_type: String, payload: serde_json::Value) -> Result<Self, String> {
        let raw_request = serde_json::json!({
            "commandType": command_type,
            "payload": payload
        });
        serde_json::from_value(raw_request).map_err(|e| format!("Invalid command payload: {}", e))
    }

    /// Runs the call against the editor. Each call records at most one
    /// history entry, and a failed call records none.
    pub fn apply(self, editor: &mut CaptionEditor) -> CoreResult<CommandOutcome> {
        let outcome = match self {
            Self::AddCaption {
                start_ms,
                end_ms,
                text,
            } => CommandOutcome::created(editor.add_caption(start_ms, end_ms, &text)?),
            Self::CreateCaption { start_ms } => {
                CommandOutcome::created(editor.create_caption(start_ms)?)
            }
            Self::DeleteCaptions { caption_ids } => {
                CommandOutcome::counted(editor.delete_captions(&caption_ids.into_vec())?)
            }
            Self::UpdateCaptionText { caption_id, text } => {
                editor.update_caption_text(&caption_id, &text)?;
                CommandOutcome::default()
            }
            Self::UpdateCaptionTiming {
                caption_id,
                start_ms,
                end_ms,
            } => {
                editor.update_caption_timing(&caption_id, start_ms, end_ms)?;
                CommandOutcome::default()
            }
            Self::SplitCaption {
                caption_id,
                split_ms,
            } => CommandOutcome::created(editor.split_caption(&caption_id, split_ms)?),
            Self::MergeCaptions { caption_ids } => {
                editor.merge_selected(&caption_ids)?;
                CommandOutcome::default()
            }
            Self::ShiftCaptions { delta_ms } => {
                editor.shift_all_captions(delta_ms)?;
                CommandOutcome::default()
            }
            Self::StretchCaptions { factor } => {
                editor.stretch_captions(factor)?;
                CommandOutcome::default()
            }
            Self::FindReplace {
                find,
                replace,
                case_sensitive,
            } => CommandOutcome::counted(editor.find_replace(&find, &replace, case_sensitive)?),
            Self::AutoPunctuate {} => CommandOutcome::counted(editor.auto_punctuate()?),
            Self::ProfanityFilter { bleep } => {
                CommandOutcome::counted(editor.apply_profanity_filter(bleep)?)
            }
            Self::UpdateCaptionStyle { caption_id, style } => {
                let ids = caption_id.into_vec();
                CommandOutcome::counted(editor.update_captions_style(&ids, style.to_caption_style())?)
            }
            Self::UpdateGlobalStyle { style } => {
                editor.update_global_style(style.to_caption_style())?;
                CommandOutcome::default()
            }
            Self::ImportCaptions { format, content } => {
                CommandOutcome::counted(editor.import_captions(&format, &content)?)
            }
            Self::IngestTranscript { segments } => {
                let created_ids = ingest_transcript(editor, &segments)?;
                CommandOutcome {
                    count: Some(created_ids.len()),
                    created_ids,
                }
            }
        };
        Ok(outcome)
    }
}
