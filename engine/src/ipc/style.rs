//! UI Style Boundary
//!
//! The style panel speaks camelCase display names (`fontSize`,
//! `backgroundColor`, `textAlign`) and may omit any field. This module maps
//! that shape onto the canonical `CaptionStyle` and back.

use serde::{Deserialize, Serialize};
use specta::Type;

use crate::core::captions::{
    resolve_style, AnimationType, CaptionPosition, CaptionStyle, StyleOverrides, TextAlign,
    WordHighlight,
};

/// Caption style as sent by the UI layer
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase", default)]
pub struct UiCaptionStyle {
    pub position: Option<CaptionPosition>,
    #[serde(alias = "alignment")]
    pub text_align: Option<TextAlign>,
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub color: Option<String>,
    #[serde(alias = "background")]
    pub background_color: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub outline_color: Option<String>,
    pub outline_width: Option<u32>,
    pub shadow_color: Option<String>,
    pub shadow_offset_x: Option<i32>,
    pub shadow_offset_y: Option<i32>,
    pub shadow_blur: Option<f32>,
    pub letter_spacing: Option<f32>,
    pub border_radius: Option<f32>,
    pub animation_type: Option<AnimationType>,
    pub animation_duration: Option<f32>,
    pub highlight: Option<WordHighlight>,
}

/// Blank strings from form inputs mean "not set"
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl UiCaptionStyle {
    /// Fields the UI actually set, as canonical overrides
    pub fn to_overrides(&self) -> StyleOverrides {
        StyleOverrides {
            position: self.position,
            alignment: self.text_align,
            font_family: present(&self.font_family),
            font_size: self.font_size.filter(|&size| size > 0),
            color: present(&self.color),
            background: present(&self.background_color),
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            outline_color: present(&self.outline_color),
            outline_width: self.outline_width,
            shadow_color: present(&self.shadow_color),
            shadow_offset_x: self.shadow_offset_x,
            shadow_offset_y: self.shadow_offset_y,
            shadow_blur: self.shadow_blur,
            letter_spacing: self.letter_spacing,
            border_radius: self.border_radius,
            animation_type: self.animation_type,
            animation_duration: self.animation_duration,
            highlight: self.highlight.clone(),
        }
    }

    /// Complete canonical style; omitted fields take the documented defaults.
    pub fn to_caption_style(&self) -> CaptionStyle {
        resolve_style(&CaptionStyle::default(), Some(&self.to_overrides()))
    }
}

impl From<UiCaptionStyle> for CaptionStyle {
    fn from(style: UiCaptionStyle) -> Self {
        style.to_caption_style()
    }
}

impl From<&CaptionStyle> for UiCaptionStyle {
    fn from(style: &CaptionStyle) -> Self {
        Self {
            position: Some(style.position),
            text_align: Some(style.alignment),
            font_family: Some(style.font_family.clone()),
            font_size: Some(style.font_size),
            color: Some(style.color.clone()),
            background_color: Some(style.background.clone()),
            bold: Some(style.bold),
            italic: Some(style.italic),
            underline: Some(style.underline),
            outline_color: style.outline_color.clone(),
            outline_width: Some(style.outline_width),
            shadow_color: style.shadow_color.clone(),
            shadow_offset_x: Some(style.shadow_offset_x),
            shadow_offset_y: Some(style.shadow_offset_y),
            shadow_blur: Some(style.shadow_blur),
            letter_spacing: Some(style.letter_spacing),
            border_radius: Some(style.border_radius),
            animation_type: Some(style.animation_type),
            animation_duration: Some(style.animation_duration),
            highlight: Some(style.highlight.clone()),
        }
    }
}
