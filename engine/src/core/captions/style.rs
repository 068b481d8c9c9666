//! Caption Style Resolution
//!
//! Merges a base style (the global template or the documented defaults) with
//! partial per-caption overrides, and validates complete style records before
//! they are written into the store.

use serde::{Deserialize, Serialize};
use specta::Type;

use super::{AnimationType, CaptionPosition, CaptionStyle, TextAlign, WordHighlight};
use crate::core::{is_css_color, CoreError, CoreResult};

const MAX_FONT_SIZE: u32 = 512;
const MAX_OUTLINE_WIDTH: u32 = 64;
const MAX_ANIMATION_SECS: f32 = 10.0;
const MAX_HIGHLIGHT_SCALE: f32 = 4.0;

/// Partial style: every field is optional and unset fields inherit from the base.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Type)]
#[serde(default)]
pub struct StyleOverrides {
    pub position: Option<CaptionPosition>,
    pub alignment: Option<TextAlign>,
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub color: Option<String>,
    pub background: Option<String>,
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

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Resolves a complete style from a base template and optional overrides.
///
/// With no overrides the result is an exact copy of `base`.
pub fn resolve_style(base: &CaptionStyle, overrides: Option<&StyleOverrides>) -> CaptionStyle {
    let Some(o) = overrides else {
        return base.clone();
    };

    CaptionStyle {
        position: o.position.unwrap_or(base.position),
        alignment: o.alignment.unwrap_or(base.alignment),
        font_family: o
            .font_family
            .clone()
            .unwrap_or_else(|| base.font_family.clone()),
        font_size: o.font_size.unwrap_or(base.font_size),
        color: o.color.clone().unwrap_or_else(|| base.color.clone()),
        background: o
            .background
            .clone()
            .unwrap_or_else(|| base.background.clone()),
        bold: o.bold.unwrap_or(base.bold),
        italic: o.italic.unwrap_or(base.italic),
        underline: o.underline.unwrap_or(base.underline),
        outline_color: o.outline_color.clone().or_else(|| base.outline_color.clone()),
        outline_width: o.outline_width.unwrap_or(base.outline_width),
        shadow_color: o.shadow_color.clone().or_else(|| base.shadow_color.clone()),
        shadow_offset_x: o.shadow_offset_x.unwrap_or(base.shadow_offset_x),
        shadow_offset_y: o.shadow_offset_y.unwrap_or(base.shadow_offset_y),
        shadow_blur: o.shadow_blur.unwrap_or(base.shadow_blur),
        letter_spacing: o.letter_spacing.unwrap_or(base.letter_spacing),
        border_radius: o.border_radius.unwrap_or(base.border_radius),
        animation_type: o.animation_type.unwrap_or(base.animation_type),
        animation_duration: o.animation_duration.unwrap_or(base.animation_duration),
        highlight: o
            .highlight
            .clone()
            .unwrap_or_else(|| base.highlight.clone()),
    }
}

fn check_color(label: &str, value: &str) -> CoreResult<()> {
    if is_css_color(value) {
        Ok(())
    } else {
        Err(CoreError::ValidationError(format!(
            "{label} is not a valid color: '{value}'"
        )))
    }
}

fn check_non_negative(label: &str, value: f32, max: f32) -> CoreResult<()> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::ValidationError(format!(
            "{label} must be between 0 and {max}, got {value}"
        )))
    }
}

impl CaptionStyle {
    /// Rejects styles with missing or out-of-range fields.
    pub fn validate(&self) -> CoreResult<()> {
        if self.font_family.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "font_family must not be empty".to_string(),
            ));
        }
        if self.font_size == 0 || self.font_size > MAX_FONT_SIZE {
            return Err(CoreError::ValidationError(format!(
                "font_size must be between 1 and {MAX_FONT_SIZE}, got {}",
                self.font_size
            )));
        }
        if self.outline_width > MAX_OUTLINE_WIDTH {
            return Err(CoreError::ValidationError(format!(
                "outline_width must be at most {MAX_OUTLINE_WIDTH}, got {}",
                self.outline_width
            )));
        }

        check_color("color", &self.color)?;
        check_color("background", &self.background)?;
        if let Some(outline) = &self.outline_color {
            check_color("outline_color", outline)?;
        }
        if let Some(shadow) = &self.shadow_color {
            check_color("shadow_color", shadow)?;
        }

        check_non_negative("shadow_blur", self.shadow_blur, 100.0)?;
        check_non_negative("border_radius", self.border_radius, 100.0)?;
        check_non_negative("animation_duration", self.animation_duration, MAX_ANIMATION_SECS)?;
        if !self.letter_spacing.is_finite() {
            return Err(CoreError::ValidationError(
                "letter_spacing must be finite".to_string(),
            ));
        }

        let highlight = &self.highlight;
        check_color("highlight.color", &highlight.color)?;
        check_color("highlight.background", &highlight.background)?;
        if !highlight.scale.is_finite()
            || highlight.scale <= 0.0
            || highlight.scale > MAX_HIGHLIGHT_SCALE
        {
            return Err(CoreError::ValidationError(format!(
                "highlight.scale must be in (0, {MAX_HIGHLIGHT_SCALE}], got {}",
                highlight.scale
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_without_overrides_copies_base() {
        let base = CaptionStyle {
            font_size: 40,
            bold: true,
            ..CaptionStyle::default()
        };
        assert_eq!(resolve_style(&base, None), base);
        assert_eq!(resolve_style(&base, Some(&StyleOverrides::default())), base);
    }

    #[test]
    fn resolve_applies_only_set_fields() {
        let base = CaptionStyle::default();
        let overrides = StyleOverrides {
            font_size: Some(28),
            color: Some("#FFFF00".to_string()),
            position: Some(CaptionPosition::Top),
            ..StyleOverrides::default()
        };

        let resolved = resolve_style(&base, Some(&overrides));
        assert_eq!(resolved.font_size, 28);
        assert_eq!(resolved.color, "#FFFF00");
        assert_eq!(resolved.position, CaptionPosition::Top);
        assert_eq!(resolved.font_family, base.font_family);
        assert_eq!(resolved.background, base.background);
    }

    #[test]
    fn default_style_is_valid() {
        assert!(CaptionStyle::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_font_size() {
        let style = CaptionStyle {
            font_size: 0,
            ..CaptionStyle::default()
        };
        assert!(matches!(
            style.validate(),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn validate_rejects_malformed_colors() {
        let style = CaptionStyle {
            color: "white".to_string(),
            ..CaptionStyle::default()
        };
        let err = style.validate().unwrap_err();
        assert!(err.to_string().contains("color"));

        let style = CaptionStyle {
            outline_color: Some("#12".to_string()),
            ..CaptionStyle::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_font_family_and_nan_values() {
        let style = CaptionStyle {
            font_family: "  ".to_string(),
            ..CaptionStyle::default()
        };
        assert!(style.validate().is_err());

        let style = CaptionStyle {
            letter_spacing: f32::NAN,
            ..CaptionStyle::default()
        };
        assert!(style.validate().is_err());

        let mut style = CaptionStyle::default();
        style.highlight.scale = 0.0;
        assert!(style.validate().is_err());
    }

    #[test]
    fn transparent_background_is_accepted() {
        let style = CaptionStyle {
            background: "transparent".to_string(),
            ..CaptionStyle::default()
        };
        assert!(style.validate().is_ok());
    }
}
