//! Style and geometry inputs for one auto-fit invocation.
//!
//! Every type here is immutable per sizing call. Callers build a fresh `StyleSpec`
//! whenever the text or any style toggle changes.

use serde::{Deserialize, Serialize};

use crate::layout::autofit::{FitError, MAX_FONT_PX};

/// Outer canvas edge in logical pixels.
pub const CANVAS_SIZE_PX: u32 = 128;
/// Padding between the canvas edge and the text box, per side.
pub const CANVAS_PADDING_PX: u32 = 8;
/// Line-height multiplier used when explicit line breaks are preserved.
pub const PRE_LINE_HEIGHT: f32 = 1.2;
/// Approximation of the CSS `line-height: normal` multiplier.
pub const NORMAL_LINE_HEIGHT: f32 = 1.15;

// ────────────────────────────────────────────────────────────────────────────
// Style
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// How line breaks in the text are treated during layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    /// Single line, default line height.
    #[default]
    NoWrap,
    /// Explicit line breaks kept, fixed 1.2 line height.
    Pre,
}

impl WrapMode {
    /// Picks the layout mode from the text content alone.
    pub fn for_text(text: &str) -> Self {
        if text.contains('\n') {
            WrapMode::Pre
        } else {
            WrapMode::NoWrap
        }
    }

    pub fn line_height(self) -> f32 {
        match self {
            WrapMode::NoWrap => NORMAL_LINE_HEIGHT,
            WrapMode::Pre => PRE_LINE_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSpec {
    pub font_family: String,
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub align: TextAlign,
    pub wrap_mode: WrapMode,
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            bold: false,
            italic: false,
            strikethrough: false,
            align: TextAlign::Center,
            wrap_mode: WrapMode::NoWrap,
        }
    }
}

impl StyleSpec {
    /// Returns a copy whose wrap mode matches `text`.
    pub fn resolved_for(&self, text: &str) -> Self {
        Self {
            wrap_mode: WrapMode::for_text(text),
            ..self.clone()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// The pixel box the rendered text must fit inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxConstraint {
    pub width: u32,
    pub height: u32,
}

impl BoxConstraint {
    pub fn new(width: u32, height: u32) -> Result<Self, FitError> {
        if width == 0 || height == 0 {
            return Err(FitError::InvalidBox { width, height });
        }
        Ok(Self { width, height })
    }

    /// The padded text box of a square canvas: `canvas - 2 * padding` per side.
    pub fn inset(canvas_px: u32, padding_px: u32) -> Result<Self, FitError> {
        let inner = canvas_px.saturating_sub(padding_px.saturating_mul(2));
        Self::new(inner, inner)
    }

    pub fn contains(&self, extents: Extents) -> bool {
        extents.width <= self.width as f32 && extents.height <= self.height as f32
    }
}

impl Default for BoxConstraint {
    /// 112×112, the padded box of the 128 px emoji canvas.
    fn default() -> Self {
        let inner = CANVAS_SIZE_PX - 2 * CANVAS_PADDING_PX;
        Self {
            width: inner,
            height: inner,
        }
    }
}

/// Inclusive range of candidate font sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBounds {
    pub min: u32,
    pub max: u32,
}

impl SizeBounds {
    pub const DEFAULT_MAX: u32 = 120;

    pub fn new(min: u32, max: u32) -> Result<Self, FitError> {
        if min == 0 || max < min || max > MAX_FONT_PX {
            return Err(FitError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self {
            min: 1,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Rendered text extents in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extents {
    pub width: f32,
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_mode_from_line_break() {
        assert_eq!(WrapMode::for_text("hello"), WrapMode::NoWrap);
        assert_eq!(WrapMode::for_text("hel\nlo"), WrapMode::Pre);
        assert_eq!(WrapMode::for_text(""), WrapMode::NoWrap);
    }

    #[test]
    fn test_resolved_for_overrides_wrap_mode_only() {
        let style = StyleSpec {
            font_family: "serif".to_string(),
            bold: true,
            wrap_mode: WrapMode::Pre,
            ..StyleSpec::default()
        };
        let resolved = style.resolved_for("one line");
        assert_eq!(resolved.wrap_mode, WrapMode::NoWrap);
        assert_eq!(resolved.font_family, "serif");
        assert!(resolved.bold);
    }

    #[test]
    fn test_default_box_is_padded_canvas() {
        let b = BoxConstraint::default();
        assert_eq!((b.width, b.height), (112, 112));
        assert_eq!(BoxConstraint::inset(128, 8).unwrap(), b);
    }

    #[test]
    fn test_box_rejects_zero_dimension() {
        assert!(BoxConstraint::new(0, 10).is_err());
        assert!(BoxConstraint::inset(16, 8).is_err());
    }

    #[test]
    fn test_bounds_validation() {
        assert!(SizeBounds::new(0, 10).is_err());
        assert!(SizeBounds::new(10, 9).is_err());
        assert!(SizeBounds::new(1, MAX_FONT_PX + 1).is_err());
        assert_eq!(SizeBounds::new(5, 5).unwrap(), SizeBounds { min: 5, max: 5 });
    }

    #[test]
    fn test_box_contains_is_inclusive() {
        let b = BoxConstraint::new(112, 112).unwrap();
        assert!(b.contains(Extents {
            width: 112.0,
            height: 40.0
        }));
        assert!(!b.contains(Extents {
            width: 112.5,
            height: 40.0
        }));
    }

    #[test]
    fn test_style_deserializes_with_defaults() {
        let style: StyleSpec = serde_json::from_str(r#"{"font_family":"monospace"}"#).unwrap();
        assert_eq!(style.align, TextAlign::Center);
        assert_eq!(style.wrap_mode, WrapMode::NoWrap);
        assert!(!style.italic);
    }
}
