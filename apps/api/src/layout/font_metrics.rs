//! Static font-metric tables and the table-driven `MetricsSurface`.
//!
//! Character widths are in em units (relative to font size). This is an
//! approximation of real shaping: it has no kerning or ligatures, but it is
//! deterministic and needs no font files, which makes it the measurement backend
//! for dry-run sizing and for hosts without a font database.
//!
//! ASCII 0x20..=0x7E comes from the per-family tables (index = code - 32).
//! Hangul, CJK and full-width forms measure 1.0 em; any other non-ASCII character
//! falls back to the family's average width.

use serde::{Deserialize, Serialize};

use crate::layout::style::{Extents, StyleSpec, WrapMode};
use crate::layout::surface::RenderSurface;

/// Horizontal growth applied to every glyph in bold.
const BOLD_WIDTH_FACTOR: f32 = 1.06;
/// Horizontal growth applied to every glyph in italic (slant overhang).
const ITALIC_WIDTH_FACTOR: f32 = 1.02;
const FULL_WIDTH_EM: f32 = 1.0;

// ────────────────────────────────────────────────────────────────────────────
// Font classes
// ────────────────────────────────────────────────────────────────────────────

/// Width class used to pick a metric table for a CSS font-family string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontClass {
    /// Humanist sans-serif (the default).
    Sans,
    /// Old-style serif.
    Serif,
    /// Narrow display faces.
    Condensed,
    /// Fixed pitch.
    Monospace,
}

impl FontClass {
    /// Classifies a font-family value, e.g. `"Noto Serif KR"` or `"monospace"`.
    ///
    /// Only the first family of a comma-separated list is considered.
    pub fn for_family(family: &str) -> Self {
        let first = family
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_ascii_lowercase();

        if first.contains("mono") || first.contains("courier") || first.contains("coding") {
            FontClass::Monospace
        } else if first.contains("condensed")
            || first.contains("narrow")
            || first.contains("oswald")
            || first.contains("impact")
        {
            FontClass::Condensed
        } else if first.contains("sans") {
            FontClass::Sans
        } else if first.contains("serif")
            || first.contains("garamond")
            || first.contains("myeongjo")
            || first.contains("batang")
            || first.contains("times")
        {
            FontClass::Serif
        } else {
            FontClass::Sans
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font class.
///
/// `widths[i]` = width of ASCII character `(i + 32)` in em.
pub struct FontMetricTable {
    pub class: FontClass,
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters that are not full-width.
    pub average_char_width: f32,
}

impl FontMetricTable {
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else if is_full_width(c) {
            FULL_WIDTH_EM
        } else if c.is_control() {
            0.0
        } else {
            self.average_char_width
        }
    }

    /// Measures the unstyled width of a single line in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Measures the width of a single line in em units with bold/italic applied.
    pub fn measure_styled(&self, s: &str, style: &StyleSpec) -> f32 {
        let mut factor = 1.0;
        if style.bold {
            factor *= BOLD_WIDTH_FACTOR;
        }
        if style.italic {
            factor *= ITALIC_WIDTH_FACTOR;
        }
        self.measure_str(s) * factor
    }
}

/// Hangul syllables/jamo, CJK ideographs and kana, and full-width forms.
fn is_full_width(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA960..=0xA97F
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF01..=0xFF60
        | 0xFFE0..=0xFFE6
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static SANS_TABLE: FontMetricTable = FontMetricTable {
    class: FontClass::Sans,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.52,
};

static SERIF_TABLE: FontMetricTable = FontMetricTable {
    class: FontClass::Serif,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.21, 0.26, 0.32, 0.48, 0.48, 0.76, 0.57, 0.19, 0.28, 0.28, 0.33, 0.50, 0.24, 0.28, 0.24, 0.26,
        // 0     1     2     3     4     5     6     7     8     9
        0.48, 0.48, 0.48, 0.48, 0.48, 0.48, 0.48, 0.48, 0.48, 0.48,
        // :     ;     <     =     >     ?     @
        0.24, 0.24, 0.50, 0.50, 0.50, 0.43, 0.87,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.57, 0.52, 0.52, 0.57, 0.48, 0.43, 0.57, 0.57, 0.21, 0.33, 0.52, 0.45, 0.66,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.57, 0.61, 0.48, 0.61, 0.52, 0.43, 0.48, 0.57, 0.57, 0.76, 0.52, 0.52, 0.48,
        // [     \     ]     ^     _     `
        0.24, 0.26, 0.24, 0.40, 0.48, 0.29,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.48, 0.48, 0.43, 0.48, 0.48, 0.26, 0.48, 0.48, 0.19, 0.19, 0.45, 0.19, 0.71,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.48, 0.48, 0.48, 0.48, 0.28, 0.37, 0.33, 0.48, 0.43, 0.61, 0.43, 0.43, 0.37,
        // {     |     }     ~
        0.28, 0.22, 0.28, 0.50,
    ],
    average_char_width: 0.44,
};

static CONDENSED_TABLE: FontMetricTable = FontMetricTable {
    class: FontClass::Condensed,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.17, 0.20, 0.26, 0.38, 0.38, 0.61, 0.46, 0.15, 0.23, 0.23, 0.27, 0.40, 0.19, 0.23, 0.19, 0.21,
        // 0     1     2     3     4     5     6     7     8     9
        0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38, 0.38,
        // :     ;     <     =     >     ?     @
        0.19, 0.19, 0.40, 0.40, 0.40, 0.34, 0.69,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.46, 0.41, 0.41, 0.46, 0.38, 0.34, 0.46, 0.46, 0.17, 0.27, 0.41, 0.36, 0.53,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.46, 0.49, 0.38, 0.49, 0.41, 0.34, 0.38, 0.46, 0.46, 0.61, 0.41, 0.41, 0.38,
        // [     \     ]     ^     _     `
        0.19, 0.21, 0.19, 0.32, 0.38, 0.23,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.38, 0.38, 0.34, 0.38, 0.38, 0.21, 0.38, 0.38, 0.15, 0.15, 0.36, 0.15, 0.56,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.38, 0.38, 0.38, 0.38, 0.23, 0.30, 0.27, 0.38, 0.34, 0.49, 0.34, 0.34, 0.30,
        // {     |     }     ~
        0.23, 0.18, 0.23, 0.40,
    ],
    average_char_width: 0.35,
};

static MONOSPACE_TABLE: FontMetricTable = FontMetricTable {
    class: FontClass::Monospace,
    widths: [0.60; 95],
    average_char_width: 0.60,
};

/// Returns the static metric table for a font class.
pub fn get_metrics(class: FontClass) -> &'static FontMetricTable {
    match class {
        FontClass::Sans => &SANS_TABLE,
        FontClass::Serif => &SERIF_TABLE,
        FontClass::Condensed => &CONDENSED_TABLE,
        FontClass::Monospace => &MONOSPACE_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MetricsSurface
// ────────────────────────────────────────────────────────────────────────────

/// A rendering surface that measures with the static tables above.
///
/// `NoWrap` content is laid out as one line, line breaks collapsed to spaces.
/// `Pre` content keeps each `\n`-separated line; width is the widest line.
pub struct MetricsSurface {
    text: String,
    style: StyleSpec,
    font_size_px: u32,
}

impl MetricsSurface {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            style: StyleSpec::default(),
            font_size_px: 0,
        }
    }

    /// Width in em and line count for the current content.
    fn em_layout(&self) -> (f32, usize) {
        let metrics = get_metrics(FontClass::for_family(&self.style.font_family));
        match self.style.wrap_mode {
            WrapMode::NoWrap => {
                let collapsed = self.text.replace('\n', " ");
                (metrics.measure_styled(&collapsed, &self.style), 1)
            }
            WrapMode::Pre => {
                let widest = self
                    .text
                    .split('\n')
                    .map(|line| metrics.measure_styled(line, &self.style))
                    .fold(0.0_f32, f32::max);
                (widest, self.text.split('\n').count())
            }
        }
    }
}

impl Default for MetricsSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for MetricsSurface {
    fn is_attached(&self) -> bool {
        true
    }

    fn apply_style(&mut self, text: &str, style: &StyleSpec) {
        self.text = text.to_string();
        self.style = style.clone();
    }

    fn set_font_size_px(&mut self, px: u32) {
        self.font_size_px = px;
    }

    fn font_size_px(&self) -> u32 {
        self.font_size_px
    }

    fn measure_rendered_extents(&mut self) -> Extents {
        let (width_em, lines) = self.em_layout();
        let size = self.font_size_px as f32;
        Extents {
            width: width_em * size,
            height: lines as f32 * self.style.wrap_mode.line_height() * size,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::autofit::{fit, MarginPolicy};
    use crate::layout::style::{BoxConstraint, SizeBounds};

    fn style(family: &str) -> StyleSpec {
        StyleSpec {
            font_family: family.to_string(),
            ..StyleSpec::default()
        }
    }

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(get_metrics(FontClass::Sans).measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_single_space() {
        let width = get_metrics(FontClass::Sans).measure_str(" ");
        assert!((width - 0.25).abs() < 1e-4, "space width should be 0.25, got {width}");
    }

    #[test]
    fn test_hangul_is_full_width() {
        let metrics = get_metrics(FontClass::Sans);
        assert!((metrics.measure_str("가나다") - 3.0).abs() < 1e-4);
        assert!((metrics.char_width('Ａ') - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_other_non_ascii_uses_average() {
        let metrics = get_metrics(FontClass::Serif);
        assert!((metrics.char_width('é') - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_family_classification() {
        assert_eq!(FontClass::for_family("sans-serif"), FontClass::Sans);
        assert_eq!(FontClass::for_family("Noto Sans KR"), FontClass::Sans);
        assert_eq!(FontClass::for_family("'EB Garamond', serif"), FontClass::Serif);
        assert_eq!(FontClass::for_family("Nanum Myeongjo"), FontClass::Serif);
        assert_eq!(FontClass::for_family("JetBrains Mono"), FontClass::Monospace);
        assert_eq!(FontClass::for_family("Oswald"), FontClass::Condensed);
        assert_eq!(FontClass::for_family("Comic Sans MS"), FontClass::Sans);
        assert_eq!(FontClass::for_family(""), FontClass::Sans);
    }

    #[test]
    fn test_bold_and_italic_widen() {
        let metrics = get_metrics(FontClass::Sans);
        let plain = metrics.measure_styled("emoji", &style("sans-serif"));
        let bold = metrics.measure_styled(
            "emoji",
            &StyleSpec {
                bold: true,
                ..style("sans-serif")
            },
        );
        let both = metrics.measure_styled(
            "emoji",
            &StyleSpec {
                bold: true,
                italic: true,
                ..style("sans-serif")
            },
        );
        assert!(plain < bold && bold < both);
    }

    #[test]
    fn test_condensed_narrower_than_sans() {
        let text = "party parrot";
        assert!(
            get_metrics(FontClass::Condensed).measure_str(text)
                < get_metrics(FontClass::Sans).measure_str(text)
        );
    }

    #[test]
    fn test_pre_mode_height_counts_lines() {
        let mut surface = MetricsSurface::new();
        surface.apply_style("ab\ncd\nef", &style("sans-serif").resolved_for("ab\ncd\nef"));
        surface.set_font_size_px(10);
        let extents = surface.measure_rendered_extents();
        assert!((extents.height - 36.0).abs() < 1e-3, "got {}", extents.height);
        // widest line: "ab" / "cd" / "ef" in sans
        let expected = get_metrics(FontClass::Sans).measure_str("ab").max(
            get_metrics(FontClass::Sans)
                .measure_str("cd")
                .max(get_metrics(FontClass::Sans).measure_str("ef")),
        ) * 10.0;
        assert!((extents.width - expected).abs() < 1e-3);
    }

    #[test]
    fn test_measurement_scales_with_size() {
        let mut surface = MetricsSurface::new();
        surface.apply_style("hello", &style("serif"));
        surface.set_font_size_px(10);
        let small = surface.measure_rendered_extents();
        surface.set_font_size_px(20);
        let large = surface.measure_rendered_extents();
        assert!((large.width - 2.0 * small.width).abs() < 1e-3);
        assert!((large.height - 2.0 * small.height).abs() < 1e-3);
    }

    #[test]
    fn test_fit_with_metrics_surface_stays_in_box() {
        let mut surface = MetricsSurface::new();
        let fit_box = BoxConstraint::default();
        for text in ["ok", "LGTM", "배포 완료", "ship it\nnow", "a rather long emoji name"] {
            let result = fit(
                &mut surface,
                text,
                &style("sans-serif"),
                fit_box,
                SizeBounds::new(1, 200).unwrap(),
                MarginPolicy::None,
            )
            .unwrap();
            assert!(!result.overflows, "{text}");
            assert_eq!(surface.font_size_px(), result.font_size_px);
            assert!(fit_box.contains(surface.measure_rendered_extents()), "{text}");
        }
    }

    #[test]
    fn test_short_text_is_height_bound() {
        // "I" is narrow, so the line height caps the size: 112 / 1.15 = 97.
        let mut surface = MetricsSurface::new();
        let result = fit(
            &mut surface,
            "I",
            &style("sans-serif"),
            BoxConstraint::default(),
            SizeBounds::new(1, 200).unwrap(),
            MarginPolicy::None,
        )
        .unwrap();
        assert_eq!(result.font_size_px, 97);
    }
}
