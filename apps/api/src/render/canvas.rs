//! `CanvasSurface`: a rendering surface backed by cosmic-text shaping.
//!
//! The surface owns its `FontSystem` and glyph cache, the current text, style and
//! font size. The sizer writes the font size; `export_png` (see `export.rs`) reads
//! the same handle to rasterise the result.

use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, SwashCache, Weight, Wrap,
};

use crate::layout::{Extents, RenderSurface, StyleSpec, TextAlign, WrapMode};

/// One laid-out line, relative to the top-left of the text block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LineBox {
    pub(crate) width: f32,
    pub(crate) baseline: f32,
}

pub struct CanvasSurface {
    pub(crate) font_system: FontSystem,
    pub(crate) swash_cache: SwashCache,
    pub(crate) text: String,
    pub(crate) style: StyleSpec,
    pub(crate) font_size_px: u32,
}

impl CanvasSurface {
    pub fn new(font_system: FontSystem) -> Self {
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            text: String::new(),
            style: StyleSpec::default(),
            font_size_px: 0,
        }
    }

    /// Shapes the current content at the current font size.
    pub(crate) fn shape(&mut self) -> Buffer {
        let size = self.font_size_px.max(1) as f32;
        let metrics = Metrics::new(size, size * self.style.wrap_mode.line_height());
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_wrap(&mut self.font_system, Wrap::None);

        let content = match self.style.wrap_mode {
            WrapMode::NoWrap => self.text.replace('\n', " "),
            WrapMode::Pre => self.text.clone(),
        };

        let attrs = text_attrs(&self.style);
        buffer.set_text(&mut self.font_system, &content, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    /// Block extents and per-line boxes of a shaped buffer.
    pub(crate) fn line_boxes(buffer: &Buffer) -> (Extents, Vec<LineBox>) {
        let mut extents = Extents::default();
        let mut lines = Vec::new();
        for run in buffer.layout_runs() {
            extents.width = extents.width.max(run.line_w);
            extents.height = extents.height.max(run.line_top + run.line_height);
            lines.push(LineBox {
                width: run.line_w,
                baseline: run.line_y,
            });
        }
        (extents, lines)
    }
}

impl RenderSurface for CanvasSurface {
    fn is_attached(&self) -> bool {
        self.font_system.db().len() > 0
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
        let buffer = self.shape();
        Self::line_boxes(&buffer).0
    }
}

/// Maps a CSS font-family value to a cosmic-text family.
pub(crate) fn family_for(name: &str) -> Family<'_> {
    let first = name
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');
    match first.to_ascii_lowercase().as_str() {
        "" | "sans-serif" | "system-ui" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(first),
    }
}

fn text_attrs(style: &StyleSpec) -> Attrs<'_> {
    Attrs::new()
        .family(family_for(&style.font_family))
        .weight(if style.bold { Weight::BOLD } else { Weight::NORMAL })
        .style(if style.italic { Style::Italic } else { Style::Normal })
}

/// Horizontal offset of a line inside a block of `block_width`.
pub(crate) fn align_offset(align: TextAlign, block_width: f32, line_width: f32) -> f32 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => (block_width - line_width) / 2.0,
        TextAlign::Right => block_width - line_width,
    }
}
