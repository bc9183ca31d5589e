//! PNG export of a sized canvas surface.
//!
//! The emoji is a square canvas filled with the background color. The text block
//! is centered both ways inside the padded box, each line is aligned within the
//! block, and anything outside the padded box is clipped.

use cosmic_text::Command;
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, Mask, Paint, PathBuilder, Pixmap, Rect, Transform};

use crate::layout::style::{CANVAS_PADDING_PX, CANVAS_SIZE_PX};
use crate::layout::surface::RenderSurface;
use crate::render::canvas::{align_offset, CanvasSurface};
use crate::render::RenderError;

pub const MIN_PIXEL_RATIO: f32 = 0.25;
pub const MAX_PIXEL_RATIO: f32 = 4.0;
/// Largest logical canvas edge a request may ask for.
pub const MAX_CANVAS_PX: u32 = 1024;

/// Strikethrough position above the baseline, as a fraction of the font size.
const STRIKE_RISE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Logical canvas edge in pixels.
    pub canvas_px: u32,
    pub padding_px: u32,
    /// Device pixels per logical pixel.
    pub pixel_ratio: f32,
    pub text_color: String,
    pub background_color: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            canvas_px: CANVAS_SIZE_PX,
            padding_px: CANVAS_PADDING_PX,
            pixel_ratio: 1.0,
            text_color: "#000000".to_string(),
            background_color: "#FFFFFF".to_string(),
        }
    }
}

impl ExportOptions {
    pub fn validate(&self) -> Result<(), RenderError> {
        if !(MIN_PIXEL_RATIO..=MAX_PIXEL_RATIO).contains(&self.pixel_ratio) {
            return Err(RenderError::InvalidOptions(format!(
                "pixel_ratio must be between {MIN_PIXEL_RATIO} and {MAX_PIXEL_RATIO}, got {}",
                self.pixel_ratio
            )));
        }
        if self.canvas_px == 0 || self.canvas_px > MAX_CANVAS_PX {
            return Err(RenderError::InvalidOptions(format!(
                "canvas_px must be between 1 and {MAX_CANVAS_PX}, got {}",
                self.canvas_px
            )));
        }
        if self.padding_px.saturating_mul(2) >= self.canvas_px {
            return Err(RenderError::InvalidOptions(format!(
                "padding {} leaves no room on a {} px canvas",
                self.padding_px, self.canvas_px
            )));
        }
        Ok(())
    }

    /// Edge of the rasterised image in device pixels.
    pub fn device_px(&self) -> u32 {
        (self.canvas_px as f32 * self.pixel_ratio).round().max(1.0) as u32
    }
}

/// Parses a CSS color string into a tiny-skia color.
pub fn parse_color(s: &str) -> Result<tiny_skia::Color, RenderError> {
    let parsed = csscolorparser::parse(s).map_err(|e| RenderError::Color {
        value: s.to_string(),
        reason: e.to_string(),
    })?;

    let [r, g, b, a] = parsed.to_array();
    tiny_skia::Color::from_rgba(r, g, b, a).ok_or_else(|| RenderError::Color {
        value: s.to_string(),
        reason: "component out of range".to_string(),
    })
}

impl CanvasSurface {
    /// Rasterises the current text, style and font size to PNG bytes.
    ///
    /// A detached surface exports the background only.
    pub fn export_png(&mut self, options: &ExportOptions) -> Result<Vec<u8>, RenderError> {
        options.validate()?;
        let background = parse_color(&options.background_color)?;
        let foreground = parse_color(&options.text_color)?;

        let device_px = options.device_px();
        let mut pixmap = Pixmap::new(device_px, device_px).ok_or_else(|| {
            RenderError::InvalidOptions(format!("cannot allocate {device_px}x{device_px} canvas"))
        })?;
        pixmap.fill(background);

        if self.is_attached() && !self.text.is_empty() {
            self.draw_text(&mut pixmap, options, foreground)?;
        }

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Png(e.to_string()))
    }

    fn draw_text(
        &mut self,
        pixmap: &mut Pixmap,
        options: &ExportOptions,
        color: tiny_skia::Color,
    ) -> Result<(), RenderError> {
        let scale = Transform::from_scale(options.pixel_ratio, options.pixel_ratio);
        let padding = options.padding_px as f32;
        let inner = options
            .canvas_px
            .saturating_sub(options.padding_px.saturating_mul(2)) as f32;

        // overflow: hidden on the padded box
        let clip_rect = Rect::from_xywh(padding, padding, inner, inner)
            .ok_or_else(|| RenderError::InvalidOptions("empty text box".to_string()))?;
        let mut clip = Mask::new(pixmap.width(), pixmap.height())
            .ok_or_else(|| RenderError::InvalidOptions("cannot allocate clip mask".to_string()))?;
        clip.fill_path(&PathBuilder::from_rect(clip_rect), FillRule::Winding, true, scale);

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        let buffer = self.shape();
        let (block, lines) = Self::line_boxes(&buffer);
        let block_x = padding + (inner - block.width) / 2.0;
        let block_y = padding + (inner - block.height) / 2.0;
        let align = self.style.align;

        for (run, line) in buffer.layout_runs().zip(lines.iter()) {
            let line_x = block_x + align_offset(align, block.width, line.width);

            for glyph in run.glyphs.iter() {
                let physical_glyph = glyph.physical((0.0, 0.0), 1.0);
                let glyph_x = line_x + glyph.x + glyph.font_size * glyph.x_offset;
                let glyph_y = block_y + line.baseline + glyph.y - glyph.font_size * glyph.y_offset;

                let Some(commands) = self
                    .swash_cache
                    .get_outline_commands(&mut self.font_system, physical_glyph.cache_key)
                else {
                    continue;
                };

                // Font outlines are y-up; the canvas is y-down.
                let mut path_builder = PathBuilder::new();
                for cmd in commands {
                    match cmd {
                        Command::MoveTo(p) => path_builder.move_to(p.x, -p.y),
                        Command::LineTo(p) => path_builder.line_to(p.x, -p.y),
                        Command::QuadTo(ctrl, end) => {
                            path_builder.quad_to(ctrl.x, -ctrl.y, end.x, -end.y)
                        }
                        Command::CurveTo(c1, c2, end) => {
                            path_builder.cubic_to(c1.x, -c1.y, c2.x, -c2.y, end.x, -end.y)
                        }
                        Command::Close => path_builder.close(),
                    }
                }

                if let Some(path) = path_builder.finish() {
                    let transform = Transform::from_translate(glyph_x, glyph_y).post_concat(scale);
                    pixmap.fill_path(&path, &paint, FillRule::Winding, transform, Some(&clip));
                }
            }

            if self.style.strikethrough && line.width > 0.0 {
                let size = self.font_size_px.max(1) as f32;
                let thickness = (size / 14.0).max(1.0);
                let y = block_y + line.baseline - size * STRIKE_RISE - thickness / 2.0;
                if let Some(rect) = Rect::from_xywh(line_x, y, line.width, thickness) {
                    pixmap.fill_rect(rect, &paint, scale, Some(&clip));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::style::StyleSpec;
    use crate::render::fonts::FontLibrary;

    /// Width and height from the PNG IHDR chunk.
    fn png_dimensions(png: &[u8]) -> (u32, u32) {
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n", "not a PNG");
        let w = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let h = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        (w, h)
    }

    #[test]
    fn test_parse_color_accepts_css_forms() {
        assert!(parse_color("#FF0000").is_ok());
        assert!(parse_color("rgb(0, 128, 255)").is_ok());
        assert!(parse_color("rebeccapurple").is_ok());
        assert!(matches!(
            parse_color("not-a-color"),
            Err(RenderError::Color { .. })
        ));
    }

    #[test]
    fn test_options_validation() {
        assert!(ExportOptions::default().validate().is_ok());
        let bad_ratio = ExportOptions {
            pixel_ratio: 8.0,
            ..ExportOptions::default()
        };
        assert!(bad_ratio.validate().is_err());
        let bad_padding = ExportOptions {
            padding_px: 64,
            ..ExportOptions::default()
        };
        assert!(bad_padding.validate().is_err());
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let huge = ExportOptions {
            canvas_px: 50_000,
            pixel_ratio: MAX_PIXEL_RATIO,
            ..ExportOptions::default()
        };
        assert!(matches!(huge.validate(), Err(RenderError::InvalidOptions(_))));
        let largest = ExportOptions {
            canvas_px: MAX_CANVAS_PX,
            ..ExportOptions::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_huge_padding_rejected_without_overflow() {
        let options = ExportOptions {
            padding_px: u32::MAX / 2 + 1,
            ..ExportOptions::default()
        };
        assert!(matches!(options.validate(), Err(RenderError::InvalidOptions(_))));
    }

    #[test]
    fn test_device_size_follows_pixel_ratio() {
        let options = ExportOptions {
            pixel_ratio: 2.0,
            ..ExportOptions::default()
        };
        assert_eq!(options.device_px(), 256);
    }

    #[test]
    fn test_background_only_export_from_empty_database() {
        let mut surface = FontLibrary::empty().surface();
        surface.apply_style("AB", &StyleSpec::default());
        surface.set_font_size_px(40);
        let png = surface
            .export_png(&ExportOptions {
                pixel_ratio: 2.0,
                ..ExportOptions::default()
            })
            .unwrap();
        assert_eq!(png_dimensions(&png), (256, 256));
    }

    #[test]
    fn test_invalid_color_rejected_before_drawing() {
        let mut surface = FontLibrary::empty().surface();
        let err = surface
            .export_png(&ExportOptions {
                text_color: "#GGGGGG".to_string(),
                ..ExportOptions::default()
            })
            .unwrap_err();
        assert!(matches!(err, RenderError::Color { .. }));
    }

    #[test]
    fn test_export_with_system_fonts() {
        let fonts = FontLibrary::load(true, None);
        if fonts.face_count() == 0 {
            return;
        }
        let mut surface = fonts.surface();
        let style = StyleSpec {
            strikethrough: true,
            ..StyleSpec::default()
        };
        surface.apply_style("LGTM", &style);
        surface.set_font_size_px(32);
        let png = surface.export_png(&ExportOptions::default()).unwrap();
        assert_eq!(png_dimensions(&png), (128, 128));
    }
}
