//! The rendering surface seam between the sizer and whatever draws the text.
//!
//! A surface is a single owned handle: the sizer writes the font size into it and
//! the exporter reads the same handle afterwards. Mutating methods take `&mut self`,
//! so two overlapping sizing calls on one surface cannot compile.

use crate::layout::style::{Extents, StyleSpec};

pub trait RenderSurface {
    /// Whether the surface can currently measure text.
    fn is_attached(&self) -> bool;

    /// Sets the content and style used by subsequent measurements.
    fn apply_style(&mut self, text: &str, style: &StyleSpec);

    fn set_font_size_px(&mut self, px: u32);

    /// The font size currently applied to the surface.
    fn font_size_px(&self) -> u32;

    /// Width/height of the content at the current font size.
    fn measure_rendered_extents(&mut self) -> Extents;
}
