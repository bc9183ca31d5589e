// Emoji rendering: font database, cosmic-text canvas surface, and PNG export.
// Everything here is CPU-bound; handlers call `render_emoji` via tokio::task::spawn_blocking.

pub mod canvas;
pub mod export;
pub mod fonts;

use thiserror::Error;
use tracing::info;

use crate::layout::{fit, BoxConstraint, FitError, MarginPolicy, SizeBounds, SizeResult, StyleSpec};

pub use export::ExportOptions;
pub use fonts::FontLibrary;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid color '{value}': {reason}")]
    Color { value: String, reason: String },

    #[error("Invalid export options: {0}")]
    InvalidOptions(String),

    #[error("PNG encoding error: {0}")]
    Png(String),

    #[error(transparent)]
    Fit(#[from] FitError),
}

/// Everything needed to size and rasterise one emoji.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub text: String,
    pub style: StyleSpec,
    pub bounds: SizeBounds,
    pub margin: MarginPolicy,
    pub export: ExportOptions,
}

#[derive(Debug, Clone)]
pub struct RenderedEmoji {
    pub png: Vec<u8>,
    pub size: SizeResult,
}

/// Fits the text into the padded box of the export canvas, then rasterises it.
///
/// The surface is created per job, so concurrent jobs never share one.
pub fn render_emoji(fonts: &FontLibrary, job: &RenderJob) -> Result<RenderedEmoji, RenderError> {
    job.export.validate()?;
    let fit_box = BoxConstraint::inset(job.export.canvas_px, job.export.padding_px)?;

    let mut surface = fonts.surface();
    let size = fit(&mut surface, &job.text, &job.style, fit_box, job.bounds, job.margin)?;
    let png = surface.export_png(&job.export)?;

    info!(
        font_size_px = size.font_size_px,
        overflows = size.overflows,
        bytes = png.len(),
        "Rendered emoji"
    );

    Ok(RenderedEmoji { png, size })
}
