// Text layout: style inputs, the rendering-surface seam, and the auto-fit sizer.
// Sizing is synchronous and CPU-bound; async callers run it inside tokio::task::spawn_blocking.

pub mod autofit;
pub mod font_metrics;
pub mod style;
pub mod surface;

// Re-export the public API consumed by the render and emoji modules.
pub use autofit::{fit, FitError, MarginPolicy, SizeResult};
pub use font_metrics::MetricsSurface;
pub use style::{BoxConstraint, Extents, SizeBounds, StyleSpec, TextAlign, WrapMode};
pub use surface::RenderSurface;
