//! Auto-fit text sizer: picks the largest integer font size whose rendered text
//! stays inside a fixed pixel box.
//!
//! # Algorithm
//! Binary search over `[bounds.min, bounds.max]`. Each candidate is applied to the
//! surface and measured; a candidate fits when both extents are within the box.
//! After the loop `hi` holds the largest fitting size, or `bounds.min - 1` when
//! nothing fit. The result is clamped to the floor, then the margin policy is
//! applied and the final size written back to the surface.
//!
//! At most `floor(log2(max - min + 1)) + 1` measurements are taken per call.
//! Nothing is cached between calls.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::layout::style::{BoxConstraint, SizeBounds, StyleSpec, WrapMode};
use crate::layout::surface::RenderSurface;

/// Largest font size a caller may request as an upper bound.
pub const MAX_FONT_PX: u32 = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FitError {
    #[error("rendering surface is not available for measurement")]
    UnavailableSurface,

    #[error("invalid size bounds [{min}, {max}]: need 1 <= min <= max <= {MAX_FONT_PX}")]
    InvalidBounds { min: u32, max: u32 },

    #[error("invalid box {width}x{height}: both sides must be positive")]
    InvalidBox { width: u32, height: u32 },
}

/// Safety margin applied to the converged size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginPolicy {
    /// Use the largest fitting size as-is.
    None,
    /// Shrink the largest fitting size by 10%, rounding down.
    #[default]
    Shrink10,
}

impl MarginPolicy {
    pub fn apply(self, size_px: u32) -> u32 {
        match self {
            MarginPolicy::None => size_px,
            MarginPolicy::Shrink10 => size_px * 9 / 10,
        }
    }
}

impl FromStr for MarginPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(MarginPolicy::None),
            "shrink10" | "shrink" => Ok(MarginPolicy::Shrink10),
            other => Err(format!("unknown margin policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeResult {
    pub font_size_px: u32,
    /// True when not even `bounds.min` fit and the floor was returned.
    pub overflows: bool,
    pub wrap_mode: WrapMode,
}

/// Sizes `text` to fit `fit_box` and leaves the chosen size applied to `surface`.
pub fn fit<S: RenderSurface + ?Sized>(
    surface: &mut S,
    text: &str,
    style: &StyleSpec,
    fit_box: BoxConstraint,
    bounds: SizeBounds,
    margin: MarginPolicy,
) -> Result<SizeResult, FitError> {
    if !surface.is_attached() {
        return Err(FitError::UnavailableSurface);
    }
    if bounds.min == 0 || bounds.max < bounds.min || bounds.max > MAX_FONT_PX {
        return Err(FitError::InvalidBounds {
            min: bounds.min,
            max: bounds.max,
        });
    }

    // Mode is fixed for the whole search.
    let style = style.resolved_for(text);
    surface.apply_style(text, &style);

    let mut lo = bounds.min;
    let mut hi = bounds.max;
    let mut measurements = 0u32;

    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        surface.set_font_size_px(mid);
        let extents = surface.measure_rendered_extents();
        measurements += 1;

        if fit_box.contains(extents) {
            lo = mid + 1;
        } else {
            // mid >= bounds.min >= 1, so this cannot underflow.
            hi = mid - 1;
        }
    }

    let overflows = hi < bounds.min;
    let largest = hi.max(bounds.min);
    let font_size_px = margin.apply(largest).clamp(bounds.min, bounds.max);

    surface.set_font_size_px(font_size_px);

    debug!(
        largest,
        font_size_px,
        measurements,
        overflows,
        wrap_mode = ?style.wrap_mode,
        "auto-fit converged"
    );

    Ok(SizeResult {
        font_size_px,
        overflows,
        wrap_mode: style.wrap_mode,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
