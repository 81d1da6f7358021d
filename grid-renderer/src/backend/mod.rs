//! Drawing surface abstraction and backend implementations.

pub mod recording;

use std::any::Any;

use crate::{BackendType, RenderResult};

/// A color stop: offset in `[0, 1]` and a CSS color.
pub type ColorStop = (f64, String);

/// How a shape is filled or stroked.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Solid CSS color.
    Color(String),
    /// Gradient along the segment `(x0, y0) → (x1, y1)`.
    Linear {
        /// Start x.
        x0: f64,
        /// Start y.
        y0: f64,
        /// End x.
        x1: f64,
        /// End y.
        y1: f64,
        /// Color stops.
        stops: Vec<ColorStop>,
    },
    /// Gradient between two concentric circles around `(x, y)`.
    Radial {
        /// Center x.
        x: f64,
        /// Center y.
        y: f64,
        /// Inner radius.
        r0: f64,
        /// Outer radius.
        r1: f64,
        /// Color stops.
        stops: Vec<ColorStop>,
    },
}

impl Paint {
    /// Solid color paint.
    pub fn color(css: impl Into<String>) -> Self {
        Self::Color(css.into())
    }
}

/// Compositing mode for subsequent draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOp {
    /// Draw over existing content.
    SourceOver,
    /// Lighten by inverse multiplication.
    Screen,
    /// Add color values.
    Lighter,
}

impl CompositeOp {
    /// Canvas `globalCompositeOperation` keyword.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            CompositeOp::SourceOver => "source-over",
            CompositeOp::Screen => "screen",
            CompositeOp::Lighter => "lighter",
        }
    }
}

/// Minimal immediate-mode 2D drawing surface.
///
/// Coordinates are in drawing space; the surface maps them to backing pixels
/// with the scale set by [`DrawSurface::set_scale`].
pub trait DrawSurface {
    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Backing-store size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Resize the backing store.
    ///
    /// # Errors
    ///
    /// Returns an error if resizing fails.
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()>;

    /// Set the drawing-space to backing-pixel scale.
    fn set_scale(&mut self, scale: f64);

    /// Toggle GPU-friendly hints (no image smoothing, compositor layer).
    fn set_gpu_hints(&mut self, enabled: bool);

    /// Clear the whole backing store.
    fn clear(&mut self);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint);

    /// Stroke an axis-aligned rectangle.
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint, line_width: f64);

    /// Stroke an open polyline.
    fn stroke_polyline(&mut self, points: &[(f64, f64)], paint: &Paint, line_width: f64);

    /// Fill a circle.
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, paint: &Paint);

    /// Push the drawing state.
    fn save(&mut self);

    /// Pop the drawing state.
    fn restore(&mut self);

    /// Opacity multiplier for subsequent draws.
    fn set_global_alpha(&mut self, alpha: f64);

    /// Compositing mode for subsequent draws.
    fn set_composite(&mut self, op: CompositeOp);

    /// CSS filter for subsequent draws (`"none"` to reset).
    fn set_filter(&mut self, filter: &str);

    /// Shadow for subsequent draws; a blur of 0 disables it.
    fn set_shadow(&mut self, blur: f64, color: &str);

    /// Draw the surface's current content back onto itself at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot read its own content.
    fn draw_self(&mut self, x: f64, y: f64) -> RenderResult<()>;

    /// Downcasting hook for plugins that need the concrete backend.
    fn as_any(&self) -> &dyn Any;
}
