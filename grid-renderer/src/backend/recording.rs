//! Recording backend for headless hosts and tests.
//!
//! Every call is kept as a [`DrawCommand`] so a frame can be inspected after
//! it was drawn. Nothing is rasterised. A clear discards everything recorded
//! before it, so a long-running host holds at most one frame of commands.

use std::any::Any;

use crate::{BackendType, RenderResult};

use super::{CompositeOp, DrawSurface, Paint};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)] // Variant fields mirror the trait method arguments
pub enum DrawCommand {
    Resize { width: u32, height: u32 },
    SetScale(f64),
    GpuHints(bool),
    Clear,
    FillRect { x: f64, y: f64, width: f64, height: f64, paint: Paint },
    StrokeRect { x: f64, y: f64, width: f64, height: f64, paint: Paint, line_width: f64 },
    StrokePolyline { points: Vec<(f64, f64)>, paint: Paint, line_width: f64 },
    FillCircle { x: f64, y: f64, radius: f64, paint: Paint },
    Save,
    Restore,
    GlobalAlpha(f64),
    Composite(CompositeOp),
    Filter(String),
    Shadow { blur: f64, color: String },
    DrawSelf { x: f64, y: f64 },
}

/// Surface that records calls instead of drawing.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    scale: f64,
    commands: Vec<DrawCommand>,
    depth: usize,
}

impl RecordingSurface {
    /// Create a new recording surface.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 800,
            height: 600,
            scale: 1.0,
            commands: Vec::new(),
            depth: 0,
        }
    }

    /// Everything recorded since the last clear or
    /// [`RecordingSurface::take_commands`].
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of recorded commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// Number of polylines stroked.
    #[must_use]
    pub fn polyline_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::StrokePolyline { .. }))
    }

    /// Current drawing-space scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Current save/restore nesting.
    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.depth
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawSurface for RecordingSurface {
    fn backend_type(&self) -> BackendType {
        BackendType::Recording
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.width = width;
        self.height = height;
        self.commands.push(DrawCommand::Resize { width, height });
        tracing::debug!("Recording surface resized to {}x{}", width, height);
        Ok(())
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.commands.push(DrawCommand::SetScale(scale));
    }

    fn set_gpu_hints(&mut self, enabled: bool) {
        self.commands.push(DrawCommand::GpuHints(enabled));
    }

    fn clear(&mut self) {
        tracing::trace!(
            "Recording clear: {} commands, backing {}x{}",
            self.commands.len(),
            self.width,
            self.height
        );
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            paint: paint.clone(),
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint, line_width: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            x,
            y,
            width,
            height,
            paint: paint.clone(),
            line_width,
        });
    }

    fn stroke_polyline(&mut self, points: &[(f64, f64)], paint: &Paint, line_width: f64) {
        self.commands.push(DrawCommand::StrokePolyline {
            points: points.to_vec(),
            paint: paint.clone(),
            line_width,
        });
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, paint: &Paint) {
        self.commands.push(DrawCommand::FillCircle {
            x,
            y,
            radius,
            paint: paint.clone(),
        });
    }

    fn save(&mut self) {
        self.depth += 1;
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.commands.push(DrawCommand::Restore);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn set_composite(&mut self, op: CompositeOp) {
        self.commands.push(DrawCommand::Composite(op));
    }

    fn set_filter(&mut self, filter: &str) {
        self.commands.push(DrawCommand::Filter(filter.to_string()));
    }

    fn set_shadow(&mut self, blur: f64, color: &str) {
        self.commands.push(DrawCommand::Shadow {
            blur,
            color: color.to_string(),
        });
    }

    fn draw_self(&mut self, x: f64, y: f64) -> RenderResult<()> {
        self.commands.push(DrawCommand::DrawSelf { x, y });
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
