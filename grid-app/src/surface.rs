//! `DrawSurface` over a browser 2D canvas context.

use std::any::Any;
use std::f64::consts::TAU;

use grid_renderer::{BackendType, CompositeOp, DrawSurface, Paint, RenderError, RenderResult};
use web_sys::{CanvasGradient, CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::js_message;

/// Canvas 2D backed drawing surface.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    scale: f64,
}

impl CanvasSurface {
    /// Wrap a canvas and its 2D context.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self {
            canvas,
            ctx,
            scale: 1.0,
        }
    }

    /// The canvas element.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// The 2D context, for JS plugins.
    #[must_use]
    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    fn apply_scale(&self) {
        if let Err(e) = self
            .ctx
            .set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0)
        {
            tracing::warn!("Failed to set canvas transform: {:?}", e);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn add_stops(gradient: &CanvasGradient, stops: &[(f64, String)]) {
        for (offset, color) in stops {
            if let Err(e) = gradient.add_color_stop(*offset as f32, color) {
                tracing::warn!("Invalid gradient stop {} at {}: {:?}", color, offset, e);
            }
        }
    }

    fn gradient(&self, paint: &Paint) -> Option<CanvasGradient> {
        match paint {
            Paint::Color(_) => None,
            Paint::Linear {
                x0,
                y0,
                x1,
                y1,
                stops,
            } => {
                let gradient = self.ctx.create_linear_gradient(*x0, *y0, *x1, *y1);
                Self::add_stops(&gradient, stops);
                Some(gradient)
            }
            Paint::Radial {
                x,
                y,
                r0,
                r1,
                stops,
            } => match self.ctx.create_radial_gradient(*x, *y, *r0, *x, *y, *r1) {
                Ok(gradient) => {
                    Self::add_stops(&gradient, stops);
                    Some(gradient)
                }
                Err(e) => {
                    tracing::warn!("Failed to create radial gradient: {:?}", e);
                    None
                }
            },
        }
    }

    fn set_fill(&self, paint: &Paint) {
        match (paint, self.gradient(paint)) {
            (Paint::Color(color), _) => self.ctx.set_fill_style_str(color),
            (_, Some(gradient)) => self.ctx.set_fill_style_canvas_gradient(&gradient),
            (_, None) => self.ctx.set_fill_style_str("transparent"),
        }
    }

    fn set_stroke(&self, paint: &Paint, line_width: f64) {
        match (paint, self.gradient(paint)) {
            (Paint::Color(color), _) => self.ctx.set_stroke_style_str(color),
            (_, Some(gradient)) => self.ctx.set_stroke_style_canvas_gradient(&gradient),
            (_, None) => self.ctx.set_stroke_style_str("transparent"),
        }
        self.ctx.set_line_width(line_width);
    }
}

impl DrawSurface for CanvasSurface {
    fn backend_type(&self) -> BackendType {
        BackendType::Canvas2D
    }

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        // Setting either dimension resets the context state, transform included.
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.apply_scale();
        Ok(())
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.apply_scale();
    }

    fn set_gpu_hints(&mut self, enabled: bool) {
        self.ctx.set_image_smoothing_enabled(!enabled);
        let will_change = if enabled { "transform" } else { "auto" };
        if let Err(e) = self.canvas.style().set_property("will-change", will_change) {
            tracing::debug!("Could not set will-change: {:?}", e);
        }
    }

    fn clear(&mut self) {
        // Clear in backing pixels regardless of the current transform.
        self.ctx.save();
        if let Err(e) = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0) {
            tracing::warn!("Failed to reset transform for clear: {:?}", e);
        }
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
        self.ctx.restore();
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint) {
        self.set_fill(paint);
        self.ctx.fill_rect(x, y, width, height);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint, line_width: f64) {
        self.set_stroke(paint, line_width);
        self.ctx.stroke_rect(x, y, width, height);
    }

    fn stroke_polyline(&mut self, points: &[(f64, f64)], paint: &Paint, line_width: f64) {
        let Some(((x0, y0), rest)) = points.split_first() else {
            return;
        };
        self.set_stroke(paint, line_width);
        self.ctx.begin_path();
        self.ctx.move_to(*x0, *y0);
        for (x, y) in rest {
            self.ctx.line_to(*x, *y);
        }
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, paint: &Paint) {
        self.set_fill(paint);
        self.ctx.begin_path();
        if let Err(e) = self.ctx.arc(x, y, radius, 0.0, TAU) {
            tracing::trace!("Skipping circle r={}: {:?}", radius, e);
            return;
        }
        self.ctx.fill();
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_composite(&mut self, op: CompositeOp) {
        if let Err(e) = self.ctx.set_global_composite_operation(op.as_css()) {
            tracing::warn!("Unsupported composite {}: {:?}", op.as_css(), e);
        }
    }

    fn set_filter(&mut self, filter: &str) {
        self.ctx.set_filter(filter);
    }

    fn set_shadow(&mut self, blur: f64, color: &str) {
        self.ctx.set_shadow_blur(blur);
        self.ctx.set_shadow_color(color);
    }

    fn draw_self(&mut self, x: f64, y: f64) -> RenderResult<()> {
        // The source is in backing pixels, so draw with an identity transform.
        self.ctx.save();
        let drawn = self
            .ctx
            .set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
            .and_then(|()| {
                self.ctx
                    .draw_image_with_html_canvas_element(&self.canvas, x, y)
            });
        self.ctx.restore();
        drawn.map_err(|e| RenderError::Surface(js_message(&e)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
