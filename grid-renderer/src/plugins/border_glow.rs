//! Periodic glowing border.

use crate::{FrameContext, GridPlugin, Paint, PluginError};

/// Flashes an inset border for the first 10 frames of every 120.
#[derive(Debug, Clone)]
pub struct BorderGlowPlugin {
    /// Border color.
    pub color: String,
    /// Frames per cycle.
    pub period: u64,
    /// Frames per cycle the border is visible.
    pub visible_frames: u64,
    /// Inset from the surface edge.
    pub inset: f64,
}

impl Default for BorderGlowPlugin {
    fn default() -> Self {
        Self {
            color: "#85B100".to_string(),
            period: 120,
            visible_frames: 10,
            inset: 20.0,
        }
    }
}

impl BorderGlowPlugin {
    /// Whether the border shows on `frame`.
    #[must_use]
    pub fn is_visible(&self, frame: u64) -> bool {
        self.period > 0 && frame % self.period < self.visible_frames
    }
}

impl GridPlugin for BorderGlowPlugin {
    fn name(&self) -> &str {
        "borderGlow"
    }

    fn on_draw(&self, ctx: &mut FrameContext<'_>) -> Result<(), PluginError> {
        if !self.is_visible(ctx.frame) {
            return Ok(());
        }
        let surface = &mut *ctx.surface;
        surface.save();
        surface.set_shadow(16.0, &self.color);
        surface.stroke_rect(
            self.inset,
            self.inset,
            (ctx.width - 2.0 * self.inset).max(0.0),
            (ctx.height - 2.0 * self.inset).max(0.0),
            &Paint::color(self.color.clone()),
            4.0,
        );
        surface.restore();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use grid_core::PointerState;

    use super::*;
    use crate::{DrawCommand, RecordingSurface};

    fn draw(frame: u64) -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        let mut ctx = FrameContext {
            surface: &mut surface,
            width: 800.0,
            height: 600.0,
            pointer: PointerState::default(),
            particles: &[],
            frame,
        };
        BorderGlowPlugin::default().on_draw(&mut ctx).expect("draws");
        surface
    }

    #[test]
    fn test_visible_window() {
        let plugin = BorderGlowPlugin::default();
        assert!(plugin.is_visible(0));
        assert!(plugin.is_visible(9));
        assert!(!plugin.is_visible(10));
        assert!(plugin.is_visible(240));
    }

    #[test]
    fn test_draws_inset_rect() {
        let surface = draw(125);
        let rect = surface
            .commands()
            .iter()
            .find(|c| matches!(c, DrawCommand::StrokeRect { .. }))
            .cloned();
        match rect {
            Some(DrawCommand::StrokeRect { x, width, line_width, .. }) => {
                assert!((x - 20.0).abs() < f64::EPSILON);
                assert!((width - 760.0).abs() < f64::EPSILON);
                assert!((line_width - 4.0).abs() < f64::EPSILON);
            }
            other => panic!("expected a stroked rect, got {other:?}"),
        }
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn test_idle_frames_draw_nothing() {
        assert!(draw(50).commands().is_empty());
    }
}
