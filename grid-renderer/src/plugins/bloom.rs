//! Screen-blended bloom over the finished grid.

use crate::{CompositeOp, FrameContext, GridPlugin, PluginError};

/// Redraws the surface onto itself, blurred and faded, with screen blending.
#[derive(Debug, Clone, Copy, Default)]
pub struct BloomPlugin;

impl BloomPlugin {
    /// Pulsing bloom strength in `[0.6, 1.0]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn intensity(frame: u64) -> f64 {
        0.8 + (frame as f64 * 0.02).sin() * 0.2
    }
}

impl GridPlugin for BloomPlugin {
    fn name(&self) -> &str {
        "bloom"
    }

    fn on_draw(&self, ctx: &mut FrameContext<'_>) -> Result<(), PluginError> {
        let intensity = Self::intensity(ctx.frame);
        let surface = &mut *ctx.surface;
        surface.save();
        surface.set_composite(CompositeOp::Screen);
        surface.set_filter(&format!("blur({}px)", 2.0 + intensity));
        surface.set_global_alpha(0.3 * intensity);
        let drawn = surface.draw_self(0.0, 0.0);
        surface.restore();
        drawn.map_err(|e| PluginError::failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use grid_core::PointerState;

    use super::*;
    use crate::{DrawCommand, RecordingSurface};

    #[test]
    fn test_intensity_range() {
        for frame in 0..1000 {
            let i = BloomPlugin::intensity(frame);
            assert!((0.6..=1.0).contains(&i));
        }
        assert!((BloomPlugin::intensity(0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_blends_surface_onto_itself() {
        let mut surface = RecordingSurface::new();
        let mut ctx = FrameContext {
            surface: &mut surface,
            width: 800.0,
            height: 600.0,
            pointer: PointerState::default(),
            particles: &[],
            frame: 0,
        };
        BloomPlugin.on_draw(&mut ctx).expect("draws");
        let commands = surface.commands();
        assert!(commands.contains(&DrawCommand::Composite(CompositeOp::Screen)));
        assert!(commands.contains(&DrawCommand::Filter("blur(2.8px)".to_string())));
        assert!(commands.contains(&DrawCommand::DrawSelf { x: 0.0, y: 0.0 }));
        assert_eq!(commands.last(), Some(&DrawCommand::Restore));
    }
}
