//! Intermittent branching lightning near the pointer.

use std::cell::RefCell;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{FrameContext, GridPlugin, Paint, PluginError};

/// Number of jagged segments per branch.
const SEGMENTS: u32 = 8;

/// Strikes for 5 frames out of every 180, with 3 to 5 branches per frame.
#[derive(Debug)]
pub struct LightningPlugin {
    rng: RefCell<SmallRng>,
    period: u64,
    strike_frames: u64,
}

impl Default for LightningPlugin {
    fn default() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }
}

impl LightningPlugin {
    /// A plugin with reproducible strikes.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            rng: RefCell::new(rng),
            period: 180,
            strike_frames: 5,
        }
    }

    /// Whether `frame` falls inside a strike.
    #[must_use]
    pub fn is_striking(&self, frame: u64) -> bool {
        frame % self.period < self.strike_frames
    }

    /// Jagged path from a start point near `(cx, cy)`.
    fn branch<R: Rng + ?Sized>(rng: &mut R, cx: f64, cy: f64) -> Vec<(f64, f64)> {
        let start_x = cx + (rng.gen::<f64>() - 0.5) * 100.0;
        let start_y = cy + (rng.gen::<f64>() - 0.5) * 100.0;
        let end_x = start_x + (rng.gen::<f64>() - 0.5) * 200.0;
        let end_y = start_y + (rng.gen::<f64>() - 0.5) * 200.0;

        let mut points = Vec::with_capacity(SEGMENTS as usize + 1);
        points.push((start_x, start_y));
        for j in 1..=SEGMENTS {
            let progress = f64::from(j) / f64::from(SEGMENTS);
            points.push((
                start_x + (end_x - start_x) * progress + (rng.gen::<f64>() - 0.5) * 20.0,
                start_y + (end_y - start_y) * progress + (rng.gen::<f64>() - 0.5) * 20.0,
            ));
        }
        points
    }
}

impl GridPlugin for LightningPlugin {
    fn name(&self) -> &str {
        "lightning"
    }

    fn on_draw(&self, ctx: &mut FrameContext<'_>) -> Result<(), PluginError> {
        if !self.is_striking(ctx.frame) {
            return Ok(());
        }
        let mut rng = self
            .rng
            .try_borrow_mut()
            .map_err(|_| PluginError::failed("lightning re-entered while drawing"))?;

        let branches = rng.gen_range(3..=5);
        for _ in 0..branches {
            let alpha = 0.8 + rng.gen::<f64>() * 0.2;
            let width = 1.0 + rng.gen::<f64>() * 2.0;
            let path = Self::branch(&mut *rng, ctx.pointer.x, ctx.pointer.y);

            ctx.surface.save();
            ctx.surface.set_shadow(10.0, "#87CEEB");
            ctx.surface.stroke_polyline(
                &path,
                &Paint::color(format!("rgba(135, 206, 250, {alpha})")),
                width,
            );
            ctx.surface.restore();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use grid_core::PointerState;

    use super::*;
    use crate::{DrawCommand, RecordingSurface};

    fn strike(plugin: &LightningPlugin, frame: u64) -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        let mut ctx = FrameContext {
            surface: &mut surface,
            width: 800.0,
            height: 600.0,
            pointer: PointerState::new(400.0, 300.0),
            particles: &[],
            frame,
        };
        plugin.on_draw(&mut ctx).expect("draws");
        surface
    }

    #[test]
    fn test_strike_window() {
        let plugin = LightningPlugin::seeded(1);
        assert!(plugin.is_striking(0));
        assert!(plugin.is_striking(184));
        assert!(!plugin.is_striking(5));
        assert!(strike(&plugin, 90).commands().is_empty());
    }

    #[test]
    fn test_branches_stay_near_pointer() {
        let plugin = LightningPlugin::seeded(42);
        let surface = strike(&plugin, 0);
        let branches = surface.polyline_count();
        assert!((3..=5).contains(&branches));

        for command in surface.commands() {
            if let DrawCommand::StrokePolyline { points, line_width, .. } = command {
                assert_eq!(points.len(), 9);
                assert!((1.0..3.0).contains(line_width));
                let (sx, sy) = points[0];
                assert!((sx - 400.0).abs() <= 50.0 && (sy - 300.0).abs() <= 50.0);
                // start ±50, end ±100 from start, jitter ±10
                for (x, y) in points {
                    assert!((x - 400.0).abs() <= 160.0);
                    assert!((y - 300.0).abs() <= 160.0);
                }
            }
        }
    }

    #[test]
    fn test_seeded_strikes_are_reproducible() {
        let a = strike(&LightningPlugin::seeded(7), 1).take_commands();
        let b = strike(&LightningPlugin::seeded(7), 1).take_commands();
        assert_eq!(a, b);
    }
}
