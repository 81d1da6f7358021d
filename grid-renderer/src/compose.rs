//! Frame composition: background, waving grid, glow, ripple and particles.

use grid_core::color::{
    particle_color, scale_alpha, with_alpha, BACKGROUND_END, BACKGROUND_START, RIPPLE_EDGE,
    TRANSPARENT_ACCENT,
};
use grid_core::{
    grid_positions, GlowLineTracker, GridConfig, Particle, ParticleSystem, PointerState,
    WaveField, COLUMN_SPACING, ROW_SPACING,
};

use crate::{DrawSurface, Paint};

/// Alpha of a grid line drawn underneath a glow.
pub const DIMMED_GRID_ALPHA: f64 = 0.08;

/// Mutable per-instance simulation state, owned by the frame tick.
#[derive(Debug, Clone)]
pub struct FrameState {
    /// Pointer in drawing space.
    pub pointer: PointerState,
    /// Live particles.
    pub particles: ParticleSystem,
    /// Scrolling column highlights.
    pub glow: GlowLineTracker,
    /// Pulse tick.
    pub tick: u64,
}

impl FrameState {
    /// Fresh state for a grid capped at `max_particles`.
    #[must_use]
    pub fn new(max_particles: usize) -> Self {
        Self {
            pointer: PointerState::default(),
            particles: ParticleSystem::new(max_particles),
            glow: GlowLineTracker::new(),
            tick: 0,
        }
    }
}

/// Fill the faint diagonal background gradient.
pub fn draw_background(surface: &mut dyn DrawSurface, width: f64, height: f64) {
    let paint = Paint::Linear {
        x0: 0.0,
        y0: 0.0,
        x1: width,
        y1: height,
        stops: vec![
            (0.0, BACKGROUND_START.to_string()),
            (1.0, BACKGROUND_END.to_string()),
        ],
    };
    surface.fill_rect(0.0, 0.0, width, height, &paint);
}

/// Stroke every vertical and horizontal grid line.
pub fn draw_grid(
    surface: &mut dyn DrawSurface,
    wave: &WaveField,
    glow: &GlowLineTracker,
    config: &GridConfig,
    width: f64,
    height: f64,
) {
    let grid_paint = Paint::color(config.grid_color.clone());
    let dimmed_paint = Paint::color(with_alpha(&config.grid_color, DIMMED_GRID_ALPHA));

    for x in grid_positions(width, COLUMN_SPACING) {
        let path = wave.vertical_line(x, height);
        if let Some(line) = glow.glow_for(x) {
            let (start, end) = line.gradient_span(height);
            let glow_paint = Paint::Linear {
                x0: x,
                y0: start,
                x1: x,
                y1: end,
                stops: vec![
                    (0.0, TRANSPARENT_ACCENT.to_string()),
                    (0.5, config.glow_color.clone()),
                    (1.0, TRANSPARENT_ACCENT.to_string()),
                ],
            };
            surface.stroke_polyline(&path, &glow_paint, 2.0);
            surface.stroke_polyline(&path, &dimmed_paint, 1.0);
        } else {
            surface.stroke_polyline(&path, &grid_paint, 1.0);
        }
    }

    for y in grid_positions(height, ROW_SPACING) {
        let path = wave.horizontal_line(y, width);
        surface.stroke_polyline(&path, &grid_paint, 1.0);
    }
}

/// Radius of the pulsing pointer ripple.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ripple_radius(tick: u64) -> f64 {
    40.0 + (tick as f64 * 0.07).sin().abs() * 20.0
}

/// Fill the radial ripple under the pointer.
pub fn draw_ripple(surface: &mut dyn DrawSurface, pointer: PointerState, tick: u64, ripple_color: &str) {
    let radius = ripple_radius(tick);
    let paint = Paint::Radial {
        x: pointer.x,
        y: pointer.y,
        r0: 0.0,
        r1: radius,
        stops: vec![
            (0.0, ripple_color.to_string()),
            (0.5, scale_alpha(ripple_color, 0.5)),
            (1.0, RIPPLE_EDGE.to_string()),
        ],
    };
    surface.fill_circle(pointer.x, pointer.y, radius, &paint);
}

/// Draw particles, with trails under the bright ones when enabled.
pub fn draw_particles(surface: &mut dyn DrawSurface, particles: &[Particle], trails: bool) {
    for particle in particles {
        if trails && particle.has_trail() {
            for (y, radius, alpha) in particle.trail() {
                surface.fill_circle(particle.x, y, radius, &Paint::Color(particle_color(alpha)));
            }
        }
        surface.fill_circle(
            particle.x,
            particle.y,
            1.5,
            &Paint::Color(particle_color(particle.alpha)),
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::{DrawCommand, RecordingSurface};

    fn wave() -> WaveField {
        WaveField::new(PointerState::new(200.0, 150.0), 1.0, 1.0, 0)
    }

    #[test]
    fn test_grid_line_counts_without_glow() {
        let mut surface = RecordingSurface::new();
        let glow = GlowLineTracker::new();
        draw_grid(&mut surface, &wave(), &glow, &GridConfig::default(), 303.0, 170.0);
        // 4 vertical (0, 101, 202, 303) + 3 horizontal (0, 85, 170)
        assert_eq!(surface.polyline_count(), 7);
    }

    #[test]
    fn test_glowing_columns_are_stroked_twice() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut glow = GlowLineTracker::new();
        glow.rebuild(303.0, 170.0, &mut rng);
        let mut surface = RecordingSurface::new();
        draw_grid(&mut surface, &wave(), &glow, &GridConfig::default(), 303.0, 170.0);
        // Columns 0, 101 and 202 glow; 303 has no glow line (ceil(303/101) = 3).
        assert_eq!(surface.polyline_count(), 3 * 2 + 1 + 3);

        let dimmed = surface.count(|c| {
            matches!(c, DrawCommand::StrokePolyline { paint: Paint::Color(color), line_width, .. }
                if color == "rgba(209,209,209,0.08)" && (*line_width - 1.0).abs() < f64::EPSILON)
        });
        assert_eq!(dimmed, 3);
    }

    #[test]
    fn test_empty_viewport_draws_no_lines_forever() {
        let mut surface = RecordingSurface::new();
        draw_grid(
            &mut surface,
            &wave(),
            &GlowLineTracker::new(),
            &GridConfig::default(),
            f64::NAN,
            -5.0,
        );
        assert_eq!(surface.polyline_count(), 0);
    }

    #[test]
    fn test_ripple_radius_range() {
        for tick in 0..500 {
            let r = ripple_radius(tick);
            assert!((40.0..=60.0).contains(&r));
        }
    }

    #[test]
    fn test_ripple_mid_stop_is_half_alpha() {
        let mut surface = RecordingSurface::new();
        draw_ripple(&mut surface, PointerState::new(1.0, 2.0), 0, "rgba(0,200,150,0.15)");
        match &surface.commands()[0] {
            DrawCommand::FillCircle { radius, paint: Paint::Radial { stops, .. }, .. } => {
                assert!((radius - 40.0).abs() < f64::EPSILON);
                assert_eq!(stops[1].1, "rgba(0,200,150,0.075)");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_trails_only_for_bright_particles() {
        let particles = [
            Particle::new(0.0, 0.0, 0.8, 50.0),
            Particle::new(5.0, 0.0, 0.2, 50.0),
        ];
        let mut surface = RecordingSurface::new();
        draw_particles(&mut surface, &particles, true);
        assert_eq!(surface.commands().len(), 5 + 1 + 1);

        let mut plain = RecordingSurface::new();
        draw_particles(&mut plain, &particles, false);
        assert_eq!(plain.commands().len(), 2);
    }
}
