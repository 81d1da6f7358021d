//! Scrolling column highlights.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::COLUMN_SPACING;

/// Length of the glow gradient, and the overscan before an offset wraps.
pub const GLOW_LENGTH: f64 = 200.0;

/// Slowest scroll speed, pixels per frame.
pub const MIN_SPEED: f64 = 1.5;

/// Width of the speed range above [`MIN_SPEED`].
pub const SPEED_RANGE: f64 = 1.5;

/// Upper bound (exclusive) of the generated delay.
pub const MAX_DELAY: f64 = 200.0;

/// A grid column carrying a scrolling highlight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlowLine {
    /// Column position.
    pub x: f64,
    /// Distance the highlight has travelled up from the bottom edge.
    pub offset: f64,
    /// Pixels per frame.
    pub speed: f64,
    /// Random value generated with the line. The scroll does not read it.
    pub delay: f64,
}

impl GlowLine {
    /// Advance by one frame, wrapping once past `height + 200`.
    pub fn advance(&mut self, height: f64) {
        self.offset += self.speed;
        if self.offset > height + GLOW_LENGTH {
            self.offset = 0.0;
        }
    }

    /// Vertical extent `(start, end)` of the gradient on a canvas of `height`.
    ///
    /// The gradient runs upward from `start`; both ends may lie off-canvas.
    #[must_use]
    pub fn gradient_span(&self, height: f64) -> (f64, f64) {
        let start = height - self.offset;
        (start, start - GLOW_LENGTH)
    }
}

/// Owns the set of glow lines for the current viewport.
#[derive(Debug, Clone, Default)]
pub struct GlowLineTracker {
    lines: Vec<GlowLine>,
    height: f64,
}

impl GlowLineTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of glow lines for a viewport width: `ceil(width / 101)`.
    ///
    /// Zero for non-positive or non-finite widths.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn line_count(viewport_width: f64) -> usize {
        if viewport_width.is_finite() && viewport_width > 0.0 {
            (viewport_width / COLUMN_SPACING).ceil() as usize
        } else {
            0
        }
    }

    /// Regenerate every line for a resized viewport.
    #[allow(clippy::cast_precision_loss)]
    pub fn rebuild<R: Rng + ?Sized>(&mut self, viewport_width: f64, height: f64, rng: &mut R) {
        let count = Self::line_count(viewport_width);
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        self.height = height;
        self.lines = (0..count)
            .map(|i| GlowLine {
                x: i as f64 * COLUMN_SPACING,
                offset: rng.gen::<f64>() * height,
                speed: MIN_SPEED + rng.gen::<f64>() * SPEED_RANGE,
                delay: rng.gen::<f64>() * MAX_DELAY,
            })
            .collect();
        tracing::debug!("Rebuilt {count} glow lines for {viewport_width}x{height}");
    }

    /// Advance every line by one frame.
    pub fn advance(&mut self) {
        let height = self.height;
        for line in &mut self.lines {
            line.advance(height);
        }
    }

    /// The first glow line within half a column of `x`.
    #[must_use]
    pub fn glow_for(&self, x: f64) -> Option<&GlowLine> {
        self.lines
            .iter()
            .find(|line| (line.x - x).abs() < COLUMN_SPACING / 2.0)
    }

    /// All lines.
    #[must_use]
    pub fn lines(&self) -> &[GlowLine] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Height the lines wrap against.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_line_count() {
        assert_eq!(GlowLineTracker::line_count(1200.0), 12);
        assert_eq!(GlowLineTracker::line_count(101.0), 1);
        assert_eq!(GlowLineTracker::line_count(102.0), 2);
        assert_eq!(GlowLineTracker::line_count(0.0), 0);
        assert_eq!(GlowLineTracker::line_count(f64::INFINITY), 0);
    }

    #[test]
    fn test_rebuild_ranges() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut tracker = GlowLineTracker::new();
        tracker.rebuild(1200.0, 800.0, &mut rng);
        assert_eq!(tracker.len(), 12);
        for (i, line) in tracker.lines().iter().enumerate() {
            assert!((line.x - i as f64 * COLUMN_SPACING).abs() < f64::EPSILON);
            assert!((0.0..800.0).contains(&line.offset));
            assert!((1.5..3.0).contains(&line.speed));
            assert!((0.0..200.0).contains(&line.delay));
        }
    }

    #[test]
    fn test_rebuild_replaces_previous_set() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut tracker = GlowLineTracker::new();
        tracker.rebuild(1200.0, 800.0, &mut rng);
        tracker.rebuild(300.0, 800.0, &mut rng);
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn test_advance_ignores_delay_and_wraps() {
        let mut line = GlowLine {
            x: 0.0,
            offset: 395.0,
            speed: 2.0,
            delay: 150.0,
        };
        line.advance(200.0);
        assert!((line.offset - 397.0).abs() < f64::EPSILON);
        assert!((line.delay - 150.0).abs() < f64::EPSILON);
        line.advance(200.0);
        assert!((line.offset - 399.0).abs() < f64::EPSILON);
        // 401 exceeds height + 200 and wraps.
        line.advance(200.0);
        assert!(line.offset.abs() < f64::EPSILON);
    }

    #[test]
    fn test_every_line_moves_on_first_frame_after_rebuild() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut tracker = GlowLineTracker::new();
        tracker.rebuild(1200.0, 800.0, &mut rng);
        let before: Vec<f64> = tracker.lines().iter().map(|l| l.offset).collect();
        tracker.advance();
        for (line, offset) in tracker.lines().iter().zip(before) {
            assert!(line.offset > offset || line.offset.abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_glow_for_matches_within_half_column() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut tracker = GlowLineTracker::new();
        tracker.rebuild(1200.0, 800.0, &mut rng);
        assert_eq!(tracker.glow_for(202.0).map(|l| l.x), Some(202.0));
        assert_eq!(tracker.glow_for(240.0).map(|l| l.x), Some(202.0));
        assert!(tracker.glow_for(5000.0).is_none());
    }

    #[test]
    fn test_gradient_span() {
        let line = GlowLine {
            x: 0.0,
            offset: 100.0,
            speed: 2.0,
            delay: 0.0,
        };
        assert_eq!(line.gradient_span(800.0), (700.0, 500.0));
    }
}
