//! Pointer-driven wave displacement for grid lines.
//!
//! ```text
//! d   = |sample - pointer|
//! amp = 3 · intensity · (1 + influence · e^(-d / 400))
//! w   = sin(0.05·d - 0.05·tick) · amp
//! ```
//!
//! The falloff radius is 400px; past ~1600px the pointer term is negligible
//! and only the ambient ripple remains.

use crate::config::SAMPLE_STEP;
use crate::PointerState;

/// Spatial frequency of the wave, per pixel of distance.
pub const SPATIAL_FREQUENCY: f64 = 0.05;

/// Temporal frequency of the wave, per tick.
pub const TEMPORAL_FREQUENCY: f64 = 0.05;

/// Base amplitude in pixels at intensity 1.
pub const BASE_AMPLITUDE: f64 = 3.0;

/// Distance over which pointer influence decays by a factor of e.
pub const FALLOFF_RADIUS: f64 = 400.0;

/// Parameters of the wave for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveField {
    /// Pointer position.
    pub pointer: PointerState,
    /// Effective intensity (already scaled by quality).
    pub intensity: f64,
    /// Pointer influence scalar.
    pub mouse_influence: f64,
    /// Pulse tick.
    pub tick: u64,
}

impl WaveField {
    /// Create a wave field for one frame.
    #[must_use]
    pub fn new(pointer: PointerState, intensity: f64, mouse_influence: f64, tick: u64) -> Self {
        Self {
            pointer,
            intensity,
            mouse_influence,
            tick,
        }
    }

    /// Envelope of the wave at `distance` from the pointer.
    #[must_use]
    pub fn amplitude(&self, distance: f64) -> f64 {
        let mouse_effect = self.mouse_influence * (-distance / FALLOFF_RADIUS).exp();
        BASE_AMPLITUDE * self.intensity * (1.0 + mouse_effect)
    }

    /// Largest displacement the field can produce anywhere.
    #[must_use]
    pub fn max_amplitude(&self) -> f64 {
        self.amplitude(0.0)
    }

    /// Signed displacement at a sample point.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn displacement(&self, x: f64, y: f64) -> f64 {
        let distance = self.pointer.distance_to(x, y);
        let phase = distance * SPATIAL_FREQUENCY - self.tick as f64 * TEMPORAL_FREQUENCY;
        phase.sin() * self.amplitude(distance)
    }

    /// Polyline for the vertical grid line at `x`, sampled every 10px.
    ///
    /// Points are `(x + w, y)` for `y = 0, 10, …` up to and including `height`.
    #[must_use]
    pub fn vertical_line(&self, x: f64, height: f64) -> Vec<(f64, f64)> {
        sample_positions(height)
            .map(|y| (x + self.displacement(x, y), y))
            .collect()
    }

    /// Polyline for the horizontal grid line at `y`.
    #[must_use]
    pub fn horizontal_line(&self, y: f64, width: f64) -> Vec<(f64, f64)> {
        sample_positions(width)
            .map(|x| (x, y + self.displacement(x, y)))
            .collect()
    }
}

/// Positions `0, step, 2·step, …` up to and including `extent`.
///
/// Empty for a non-positive step or a non-finite/negative extent, so callers
/// never loop forever on bad geometry.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn grid_positions(extent: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = if step > 0.0 && extent.is_finite() && extent >= 0.0 {
        (extent / step).floor() as u64 + 1
    } else {
        0
    };
    (0..count).map(move |i| i as f64 * step)
}

fn sample_positions(extent: f64) -> impl Iterator<Item = f64> {
    grid_positions(extent, SAMPLE_STEP)
}
