//! Grid configuration.
//!
//! Every field is optional on the wire: missing keys take the defaults below,
//! so a host can pass `{}` or a partial object straight from JavaScript.

use serde::{Deserialize, Serialize};

use crate::{GridError, GridResult, Theme};

/// Horizontal distance between vertical grid lines, in CSS pixels.
pub const COLUMN_SPACING: f64 = 101.0;

/// Vertical distance between horizontal grid lines, in CSS pixels.
pub const ROW_SPACING: f64 = 85.0;

/// Distance between wave samples along a grid line, in CSS pixels.
pub const SAMPLE_STEP: f64 = 10.0;

/// Debounce applied to resize events before a sizing pass runs.
pub const RESIZE_DEBOUNCE_MS: u32 = 100;

/// Configuration for an animated grid instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Stroke color of the grid lines.
    pub grid_color: String,
    /// Color at the center of the scrolling column glow.
    pub glow_color: String,
    /// Inner color of the pointer ripple.
    pub ripple_color: String,
    /// Upper bound on live particles.
    pub max_particles: usize,
    /// Viewports narrower than this (CSS pixels) get the static fallback.
    pub mobile_breakpoint: u32,
    /// Image shown instead of the animation.
    pub static_bg_img: String,
    /// Frame rate the performance governor aims for.
    #[serde(rename = "targetFPS", alias = "targetFps")]
    pub target_fps: u32,
    /// Let the governor trade resolution for frame rate.
    pub adaptive_quality: bool,
    /// Disable image smoothing and hint the compositor.
    pub gpu_acceleration: bool,
    /// Wave amplitude scalar.
    pub intensity: f64,
    /// Strength of the pointer's pull on the wave.
    pub mouse_influence: f64,
    /// Draw fading trails below bright particles.
    pub particle_trails: bool,
    /// Explicit animation switch. `None` defers to the reduced-motion preference.
    pub disable_animation: Option<bool>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_color: "rgba(209,209,209,0.16)".to_string(),
            glow_color: "rgba(0,200,150,0.6)".to_string(),
            ripple_color: "rgba(0,200,150,0.15)".to_string(),
            max_particles: 150,
            mobile_breakpoint: 640,
            static_bg_img: "/bg-grid-static.webp".to_string(),
            target_fps: 60,
            adaptive_quality: true,
            gpu_acceleration: true,
            intensity: 1.0,
            mouse_influence: 1.0,
            particle_trails: false,
            disable_animation: None,
        }
    }
}

impl GridConfig {
    /// Apply a theme preset on top of this configuration.
    ///
    /// Only the fields the theme defines are overwritten.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        theme.preset().apply(&mut self);
        self
    }

    /// Target FPS with the zero value mapped to the 60 FPS default.
    #[must_use]
    pub fn effective_target_fps(&self) -> u32 {
        if self.target_fps == 0 {
            60
        } else {
            self.target_fps
        }
    }

    /// Check that all scalars are usable.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfig`] for non-finite or negative scalars.
    pub fn validate(&self) -> GridResult<()> {
        for (name, value) in [
            ("intensity", self.intensity),
            ("mouseInfluence", self.mouse_influence),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(GridError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON configuration object.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> GridResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> GridResult<String> {
        serde_json::to_string(self).map_err(GridError::Serialization)
    }
}
