//! Visual theme presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{GridConfig, GridError};

/// Named visual themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Green-on-black terminal look.
    Matrix,
    /// Saturated magenta cyberpunk.
    Neon,
    /// Low-contrast grey.
    Minimal,
    /// Blue high-tech.
    Tech,
}

/// The subset of [`GridConfig`] a theme sets.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemePreset {
    /// Grid line color.
    pub grid_color: &'static str,
    /// Glow color.
    pub glow_color: &'static str,
    /// Ripple color.
    pub ripple_color: &'static str,
    /// Wave intensity.
    pub intensity: f64,
    /// Pointer influence.
    pub mouse_influence: f64,
    /// Particle trails.
    pub particle_trails: bool,
}

impl ThemePreset {
    /// Overwrite the themed fields of `config`.
    pub fn apply(&self, config: &mut GridConfig) {
        config.grid_color = self.grid_color.to_string();
        config.glow_color = self.glow_color.to_string();
        config.ripple_color = self.ripple_color.to_string();
        config.intensity = self.intensity;
        config.mouse_influence = self.mouse_influence;
        config.particle_trails = self.particle_trails;
    }
}

impl Theme {
    /// All themes, in declaration order.
    pub const ALL: [Theme; 4] = [Theme::Matrix, Theme::Neon, Theme::Minimal, Theme::Tech];

    /// The preset values for this theme.
    #[must_use]
    pub fn preset(self) -> ThemePreset {
        match self {
            Theme::Matrix => ThemePreset {
                grid_color: "rgba(0,255,0,0.15)",
                glow_color: "rgba(0,255,0,0.8)",
                ripple_color: "rgba(0,255,0,0.25)",
                intensity: 1.2,
                mouse_influence: 1.5,
                particle_trails: true,
            },
            Theme::Neon => ThemePreset {
                grid_color: "rgba(255,0,150,0.2)",
                glow_color: "rgba(255,0,150,0.9)",
                ripple_color: "rgba(255,0,150,0.3)",
                intensity: 1.5,
                mouse_influence: 2.0,
                particle_trails: true,
            },
            Theme::Minimal => ThemePreset {
                grid_color: "rgba(100,100,100,0.1)",
                glow_color: "rgba(200,200,200,0.4)",
                ripple_color: "rgba(200,200,200,0.1)",
                intensity: 0.8,
                mouse_influence: 0.5,
                particle_trails: false,
            },
            Theme::Tech => ThemePreset {
                grid_color: "rgba(0,150,255,0.18)",
                glow_color: "rgba(0,150,255,0.7)",
                ripple_color: "rgba(0,150,255,0.2)",
                intensity: 1.1,
                mouse_influence: 1.2,
                particle_trails: true,
            },
        }
    }

    /// Lower-case name of the theme.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Theme::Matrix => "matrix",
            Theme::Neon => "neon",
            Theme::Minimal => "minimal",
            Theme::Tech => "tech",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GridError::InvalidConfig(format!("Unknown theme: {s}")))
    }
}
