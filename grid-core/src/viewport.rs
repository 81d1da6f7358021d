//! Viewport geometry, backing-store sizing and the animation gate.

use serde::{Deserialize, Serialize};

use crate::{GridConfig, GridError, GridResult};

/// Host viewport as reported at resize time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
    /// Physical-to-logical pixel ratio.
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Create a viewport.
    #[must_use]
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Check the viewport is drawable.
    ///
    /// A missing or zero device pixel ratio is not an error here; see
    /// [`Viewport::effective_dpr`].
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidViewport`] for zero, negative or non-finite
    /// dimensions.
    pub fn validate(&self) -> GridResult<()> {
        let dims_ok = self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0;
        if dims_ok {
            Ok(())
        } else {
            Err(GridError::InvalidViewport {
                width: self.width,
                height: self.height,
                device_pixel_ratio: self.device_pixel_ratio,
            })
        }
    }

    /// Device pixel ratio, with unusable values mapped to 1.
    #[must_use]
    pub fn effective_dpr(&self) -> f64 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }
}

/// Size and scale of the drawing surface's backing store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackingStore {
    /// Backing width in physical pixels.
    pub width: u32,
    /// Backing height in physical pixels.
    pub height: u32,
    /// Scale from drawing space to backing pixels.
    pub scale: f64,
}

impl BackingStore {
    /// Compute the backing store for a viewport.
    ///
    /// `viewport × DPR × quality` when adaptive quality is on, `viewport × DPR`
    /// otherwise, truncated to whole pixels like a canvas width attribute.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidViewport`] if the viewport is not drawable.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn for_viewport(viewport: &Viewport, quality: f64, adaptive: bool) -> GridResult<Self> {
        viewport.validate()?;
        let dpr = viewport.effective_dpr();
        let scale = if adaptive { dpr * quality } else { dpr };
        Ok(Self {
            width: (viewport.width * scale).floor() as u32,
            height: (viewport.height * scale).floor() as u32,
            scale,
        })
    }
}

/// Outcome of the "should animate" decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationGate {
    /// Run the interactive loop.
    Animate,
    /// Viewport narrower than the mobile breakpoint.
    NarrowViewport,
    /// Animation explicitly disabled by configuration.
    Disabled,
    /// The user prefers reduced motion.
    ReducedMotion,
}

impl AnimationGate {
    /// Decide whether the loop may run.
    ///
    /// An explicit `disable_animation` wins over the reduced-motion preference,
    /// in both directions.
    #[must_use]
    pub fn evaluate(viewport_width: f64, config: &GridConfig, prefers_reduced_motion: bool) -> Self {
        if viewport_width < f64::from(config.mobile_breakpoint) {
            return Self::NarrowViewport;
        }
        match config.disable_animation {
            Some(true) => Self::Disabled,
            Some(false) => Self::Animate,
            None if prefers_reduced_motion => Self::ReducedMotion,
            None => Self::Animate,
        }
    }

    /// Whether the loop may run.
    #[must_use]
    pub fn should_animate(self) -> bool {
        self == Self::Animate
    }
}

/// Boolean form of [`AnimationGate::evaluate`].
#[must_use]
pub fn should_animate(viewport_width: f64, config: &GridConfig, prefers_reduced_motion: bool) -> bool {
    AnimationGate::evaluate(viewport_width, config, prefers_reduced_motion).should_animate()
}
