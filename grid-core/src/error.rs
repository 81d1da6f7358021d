//! Error types for grid operations.

use thiserror::Error;

use crate::lifecycle::LoopState;

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur in grid operations.
#[derive(Debug, Error)]
pub enum GridError {
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Viewport dimensions are zero, negative or not finite.
    #[error("Invalid viewport: {width}x{height} @ {device_pixel_ratio}")]
    InvalidViewport {
        /// Viewport width in CSS pixels.
        width: f64,
        /// Viewport height in CSS pixels.
        height: f64,
        /// Device pixel ratio.
        device_pixel_ratio: f64,
    },

    /// The frame loop was asked to make a transition it does not allow.
    #[error("Invalid frame loop transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// State the loop was in.
        from: LoopState,
        /// State that was requested.
        to: LoopState,
    },

    /// The host could not schedule a frame or timer.
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Configuration serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
