//! Renderer error types.

use grid_core::GridError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No drawing context could be obtained.
    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// A surface operation failed.
    #[error("Surface error: {0}")]
    Surface(String),

    /// A plugin failed while drawing.
    #[error("Plugin '{name}' failed: {source}")]
    Plugin {
        /// Name the plugin reports.
        name: String,
        /// Underlying failure.
        #[source]
        source: PluginError,
    },

    /// Error bubbled up from the simulation core.
    #[error(transparent)]
    Core(#[from] GridError),
}

/// Failure reported by a plugin's draw callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    /// The plugin ran but could not finish.
    #[error("draw failed: {0}")]
    Failed(String),

    /// The plugin cannot draw on this kind of surface.
    #[error("unsupported surface: {0}")]
    UnsupportedSurface(String),
}

impl PluginError {
    /// Shorthand for [`PluginError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
