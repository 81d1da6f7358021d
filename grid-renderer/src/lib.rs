//! # Animated Grid Renderer
//!
//! Turns the simulation in `grid-core` into draw calls on an abstract
//! surface, and runs the per-frame plugin pipeline.
//!
//! ## Drawing Backends
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              DrawSurface Trait              │
//! ├──────────────────────┬──────────────────────┤
//! │ Canvas 2D            │ Recording            │
//! │ (browser, grid-app)  │ (headless, tests)    │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! [`AnimatedGrid`] owns one surface and drives everything else.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animator;
pub mod backend;
pub mod compose;
pub mod error;
pub mod plugin;
pub mod plugins;

pub use animator::{
    AnimatedGrid, FrameOutcome, FrameStats, GateOutcome, HostEnvironment, MountOutcome,
};
pub use backend::recording::{DrawCommand, RecordingSurface};
pub use backend::{ColorStop, CompositeOp, DrawSurface, Paint};
pub use compose::FrameState;
pub use error::{PluginError, RenderError, RenderResult};
pub use plugin::{
    register_plugin, FnPlugin, FrameContext, GridPlugin, PipelineReport, PluginPipeline,
    PluginRegistry,
};
pub use plugins::{BloomPlugin, BorderGlowPlugin, LightningPlugin};

/// Available drawing backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Browser 2D canvas context.
    Canvas2D,
    /// In-memory command log.
    Recording,
}

impl BackendType {
    /// Short name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Canvas2D => "canvas2d",
            Self::Recording => "recording",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        assert_eq!(BackendType::Canvas2D.as_str(), "canvas2d");
        assert_eq!(RecordingSurface::new().backend_type(), BackendType::Recording);
    }
}
