//! # Animated Grid Core
//!
//! Simulation for an interactive grid background: everything that decides
//! *what* to draw each frame, with no dependency on a browser.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 grid-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Simulation      │  Governor                │
//! │  - Wave field    │  - FPS windows           │
//! │  - Glow lines    │  - Quality factor        │
//! │  - Particles     │  - Frame skipping        │
//! ├─────────────────────────────────────────────┤
//! │  Frame Loop      │  Host Seam               │
//! │  - State machine │  - Viewport / gate       │
//! │  - Debounce      │  - Pointer mapping       │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod config;
pub mod error;
pub mod glow;
pub mod id;
pub mod lifecycle;
pub mod particle;
pub mod performance;
pub mod pointer;
pub mod theme;
pub mod viewport;
pub mod wave;

pub use config::{GridConfig, COLUMN_SPACING, RESIZE_DEBOUNCE_MS, ROW_SPACING, SAMPLE_STEP};
pub use error::{GridError, GridResult};
pub use glow::{GlowLine, GlowLineTracker};
pub use id::GridId;
pub use lifecycle::{FrameHandle, FrameLoop, FrameScheduler, LoopState, ManualScheduler, TimerHandle};
pub use particle::{Particle, ParticleSystem, StepReport};
pub use performance::{is_software_renderer, FrameTiming, PerformanceMonitor, PerformanceSample};
pub use pointer::{ClientRect, PointerState};
pub use theme::{Theme, ThemePreset};
pub use viewport::{should_animate, AnimationGate, BackingStore, Viewport};
pub use wave::{grid_positions, WaveField};

/// Grid core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
