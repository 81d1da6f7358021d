//! The animated grid orchestrator.
//!
//! [`AnimatedGrid`] owns one drawing surface and all per-instance state. The
//! host drives it from its event loop:
//!
//! ```text
//! mount ──► on_frame ──► on_frame ──► …          (display refresh)
//!            ▲ on_pointer_move / on_resize        (input events)
//!            ├ on_resize_timer                    (debounce expiry)
//!            └ on_motion_preference               (media query change)
//! teardown                                        (unmount)
//! ```
//!
//! The animation gate is re-checked whenever the viewport or the motion
//! preference changes, so a mounted grid moves between the loop and its
//! static image as the host crosses the breakpoint.
//!
//! Every host callback takes the [`FrameScheduler`] so the grid can request
//! its next frame or arm its resize timer.

use std::fmt;
use std::rc::Rc;

use grid_core::{
    AnimationGate, BackingStore, ClientRect, FrameHandle, FrameLoop, FrameScheduler, FrameTiming,
    GridConfig, GridError, GridId, LoopState, PerformanceMonitor, PerformanceSample, PointerState,
    TimerHandle, Viewport, WaveField, RESIZE_DEBOUNCE_MS,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::compose::{self, FrameState};
use crate::{
    DrawSurface, FnPlugin, FrameContext, GridPlugin, PipelineReport, PluginError, PluginPipeline,
    PluginRegistry, RenderResult,
};

/// What the host reports about its environment at mount time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostEnvironment {
    /// Current viewport.
    pub viewport: Viewport,
    /// The user asked for reduced motion.
    pub prefers_reduced_motion: bool,
    /// The host detected a software renderer.
    pub low_power: bool,
}

impl HostEnvironment {
    /// Environment with no motion preference on a capable device.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            prefers_reduced_motion: false,
            low_power: false,
        }
    }
}

/// Result of [`AnimatedGrid::mount`].
#[derive(Debug, Clone, PartialEq)]
pub enum MountOutcome {
    /// The frame loop is running.
    Animating,
    /// The host should show a static image instead.
    StaticFallback {
        /// Image to show.
        image: String,
        /// Why the loop did not start.
        reason: AnimationGate,
    },
    /// No drawing context could be obtained; the host shows an empty element.
    Placeholder,
}

impl MountOutcome {
    /// Short name for logs and the browser binding.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Animating => "animating",
            Self::StaticFallback { .. } => "static",
            Self::Placeholder => "placeholder",
        }
    }
}

/// Result of re-checking the animation gate after a resize or a motion
/// preference change.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// The callback was stale or the grid is not mounted.
    Ignored,
    /// Nothing visible changed.
    Unchanged,
    /// The loop kept running and a sizing pass ran.
    Resized,
    /// The gate opened: the host should hide the static image; the loop runs.
    Started,
    /// The gate closed: the loop stopped and the host should show `image`.
    Stopped {
        /// Image to show.
        image: String,
        /// Why the loop stopped.
        reason: AnimationGate,
    },
}

/// Result of [`AnimatedGrid::on_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FrameOutcome {
    /// A full frame was drawn.
    Drawn {
        /// Plugin pipeline result.
        plugins: PipelineReport,
    },
    /// The frame was shed by the governor or had no drawable geometry.
    Skipped,
    /// The callback was stale or arrived after teardown; nothing happened.
    Ignored,
}

/// Running totals for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameStats {
    /// Frames fully drawn.
    pub frames_drawn: u64,
    /// Frames shed or without geometry.
    pub frames_skipped: u64,
    /// Plugin failures.
    pub plugin_failures: u64,
    /// Sizing passes run.
    pub sizing_passes: u64,
}

type LoadHook = Box<dyn FnMut()>;

/// One animated grid bound to a drawing surface.
pub struct AnimatedGrid<S: DrawSurface> {
    id: GridId,
    config: GridConfig,
    surface: S,
    frame_loop: FrameLoop,
    state: FrameState,
    monitor: PerformanceMonitor,
    pipeline: PluginPipeline,
    viewport: Option<Viewport>,
    prefers_reduced_motion: bool,
    low_power: bool,
    store: Option<BackingStore>,
    rng: SmallRng,
    on_load: Option<LoadHook>,
    stats: FrameStats,
}

impl<S: DrawSurface> AnimatedGrid<S> {
    /// Create an unmounted grid using the thread's global plugin registry.
    pub fn new(config: GridConfig, surface: S) -> Self {
        Self::with_registry(config, surface, PluginRegistry::global())
    }

    /// Create an unmounted grid reading plugins from `registry`.
    pub fn with_registry(config: GridConfig, surface: S, registry: PluginRegistry) -> Self {
        let monitor = PerformanceMonitor::for_config(&config, 0.0);
        Self {
            id: GridId::new(),
            state: FrameState::new(config.max_particles),
            config,
            surface,
            frame_loop: FrameLoop::new(),
            monitor,
            pipeline: PluginPipeline::new(registry),
            viewport: None,
            prefers_reduced_motion: false,
            low_power: false,
            store: None,
            rng: SmallRng::from_entropy(),
            on_load: None,
            stats: FrameStats::default(),
        }
    }

    /// Use a reproducible random sequence for particles and glow lines.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Add an instance-scoped plugin.
    #[must_use]
    pub fn with_plugin(mut self, plugin: Rc<dyn GridPlugin>) -> Self {
        self.pipeline.push(plugin);
        self
    }

    /// Fill the custom-draw slot, called after every other plugin.
    #[must_use]
    pub fn with_custom_draw(
        mut self,
        draw: impl Fn(&mut FrameContext<'_>) -> Result<(), PluginError> + 'static,
    ) -> Self {
        self.pipeline
            .set_custom(Some(Rc::new(FnPlugin::new("customDraw", draw))));
        self
    }

    /// Set the custom-draw slot from an existing plugin.
    pub fn set_custom_draw(&mut self, plugin: Option<Rc<dyn GridPlugin>>) {
        self.pipeline.set_custom(plugin);
    }

    /// Called once when the loop starts.
    #[must_use]
    pub fn on_load(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_load = Some(Box::new(hook));
        self
    }

    /// Called with the measured FPS once per measurement window.
    #[must_use]
    pub fn on_performance_change(mut self, hook: impl FnMut(u32) + 'static) -> Self {
        self.monitor.set_listener(Some(Box::new(hook)));
        self
    }

    /// Decide, size, and start the loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid was already mounted or the host cannot
    /// schedule the first frame.
    pub fn mount(
        &mut self,
        env: &HostEnvironment,
        now: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> RenderResult<MountOutcome> {
        if self.frame_loop.state() != LoopState::Uninitialized {
            return Err(GridError::InvalidTransition {
                from: self.frame_loop.state(),
                to: LoopState::Sizing,
            }
            .into());
        }
        self.replace_invalid_config();
        self.prefers_reduced_motion = env.prefers_reduced_motion;
        self.low_power = env.low_power;

        let gate = self.gate(env.viewport);
        if !gate.should_animate() {
            self.frame_loop.show_static(scheduler)?;
            self.viewport = Some(env.viewport);
            tracing::info!("Grid {} showing static fallback ({:?})", self.id, gate);
            return Ok(MountOutcome::StaticFallback {
                image: self.config.static_bg_img.clone(),
                reason: gate,
            });
        }

        self.start(env.viewport, now, scheduler)?;
        Ok(MountOutcome::Animating)
    }

    /// Swap an unusable configuration for the defaults, keeping the fallback
    /// image, and bring the governor and particle cap in line with it.
    fn replace_invalid_config(&mut self) {
        if let Err(e) = self.config.validate() {
            tracing::warn!("Grid {} config rejected, using defaults: {}", self.id, e);
            self.config = GridConfig {
                static_bg_img: self.config.static_bg_img.clone(),
                ..GridConfig::default()
            };
            self.monitor.reconfigure(&self.config);
            self.state
                .particles
                .set_max_particles(self.config.max_particles);
        }
    }

    fn gate(&self, viewport: Viewport) -> AnimationGate {
        AnimationGate::evaluate(viewport.width, &self.config, self.prefers_reduced_motion)
    }

    /// Size for `viewport` and enter the running loop.
    fn start(
        &mut self,
        viewport: Viewport,
        now: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> RenderResult<()> {
        self.monitor.set_low_power(self.low_power);
        self.monitor.rebase(now);

        self.frame_loop.begin_sizing()?;
        self.sizing_pass(viewport);
        self.frame_loop.finish_sizing(scheduler)?;

        tracing::info!(
            "Grid {} started at {}x{} (dpr {})",
            self.id,
            viewport.width,
            viewport.height,
            viewport.effective_dpr()
        );
        if let Some(hook) = self.on_load.as_mut() {
            hook();
        }
        Ok(())
    }

    /// Re-check the gate for `viewport` and move between the loop and the
    /// static image. A sizing pass runs only when `resized` is set.
    fn regate(
        &mut self,
        viewport: Viewport,
        resized: bool,
        now: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> RenderResult<GateOutcome> {
        let gate = self.gate(viewport);
        let live = matches!(
            self.frame_loop.state(),
            LoopState::Running | LoopState::Suspended
        );
        match (live, gate.should_animate()) {
            (true, true) if resized => {
                self.frame_loop.begin_sizing()?;
                self.sizing_pass(viewport);
                self.frame_loop.finish_sizing(scheduler)?;
                Ok(GateOutcome::Resized)
            }
            (true, true) => Ok(GateOutcome::Unchanged),
            (true, false) => {
                self.frame_loop.show_static(scheduler)?;
                self.viewport = Some(viewport);
                self.store = None;
                self.state.particles.clear();
                tracing::info!("Grid {} stopped, showing static fallback ({:?})", self.id, gate);
                Ok(GateOutcome::Stopped {
                    image: self.config.static_bg_img.clone(),
                    reason: gate,
                })
            }
            (false, true) => {
                self.start(viewport, now, scheduler)?;
                Ok(GateOutcome::Started)
            }
            (false, false) => {
                self.viewport = Some(viewport);
                Ok(GateOutcome::Unchanged)
            }
        }
    }

    /// Recompute the backing store and rebuild the glow lines.
    fn sizing_pass(&mut self, viewport: Viewport) {
        self.stats.sizing_passes += 1;
        self.viewport = Some(viewport);
        if self.apply_backing_store() {
            self.state
                .glow
                .rebuild(viewport.width, viewport.height, &mut self.rng);
        } else {
            self.state.glow = grid_core::GlowLineTracker::new();
        }
    }

    /// Size the surface for the current viewport and quality.
    ///
    /// Returns `false` (and leaves nothing drawable) for a degenerate viewport.
    fn apply_backing_store(&mut self) -> bool {
        let Some(viewport) = self.viewport else {
            return false;
        };
        let store = match BackingStore::for_viewport(
            &viewport,
            self.monitor.quality(),
            self.monitor.is_adaptive(),
        ) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("Grid {} not drawable: {}", self.id, e);
                self.store = None;
                return false;
            }
        };
        if let Err(e) = self.surface.resize(store.width, store.height) {
            tracing::warn!("Grid {} resize failed: {}", self.id, e);
            self.store = None;
            return false;
        }
        self.surface.set_scale(store.scale);
        if self.config.gpu_acceleration {
            self.surface.set_gpu_hints(true);
        }
        tracing::debug!(
            "Grid {} backing store {}x{} (scale {:.2})",
            self.id,
            store.width,
            store.height,
            store.scale
        );
        self.store = Some(store);
        true
    }

    /// Handle a frame callback from the host.
    ///
    /// Draws one frame if the handle is the one this grid requested and the
    /// loop is running, then requests the next frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the next frame cannot be scheduled.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> RenderResult<FrameOutcome> {
        if !self.frame_loop.frame_fired(handle) {
            return Ok(FrameOutcome::Ignored);
        }
        let outcome = self.tick(now);
        self.frame_loop.schedule_next(scheduler)?;
        Ok(outcome)
    }

    fn tick(&mut self, now: f64) -> FrameOutcome {
        let timing: FrameTiming = self.monitor.update(now);
        if timing.quality_changed {
            self.apply_backing_store();
        }
        if timing.should_skip_frame {
            self.stats.frames_skipped += 1;
            return FrameOutcome::Skipped;
        }
        let Some(viewport) = self.viewport.filter(|_| self.store.is_some()) else {
            self.stats.frames_skipped += 1;
            return FrameOutcome::Skipped;
        };

        let (width, height) = (viewport.width, viewport.height);
        let intensity = self.config.intensity * timing.quality_factor;
        let surface: &mut dyn DrawSurface = &mut self.surface;

        surface.clear();
        compose::draw_background(surface, width, height);

        let wave = WaveField::new(
            self.state.pointer,
            intensity,
            self.config.mouse_influence,
            self.state.tick,
        );
        compose::draw_grid(surface, &wave, &self.state.glow, &self.config, width, height);
        self.state.glow.advance();

        compose::draw_ripple(
            surface,
            self.state.pointer,
            self.state.tick,
            &self.config.ripple_color,
        );

        let plugins = {
            let mut ctx = FrameContext {
                surface: &mut *surface,
                width,
                height,
                pointer: self.state.pointer,
                particles: self.state.particles.particles(),
                frame: self.state.tick,
            };
            self.pipeline.invoke(&mut ctx)
        };

        self.state.particles.step(
            &mut self.rng,
            self.state.pointer,
            intensity,
            timing.quality_factor,
        );
        compose::draw_particles(
            surface,
            self.state.particles.particles(),
            self.config.particle_trails,
        );

        self.state.tick += 1;
        self.stats.frames_drawn += 1;
        self.stats.plugin_failures += u64::try_from(plugins.failed).unwrap_or(u64::MAX);
        tracing::trace!(
            "Grid {} frame {} drawn ({} particles)",
            self.id,
            self.state.tick,
            self.state.particles.len()
        );
        FrameOutcome::Drawn { plugins }
    }

    /// Pointer or first-touch move, in viewport coordinates.
    ///
    /// `rect` is the canvas element's on-screen rectangle.
    pub fn on_pointer_move(&mut self, client_x: f64, client_y: f64, rect: &ClientRect) {
        if self.frame_loop.state() == LoopState::TornDown {
            return;
        }
        if let Some(store) = self.store {
            self.state
                .pointer
                .update_from_client(client_x, client_y, rect, &store);
        }
    }

    /// Viewport resize event; debounced before the sizing pass runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the debounce timer cannot be armed.
    pub fn on_resize(&mut self, scheduler: &mut dyn FrameScheduler) -> RenderResult<()> {
        self.frame_loop
            .debounce_resize(scheduler, RESIZE_DEBOUNCE_MS)?;
        Ok(())
    }

    /// The resize debounce timer fired.
    ///
    /// Re-checks the animation gate against the new viewport: a running grid
    /// is resized or stopped, a static one may start.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop cannot re-enter its drawing state.
    pub fn on_resize_timer(
        &mut self,
        handle: TimerHandle,
        viewport: Viewport,
        now: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> RenderResult<GateOutcome> {
        if !self.frame_loop.resize_fired(handle) {
            return Ok(GateOutcome::Ignored);
        }
        self.regate(viewport, true, now, scheduler)
    }

    /// The host's reduced-motion preference changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop cannot be started.
    pub fn on_motion_preference(
        &mut self,
        prefers_reduced_motion: bool,
        now: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> RenderResult<GateOutcome> {
        let mounted = matches!(
            self.frame_loop.state(),
            LoopState::Running | LoopState::Suspended | LoopState::Static
        );
        let Some(viewport) = self.viewport.filter(|_| mounted) else {
            return Ok(GateOutcome::Ignored);
        };
        self.prefers_reduced_motion = prefers_reduced_motion;
        self.regate(viewport, false, now, scheduler)
    }

    /// Stop drawing while the host is hidden.
    ///
    /// # Errors
    ///
    /// Returns an error unless the loop is running.
    pub fn suspend(&mut self, scheduler: &mut dyn FrameScheduler) -> RenderResult<()> {
        self.frame_loop.suspend(scheduler)?;
        tracing::debug!("Grid {} suspended", self.id);
        Ok(())
    }

    /// Resume drawing; the FPS window restarts at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error unless the loop is suspended.
    pub fn resume(&mut self, now: f64, scheduler: &mut dyn FrameScheduler) -> RenderResult<()> {
        self.frame_loop.resume(scheduler)?;
        self.monitor.rebase(now);
        tracing::debug!("Grid {} resumed", self.id);
        Ok(())
    }

    /// Cancel the pending frame and resize timer. Idempotent.
    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.frame_loop.teardown(scheduler) {
            tracing::info!(
                "Grid {} torn down after {} frames",
                self.id,
                self.stats.frames_drawn
            );
        }
    }

    /// Lifecycle state.
    #[must_use]
    pub fn loop_state(&self) -> LoopState {
        self.frame_loop.state()
    }

    /// Whether the loop is drawing frames.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// The drawing surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The drawing surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Instance ID.
    #[must_use]
    pub fn id(&self) -> GridId {
        self.id
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Simulation state.
    #[must_use]
    pub fn state(&self) -> &FrameState {
        &self.state
    }

    /// Pointer in drawing space.
    #[must_use]
    pub fn pointer(&self) -> PointerState {
        self.state.pointer
    }

    /// Performance governor snapshot.
    #[must_use]
    pub fn performance(&self) -> PerformanceSample {
        self.monitor.sample()
    }

    /// Current backing store, if the viewport is drawable.
    #[must_use]
    pub fn backing_store(&self) -> Option<BackingStore> {
        self.store
    }

    /// Diagnostics counters.
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

impl<S: DrawSurface> fmt::Debug for AnimatedGrid<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatedGrid")
            .field("id", &self.id)
            .field("state", &self.frame_loop.state())
            .field("backend", &self.surface.backend_type())
            .field("store", &self.store)
            .field("pipeline", &self.pipeline)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
