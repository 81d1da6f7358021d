//! Plugin capability, registry and per-frame pipeline.
//!
//! A plugin is anything implementing [`GridPlugin`]. Each frame the pipeline
//! calls, in order:
//!
//! 1. every plugin in the global registry,
//! 2. every plugin passed to this instance,
//! 3. the instance's custom-draw slot, if set.
//!
//! A failing plugin is logged and skipped for that frame only.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use grid_core::{Particle, PointerState};
use serde::Serialize;

use crate::{DrawSurface, PluginError};

/// Everything a plugin sees while drawing one frame.
///
/// The pointer is a copy and the particles are a shared slice: plugins can
/// draw on the surface but cannot reach simulation state.
pub struct FrameContext<'a> {
    /// Surface to draw on.
    pub surface: &'a mut dyn DrawSurface,
    /// Drawing-space width.
    pub width: f64,
    /// Drawing-space height.
    pub height: f64,
    /// Pointer position.
    pub pointer: PointerState,
    /// Live particles.
    pub particles: &'a [Particle],
    /// Pulse tick.
    pub frame: u64,
}

impl fmt::Debug for FrameContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameContext")
            .field("backend", &self.surface.backend_type())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pointer", &self.pointer)
            .field("particles", &self.particles.len())
            .field("frame", &self.frame)
            .finish()
    }
}

/// An extension that draws once per frame.
pub trait GridPlugin {
    /// Name used in logs.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Draw into the frame. The default draws nothing.
    ///
    /// # Errors
    ///
    /// A returned error is logged and the frame continues with the next plugin.
    fn on_draw(&self, ctx: &mut FrameContext<'_>) -> Result<(), PluginError> {
        let _ = ctx;
        Ok(())
    }
}

type DrawFn = dyn Fn(&mut FrameContext<'_>) -> Result<(), PluginError>;

/// A plugin made from a closure.
pub struct FnPlugin {
    name: String,
    draw: Box<DrawFn>,
}

impl FnPlugin {
    /// Wrap a closure as a plugin.
    pub fn new(
        name: impl Into<String>,
        draw: impl Fn(&mut FrameContext<'_>) -> Result<(), PluginError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            draw: Box::new(draw),
        }
    }
}

impl fmt::Debug for FnPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPlugin").field("name", &self.name).finish()
    }
}

impl GridPlugin for FnPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_draw(&self, ctx: &mut FrameContext<'_>) -> Result<(), PluginError> {
        (self.draw)(ctx)
    }
}

/// Append-only list of plugins shared by every grid that holds it.
///
/// Cloning shares the same list. The thread's global registry lives for the
/// lifetime of the UI thread; tests should build their own with
/// [`PluginRegistry::new`] or call [`PluginRegistry::reset`].
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Rc<RefCell<Vec<Rc<dyn GridPlugin>>>>,
}

thread_local! {
    static GLOBAL_REGISTRY: PluginRegistry = PluginRegistry::new();
}

impl PluginRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to this thread's global registry.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_REGISTRY.with(Clone::clone)
    }

    /// Append a plugin.
    pub fn register(&self, plugin: Rc<dyn GridPlugin>) {
        tracing::debug!("Registered plugin '{}'", plugin.name());
        self.plugins.borrow_mut().push(plugin);
    }

    /// The plugins registered so far, in order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<dyn GridPlugin>> {
        self.plugins.borrow().clone()
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.borrow().len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.borrow().is_empty()
    }

    /// Remove everything. Meant for test isolation.
    pub fn reset(&self) {
        self.plugins.borrow_mut().clear();
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("len", &self.len())
            .finish()
    }
}

/// Add a plugin to this thread's global registry.
///
/// Every grid that uses the global registry (the default) picks it up on its
/// next frame.
pub fn register_plugin(plugin: Rc<dyn GridPlugin>) {
    PluginRegistry::global().register(plugin);
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Plugins called.
    pub invoked: usize,
    /// Plugins that returned an error.
    pub failed: usize,
}

/// Ordered plugin list for one grid instance.
#[derive(Clone, Default)]
pub struct PluginPipeline {
    registry: PluginRegistry,
    instance: Vec<Rc<dyn GridPlugin>>,
    custom: Option<Rc<dyn GridPlugin>>,
}

impl PluginPipeline {
    /// A pipeline reading from `registry`.
    #[must_use]
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry,
            instance: Vec::new(),
            custom: None,
        }
    }

    /// Add an instance-scoped plugin.
    pub fn push(&mut self, plugin: Rc<dyn GridPlugin>) {
        self.instance.push(plugin);
    }

    /// Set (or clear) the custom-draw slot.
    pub fn set_custom(&mut self, plugin: Option<Rc<dyn GridPlugin>>) {
        self.custom = plugin;
    }

    /// Every plugin in call order.
    #[must_use]
    pub fn ordered(&self) -> Vec<Rc<dyn GridPlugin>> {
        let mut plugins = self.registry.snapshot();
        plugins.extend(self.instance.iter().cloned());
        plugins.extend(self.custom.iter().cloned());
        plugins
    }

    /// Run every plugin against the frame.
    pub fn invoke(&self, ctx: &mut FrameContext<'_>) -> PipelineReport {
        let mut report = PipelineReport::default();
        // Snapshot so a plugin registering another plugin does not alias the list.
        for plugin in self.ordered() {
            report.invoked += 1;
            if let Err(e) = plugin.on_draw(ctx) {
                report.failed += 1;
                tracing::warn!(
                    "Plugin '{}' failed on frame {}: {}",
                    plugin.name(),
                    ctx.frame,
                    e
                );
            }
        }
        report
    }
}

impl fmt::Debug for PluginPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginPipeline")
            .field("global", &self.registry.len())
            .field("instance", &self.instance.len())
            .field("custom", &self.custom.is_some())
            .finish()
    }
}
