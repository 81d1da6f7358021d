//! The mountable grid element exposed to JavaScript.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use grid_core::{GridConfig, Theme};
use grid_renderer::{AnimatedGrid, GateOutcome, GridPlugin, MountOutcome, RenderResult};
use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlCanvasElement, HtmlImageElement, MouseEvent, TouchEvent, Window};

use crate::environment;
use crate::error::{AppError, AppResult};
use crate::js_plugin::JsPlugin;
use crate::listeners::EventListener;
use crate::scheduler::BrowserScheduler;
use crate::surface::CanvasSurface;

/// State shared between the element and its browser callbacks.
///
/// Callbacks hold a `Weak` to this, so dropping the element's `Rc` is enough
/// to make any late callback a no-op.
struct Running {
    grid: AnimatedGrid<CanvasSurface>,
    scheduler: BrowserScheduler,
    window: Window,
    document: Document,
    fallback: Option<HtmlImageElement>,
}

type Shared = Rc<RefCell<Running>>;

/// Run `f` against the shared state if it is still alive and not borrowed.
fn with_running(weak: &Weak<RefCell<Running>>, f: impl FnOnce(&mut Running)) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(mut running) = shared.try_borrow_mut() else {
        tracing::debug!("Grid callback re-entered; dropping event");
        return;
    };
    f(&mut running);
}

impl Running {
    fn on_frame(&mut self, now: f64) {
        let Some(handle) = self.scheduler.take_fired_frame() else {
            return;
        };
        if let Err(e) = self.grid.on_frame(handle, now, &mut self.scheduler) {
            tracing::warn!("Frame failed: {}", e);
        }
    }

    fn on_resize_timer(&mut self) {
        let Some(handle) = self.scheduler.take_fired_timer() else {
            return;
        };
        let viewport = environment::viewport(&self.window);
        let now = environment::now(&self.window);
        let outcome = self
            .grid
            .on_resize_timer(handle, viewport, now, &mut self.scheduler);
        self.apply(outcome);
    }

    fn on_motion_preference(&mut self) {
        let reduced = environment::prefers_reduced_motion(&self.window);
        let now = environment::now(&self.window);
        let outcome = self
            .grid
            .on_motion_preference(reduced, now, &mut self.scheduler);
        self.apply(outcome);
    }

    /// Swap between canvas and static image as the gate dictates.
    fn apply(&mut self, outcome: RenderResult<GateOutcome>) {
        match outcome {
            Ok(GateOutcome::Resized) => self.fit_css(),
            Ok(GateOutcome::Started) => {
                self.hide_fallback();
                self.fit_css();
            }
            Ok(GateOutcome::Stopped { image, reason }) => {
                tracing::info!("Static background ({:?})", reason);
                if let Err(e) = self.show_fallback(&image) {
                    tracing::warn!("Could not show static background: {}", e);
                }
            }
            Ok(GateOutcome::Ignored | GateOutcome::Unchanged) => {}
            Err(e) => tracing::warn!("Layout change failed: {}", e),
        }
    }

    fn on_resize(&mut self) {
        if let Err(e) = self.grid.on_resize(&mut self.scheduler) {
            tracing::warn!("Could not debounce resize: {}", e);
        }
    }

    fn on_pointer(&mut self, client_x: f64, client_y: f64) {
        let rect = environment::client_rect(self.grid.surface().canvas());
        self.grid.on_pointer_move(client_x, client_y, &rect);
    }

    fn on_visibility(&mut self) {
        let result = if self.document.hidden() {
            self.grid.suspend(&mut self.scheduler)
        } else {
            let now = environment::now(&self.window);
            self.grid.resume(now, &mut self.scheduler)
        };
        if let Err(e) = result {
            tracing::debug!("Visibility change ignored: {}", e);
        }
    }

    /// Insert the static image before the canvas and hide the canvas.
    fn show_fallback(&mut self, src: &str) -> AppResult<()> {
        if self.fallback.is_some() {
            return Ok(());
        }
        let canvas = self.grid.surface().canvas();
        let img = self
            .document
            .create_element("img")
            .map_err(|e| AppError::dom(&e))?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| AppError::Dom("img element expected".to_string()))?;
        img.set_src(src);
        img.set_alt("");
        img.set_class_name(&format!("{} w-full h-full object-cover", canvas.class_name()));
        img.set_attribute("aria-hidden", "true")
            .map_err(|e| AppError::dom(&e))?;

        if let Some(parent) = canvas.parent_node() {
            parent
                .insert_before(&img, Some(canvas))
                .map_err(|e| AppError::dom(&e))?;
        }
        canvas
            .style()
            .set_property("display", "none")
            .map_err(|e| AppError::dom(&e))?;
        self.fallback = Some(img);
        Ok(())
    }

    /// Remove the static image and show the canvas again.
    fn hide_fallback(&mut self) {
        if let Some(img) = self.fallback.take() {
            img.remove();
            if let Err(e) = self.grid.surface().canvas().style().remove_property("display") {
                tracing::debug!("Could not restore canvas display: {:?}", e);
            }
        }
    }

    /// Match the canvas's CSS size to the viewport it was sized for.
    fn fit_css(&self) {
        let viewport = environment::viewport(&self.window);
        let style = self.grid.surface().canvas().style();
        for (property, value) in [("width", viewport.width), ("height", viewport.height)] {
            if let Err(e) = style.set_property(property, &format!("{value}px")) {
                tracing::debug!("Could not set canvas {}: {:?}", property, e);
            }
        }
    }
}

/// A mounted loop: shared state plus the listeners feeding it.
struct Mounted {
    running: Shared,
    listeners: Vec<EventListener>,
}

/// Animated grid bound to a `<canvas>` element.
///
/// ```javascript
/// const grid = new AnimatedGridElement('bg-canvas', JSON.stringify({ intensity: 1.2 }));
/// grid.onLoad(() => console.log('grid running'));
/// grid.addPlugin({ name: 'dots', onDraw: ({ ctx, mouse }) => { ... } });
/// grid.mount();   // "animating" | "static" | "placeholder"
/// // later
/// grid.unmount();
/// ```
#[wasm_bindgen]
pub struct AnimatedGridElement {
    canvas: HtmlCanvasElement,
    config: GridConfig,
    plugins: Vec<Rc<dyn GridPlugin>>,
    custom_draw: Option<Rc<dyn GridPlugin>>,
    on_load: Option<Function>,
    on_performance_change: Option<Function>,
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl AnimatedGridElement {
    /// Bind to the canvas with the given ID.
    ///
    /// `config` is an optional JSON object; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas is missing or the config is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, config: Option<String>) -> Result<AnimatedGridElement, JsValue> {
        let document = document()?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| AppError::ElementNotFound(canvas_id.to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| AppError::NotACanvas(canvas_id.to_string()))?;
        let config = match config.as_deref() {
            Some(json) => GridConfig::from_json(json).map_err(AppError::from)?,
            None => GridConfig::default(),
        };
        Ok(Self {
            canvas,
            config,
            plugins: Vec::new(),
            custom_draw: None,
            on_load: None,
            on_performance_change: None,
            mounted: None,
        })
    }

    /// Apply a theme preset by name (`matrix`, `neon`, `minimal`, `tech`).
    ///
    /// Takes effect on the next mount.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown theme.
    #[wasm_bindgen(js_name = applyTheme)]
    pub fn apply_theme(&mut self, name: &str) -> Result<(), JsValue> {
        let theme: Theme = name.parse().map_err(AppError::from)?;
        self.config = std::mem::take(&mut self.config).with_theme(theme);
        Ok(())
    }

    /// Add an instance plugin object `{ name?, onDraw }`.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not a plugin.
    #[wasm_bindgen(js_name = addPlugin)]
    pub fn add_plugin(&mut self, plugin: &JsValue) -> Result<(), JsValue> {
        self.plugins.push(Rc::new(JsPlugin::from_object(plugin)?));
        Ok(())
    }

    /// Add one of the built-in plugins (`borderGlow`, `bloom`, `lightning`).
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown name.
    #[wasm_bindgen(js_name = addBuiltinPlugin)]
    pub fn add_builtin_plugin(&mut self, name: &str) -> Result<(), JsValue> {
        let plugin = grid_renderer::plugins::builtin(name)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown plugin '{name}'")))?;
        self.plugins.push(plugin);
        Ok(())
    }

    /// Set the custom-draw slot, called after every plugin.
    #[wasm_bindgen(js_name = setCustomDraw)]
    pub fn set_custom_draw(&mut self, draw: Option<Function>) {
        self.custom_draw = draw.map(|f| Rc::new(JsPlugin::from_function("customDraw", f)) as Rc<dyn GridPlugin>);
    }

    /// Called once the loop has started.
    #[wasm_bindgen(js_name = onLoad)]
    pub fn on_load(&mut self, callback: Option<Function>) {
        self.on_load = callback;
    }

    /// Called with the measured FPS about once a second.
    #[wasm_bindgen(js_name = onPerformanceChange)]
    pub fn on_performance_change(&mut self, callback: Option<Function>) {
        self.on_performance_change = callback;
    }

    /// Decide, size and start. Returns `"animating"`, `"static"` or
    /// `"placeholder"`.
    ///
    /// Mounting an already mounted element remounts it.
    ///
    /// # Errors
    ///
    /// Returns an error if a browser API fails.
    pub fn mount(&mut self) -> Result<String, JsValue> {
        self.unmount();
        Ok(self.mount_inner()?.as_str().to_string())
    }

    /// Stop the loop, remove listeners and any fallback image. Idempotent.
    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            let torn_down = match mounted.running.try_borrow_mut() {
                Ok(mut running) => {
                    let Running {
                        grid, scheduler, ..
                    } = &mut *running;
                    grid.teardown(scheduler);
                    running.hide_fallback();
                    true
                }
                Err(_) => false,
            };
            if !torn_down {
                tracing::warn!("unmount() called from inside a frame; ignored");
                self.mounted = Some(mounted);
                return;
            }
            drop(mounted.listeners);
        }
    }

    /// Whether the loop is running.
    #[wasm_bindgen(js_name = isRunning)]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.mounted
            .as_ref()
            .and_then(|m| m.running.try_borrow().ok().map(|r| r.grid.is_running()))
            .unwrap_or(false)
    }

    /// The canvas this element draws on.
    #[must_use]
    pub fn canvas(&self) -> HtmlCanvasElement {
        self.canvas.clone()
    }

    /// Frame counters and governor state as JSON, or `null` when not running.
    #[must_use]
    pub fn stats(&self) -> Option<String> {
        let mounted = self.mounted.as_ref()?;
        let running = mounted.running.try_borrow().ok()?;
        let stats = serde_json::json!({
            "frames": running.grid.stats(),
            "performance": running.grid.performance(),
            "particles": running.grid.state().particles.len(),
        });
        Some(stats.to_string())
    }

    /// Current configuration as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = configJson)]
    pub fn config_json(&self) -> Result<String, JsValue> {
        self.config
            .to_json()
            .map_err(|e| AppError::from(e).into())
    }
}

impl AnimatedGridElement {
    fn mount_inner(&mut self) -> AppResult<MountOutcome> {
        let window = window()?;
        let document = window.document().ok_or(AppError::MissingGlobal("document"))?;
        let env = environment::host_environment(&window, &document);

        let ctx = match self.canvas.get_context("2d") {
            Ok(Some(ctx)) => ctx.dyn_into::<web_sys::CanvasRenderingContext2d>().ok(),
            Ok(None) | Err(_) => None,
        };
        let Some(ctx) = ctx else {
            tracing::warn!("2D context unavailable; rendering placeholder");
            return Ok(MountOutcome::Placeholder);
        };

        let mut grid = AnimatedGrid::new(
            self.config.clone(),
            CanvasSurface::new(self.canvas.clone(), ctx),
        );
        for plugin in &self.plugins {
            grid = grid.with_plugin(Rc::clone(plugin));
        }
        grid.set_custom_draw(self.custom_draw.clone());
        if let Some(callback) = self.on_load.clone() {
            grid = grid.on_load(move || {
                if let Err(e) = callback.call0(&JsValue::NULL) {
                    tracing::warn!("onLoad threw: {:?}", e);
                }
            });
        }
        if let Some(callback) = self.on_performance_change.clone() {
            grid = grid.on_performance_change(move |fps| {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from(fps)) {
                    tracing::warn!("onPerformanceChange threw: {:?}", e);
                }
            });
        }

        let running: Shared = Rc::new_cyclic(|weak: &Weak<RefCell<Running>>| {
            let on_frame = weak.clone();
            let on_timer = weak.clone();
            RefCell::new(Running {
                grid,
                scheduler: BrowserScheduler::new(
                    window.clone(),
                    move |now| with_running(&on_frame, |r| r.on_frame(now)),
                    move || with_running(&on_timer, Running::on_resize_timer),
                ),
                window: window.clone(),
                document: document.clone(),
                fallback: None,
            })
        });

        let now = environment::now(&window);
        let outcome = {
            let mut guard = running.borrow_mut();
            let Running {
                grid, scheduler, ..
            } = &mut *guard;
            grid.mount(&env, now, scheduler)?
        };

        match &outcome {
            MountOutcome::Animating => running.borrow().fit_css(),
            MountOutcome::StaticFallback { image, reason } => {
                tracing::info!("Static background ({:?})", reason);
                running.borrow_mut().show_fallback(image)?;
            }
            MountOutcome::Placeholder => return Ok(outcome),
        }
        // A static grid keeps its listeners so it can start once the gate opens.
        let listeners = Self::attach(&running, &window, &document)?;
        self.mounted = Some(Mounted { running, listeners });
        Ok(outcome)
    }

    fn attach(running: &Shared, window: &Window, document: &Document) -> AppResult<Vec<EventListener>> {
        let weak = Rc::downgrade(running);

        let resize = {
            let weak = weak.clone();
            EventListener::passive(window, "resize", move |_| {
                with_running(&weak, Running::on_resize);
            })?
        };
        let mouse = {
            let weak = weak.clone();
            EventListener::passive(window, "mousemove", move |event: Event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    let (x, y) = (f64::from(event.client_x()), f64::from(event.client_y()));
                    with_running(&weak, |r| r.on_pointer(x, y));
                }
            })?
        };
        let touch = {
            let weak = weak.clone();
            EventListener::passive(window, "touchmove", move |event: Event| {
                let first = event
                    .dyn_ref::<TouchEvent>()
                    .and_then(|event| event.touches().get(0));
                if let Some(touch) = first {
                    let (x, y) = (f64::from(touch.client_x()), f64::from(touch.client_y()));
                    with_running(&weak, |r| r.on_pointer(x, y));
                }
            })?
        };
        let visibility = {
            let weak = weak.clone();
            EventListener::passive(document, "visibilitychange", move |_| {
                with_running(&weak, Running::on_visibility);
            })?
        };
        let mut listeners = vec![resize, mouse, touch, visibility];

        if let Some(query) = environment::reduced_motion_query(window) {
            listeners.push(EventListener::passive(&query, "change", move |_| {
                with_running(&weak, Running::on_motion_preference);
            })?);
        }
        Ok(listeners)
    }
}

impl Drop for AnimatedGridElement {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn window() -> AppResult<Window> {
    web_sys::window().ok_or(AppError::MissingGlobal("window"))
}

fn document() -> AppResult<Document> {
    window()?
        .document()
        .ok_or(AppError::MissingGlobal("document"))
}
