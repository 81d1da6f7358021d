//! # Animated Grid WASM Application
//!
//! Browser binding for the animated grid: a canvas-backed drawing surface,
//! a `requestAnimationFrame` scheduler, DOM listeners and JS plugins.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web grid-app
//! ```
//!
//! Then import in JavaScript:
//! ```javascript
//! import init, { AnimatedGridElement, registerAnimatedGridPlugin } from './pkg/grid_app.js';
//!
//! await init();
//! registerAnimatedGridPlugin({ name: 'halo', onDraw: ({ ctx, mouse }) => { ... } });
//!
//! const grid = new AnimatedGridElement('bg-canvas');
//! grid.applyTheme('neon');
//! grid.mount();
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod element;
pub mod environment;
pub mod error;
pub mod js_plugin;
pub mod listeners;
pub mod scheduler;
pub mod surface;

use std::rc::Rc;

use grid_core::{GridConfig, Theme};
use wasm_bindgen::prelude::*;

pub use element::AnimatedGridElement;
pub use error::{AppError, AppResult};
pub use js_plugin::JsPlugin;
pub use scheduler::BrowserScheduler;
pub use surface::CanvasSurface;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Animated grid WASM initialized (v{})", grid_core::VERSION);
}

/// Register a plugin object `{ name?, onDraw }` for every grid on the page.
///
/// # Errors
///
/// Returns an error if the object is not a plugin.
#[wasm_bindgen(js_name = registerAnimatedGridPlugin)]
pub fn register_animated_grid_plugin(plugin: &JsValue) -> Result<(), JsValue> {
    grid_renderer::register_plugin(Rc::new(JsPlugin::from_object(plugin)?));
    Ok(())
}

/// Register a built-in plugin (`borderGlow`, `bloom`, `lightning`) for every
/// grid on the page.
///
/// # Errors
///
/// Returns an error for an unknown name.
#[wasm_bindgen(js_name = registerBuiltinPlugin)]
pub fn register_builtin_plugin(name: &str) -> Result<(), JsValue> {
    let plugin = grid_renderer::plugins::builtin(name)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown plugin '{name}'")))?;
    grid_renderer::register_plugin(plugin);
    Ok(())
}

/// Default configuration with a theme applied, as JSON.
///
/// # Errors
///
/// Returns an error for an unknown theme.
#[wasm_bindgen(js_name = themeConfig)]
pub fn theme_config(name: &str) -> Result<String, JsValue> {
    let theme: Theme = name.parse().map_err(AppError::from)?;
    GridConfig::default()
        .with_theme(theme)
        .to_json()
        .map_err(|e| AppError::from(e).into())
}

/// Names accepted by `themeConfig`.
#[wasm_bindgen(js_name = themeNames)]
#[must_use]
pub fn theme_names() -> Vec<String> {
    Theme::ALL.iter().map(|t| t.name().to_string()).collect()
}
