//! Errors raised by the browser binding.

use grid_core::GridError;
use grid_renderer::RenderError;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Result type for the browser binding.
pub type AppResult<T> = Result<T, AppError>;

/// Errors that can occur while binding the grid to the DOM.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required browser global is missing.
    #[error("{0} is not available")]
    MissingGlobal(&'static str),

    /// No element with the given ID.
    #[error("Element '{0}' not found")]
    ElementNotFound(String),

    /// The element exists but is not a canvas.
    #[error("Element '{0}' is not a canvas")]
    NotACanvas(String),

    /// A DOM call threw.
    #[error("DOM error: {0}")]
    Dom(String),

    /// The configuration object could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] GridError),

    /// The renderer failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl AppError {
    /// Wrap a thrown JS value.
    pub fn dom(value: &JsValue) -> Self {
        Self::Dom(js_message(value))
    }
}

impl From<AppError> for JsValue {
    fn from(err: AppError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort message for a thrown JS value.
pub fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
