//! Plugins written in JavaScript.
//!
//! A JS plugin is an object with an `onDraw(args)` method (and an optional
//! `name`), or a bare function used as the custom-draw slot. `args` carries
//! `{ ctx, canvas, mouse: { x, y }, particles: [{ x, y, alpha, life }], frame }`.

use grid_core::Particle;
use grid_renderer::{FrameContext, GridPlugin, PluginError};
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use crate::error::{js_message, AppError, AppResult};
use crate::surface::CanvasSurface;

/// A plugin backed by a JS function.
#[derive(Debug, Clone)]
pub struct JsPlugin {
    name: String,
    this: JsValue,
    on_draw: Option<Function>,
}

impl JsPlugin {
    /// Wrap a plugin object. A missing `onDraw` makes a plugin that draws
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an object or `onDraw` is not a
    /// function.
    pub fn from_object(value: &JsValue) -> AppResult<Self> {
        if !value.is_object() {
            return Err(AppError::Dom("plugin must be an object".to_string()));
        }
        let on_draw = Reflect::get(value, &JsValue::from_str("onDraw"))
            .map_err(|e| AppError::dom(&e))?;
        let on_draw = if on_draw.is_undefined() || on_draw.is_null() {
            None
        } else {
            Some(
                on_draw
                    .dyn_into::<Function>()
                    .map_err(|_| AppError::Dom("plugin.onDraw must be a function".to_string()))?,
            )
        };
        let name = Reflect::get(value, &JsValue::from_str("name"))
            .ok()
            .and_then(|n| n.as_string())
            .unwrap_or_else(|| "js".to_string());
        Ok(Self {
            name,
            this: value.clone(),
            on_draw,
        })
    }

    /// Wrap a bare draw function.
    #[must_use]
    pub fn from_function(name: &str, on_draw: Function) -> Self {
        Self {
            name: name.to_string(),
            this: JsValue::UNDEFINED,
            on_draw: Some(on_draw),
        }
    }

    fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), PluginError> {
        Reflect::set(target, &JsValue::from_str(key), value)
            .map(|_| ())
            .map_err(|e| PluginError::failed(js_message(&e)))
    }

    fn particle_array(particles: &[Particle]) -> Result<Array, PluginError> {
        let array = Array::new_with_length(u32::try_from(particles.len()).unwrap_or(u32::MAX));
        for (i, p) in (0..).zip(particles) {
            let obj = Object::new();
            Self::set(&obj, "x", &JsValue::from_f64(p.x))?;
            Self::set(&obj, "y", &JsValue::from_f64(p.y))?;
            Self::set(&obj, "alpha", &JsValue::from_f64(p.alpha))?;
            Self::set(&obj, "life", &JsValue::from_f64(p.life))?;
            array.set(i, obj.into());
        }
        Ok(array)
    }

    #[allow(clippy::cast_precision_loss)]
    fn args(surface: &CanvasSurface, ctx: &FrameContext<'_>) -> Result<Object, PluginError> {
        let mouse = Object::new();
        Self::set(&mouse, "x", &JsValue::from_f64(ctx.pointer.x))?;
        Self::set(&mouse, "y", &JsValue::from_f64(ctx.pointer.y))?;

        let args = Object::new();
        Self::set(&args, "ctx", surface.context())?;
        Self::set(&args, "canvas", surface.canvas())?;
        Self::set(&args, "mouse", &mouse)?;
        Self::set(&args, "particles", &Self::particle_array(ctx.particles)?.into())?;
        Self::set(&args, "frame", &JsValue::from_f64(ctx.frame as f64))?;
        Self::set(&args, "width", &JsValue::from_f64(ctx.width))?;
        Self::set(&args, "height", &JsValue::from_f64(ctx.height))?;
        Ok(args)
    }
}

impl GridPlugin for JsPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_draw(&self, ctx: &mut FrameContext<'_>) -> Result<(), PluginError> {
        let Some(on_draw) = &self.on_draw else {
            return Ok(());
        };
        let surface = ctx
            .surface
            .as_any()
            .downcast_ref::<CanvasSurface>()
            .ok_or_else(|| {
                PluginError::UnsupportedSurface(ctx.surface.backend_type().as_str().to_string())
            })?;
        let args = Self::args(surface, ctx)?;
        on_draw
            .call1(&self.this, &args)
            .map(|_| ())
            .map_err(|e| PluginError::failed(js_message(&e)))
    }
}
