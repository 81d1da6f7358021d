//! Probes for the host environment.

use grid_core::{is_software_renderer, ClientRect, Viewport};
use grid_renderer::HostEnvironment;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlCanvasElement, MediaQueryList, WebGlRenderingContext, Window,
};

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Window inner size and device pixel ratio.
pub fn viewport(window: &Window) -> Viewport {
    Viewport::new(
        dimension(window.inner_width()),
        dimension(window.inner_height()),
        window.device_pixel_ratio(),
    )
}

fn dimension(value: Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

/// The `prefers-reduced-motion` media query, if the browser supports it.
pub fn reduced_motion_query(window: &Window) -> Option<MediaQueryList> {
    window.match_media(REDUCED_MOTION_QUERY).ok().flatten()
}

/// Whether the user asked for reduced motion.
pub fn prefers_reduced_motion(window: &Window) -> bool {
    reduced_motion_query(window).is_some_and(|query| query.matches())
}

/// Whether WebGL reports a software rasterizer.
///
/// False when WebGL is unavailable.
pub fn is_low_power_device(document: &Document) -> bool {
    let gl = document
        .create_element("canvas")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .and_then(|canvas| canvas.get_context("webgl").ok().flatten())
        .and_then(|ctx| ctx.dyn_into::<WebGlRenderingContext>().ok());
    let Some(gl) = gl else {
        return false;
    };
    let renderer = gl
        .get_parameter(WebGlRenderingContext::RENDERER)
        .ok()
        .and_then(|v| v.as_string());
    tracing::debug!("WebGL renderer: {:?}", renderer);
    renderer.is_some_and(|name| is_software_renderer(&name))
}

/// Everything the grid needs to decide how to mount.
pub fn host_environment(window: &Window, document: &Document) -> HostEnvironment {
    HostEnvironment {
        viewport: viewport(window),
        prefers_reduced_motion: prefers_reduced_motion(window),
        low_power: is_low_power_device(document),
    }
}

/// On-screen rectangle of an element.
pub fn client_rect(element: &Element) -> ClientRect {
    let rect = element.get_bounding_client_rect();
    ClientRect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

/// High-resolution clock in milliseconds.
pub fn now(window: &Window) -> f64 {
    window
        .performance()
        .map_or_else(js_sys::Date::now, |performance| performance.now())
}
