//! Browser tests, run with `wasm-pack test --headless --chrome grid-app`.

#![cfg(target_arch = "wasm32")]

use grid_app::{AnimatedGridElement, BrowserScheduler, CanvasSurface, JsPlugin};
use grid_core::{FrameScheduler, PointerState};
use grid_renderer::{BackendType, DrawSurface, FrameContext, GridPlugin, Paint, PluginError, RecordingSurface};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

wasm_bindgen_test_configure!(run_in_browser);

fn canvas(id: &str) -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<HtmlCanvasElement>()
        .unwrap();
    canvas.set_id(id);
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

fn surface(id: &str) -> CanvasSurface {
    let canvas = canvas(id);
    let ctx = canvas
        .get_context("2d")
        .unwrap()
        .unwrap()
        .dyn_into::<CanvasRenderingContext2d>()
        .unwrap();
    CanvasSurface::new(canvas, ctx)
}

#[wasm_bindgen_test]
fn canvas_surface_resizes_backing_store() {
    let mut surface = surface("resize-canvas");
    surface.resize(300, 150).unwrap();
    surface.set_scale(2.0);
    assert_eq!(surface.size(), (300, 150));
    assert_eq!(surface.backend_type(), BackendType::Canvas2D);

    surface.clear();
    surface.fill_circle(10.0, 10.0, 5.0, &Paint::color("red"));
    surface.stroke_polyline(&[], &Paint::color("red"), 1.0);
    assert!(surface.draw_self(0.0, 0.0).is_ok());
}

#[wasm_bindgen_test]
fn missing_canvas_is_an_error() {
    assert!(AnimatedGridElement::new("no-such-canvas", None).is_err());
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    canvas("bad-config");
    let config = Some(r#"{"intensity": -1}"#.to_string());
    assert!(AnimatedGridElement::new("bad-config", config).is_err());
}

#[wasm_bindgen_test]
fn mount_and_unmount_leave_nothing_running() {
    canvas("mount-canvas");
    let mut grid = AnimatedGridElement::new("mount-canvas", None).unwrap();
    grid.add_builtin_plugin("bloom").unwrap();
    grid.apply_theme("tech").unwrap();

    let outcome = grid.mount().unwrap();
    assert!(["animating", "static", "placeholder"].contains(&outcome.as_str()));
    assert_eq!(grid.is_running(), outcome == "animating");

    grid.unmount();
    grid.unmount();
    assert!(!grid.is_running());
    assert!(grid.stats().is_none());
}

#[wasm_bindgen_test]
fn theme_helpers() {
    let json = grid_app::theme_config("neon").unwrap();
    assert!(json.contains("gridColor"));
    assert!(grid_app::theme_config("sepia").is_err());
    assert_eq!(grid_app::theme_names().len(), 4);
}

#[wasm_bindgen_test]
fn js_plugin_needs_a_canvas_surface() {
    let plugin = JsValue::from(js_sys::Object::new());
    let on_draw = js_sys::Function::new_no_args("");
    js_sys::Reflect::set(&plugin, &"onDraw".into(), &on_draw).unwrap();
    let plugin = JsPlugin::from_object(&plugin).unwrap();

    let mut recording = RecordingSurface::new();
    let mut ctx = FrameContext {
        surface: &mut recording,
        width: 100.0,
        height: 100.0,
        pointer: PointerState::default(),
        particles: &[],
        frame: 0,
    };
    assert!(matches!(
        plugin.on_draw(&mut ctx),
        Err(PluginError::UnsupportedSurface(_))
    ));

    let mut canvas_surface = surface("plugin-canvas");
    let mut ctx = FrameContext {
        surface: &mut canvas_surface,
        width: 100.0,
        height: 100.0,
        pointer: PointerState::new(5.0, 5.0),
        particles: &[],
        frame: 3,
    };
    assert!(plugin.on_draw(&mut ctx).is_ok());
}

#[wasm_bindgen_test]
fn throwing_js_plugin_reports_failure() {
    let throws = js_sys::Function::new_no_args("throw new Error('boom')");
    let plugin = JsPlugin::from_function("thrower", throws);
    let mut canvas_surface = surface("throw-canvas");
    let mut ctx = FrameContext {
        surface: &mut canvas_surface,
        width: 100.0,
        height: 100.0,
        pointer: PointerState::default(),
        particles: &[],
        frame: 0,
    };
    match plugin.on_draw(&mut ctx) {
        Err(PluginError::Failed(message)) => assert!(message.contains("boom")),
        other => panic!("unexpected {other:?}"),
    }
}

#[wasm_bindgen_test]
fn non_object_plugin_rejected() {
    assert!(JsPlugin::from_object(&JsValue::from_f64(1.0)).is_err());
}

#[wasm_bindgen_test]
fn browser_scheduler_tracks_outstanding_requests() {
    let window = web_sys::window().unwrap();
    let mut scheduler = BrowserScheduler::new(window, |_| {}, || {});
    let frame = scheduler.request_frame().unwrap();
    scheduler.cancel_frame(frame);
    assert!(scheduler.take_fired_frame().is_none());

    let timer = scheduler.set_timer(50).unwrap();
    assert_eq!(scheduler.take_fired_timer(), Some(timer));
    scheduler.clear_timer(timer);
}
