//! `FrameScheduler` backed by `requestAnimationFrame` and `setTimeout`.

use grid_core::{FrameHandle, FrameScheduler, GridError, GridResult, TimerHandle};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::error::js_message;

/// Browser scheduler with one reusable frame callback and one timer callback.
///
/// The grid keeps at most one frame and one timer outstanding, so the handle
/// of the request that just fired is always the last one issued.
pub struct BrowserScheduler {
    window: Window,
    on_frame: Closure<dyn FnMut(f64)>,
    on_timer: Closure<dyn FnMut()>,
    frame: Option<FrameHandle>,
    timer: Option<TimerHandle>,
}

impl BrowserScheduler {
    /// Create a scheduler that calls `on_frame` with the frame timestamp and
    /// `on_timer` when the timer expires.
    pub fn new(
        window: Window,
        on_frame: impl FnMut(f64) + 'static,
        on_timer: impl FnMut() + 'static,
    ) -> Self {
        Self {
            window,
            on_frame: Closure::wrap(Box::new(on_frame) as Box<dyn FnMut(f64)>),
            on_timer: Closure::wrap(Box::new(on_timer) as Box<dyn FnMut()>),
            frame: None,
            timer: None,
        }
    }

    /// Handle of the frame whose callback is running.
    pub fn take_fired_frame(&mut self) -> Option<FrameHandle> {
        self.frame.take()
    }

    /// Handle of the timer whose callback is running.
    pub fn take_fired_timer(&mut self) -> Option<TimerHandle> {
        self.timer.take()
    }
}

impl FrameScheduler for BrowserScheduler {
    fn request_frame(&mut self) -> GridResult<FrameHandle> {
        let id = self
            .window
            .request_animation_frame(self.on_frame.as_ref().unchecked_ref())
            .map_err(|e| GridError::Scheduler(js_message(&e)))?;
        let handle = FrameHandle(id);
        self.frame = Some(handle);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0) {
            tracing::debug!("cancelAnimationFrame({}) failed: {:?}", handle.0, e);
        }
        if self.frame == Some(handle) {
            self.frame = None;
        }
    }

    fn set_timer(&mut self, delay_ms: u32) -> GridResult<TimerHandle> {
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let id = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                self.on_timer.as_ref().unchecked_ref(),
                delay,
            )
            .map_err(|e| GridError::Scheduler(js_message(&e)))?;
        let handle = TimerHandle(id);
        self.timer = Some(handle);
        Ok(handle)
    }

    fn clear_timer(&mut self, handle: TimerHandle) {
        self.window.clear_timeout_with_handle(handle.0);
        if self.timer == Some(handle) {
            self.timer = None;
        }
    }
}
