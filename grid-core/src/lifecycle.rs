//! Frame-loop state machine and the host scheduling seam.
//!
//! ```text
//! Uninitialized ──► Sizing ──► Running ◄──► Suspended
//!       │            ▲  ▲         │             │
//!       │            │  └─resize──┤             │
//!       ▼            │            ▼             │
//!     Static ──open──┘◄──closed─ gate ◄─────────┘
//! ```
//!
//! Any state can move to `TornDown`.
//!
//! `Static` is a mounted grid showing its fallback image. It keeps watching
//! resizes so it can start the loop once the gate opens.
//!
//! The loop never reschedules itself implicitly: every pending frame and
//! resize timer is an explicit handle owned by [`FrameLoop`], so teardown can
//! cancel both and late callbacks can be recognised and ignored.

use serde::{Deserialize, Serialize};

use crate::{GridError, GridResult};

/// Lifecycle state of an animated grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopState {
    /// Constructed, not yet mounted.
    Uninitialized,
    /// Computing the backing store.
    Sizing,
    /// Drawing every frame.
    Running,
    /// Mounted but hidden; no frames scheduled.
    Suspended,
    /// Mounted behind the static image; no frames scheduled.
    Static,
    /// Unmounted; nothing will run again.
    TornDown,
}

/// Handle to a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub i32);

/// Handle to a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(pub i32);

/// Host facility for display-synchronised frames and one-shot timers.
///
/// Browsers back this with `requestAnimationFrame` and `setTimeout`; tests and
/// headless hosts use [`ManualScheduler`].
pub trait FrameScheduler {
    /// Ask for one frame callback.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot schedule frames.
    fn request_frame(&mut self) -> GridResult<FrameHandle>;

    /// Cancel a requested frame. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Arm a one-shot timer.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot arm timers.
    fn set_timer(&mut self, delay_ms: u32) -> GridResult<TimerHandle>;

    /// Disarm a timer. Unknown handles are ignored.
    fn clear_timer(&mut self, handle: TimerHandle);
}

/// Explicit state machine for the continuous render loop.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    state: LoopState,
    resume_to: LoopState,
    pending_frame: Option<FrameHandle>,
    pending_resize: Option<TimerHandle>,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    /// A loop in [`LoopState::Uninitialized`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LoopState::Uninitialized,
            resume_to: LoopState::Running,
            pending_frame: None,
            pending_resize: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Whether frames are being drawn.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// The frame currently requested from the host, if any.
    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    /// The armed resize timer, if any.
    #[must_use]
    pub fn pending_resize(&self) -> Option<TimerHandle> {
        self.pending_resize
    }

    /// Enter [`LoopState::Sizing`] from any live state.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidTransition`] after teardown or when already sizing.
    pub fn begin_sizing(&mut self) -> GridResult<()> {
        match self.state {
            LoopState::Uninitialized | LoopState::Running | LoopState::Static => {
                self.resume_to = LoopState::Running;
            }
            LoopState::Suspended => self.resume_to = LoopState::Suspended,
            LoopState::Sizing | LoopState::TornDown => {
                return Err(self.invalid(LoopState::Sizing));
            }
        }
        self.state = LoopState::Sizing;
        Ok(())
    }

    /// Leave [`LoopState::Sizing`] and go back to drawing (or stay suspended).
    ///
    /// When entering `Running` a frame is requested unless one is pending.
    ///
    /// # Errors
    ///
    /// Returns an error if not sizing or the host cannot schedule a frame.
    pub fn finish_sizing(&mut self, scheduler: &mut dyn FrameScheduler) -> GridResult<()> {
        if self.state != LoopState::Sizing {
            return Err(self.invalid(self.resume_to));
        }
        self.state = self.resume_to;
        if self.state == LoopState::Running {
            self.ensure_scheduled(scheduler)?;
        }
        Ok(())
    }

    /// Consume a fired frame callback.
    ///
    /// Returns `true` when the frame belongs to this loop and should be drawn;
    /// late or cancelled callbacks return `false`.
    pub fn frame_fired(&mut self, handle: FrameHandle) -> bool {
        if self.pending_frame != Some(handle) {
            return false;
        }
        self.pending_frame = None;
        self.state == LoopState::Running
    }

    /// Request the next frame after one has been drawn.
    ///
    /// A no-op unless running.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot schedule a frame.
    pub fn schedule_next(&mut self, scheduler: &mut dyn FrameScheduler) -> GridResult<()> {
        if self.state == LoopState::Running {
            self.ensure_scheduled(scheduler)?;
        }
        Ok(())
    }

    fn ensure_scheduled(&mut self, scheduler: &mut dyn FrameScheduler) -> GridResult<()> {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(scheduler.request_frame()?);
        }
        Ok(())
    }

    /// Stop drawing while hidden.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidTransition`] unless running.
    pub fn suspend(&mut self, scheduler: &mut dyn FrameScheduler) -> GridResult<()> {
        if self.state != LoopState::Running {
            return Err(self.invalid(LoopState::Suspended));
        }
        if let Some(handle) = self.pending_frame.take() {
            scheduler.cancel_frame(handle);
        }
        self.state = LoopState::Suspended;
        Ok(())
    }

    /// Resume drawing after [`FrameLoop::suspend`].
    ///
    /// # Errors
    ///
    /// Returns an error unless suspended, or if a frame cannot be scheduled.
    pub fn resume(&mut self, scheduler: &mut dyn FrameScheduler) -> GridResult<()> {
        if self.state != LoopState::Suspended {
            return Err(self.invalid(LoopState::Running));
        }
        self.state = LoopState::Running;
        self.ensure_scheduled(scheduler)
    }

    /// Park the loop behind the static image.
    ///
    /// Cancels the pending frame; a pending resize timer stays armed.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidTransition`] while sizing or after teardown.
    pub fn show_static(&mut self, scheduler: &mut dyn FrameScheduler) -> GridResult<()> {
        if matches!(self.state, LoopState::Sizing | LoopState::TornDown) {
            return Err(self.invalid(LoopState::Static));
        }
        if let Some(handle) = self.pending_frame.take() {
            scheduler.cancel_frame(handle);
        }
        self.state = LoopState::Static;
        Ok(())
    }

    /// (Re)arm the resize debounce timer.
    ///
    /// Ignored before mount and after teardown.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot arm the timer.
    pub fn debounce_resize(
        &mut self,
        scheduler: &mut dyn FrameScheduler,
        delay_ms: u32,
    ) -> GridResult<()> {
        if matches!(self.state, LoopState::Uninitialized | LoopState::TornDown) {
            return Ok(());
        }
        if let Some(handle) = self.pending_resize.take() {
            scheduler.clear_timer(handle);
        }
        self.pending_resize = Some(scheduler.set_timer(delay_ms)?);
        Ok(())
    }

    /// Consume a fired resize timer; `true` when the new size should be
    /// handled.
    pub fn resize_fired(&mut self, handle: TimerHandle) -> bool {
        if self.pending_resize != Some(handle) {
            return false;
        }
        self.pending_resize = None;
        matches!(
            self.state,
            LoopState::Running | LoopState::Suspended | LoopState::Static
        )
    }

    /// Cancel everything and enter [`LoopState::TornDown`].
    ///
    /// Idempotent. Returns `true` on the first call only.
    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if let Some(handle) = self.pending_frame.take() {
            scheduler.cancel_frame(handle);
        }
        if let Some(handle) = self.pending_resize.take() {
            scheduler.clear_timer(handle);
        }
        let first = self.state != LoopState::TornDown;
        self.state = LoopState::TornDown;
        first
    }

    fn invalid(&self, to: LoopState) -> GridError {
        GridError::InvalidTransition {
            from: self.state,
            to,
        }
    }
}

/// Headless scheduler driven by hand.
///
/// Frames are queued until the host pops them with
/// [`ManualScheduler::take_frame`]; timers fire when the clock is advanced
/// past their deadline.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    next_id: i32,
    now: f64,
    frames: Vec<FrameHandle>,
    timers: Vec<(TimerHandle, f64)>,
    requested_frames: usize,
    cancelled_frames: usize,
}

impl ManualScheduler {
    /// A scheduler with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Pop the oldest requested frame.
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.frames.remove(0))
        }
    }

    /// Frames requested but not yet taken or cancelled.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Armed timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Total frames ever requested.
    #[must_use]
    pub fn requested_frames(&self) -> usize {
        self.requested_frames
    }

    /// Total frames cancelled.
    #[must_use]
    pub fn cancelled_frames(&self) -> usize {
        self.cancelled_frames
    }

    /// Current clock, in milliseconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move the clock forward and return the timers that came due, in order.
    pub fn advance(&mut self, ms: f64) -> Vec<TimerHandle> {
        self.now += ms;
        let now = self.now;
        let (due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|(_, deadline)| *deadline <= now);
        self.timers = pending;
        due.into_iter().map(|(handle, _)| handle).collect()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> GridResult<FrameHandle> {
        let handle = FrameHandle(self.next_id());
        self.frames.push(handle);
        self.requested_frames += 1;
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.frames.len();
        self.frames.retain(|h| *h != handle);
        self.cancelled_frames += before - self.frames.len();
    }

    fn set_timer(&mut self, delay_ms: u32) -> GridResult<TimerHandle> {
        let handle = TimerHandle(self.next_id());
        self.timers.push((handle, self.now + f64::from(delay_ms)));
        Ok(handle)
    }

    fn clear_timer(&mut self, handle: TimerHandle) {
        self.timers.retain(|(h, _)| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_loop(scheduler: &mut ManualScheduler) -> FrameLoop {
        let mut frame_loop = FrameLoop::new();
        frame_loop.begin_sizing().expect("sizing");
        frame_loop.finish_sizing(scheduler).expect("running");
        frame_loop
    }

    #[test]
    fn test_mount_schedules_first_frame() {
        let mut scheduler = ManualScheduler::new();
        let frame_loop = running_loop(&mut scheduler);
        assert_eq!(frame_loop.state(), LoopState::Running);
        assert_eq!(scheduler.pending_frames(), 1);
    }

    #[test]
    fn test_fire_and_reschedule() {
        let mut scheduler = ManualScheduler::new();
        let mut frame_loop = running_loop(&mut scheduler);
        let handle = scheduler.take_frame().expect("frame");
        assert!(frame_loop.frame_fired(handle));
        assert!(frame_loop.pending_frame().is_none());
        frame_loop.schedule_next(&mut scheduler).expect("schedule");
        assert_eq!(scheduler.pending_frames(), 1);
        // A stale handle is not drawn.
        assert!(!frame_loop.frame_fired(handle));
    }

    #[test]
    fn test_teardown_cancels_and_is_idempotent() {
        let mut scheduler = ManualScheduler::new();
        let mut frame_loop = running_loop(&mut scheduler);
        frame_loop
            .debounce_resize(&mut scheduler, 100)
            .expect("timer");
        let frame = frame_loop.pending_frame().expect("pending");
        let timer = frame_loop.pending_resize().expect("armed");

        assert!(frame_loop.teardown(&mut scheduler));
        assert!(!frame_loop.teardown(&mut scheduler));
        assert_eq!(scheduler.pending_frames(), 0);
        assert_eq!(scheduler.pending_timers(), 0);
        assert!(!frame_loop.frame_fired(frame));
        assert!(!frame_loop.resize_fired(timer));
        frame_loop.schedule_next(&mut scheduler).expect("no-op");
        assert_eq!(scheduler.pending_frames(), 0);
    }

    #[test]
    fn test_debounce_rearms() {
        let mut scheduler = ManualScheduler::new();
        let mut frame_loop = running_loop(&mut scheduler);
        frame_loop.debounce_resize(&mut scheduler, 100).expect("arm");
        scheduler.advance(60.0);
        frame_loop.debounce_resize(&mut scheduler, 100).expect("re-arm");
        assert_eq!(scheduler.pending_timers(), 1);
        assert!(scheduler.advance(60.0).is_empty());
        let due = scheduler.advance(40.0);
        assert_eq!(due.len(), 1);
        assert!(frame_loop.resize_fired(due[0]));
    }

    #[test]
    fn test_suspend_resume() {
        let mut scheduler = ManualScheduler::new();
        let mut frame_loop = running_loop(&mut scheduler);
        frame_loop.suspend(&mut scheduler).expect("suspend");
        assert_eq!(scheduler.pending_frames(), 0);
        assert_eq!(scheduler.cancelled_frames(), 1);

        // Resizing while hidden stays hidden.
        frame_loop.begin_sizing().expect("sizing");
        frame_loop.finish_sizing(&mut scheduler).expect("back");
        assert_eq!(frame_loop.state(), LoopState::Suspended);
        assert_eq!(scheduler.pending_frames(), 0);

        frame_loop.resume(&mut scheduler).expect("resume");
        assert!(frame_loop.is_running());
        assert_eq!(scheduler.pending_frames(), 1);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut scheduler = ManualScheduler::new();
        let mut frame_loop = FrameLoop::new();
        assert!(matches!(
            frame_loop.suspend(&mut scheduler),
            Err(GridError::InvalidTransition { .. })
        ));
        frame_loop.teardown(&mut scheduler);
        assert!(frame_loop.begin_sizing().is_err());
    }

    #[test]
    fn test_static_parks_and_restarts() {
        let mut scheduler = ManualScheduler::new();
        let mut frame_loop = running_loop(&mut scheduler);
        frame_loop.show_static(&mut scheduler).expect("static");
        assert_eq!(frame_loop.state(), LoopState::Static);
        assert_eq!(scheduler.pending_frames(), 0);
        assert!(frame_loop.suspend(&mut scheduler).is_err());

        frame_loop.debounce_resize(&mut scheduler, 100).expect("arm");
        let due = scheduler.advance(100.0);
        assert!(frame_loop.resize_fired(due[0]));

        frame_loop.begin_sizing().expect("sizing");
        frame_loop.finish_sizing(&mut scheduler).expect("running");
        assert!(frame_loop.is_running());
        assert_eq!(scheduler.pending_frames(), 1);

        frame_loop.teardown(&mut scheduler);
        assert!(frame_loop.show_static(&mut scheduler).is_err());
    }

    #[test]
    fn test_debounce_ignored_before_mount() {
        let mut scheduler = ManualScheduler::new();
        let mut frame_loop = FrameLoop::new();
        frame_loop.debounce_resize(&mut scheduler, 100).expect("noop");
        assert_eq!(scheduler.pending_timers(), 0);
    }
}
