//! Frame-rate monitoring and adaptive quality.
//!
//! The monitor counts frames over measurement windows of at least one second.
//! At the end of each window it derives the frame rate and, when adaptive
//! quality is on, nudges the quality factor:
//!
//! ```text
//! fps < 0.80 × target  →  quality -= 0.10
//! fps > 0.95 × target  →  quality += 0.05
//! quality ∈ [0.5, 1.0]
//! ```
//!
//! Below half the target frame rate every other frame is skipped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GridConfig;

/// Lowest quality factor the governor will use.
pub const MIN_QUALITY: f64 = 0.5;

/// Highest quality factor.
pub const MAX_QUALITY: f64 = 1.0;

/// Quality lost per window when the frame rate undershoots.
pub const QUALITY_STEP_DOWN: f64 = 0.1;

/// Quality regained per window when the frame rate is on target.
pub const QUALITY_STEP_UP: f64 = 0.05;

/// Minimum duration of a measurement window, in milliseconds.
pub const MEASUREMENT_WINDOW_MS: f64 = 1000.0;

/// Renderer name fragments that identify a software rasterizer.
const SOFTWARE_RENDERERS: [&str; 3] = ["swiftshader", "llvmpipe", "software"];

/// Whether a WebGL renderer string names a software rasterizer.
///
/// Matching is case-insensitive.
#[must_use]
pub fn is_software_renderer(renderer: &str) -> bool {
    let renderer = renderer.to_ascii_lowercase();
    SOFTWARE_RENDERERS.iter().any(|name| renderer.contains(name))
}

/// Snapshot of the governor's state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    /// Frames counted in the current window.
    pub frame_count: u32,
    /// Start of the current window, in milliseconds.
    pub last_timestamp: f64,
    /// Frame rate measured at the end of the previous window.
    pub fps: u32,
    /// Resolution scale in [0.5, 1.0].
    pub quality_factor: f64,
    /// The host reported a software renderer.
    pub is_low_power_device: bool,
}

/// Result of [`PerformanceMonitor::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Latest measured frame rate.
    pub fps: u32,
    /// Current quality factor.
    pub quality_factor: f64,
    /// Skip drawing this frame.
    pub should_skip_frame: bool,
    /// Frame rate measured by this call, if it closed a window.
    pub measured_fps: Option<u32>,
    /// The quality factor changed during this call.
    pub quality_changed: bool,
}

type FpsListener = Box<dyn FnMut(u32)>;

/// Tracks frame timing and governs the quality factor.
pub struct PerformanceMonitor {
    sample: PerformanceSample,
    target_fps: u32,
    adaptive: bool,
    frames_seen: u64,
    listener: Option<FpsListener>,
}

impl fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("sample", &self.sample)
            .field("target_fps", &self.target_fps)
            .field("adaptive", &self.adaptive)
            .field("frames_seen", &self.frames_seen)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl PerformanceMonitor {
    /// Create a monitor whose first window starts at `now`.
    #[must_use]
    pub fn new(target_fps: u32, adaptive: bool, now: f64) -> Self {
        Self {
            sample: PerformanceSample {
                frame_count: 0,
                last_timestamp: now,
                fps: target_fps.min(60),
                quality_factor: MAX_QUALITY,
                is_low_power_device: false,
            },
            target_fps,
            adaptive,
            frames_seen: 0,
            listener: None,
        }
    }

    /// Create a monitor for a configuration; a zero target becomes 60 FPS.
    #[must_use]
    pub fn for_config(config: &GridConfig, now: f64) -> Self {
        Self::new(config.effective_target_fps(), config.adaptive_quality, now)
    }

    /// Adopt the target and adaptive flag of `config`, keeping the listener.
    ///
    /// Quality goes back to full resolution.
    pub fn reconfigure(&mut self, config: &GridConfig) {
        self.target_fps = config.effective_target_fps();
        self.adaptive = config.adaptive_quality;
        self.sample.quality_factor = MAX_QUALITY;
        self.sample.fps = self.target_fps.min(60);
    }

    /// Register the callback fired once per measurement window.
    #[must_use]
    pub fn with_listener(mut self, listener: impl FnMut(u32) + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Replace the measurement callback.
    pub fn set_listener(&mut self, listener: Option<Box<dyn FnMut(u32)>>) {
        self.listener = listener;
    }

    /// Record whether the host runs on a software renderer.
    ///
    /// With adaptive quality on, a low-power device starts at the quality
    /// floor and has to earn resolution back.
    pub fn set_low_power(&mut self, low_power: bool) {
        self.sample.is_low_power_device = low_power;
        if low_power && self.adaptive {
            self.sample.quality_factor = MIN_QUALITY;
        }
    }

    /// Start a fresh window at `now`, e.g. after the loop was suspended.
    pub fn rebase(&mut self, now: f64) {
        self.sample.frame_count = 0;
        self.sample.last_timestamp = now;
    }

    /// Account for one frame at time `now` (milliseconds).
    pub fn update(&mut self, now: f64) -> FrameTiming {
        self.frames_seen += 1;
        self.sample.frame_count = self.sample.frame_count.saturating_add(1);

        let mut measured_fps = None;
        let mut quality_changed = false;

        let elapsed = now - self.sample.last_timestamp;
        if !elapsed.is_finite() || elapsed < 0.0 {
            // Clock went backwards: treat as zero elapsed and restart the window.
            tracing::debug!("Frame clock went backwards by {:.1}ms", -elapsed);
            self.rebase(now);
        } else if elapsed >= MEASUREMENT_WINDOW_MS {
            let fps = Self::compute_fps(self.sample.frame_count, elapsed);
            self.sample.fps = fps;
            self.sample.frame_count = 0;
            self.sample.last_timestamp = now;

            if self.adaptive {
                let before = self.sample.quality_factor;
                self.sample.quality_factor = Self::adjust_quality(before, fps, self.target_fps);
                quality_changed = (self.sample.quality_factor - before).abs() > f64::EPSILON;
                if quality_changed {
                    tracing::debug!(
                        "Quality {:.2} -> {:.2} at {fps} FPS (target {})",
                        before,
                        self.sample.quality_factor,
                        self.target_fps
                    );
                }
            }

            if let Some(listener) = self.listener.as_mut() {
                listener(fps);
            }
            measured_fps = Some(fps);
        }

        FrameTiming {
            fps: self.sample.fps,
            quality_factor: self.sample.quality_factor,
            should_skip_frame: self.should_skip(),
            measured_fps,
            quality_changed,
        }
    }

    /// Apply one step of the quality rule.
    #[must_use]
    pub fn adjust_quality(quality: f64, fps: u32, target_fps: u32) -> f64 {
        let fps = f64::from(fps);
        let target = f64::from(target_fps);
        let next = if fps < target * 0.8 {
            quality - QUALITY_STEP_DOWN
        } else if fps > target * 0.95 {
            quality + QUALITY_STEP_UP
        } else {
            quality
        };
        next.clamp(MIN_QUALITY, MAX_QUALITY)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn compute_fps(frames: u32, elapsed_ms: f64) -> u32 {
        if elapsed_ms <= 0.0 {
            return 0;
        }
        (f64::from(frames) * 1000.0 / elapsed_ms).round() as u32
    }

    fn should_skip(&self) -> bool {
        self.adaptive
            && f64::from(self.sample.fps) < f64::from(self.target_fps) * 0.5
            && self.frames_seen % 2 == 0
    }

    /// Current quality factor.
    #[must_use]
    pub fn quality(&self) -> f64 {
        self.sample.quality_factor
    }

    /// Latest measured frame rate.
    #[must_use]
    pub fn fps(&self) -> u32 {
        self.sample.fps
    }

    /// Full state snapshot.
    #[must_use]
    pub fn sample(&self) -> PerformanceSample {
        self.sample
    }

    /// Whether adaptive quality is on.
    #[must_use]
    pub fn is_adaptive(&self) -> bool {
        self.adaptive
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_software_renderer_detection() {
        assert!(is_software_renderer("Google SwiftShader"));
        assert!(is_software_renderer("llvmpipe (LLVM 15.0.7, 256 bits)"));
        assert!(is_software_renderer("Microsoft Basic Render Driver (Software)"));
        assert!(!is_software_renderer("ANGLE (Apple, Apple M2, OpenGL 4.1)"));
        assert!(!is_software_renderer(""));
    }

    /// Feed `frames` evenly spaced frames spanning `window_ms`.
    fn run_window(monitor: &mut PerformanceMonitor, start: f64, frames: u32, window_ms: f64) -> FrameTiming {
        let mut last = None;
        for i in 1..=frames {
            last = Some(monitor.update(start + window_ms * f64::from(i) / f64::from(frames)));
        }
        last.expect("at least one frame")
    }

    #[test]
    fn test_measures_fps_once_per_window() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let mut monitor =
            PerformanceMonitor::new(60, true, 0.0).with_listener(move |fps| sink.borrow_mut().push(fps));

        let timing = run_window(&mut monitor, 0.0, 60, 1000.0);
        assert_eq!(timing.measured_fps, Some(60));
        assert_eq!(*calls.borrow(), vec![60]);

        monitor.update(1010.0);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_low_fps_steps_quality_down() {
        let mut monitor = PerformanceMonitor::new(60, true, 0.0);
        let timing = run_window(&mut monitor, 0.0, 40, 1000.0);
        assert_eq!(timing.fps, 40);
        assert!((timing.quality_factor - 0.9).abs() < 1e-9);
        assert!(timing.quality_changed);
    }

    #[test]
    fn test_quality_floor() {
        let mut monitor = PerformanceMonitor::new(60, true, 0.0);
        let mut start = 0.0;
        for _ in 0..10 {
            run_window(&mut monitor, start, 10, 1000.0);
            start += 1000.0;
        }
        assert!((monitor.quality() - MIN_QUALITY).abs() < 1e-9);
    }

    #[test]
    fn test_on_target_recovers_by_small_step() {
        let mut monitor = PerformanceMonitor::new(60, true, 0.0);
        run_window(&mut monitor, 0.0, 30, 1000.0);
        let before = monitor.quality();
        run_window(&mut monitor, 1000.0, 60, 1000.0);
        assert!((monitor.quality() - (before + QUALITY_STEP_UP)).abs() < 1e-9);
    }

    #[test]
    fn test_middle_band_holds() {
        assert!((PerformanceMonitor::adjust_quality(0.7, 55, 60) - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_adaptive_keeps_quality() {
        let mut monitor = PerformanceMonitor::new(60, false, 0.0);
        let timing = run_window(&mut monitor, 0.0, 10, 1000.0);
        assert_eq!(timing.fps, 10);
        assert!((timing.quality_factor - 1.0).abs() < f64::EPSILON);
        assert!(!timing.should_skip_frame);
    }

    #[test]
    fn test_skips_alternate_frames_when_slow() {
        let mut monitor = PerformanceMonitor::new(60, true, 0.0);
        run_window(&mut monitor, 0.0, 20, 1000.0);
        let skips: Vec<bool> = (0..4)
            .map(|i| monitor.update(1001.0 + f64::from(i)).should_skip_frame)
            .collect();
        assert_eq!(skips.iter().filter(|s| **s).count(), 2);
        assert_ne!(skips[0], skips[1]);
    }

    #[test]
    fn test_backwards_clock_is_tolerated() {
        let mut monitor = PerformanceMonitor::new(60, true, 5000.0);
        let timing = monitor.update(100.0);
        assert!(timing.measured_fps.is_none());
        assert_eq!(monitor.sample().last_timestamp, 100.0);
        assert_eq!(monitor.sample().frame_count, 0);
    }

    #[test]
    fn test_zero_target_from_config_means_sixty() {
        let config = GridConfig {
            target_fps: 0,
            ..GridConfig::default()
        };
        let mut monitor = PerformanceMonitor::for_config(&config, 0.0);
        let timing = run_window(&mut monitor, 0.0, 40, 1000.0);
        assert!((timing.quality_factor - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_reconfigure_keeps_listener() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let mut monitor =
            PerformanceMonitor::new(30, true, 0.0).with_listener(move |fps| sink.borrow_mut().push(fps));
        monitor.reconfigure(&GridConfig {
            adaptive_quality: false,
            ..GridConfig::default()
        });
        assert!(!monitor.is_adaptive());
        let timing = run_window(&mut monitor, 0.0, 10, 1000.0);
        assert!((timing.quality_factor - 1.0).abs() < f64::EPSILON);
        assert_eq!(*calls.borrow(), vec![10]);
    }

    #[test]
    fn test_low_power_starts_at_floor() {
        let mut monitor = PerformanceMonitor::new(60, true, 0.0);
        monitor.set_low_power(true);
        assert!((monitor.quality() - MIN_QUALITY).abs() < f64::EPSILON);
        assert!(monitor.sample().is_low_power_device);
    }
}
