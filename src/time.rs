//! Simulation clock.
//!
//! Simulated time advances by a fixed step per tick, not by wall-clock time,
//! so motion is identical on every machine regardless of frame rate. The
//! wall clock is only used for the FPS estimate shown by the host.
//!
//! # Example
//!
//! ```ignore
//! use glimmer::time::Time;
//!
//! let mut time = Time::new();
//!
//! // Once per display refresh:
//! if let Some(t) = time.advance() {
//!     println!("tick {} at t={:.2}", time.tick(), t);
//! }
//! println!("FPS: {:.1}", time.fps());
//! ```

use std::time::{Duration, Instant};

/// Simulated seconds added per tick at a time scale of 1.
pub const TICK_STEP: f32 = 0.01;

/// Fixed-step simulation time plus frame-rate bookkeeping.
#[derive(Debug, Clone)]
pub struct Time {
    /// Simulated time. Accumulated in f64 so the step stays exact over long
    /// sessions; narrowed to f32 only for shaders and motion rules.
    elapsed: f64,
    /// Ticks advanced since the last reset (paused ticks excluded).
    tick_count: u64,
    /// Multiplier on [`TICK_STEP`].
    time_scale: f32,
    paused: bool,
    /// Frames observed by [`Time::advance`], paused or not.
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Time {
    /// A clock at `t = 0`.
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            tick_count: 0,
            time_scale: 1.0,
            paused: false,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: Instant::now(),
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Advance one tick. Call once per frame.
    ///
    /// Returns the new simulated time, or `None` while paused.
    pub fn advance(&mut self) -> Option<f32> {
        self.frame_count += 1;
        self.update_fps();

        if self.paused {
            return None;
        }

        self.elapsed += f64::from(TICK_STEP) * f64::from(self.time_scale);
        self.tick_count += 1;
        Some(self.elapsed as f32)
    }

    fn update_fps(&mut self) {
        let now = Instant::now();
        let since = now.duration_since(self.fps_update_time);
        if since >= self.fps_update_interval {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / since.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    /// Simulated time in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    /// Simulated time at full precision.
    #[inline]
    pub fn elapsed_f64(&self) -> f64 {
        self.elapsed
    }

    /// Ticks advanced so far.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set the time scale; negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Back to `t = 0`, keeping pause state and time scale.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.tick_count = 0;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
