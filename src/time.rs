//! Frame timing.
//!
//! [`Time`] tracks elapsed time, per-frame delta, a running frame count and
//! FPS. It is advanced from an explicit [`Instant`] so headless renders and
//! tests can drive it with a synthetic clock; [`Time::update`] is the
//! real-time shortcut.
//!
//! # Example
//!
//! ```ignore
//! let mut time = Time::new();
//!
//! // In your frame loop:
//! time.update();
//! println!("Elapsed: {:.2}s, FPS: {:.1}", time.elapsed(), time.fps());
//! ```

use std::time::{Duration, Instant};

/// Time tracking for the frame loop.
#[derive(Debug, Clone)]
pub struct Time {
    /// When the timer was created.
    start: Instant,
    /// When the last frame occurred.
    last_frame: Instant,
    /// Total elapsed time in seconds.
    elapsed_secs: f32,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start. Unaffected by resizes.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    /// Fixed delta time for deterministic stepping (optional).
    fixed_delta: Option<f32>,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a time tracker whose clock starts at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last_frame: start,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: start,
            fps_update_interval: Duration::from_millis(500),
            fixed_delta: None,
        }
    }

    /// Advance to the current wall-clock time.
    pub fn update(&mut self) -> (f32, f32) {
        self.advance(Instant::now())
    }

    /// Advance to `now`. Returns `(elapsed_time, delta_time)`.
    ///
    /// With a fixed delta set, elapsed time accumulates in fixed steps and
    /// the wall clock only feeds the FPS counter.
    pub fn advance(&mut self, now: Instant) -> (f32, f32) {
        let raw_delta = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        match self.fixed_delta {
            Some(step) => {
                self.delta_secs = step;
                self.elapsed_secs += step;
            }
            None => {
                self.delta_secs = raw_delta;
                self.elapsed_secs = now.saturating_duration_since(self.start).as_secs_f32();
            }
        }

        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Total elapsed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Set a fixed delta time for deterministic stepping.
    ///
    /// Pass `None` to use real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
    }

    #[test]
    fn test_advance_uses_given_instant() {
        let t0 = Instant::now();
        let mut time = Time::starting_at(t0);

        let (elapsed, delta) = time.advance(t0 + Duration::from_millis(250));
        assert!((elapsed - 0.25).abs() < 1e-6);
        assert!((delta - 0.25).abs() < 1e-6);
        assert_eq!(time.frame(), 1);

        let (elapsed, delta) = time.advance(t0 + Duration::from_millis(300));
        assert!((elapsed - 0.3).abs() < 1e-6);
        assert!((delta - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_fixed_delta() {
        let t0 = Instant::now();
        let mut time = Time::starting_at(t0);
        time.set_fixed_delta(Some(1.0 / 60.0));

        time.advance(t0 + Duration::from_secs(5));
        time.advance(t0 + Duration::from_secs(6));

        // Elapsed follows the fixed steps, not the wall clock
        assert!((time.delta() - 1.0 / 60.0).abs() < 1e-6);
        assert!((time.elapsed() - 2.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_fps_updates_after_interval() {
        let t0 = Instant::now();
        let mut time = Time::starting_at(t0);
        for i in 1..=30 {
            time.advance(t0 + Duration::from_millis(i * 20));
        }
        // 30 frames over 600ms; FPS refreshed at the 500ms mark (25 frames)
        assert!((time.fps() - 50.0).abs() < 0.5);
    }
}
