//! Frame scheduler: the per-refresh driver.
//!
//! Owns every piece of mutable effect state: the backend (field pair and
//! output), the pointer tracker, the frame counter, the clock and any
//! pending resize. One [`FrameScheduler::tick`] per display refresh runs:
//!
//! 1. apply a pending resize (resets to [`Phase::Bootstrapping`])
//! 2. advance time and decide pointer forcing
//! 3. simulate front -> back
//! 4. composite back -> output
//! 5. swap roles, bump the frame counter
//!
//! A backend failure is logged and disables the effect. Later ticks are
//! no-ops; nothing is propagated to the caller.

use std::time::Instant;

use crate::backend::{FluidBackend, FrameInputs};
use crate::input::{CanvasRect, PointerTracker};
use crate::time::Time;

/// Where the simulation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Next pass writes the analytic initial state.
    Bootstrapping,
    /// Next pass advances the existing field.
    Steady,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Both passes ran.
    Rendered,
    /// Viewport has no area; nothing ran.
    Skipped,
    /// The effect was disabled by an earlier failure.
    Disabled,
}

pub struct FrameScheduler<B: FluidBackend> {
    backend: B,
    pointer: PointerTracker,
    time: Time,
    frame: u64,
    pending_resize: Option<(u32, u32)>,
    disabled: bool,
}

impl<B: FluidBackend> FrameScheduler<B> {
    pub fn new(backend: B) -> Self {
        Self::with_time(backend, Time::new())
    }

    /// Create a scheduler driven by the given clock.
    pub fn with_time(backend: B, time: Time) -> Self {
        let (width, height) = backend.size();
        Self {
            backend,
            pointer: PointerTracker::new(CanvasRect::from_size(width, height)),
            time,
            frame: 0,
            pending_resize: None,
            disabled: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut PointerTracker {
        &mut self.pointer
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut Time {
        &mut self.time
    }

    /// Frames since the last reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn phase(&self) -> Phase {
        if self.frame == 0 {
            Phase::Bootstrapping
        } else {
            Phase::Steady
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Record a new viewport size. Applied at the start of the next tick;
    /// later requests before that tick replace earlier ones.
    ///
    /// The pointer canvas follows immediately, so moves reported in the new
    /// window coordinates map correctly before the field is reallocated.
    pub fn request_resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width, height));
        if width > 0 && height > 0 {
            self.set_canvas_size(width, height);
        }
    }

    fn set_canvas_size(&mut self, width: u32, height: u32) {
        let canvas = CanvasRect { width: width as f32, height: height as f32, ..self.pointer.canvas() };
        self.pointer.set_canvas(canvas);
    }

    /// Run one frame against the wall clock.
    pub fn tick(&mut self) -> FrameStatus {
        self.tick_at(Instant::now())
    }

    /// Run one frame as if the current time were `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameStatus {
        if self.disabled {
            return FrameStatus::Disabled;
        }

        if let Some((width, height)) = self.pending_resize {
            if width == 0 || height == 0 {
                return FrameStatus::Skipped;
            }
            self.pending_resize = None;
            if let Err(e) = self.backend.resize(width, height) {
                return self.disable("resize", e);
            }
            self.set_canvas_size(width, height);
            self.frame = 0;
            log::info!("Fluid field resized to {}x{}", width, height);
        }

        let (width, height) = self.backend.size();
        if width == 0 || height == 0 {
            return FrameStatus::Skipped;
        }

        let (elapsed, _) = self.time.advance(now);
        let inputs = FrameInputs {
            frame: self.frame,
            time: elapsed,
            pointer: self.pointer.forcing(now),
        };

        if self.frame == 0 {
            log::debug!("Bootstrapping fluid field");
        }

        if let Err(e) = self.backend.simulate(&inputs) {
            return self.disable("simulation", e);
        }
        if let Err(e) = self.backend.composite(&inputs) {
            return self.disable("compositing", e);
        }
        self.backend.swap();
        self.frame += 1;

        if self.frame == 1 {
            log::debug!("Fluid field entered steady state");
        }

        FrameStatus::Rendered
    }

    fn disable(&mut self, stage: &str, error: impl std::fmt::Display) -> FrameStatus {
        log::warn!("Fluid effect disabled after {} failure: {}", stage, error);
        self.disabled = true;
        FrameStatus::Disabled
    }
}
