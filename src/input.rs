//! Pointer tracking for the fluid simulation.
//!
//! The [`PointerTracker`] turns raw pointer-move events into field-space
//! positions and remembers the previous position, so the simulation can
//! stamp a brush stroke along the segment the pointer travelled.
//!
//! Events may arrive any number of times between frames. Each one
//! overwrites the tracked state; nothing is queued.
//!
//! # Activity
//!
//! A pointer that has not moved for more than [`ACTIVITY_TIMEOUT`] is
//! considered idle. The tracker keeps its history untouched in that case so
//! a resumed movement still produces a correct delta; [`PointerTracker::forcing`]
//! simply reports no forcing for the frame.
//!
//! A stroke needs two recorded moves. After the first move there is no
//! previous position yet and the pointer does not force the field.

use std::time::{Duration, Instant};

use glam::Vec2;
use winit::event::WindowEvent;

/// Quiet period after which the pointer stops forcing the field.
pub const ACTIVITY_TIMEOUT: Duration = Duration::from_millis(100);

/// Screen-space rectangle the effect is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    /// A canvas anchored at the window origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }

    /// Convert a screen position (y down) to field space (origin bottom-left).
    pub fn to_field(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x - self.left, self.height - (screen.y - self.top))
    }
}

/// Everything the tracker knows, as of the latest event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSnapshot {
    /// `None` before the first move.
    pub position: Option<Vec2>,
    /// `None` until a second move has been recorded.
    pub previous: Option<Vec2>,
    pub last_move: Option<Instant>,
}

/// Pointer input handed to one simulation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Current position in field pixels.
    pub position: Vec2,
    /// Position at the previous move event.
    pub previous: Vec2,
}

impl PointerSample {
    /// Displacement between the last two move events.
    pub fn velocity(&self) -> Vec2 {
        self.position - self.previous
    }
}

/// Latest pointer position, previous position and move time.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    position: Option<Vec2>,
    previous: Option<Vec2>,
    last_move: Option<Instant>,
    canvas: CanvasRect,
}

impl PointerTracker {
    pub fn new(canvas: CanvasRect) -> Self {
        Self {
            position: None,
            previous: None,
            last_move: None,
            canvas,
        }
    }

    pub fn canvas(&self) -> CanvasRect {
        self.canvas
    }

    /// Update the canvas rectangle, e.g. after a resize.
    pub fn set_canvas(&mut self, canvas: CanvasRect) {
        self.canvas = canvas;
    }

    /// Record a pointer-move event at a screen position.
    pub fn on_move(&mut self, screen: Vec2, now: Instant) {
        self.previous = self.position;
        self.position = Some(self.canvas.to_field(screen));
        self.last_move = Some(now);
    }

    pub fn snapshot(&self) -> PointerSnapshot {
        PointerSnapshot {
            position: self.position,
            previous: self.previous,
            last_move: self.last_move,
        }
    }

    /// Whether the pointer moved within the activity window.
    pub fn is_active(&self, now: Instant) -> bool {
        match self.last_move {
            Some(t) => now.saturating_duration_since(t) <= ACTIVITY_TIMEOUT,
            None => false,
        }
    }

    /// Pointer input for this frame, or `None` when the pointer has gone
    /// quiet or has not yet moved twice.
    pub fn forcing(&self, now: Instant) -> Option<PointerSample> {
        if !self.is_active(now) {
            return None;
        }
        Some(PointerSample {
            position: self.position?,
            previous: self.previous?,
        })
    }

    /// Process a winit window event. Returns `true` if it was a pointer move.
    pub fn handle_event(&mut self, event: &WindowEvent, now: Instant) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.on_move(Vec2::new(position.x as f32, position.y as f32), now);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_axis_is_flipped() {
        let canvas = CanvasRect { left: 10.0, top: 20.0, width: 200.0, height: 100.0 };
        let p = canvas.to_field(Vec2::new(10.0, 20.0));
        // Top-left of the canvas is the top of the field
        assert_eq!(p, Vec2::new(0.0, 100.0));

        let p = canvas.to_field(Vec2::new(60.0, 120.0));
        assert_eq!(p, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_move_shifts_previous() {
        let mut tracker = PointerTracker::new(CanvasRect::from_size(100, 100));
        let t0 = Instant::now();

        tracker.on_move(Vec2::new(10.0, 90.0), t0);
        tracker.on_move(Vec2::new(30.0, 80.0), t0 + Duration::from_millis(5));

        let snap = tracker.snapshot();
        assert_eq!(snap.previous, Some(Vec2::new(10.0, 10.0)));
        assert_eq!(snap.position, Some(Vec2::new(30.0, 20.0)));
        assert_eq!(snap.last_move, Some(t0 + Duration::from_millis(5)));
    }

    #[test]
    fn test_timeout_zeroes_forcing_but_keeps_history() {
        let mut tracker = PointerTracker::new(CanvasRect::from_size(100, 100));
        let t0 = Instant::now();
        tracker.on_move(Vec2::new(10.0, 10.0), t0);
        tracker.on_move(Vec2::new(20.0, 10.0), t0);

        assert!(tracker.forcing(t0 + Duration::from_millis(100)).is_some());
        assert!(tracker.forcing(t0 + Duration::from_millis(101)).is_none());

        // History untouched, so a resumed move has a correct delta
        let snap = tracker.snapshot();
        assert_eq!(snap.position, Some(Vec2::new(20.0, 90.0)));

        tracker.on_move(Vec2::new(25.0, 10.0), t0 + Duration::from_millis(500));
        let sample = tracker.forcing(t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(sample.velocity(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_first_move_has_no_stroke() {
        let mut tracker = PointerTracker::new(CanvasRect::from_size(200, 200));
        let t0 = Instant::now();

        tracker.on_move(Vec2::new(150.0, 50.0), t0);
        assert!(tracker.is_active(t0));
        assert!(tracker.forcing(t0).is_none());
        assert_eq!(tracker.snapshot().previous, None);

        tracker.on_move(Vec2::new(152.0, 50.0), t0);
        let sample = tracker.forcing(t0).unwrap();
        assert_eq!(sample.previous, Vec2::new(150.0, 150.0));
        assert_eq!(sample.velocity(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_never_moved_is_inactive() {
        let tracker = PointerTracker::new(CanvasRect::from_size(10, 10));
        assert!(!tracker.is_active(Instant::now()));
        assert!(tracker.forcing(Instant::now()).is_none());
    }
}
