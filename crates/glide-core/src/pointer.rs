#![forbid(unsafe_code)]

//! Raw pointer input and velocity estimation.
//!
//! Hosts that receive plain pointer coordinates (rather than pre-computed
//! gesture state) push [`PointerEvent`]s through a [`VelocityTracker`],
//! which turns them into [`GestureSample`]s relative to the gesture origin.
//!
//! # Velocity
//!
//! Velocity is the displacement across a trailing window (default 100 ms)
//! divided by the window's time span, in logical px per millisecond. A
//! window with less than 1 ms of history reports zero velocity.
//!
//! # Failure Modes
//!
//! - Moves before a `Down`: ignored (returns `None`).
//! - Non-finite coordinates: ignored.
//! - Timestamps going backwards: treated as zero elapsed time.

use std::collections::VecDeque;
use std::time::Duration;

use crate::gesture::GestureSample;
use crate::geometry::Point;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// Pointer pressed on the surface.
    Down,
    /// Pointer moved while pressed.
    Move,
    /// Pointer lifted.
    Up,
    /// The platform took the pointer away (scroll parent, system gesture).
    Cancel,
}

/// A single pointer event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Event phase.
    pub phase: PointerPhase,
    /// Position in logical pixels.
    pub position: Point,
    /// Monotonic timestamp since an arbitrary epoch.
    pub timestamp: Duration,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(phase: PointerPhase, position: Point, timestamp: Duration) -> Self {
        Self {
            phase,
            position,
            timestamp,
        }
    }

    /// Pointer-down at `(x, y)`, `ms` milliseconds after the epoch.
    #[must_use]
    pub fn down(x: f32, y: f32, ms: u64) -> Self {
        Self::new(PointerPhase::Down, Point::new(x, y), Duration::from_millis(ms))
    }

    /// Pointer-move at `(x, y)`.
    #[must_use]
    pub fn moved(x: f32, y: f32, ms: u64) -> Self {
        Self::new(PointerPhase::Move, Point::new(x, y), Duration::from_millis(ms))
    }

    /// Pointer-up at `(x, y)`.
    #[must_use]
    pub fn up(x: f32, y: f32, ms: u64) -> Self {
        Self::new(PointerPhase::Up, Point::new(x, y), Duration::from_millis(ms))
    }

    /// Pointer cancelled by the platform.
    #[must_use]
    pub fn cancel(ms: u64) -> Self {
        Self::new(
            PointerPhase::Cancel,
            Point::default(),
            Duration::from_millis(ms),
        )
    }
}

/// Trailing history window used for velocity estimation.
const DEFAULT_WINDOW: Duration = Duration::from_millis(100);

/// Converts raw pointer events into gesture samples.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    window: Duration,
    origin: Option<Point>,
    history: VecDeque<(Duration, Point)>,
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityTracker {
    /// Create a tracker with the default 100 ms window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Create a tracker with a custom velocity window.
    #[must_use]
    pub fn with_window(window: Duration) -> Self {
        Self {
            window: window.max(Duration::from_millis(1)),
            origin: None,
            history: VecDeque::with_capacity(16),
        }
    }

    /// Whether a pointer is currently down.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.origin.is_some()
    }

    /// Start a new gesture at `position`.
    pub fn begin(&mut self, position: Point, timestamp: Duration) {
        self.origin = Some(position);
        self.history.clear();
        self.history.push_back((timestamp, position));
    }

    /// Record a position and return the sample relative to the origin.
    ///
    /// Returns `None` when no gesture is active or the position is not finite.
    pub fn record(&mut self, position: Point, timestamp: Duration) -> Option<GestureSample> {
        let origin = self.origin?;
        if !position.is_finite() {
            return None;
        }
        let timestamp = match self.history.back() {
            Some(&(last, _)) if timestamp < last => last,
            _ => timestamp,
        };
        self.history.push_back((timestamp, position));
        while let Some(&(t, _)) = self.history.front() {
            if timestamp.saturating_sub(t) > self.window && self.history.len() > 2 {
                self.history.pop_front();
            } else {
                break;
            }
        }
        let (dx, dy) = position.delta_from(origin);
        let (vx, vy) = self.velocity();
        Some(GestureSample::new(dx, dy, vx, vy))
    }

    /// End the gesture. Returns the final sample for an `Up` at `position`.
    pub fn finish(&mut self, position: Point, timestamp: Duration) -> Option<GestureSample> {
        let sample = self.record(position, timestamp);
        self.origin = None;
        self.history.clear();
        sample
    }

    /// Abandon the gesture without producing a sample.
    pub fn cancel(&mut self) {
        self.origin = None;
        self.history.clear();
    }

    /// Current velocity estimate in px/ms.
    #[must_use]
    pub fn velocity(&self) -> (f32, f32) {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.history.front(), self.history.back())
        else {
            return (0.0, 0.0);
        };
        let span_ms = t1.saturating_sub(t0).as_secs_f32() * 1000.0;
        if span_ms < 1.0 {
            return (0.0, 0.0);
        }
        let (dx, dy) = p1.delta_from(p0);
        (dx / span_ms, dy / span_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn record_without_begin_is_ignored() {
        let mut tracker = VelocityTracker::new();
        assert!(tracker.record(Point::new(0.0, 10.0), ms(0)).is_none());
    }

    #[test]
    fn displacement_is_relative_to_origin() {
        let mut tracker = VelocityTracker::new();
        tracker.begin(Point::new(100.0, 200.0), ms(0));
        let sample = tracker.record(Point::new(104.0, 260.0), ms(16)).unwrap();
        assert_eq!(sample.dx, 4.0);
        assert_eq!(sample.dy, 60.0);
    }

    #[test]
    fn steady_drag_velocity() {
        let mut tracker = VelocityTracker::new();
        tracker.begin(Point::new(0.0, 0.0), ms(0));
        let mut last = None;
        for i in 1..=10u64 {
            last = tracker.record(Point::new(0.0, i as f32 * 8.0), ms(i * 16));
        }
        let sample = last.unwrap();
        // 8 px per 16 ms
        assert!((sample.vy - 0.5).abs() < 0.01, "vy = {}", sample.vy);
        assert!(sample.vx.abs() < f32::EPSILON);
    }

    #[test]
    fn window_forgets_old_motion() {
        let mut tracker = VelocityTracker::new();
        tracker.begin(Point::new(0.0, 0.0), ms(0));
        tracker.record(Point::new(0.0, 300.0), ms(50));
        // Pointer rests for a while
        for t in (60..=400).step_by(20) {
            tracker.record(Point::new(0.0, 300.0), ms(t));
        }
        let (_, vy) = tracker.velocity();
        assert!(vy.abs() < 0.01, "stale motion leaked into velocity: {vy}");
    }

    #[test]
    fn backwards_timestamps_do_not_panic() {
        let mut tracker = VelocityTracker::new();
        tracker.begin(Point::new(0.0, 0.0), ms(100));
        let sample = tracker.record(Point::new(0.0, 20.0), ms(50)).unwrap();
        assert!(sample.vy.is_finite());
    }

    #[test]
    fn finish_ends_tracking() {
        let mut tracker = VelocityTracker::new();
        tracker.begin(Point::new(0.0, 0.0), ms(0));
        assert!(tracker.is_tracking());
        let sample = tracker.finish(Point::new(0.0, 40.0), ms(32));
        assert!(sample.is_some());
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn non_finite_position_dropped() {
        let mut tracker = VelocityTracker::new();
        tracker.begin(Point::new(0.0, 0.0), ms(0));
        assert!(tracker.record(Point::new(f32::NAN, 0.0), ms(16)).is_none());
    }
}
