#![forbid(unsafe_code)]

//! Time-driven interpolation primitives.
//!
//! Every overlay channel moves under one of these. An animation reports a
//! normalized progress (0.0 when started, 1.0 at rest); the channel that owns
//! it maps that onto its own `from..to` span. Nothing here reads a clock:
//! progress only changes in [`Animation::tick`], so tests replay exact frame
//! sequences.
//!
//! - [`Tween`]: fixed duration, eased.
//! - [`Delayed`]: holds at 0.0, then hands the rest of its ticks to an inner animation.
//! - [`spring::Spring`]: damped oscillator settling at 1.0.

pub mod spring;

use std::time::Duration;

pub use spring::{Spring, SpringSpec};

// ---------------------------------------------------------------------------
// Easing
// ---------------------------------------------------------------------------

/// Maps linear time in [0, 1] to eased progress in [0, 1]. Inputs outside
/// the unit interval are clamped first.
pub type EasingFn = fn(f32) -> f32;

/// No easing.
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic acceleration. Used for exits: the overlay leaves slowly, then fast.
pub fn ease_in(t: f32) -> f32 {
    let t = linear(t);
    t * t
}

/// Quadratic deceleration.
pub fn ease_out(t: f32) -> f32 {
    let rest = 1.0 - linear(t);
    1.0 - rest * rest
}

/// Smoothstep.
pub fn ease_in_out(t: f32) -> f32 {
    let t = linear(t);
    t * t * (3.0 - 2.0 * t)
}

/// Cubic deceleration. Used for entries: the background covers most of the
/// screen early, then settles.
pub fn ease_out_cubic(t: f32) -> f32 {
    let rest = 1.0 - linear(t);
    1.0 - rest * rest * rest
}

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// Something that advances toward rest when ticked.
///
/// [`Tween`] and [`Delayed`] stay within [0.0, 1.0]. A [`Spring`] may pass
/// 1.0 on the way to rest; channels clamp the mapped value.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation is at rest.
    fn is_complete(&self) -> bool;

    /// Normalized progress.
    fn value(&self) -> f32;

    /// Rewind to the starting state.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// Tween
// ---------------------------------------------------------------------------

/// Eased progression over a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    duration: Duration,
    elapsed: Duration,
    easing: EasingFn,
}

impl Tween {
    /// Linear tween lasting `duration`. A zero duration completes on the first tick.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: duration.max(Duration::from_nanos(1)),
            elapsed: Duration::ZERO,
            easing: linear,
        }
    }

    /// Use `easing` for [`Animation::value`].
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Share of the duration that has passed, before easing.
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
    }

    /// Time past the end of the tween.
    pub fn excess(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        // Accumulate as Duration: many 16 ms frames must land exactly on the end.
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

// ---------------------------------------------------------------------------
// Delayed
// ---------------------------------------------------------------------------

/// Holds at 0.0 for a wait period, then runs `inner`.
///
/// A tick that crosses the end of the wait passes its remainder to `inner`,
/// so stagger timing does not depend on frame boundaries.
#[derive(Debug, Clone, Copy)]
pub struct Delayed<A> {
    wait: Duration,
    remaining: Duration,
    inner: A,
}

impl<A: Animation> Delayed<A> {
    /// Run `inner` after `wait`.
    pub fn new(wait: Duration, inner: A) -> Self {
        Self {
            wait,
            remaining: wait,
            inner,
        }
    }

    /// Whether the wait is still running.
    pub fn is_waiting(&self) -> bool {
        !self.remaining.is_zero()
    }

    /// The wrapped animation.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: Animation> Animation for Delayed<A> {
    fn tick(&mut self, dt: Duration) {
        if dt <= self.remaining {
            self.remaining -= dt;
            return;
        }
        let carry = dt - self.remaining;
        self.remaining = Duration::ZERO;
        self.inner.tick(carry);
    }

    fn is_complete(&self) -> bool {
        !self.is_waiting() && self.inner.is_complete()
    }

    fn value(&self) -> f32 {
        if self.is_waiting() { 0.0 } else { self.inner.value() }
    }

    fn reset(&mut self) {
        self.remaining = self.wait;
        self.inner.reset();
    }
}

/// Shorthand for [`Delayed::new`].
pub fn delay<A: Animation>(wait: Duration, inner: A) -> Delayed<A> {
    Delayed::new(wait, inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn curves_pin_endpoints() {
        for curve in [linear, ease_in, ease_out, ease_in_out, ease_out_cubic] {
            assert_eq!(curve(0.0), 0.0);
            assert_eq!(curve(1.0), 1.0);
            assert_eq!(curve(-3.0), 0.0);
            assert_eq!(curve(7.0), 1.0);
        }
    }

    #[test]
    fn entry_curve_leads_exit_curve() {
        assert!(ease_out_cubic(0.25) > ease_out(0.25));
        assert!(ease_out(0.25) > linear(0.25));
        assert!(ease_in(0.25) < linear(0.25));
        assert_eq!(ease_in_out(0.5), 0.5);
    }

    #[test]
    fn four_hundred_ms_in_frames() {
        let mut tween = Tween::new(ms(400)).easing(ease_out_cubic);
        for _ in 0..24 {
            tween.tick(FRAME);
        }
        assert!(!tween.is_complete());
        assert!(tween.value() > 0.99);
        tween.tick(FRAME);
        assert!(tween.is_complete());
        assert_eq!(tween.value(), 1.0);
        assert_eq!(tween.excess(), Duration::ZERO);
    }

    #[test]
    fn easing_shapes_value_not_progress() {
        let mut tween = Tween::new(ms(200)).easing(ease_in);
        tween.tick(ms(100));
        assert!((tween.progress() - 0.5).abs() < 1e-6);
        assert!((tween.value() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn zero_length_tween() {
        let mut tween = Tween::new(Duration::ZERO);
        assert!(!tween.is_complete());
        tween.tick(FRAME);
        assert!(tween.is_complete());
        assert_eq!(tween.value(), 1.0);
    }

    #[test]
    fn tween_rewinds() {
        let mut tween = Tween::new(ms(50));
        tween.tick(ms(80));
        assert_eq!(tween.excess(), ms(30));
        tween.reset();
        assert_eq!(tween.value(), 0.0);
        assert!(!tween.is_complete());
    }

    #[test]
    fn delayed_waits_then_runs() {
        let mut staggered = delay(ms(120), Tween::new(ms(280)));
        for _ in 0..7 {
            staggered.tick(FRAME);
        }
        assert!(staggered.is_waiting());
        assert_eq!(staggered.value(), 0.0);
        staggered.tick(FRAME);
        assert!(!staggered.is_waiting());
        assert!(staggered.value() > 0.0);
        staggered.tick(ms(280));
        assert!(staggered.is_complete());
    }

    #[test]
    fn crossing_tick_carries_into_inner() {
        let mut staggered = delay(ms(100), Tween::new(ms(200)));
        staggered.tick(ms(150));
        assert!((staggered.inner().progress() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn no_wait_runs_immediately() {
        let mut staggered = delay(Duration::ZERO, Tween::new(ms(100)));
        assert!(!staggered.is_waiting());
        staggered.tick(ms(50));
        assert!((staggered.value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn delayed_rewinds_both_parts() {
        let mut staggered = delay(ms(40), Tween::new(ms(40)));
        staggered.tick(ms(100));
        assert!(staggered.is_complete());
        staggered.reset();
        assert!(staggered.is_waiting());
        assert_eq!(staggered.inner().progress(), 0.0);
    }
}
