#![forbid(unsafe_code)]

//! Damped spring animation.
//!
//! [`Spring`] models progress toward 1.0 as a damped harmonic oscillator and
//! integrates it with semi-implicit Euler in fixed sub-steps, so results do
//! not depend on how the caller slices time into frames.
//!
//! # Invariants
//!
//! 1. `value()` starts at 0.0 and settles at exactly 1.0 once complete.
//! 2. Completion requires both displacement and velocity under their thresholds.
//! 3. Under-damped springs may overshoot 1.0 before settling.
//!
//! # Failure Modes
//!
//! - Non-finite or non-positive stiffness is replaced by the default stiffness.
//! - A zero or non-finite rest threshold is replaced by the default, since a
//!   spring with a zero threshold can never come to rest.
//! - Negative damping ratio is clamped to 0.0 (undamped oscillation, which
//!   never completes; callers should not configure it).

use std::time::Duration;

use super::Animation;

/// Fixed integration step (~240 Hz).
const STEP_SECS: f32 = 1.0 / 240.0;

/// Upper bound on integrated time per tick, so a stalled frame cannot spin.
const MAX_TICK_SECS: f32 = 1.0;

/// Spring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSpec {
    /// Damping ratio. 1.0 = critically damped, < 1.0 = bouncy.
    pub damping_ratio: f32,
    /// Stiffness. Higher values settle faster.
    pub stiffness: f32,
    /// Velocity (progress units per second) below which the spring may rest.
    pub velocity_threshold: f32,
    /// Distance from 1.0 below which the spring may rest.
    pub position_threshold: f32,
}

impl SpringSpec {
    /// Slightly bouncy spring used to return a dragged panel to rest.
    pub const SPRING_BACK: Self = Self {
        damping_ratio: 0.8,
        stiffness: 220.0,
        velocity_threshold: 0.01,
        position_threshold: 0.001,
    };

    /// Critically damped spring: fastest settle without overshoot.
    pub const CRITICAL: Self = Self {
        damping_ratio: 1.0,
        stiffness: 300.0,
        velocity_threshold: 0.01,
        position_threshold: 0.001,
    };

    /// Set the damping ratio (builder).
    #[must_use]
    pub fn damping_ratio(mut self, ratio: f32) -> Self {
        self.damping_ratio = ratio;
        self
    }

    /// Set the stiffness (builder).
    #[must_use]
    pub fn stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    fn sanitized(self) -> Self {
        let stiffness = if self.stiffness.is_finite() && self.stiffness > 0.0 {
            self.stiffness
        } else {
            Self::SPRING_BACK.stiffness
        };
        let damping_ratio = if self.damping_ratio.is_finite() {
            self.damping_ratio.max(0.0)
        } else {
            Self::SPRING_BACK.damping_ratio
        };
        Self {
            damping_ratio,
            stiffness,
            velocity_threshold: positive_or(
                self.velocity_threshold,
                Self::SPRING_BACK.velocity_threshold,
            ),
            position_threshold: positive_or(
                self.position_threshold,
                Self::SPRING_BACK.position_threshold,
            ),
        }
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    let value = value.abs();
    if value.is_finite() && value > 0.0 { value } else { fallback }
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self::SPRING_BACK
    }
}

/// A damped spring pulling progress from 0.0 toward 1.0.
#[derive(Debug, Clone, Copy)]
pub struct Spring {
    spec: SpringSpec,
    position: f32,
    velocity: f32,
    initial_velocity: f32,
    settled: bool,
}

impl Spring {
    /// Create a spring at rest at 0.0.
    pub fn new(spec: SpringSpec) -> Self {
        Self {
            spec: spec.sanitized(),
            position: 0.0,
            velocity: 0.0,
            initial_velocity: 0.0,
            settled: false,
        }
    }

    /// Start with an initial velocity in progress units per second.
    ///
    /// Used to hand release momentum over to the spring.
    #[must_use]
    pub fn with_initial_velocity(mut self, velocity: f32) -> Self {
        let v = if velocity.is_finite() { velocity } else { 0.0 };
        self.initial_velocity = v;
        self.velocity = v;
        self
    }

    /// Current velocity in progress units per second.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// The spring's parameters.
    pub fn spec(&self) -> SpringSpec {
        self.spec
    }

    fn step(&mut self, dt: f32) {
        let stiffness = self.spec.stiffness;
        let damping = 2.0 * self.spec.damping_ratio * stiffness.sqrt();
        let displacement = self.position - 1.0;
        let force = -stiffness * displacement - damping * self.velocity;
        self.velocity += force * dt;
        self.position += self.velocity * dt;
    }

    fn at_rest(&self) -> bool {
        (self.position - 1.0).abs() < self.spec.position_threshold
            && self.velocity.abs() < self.spec.velocity_threshold
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        if self.settled {
            return;
        }
        let mut remaining = dt.as_secs_f32().min(MAX_TICK_SECS);
        while remaining > 0.0 {
            let step = remaining.min(STEP_SECS);
            self.step(step);
            remaining -= step;
            if self.at_rest() {
                self.position = 1.0;
                self.velocity = 0.0;
                self.settled = true;
                break;
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.settled
    }

    fn value(&self) -> f32 {
        self.position
    }

    fn reset(&mut self) {
        self.position = 0.0;
        self.velocity = self.initial_velocity;
        self.settled = false;
    }
}
