#![forbid(unsafe_code)]

//! Direction-gated vertical drag recognition.
//!
//! [`GestureSampleStream`] sits between a touch surface and the transition
//! logic. It keeps a gesture-local reference frame, filters out noise and
//! mostly-horizontal motion, tracks the peak displacement in each direction,
//! and turns the release into a single [`GestureOutcome`].
//!
//! # Gating
//!
//! A move is forwarded once the vertical displacement exceeds the noise
//! floor, dominates the horizontal displacement by the configured ratio, and
//! points in an allowed direction. From then on the gesture is *engaged* and
//! every move is forwarded until release.
//!
//! # Release
//!
//! The release direction comes from the final vertical delta; its magnitude
//! is the peak displacement observed in that direction. A drag that goes to
//! 300 px and eases back to 250 px before lifting is judged at 300 px, while
//! a drag that returns all the way to the start is judged as no gesture.
//!
//! # Invariants
//!
//! 1. `on_release` / `on_terminate` produce exactly one outcome per grant;
//!    later calls return [`GestureOutcome::NONE`] until the next grant.
//! 2. `final_progress` is always within [0, 1].
//! 3. `velocity` is positive when moving in the outcome's direction.
//!
//! # Failure Modes
//!
//! - Samples before a grant: ignored.
//! - Non-finite samples: ignored on move, treated as terminate on release.

use bitflags::bitflags;

use crate::progress::ProgressNormalizer;
use crate::validation::{ConfigError, ConfigResult, ensure_in_range, ensure_positive};

bitflags! {
    /// Vertical directions a stream will engage on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DragDirections: u8 {
        /// Upward drags (negative dy).
        const UP   = 0b01;
        /// Downward drags (positive dy).
        const DOWN = 0b10;
        /// Both vertical directions.
        const VERTICAL = Self::UP.bits() | Self::DOWN.bits();
    }
}

/// Direction of a completed gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureDirection {
    /// Toward the top of the surface.
    Up,
    /// Toward the bottom of the surface.
    Down,
    /// No decisive vertical motion.
    #[default]
    None,
}

/// Pointer displacement and velocity relative to the gesture start.
///
/// Distances are logical pixels, velocities px/ms, positive y is downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSample {
    /// Horizontal displacement.
    pub dx: f32,
    /// Vertical displacement.
    pub dy: f32,
    /// Horizontal velocity.
    pub vx: f32,
    /// Vertical velocity.
    pub vy: f32,
}

impl GestureSample {
    /// Create a new sample.
    #[must_use]
    pub const fn new(dx: f32, dy: f32, vx: f32, vy: f32) -> Self {
        Self { dx, dy, vx, vy }
    }

    /// Vertical-only sample with no velocity.
    #[must_use]
    pub const fn vertical(dy: f32) -> Self {
        Self::new(0.0, dy, 0.0, 0.0)
    }

    /// Set the vertical velocity (builder).
    #[must_use]
    pub const fn with_vy(mut self, vy: f32) -> Self {
        self.vy = vy;
        self
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite() && self.vx.is_finite() && self.vy.is_finite()
    }
}

/// The result of a released gesture, computed once.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureOutcome {
    /// Decisive direction of the gesture.
    pub direction: GestureDirection,
    /// Eased progress of the peak displacement in `direction`, in [0, 1].
    pub final_progress: f32,
    /// Release velocity along `direction` (px/ms, positive = with the gesture).
    pub velocity: f32,
}

impl GestureOutcome {
    /// An outcome that never triggers anything.
    pub const NONE: Self = Self {
        direction: GestureDirection::None,
        final_progress: 0.0,
        velocity: 0.0,
    };

    /// Whether the gesture had no decisive direction.
    pub fn is_none(&self) -> bool {
        self.direction == GestureDirection::None
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Gating tunables for a [`GestureSampleStream`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureStreamConfig {
    /// Minimum |dy| in px before a drag engages.
    pub noise_floor: f32,
    /// Required |dy| / |dx| ratio before a drag engages.
    pub dominance_ratio: f32,
    /// Directions the stream engages on.
    pub directions: DragDirections,
}

impl Default for GestureStreamConfig {
    fn default() -> Self {
        Self {
            noise_floor: 10.0,
            dominance_ratio: 1.5,
            directions: DragDirections::DOWN,
        }
    }
}

impl GestureStreamConfig {
    /// Set the noise floor.
    #[must_use]
    pub fn noise_floor(mut self, px: f32) -> Self {
        self.noise_floor = px;
        self
    }

    /// Set the vertical dominance ratio.
    #[must_use]
    pub fn dominance_ratio(mut self, ratio: f32) -> Self {
        self.dominance_ratio = ratio;
        self
    }

    /// Set the allowed directions.
    #[must_use]
    pub fn directions(mut self, directions: DragDirections) -> Self {
        self.directions = directions;
        self
    }

    /// Check that the tunables are usable.
    pub fn validate(self) -> ConfigResult<Self> {
        ensure_positive("noise_floor", self.noise_floor)?;
        ensure_in_range("dominance_ratio", self.dominance_ratio, 1.0, 10.0)?;
        if self.directions.is_empty() {
            return Err(ConfigError::NoDirection);
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// GestureSampleStream
// ---------------------------------------------------------------------------

/// Turns a grant/move/release sequence into gated samples and one outcome.
#[derive(Debug, Clone)]
pub struct GestureSampleStream {
    config: GestureStreamConfig,
    normalizer: ProgressNormalizer,
    viewport_extent: f32,
    active: bool,
    engaged: bool,
    peak_down: f32,
    peak_up: f32,
}

impl GestureSampleStream {
    /// Create a stream for a viewport of the given vertical extent.
    pub fn new(
        config: GestureStreamConfig,
        normalizer: ProgressNormalizer,
        viewport_extent: f32,
    ) -> ConfigResult<Self> {
        Ok(Self {
            config: config.validate()?,
            normalizer,
            viewport_extent: ensure_positive("viewport_extent", viewport_extent)?,
            active: false,
            engaged: false,
            peak_down: 0.0,
            peak_up: 0.0,
        })
    }

    /// Gating configuration.
    pub fn config(&self) -> &GestureStreamConfig {
        &self.config
    }

    /// Normalizer used for progress.
    pub fn normalizer(&self) -> &ProgressNormalizer {
        &self.normalizer
    }

    /// Update the viewport extent (e.g. after rotation).
    pub fn set_viewport_extent(&mut self, extent: f32) -> ConfigResult<()> {
        self.viewport_extent = ensure_positive("viewport_extent", extent)?;
        Ok(())
    }

    /// Whether a gesture is in progress (granted, not yet released).
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the current gesture has passed the gate.
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Peak displacement observed in `direction` during the current gesture.
    pub fn peak(&self, direction: GestureDirection) -> f32 {
        match direction {
            GestureDirection::Down => self.peak_down,
            GestureDirection::Up => self.peak_up,
            GestureDirection::None => 0.0,
        }
    }

    /// Start a new gesture: reset the reference frame and peak tracking.
    pub fn on_grant(&mut self) {
        self.active = true;
        self.engaged = false;
        self.peak_down = 0.0;
        self.peak_up = 0.0;
    }

    /// Feed a move. Returns the sample if it is forwarded.
    pub fn on_move(&mut self, sample: GestureSample) -> Option<GestureSample> {
        if !self.active || !sample.is_finite() {
            return None;
        }
        if !self.engaged {
            if !self.passes_gate(&sample) {
                return None;
            }
            self.engaged = true;
            crate::trace!(dy = sample.dy, dx = sample.dx, "gesture engaged");
        }
        self.track_peak(sample.dy);
        Some(sample)
    }

    /// Live progress for a forwarded sample.
    ///
    /// Signed normalizers report downward motion as positive and upward as
    /// negative; motion in a disallowed direction reports 0.
    pub fn live_progress(&self, sample: &GestureSample) -> f32 {
        let dy = self.allowed_displacement(sample.dy);
        let p = self.normalizer.normalize(dy, self.viewport_extent);
        if self.normalizer.is_signed() {
            p
        } else {
            p.copysign(dy)
        }
    }

    /// Finish the gesture and compute its outcome.
    pub fn on_release(&mut self, sample: GestureSample) -> GestureOutcome {
        if !self.active {
            return GestureOutcome::NONE;
        }
        if !sample.is_finite() || !self.engaged {
            return self.on_terminate();
        }
        self.track_peak(sample.dy);
        self.active = false;
        self.engaged = false;

        let direction = self.release_direction(sample.dy);
        let (peak, velocity) = match direction {
            GestureDirection::Down => (self.peak_down, sample.vy),
            GestureDirection::Up => (self.peak_up, -sample.vy),
            GestureDirection::None => return GestureOutcome::NONE,
        };
        GestureOutcome {
            direction,
            final_progress: self
                .normalizer
                .normalize(peak, self.viewport_extent)
                .abs()
                .clamp(0.0, 1.0),
            velocity,
        }
    }

    /// Abandon the gesture. Always yields [`GestureOutcome::NONE`].
    pub fn on_terminate(&mut self) -> GestureOutcome {
        self.active = false;
        self.engaged = false;
        self.peak_down = 0.0;
        self.peak_up = 0.0;
        GestureOutcome::NONE
    }

    fn passes_gate(&self, sample: &GestureSample) -> bool {
        let vertical = sample.dy.abs();
        vertical > self.config.noise_floor
            && vertical >= sample.dx.abs() * self.config.dominance_ratio
            && self.allows(sample.dy)
    }

    fn allows(&self, dy: f32) -> bool {
        if dy > 0.0 {
            self.config.directions.contains(DragDirections::DOWN)
        } else if dy < 0.0 {
            self.config.directions.contains(DragDirections::UP)
        } else {
            false
        }
    }

    fn allowed_displacement(&self, dy: f32) -> f32 {
        if self.allows(dy) { dy } else { 0.0 }
    }

    fn track_peak(&mut self, dy: f32) {
        if dy > 0.0 {
            self.peak_down = self.peak_down.max(dy);
        } else {
            self.peak_up = self.peak_up.max(-dy);
        }
    }

    fn release_direction(&self, dy: f32) -> GestureDirection {
        if dy.abs() <= self.config.noise_floor || !self.allows(dy) {
            GestureDirection::None
        } else if dy > 0.0 {
            GestureDirection::Down
        } else {
            GestureDirection::Up
        }
    }
}
