#![forbid(unsafe_code)]

//! Dual-threshold intent recognition.
//!
//! A released gesture triggers its action when it travelled far enough, or
//! when it travelled a little and was still moving fast:
//!
//! ```text
//! trigger = progress > distance
//!        || (progress > lower_bound && velocity > velocity_threshold)
//! ```
//!
//! Progress is the eased value produced by
//! [`ProgressNormalizer`](crate::progress::ProgressNormalizer); velocity is
//! px/ms along the gesture direction.

use crate::gesture::{GestureDirection, GestureOutcome};
use crate::validation::{ConfigError, ConfigResult, ensure_in_range, ensure_positive};

/// Distance and velocity thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Progress that triggers on its own.
    pub distance_fraction: f32,
    /// Release velocity (px/ms) that triggers together with `lower_distance_bound`.
    pub velocity: f32,
    /// Minimum progress for a velocity-assisted trigger.
    pub lower_distance_bound: f32,
}

impl Thresholds {
    /// Deliberate drags: a third of the way, or a flick past a fifth.
    pub const STANDARD: Self = Self {
        distance_fraction: 0.35,
        velocity: 0.5,
        lower_distance_bound: 0.2,
    };

    /// Light touch, used for overlays dismissed with a short flick.
    pub const SENSITIVE: Self = Self {
        distance_fraction: 0.07,
        velocity: 0.5,
        lower_distance_bound: 0.03,
    };

    /// Set the distance threshold.
    #[must_use]
    pub fn distance_fraction(mut self, fraction: f32) -> Self {
        self.distance_fraction = fraction;
        self
    }

    /// Set the velocity threshold.
    #[must_use]
    pub fn velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the velocity-assisted lower bound.
    #[must_use]
    pub fn lower_distance_bound(mut self, bound: f32) -> Self {
        self.lower_distance_bound = bound;
        self
    }

    /// Check `0 < lower_bound <= distance <= 1` and `velocity > 0`.
    pub fn validate(self) -> ConfigResult<Self> {
        ensure_in_range("distance_fraction", self.distance_fraction, 0.0, 1.0)?;
        ensure_positive("distance_fraction", self.distance_fraction)?;
        ensure_positive("velocity_threshold", self.velocity)?;
        ensure_positive("lower_distance_bound", self.lower_distance_bound)?;
        if self.lower_distance_bound > self.distance_fraction {
            return Err(ConfigError::InvertedThresholds {
                lower: self.lower_distance_bound,
                distance: self.distance_fraction,
            });
        }
        Ok(self)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Action selected for a released gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Dismiss the overlay.
    Close,
    /// Bring the overlay back to fully open.
    Open,
    /// Nothing triggered; return to rest.
    None,
}

/// Applies [`Thresholds`] to gesture outcomes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdDecider {
    thresholds: Thresholds,
}

impl ThresholdDecider {
    /// Create a decider from validated thresholds.
    pub fn new(thresholds: Thresholds) -> ConfigResult<Self> {
        Ok(Self {
            thresholds: thresholds.validate()?,
        })
    }

    /// The thresholds in use.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Whether `progress` and `velocity` clear the thresholds.
    pub fn triggers(&self, progress: f32, velocity: f32) -> bool {
        let t = &self.thresholds;
        progress > t.distance_fraction || (progress > t.lower_distance_bound && velocity > t.velocity)
    }

    /// Map an outcome to an action.
    ///
    /// Downward gestures close, upward gestures open. Upward outcomes only
    /// reach here from streams that allow upward drags.
    pub fn decide(&self, outcome: &GestureOutcome) -> Decision {
        let action = match outcome.direction {
            GestureDirection::Down => Decision::Close,
            GestureDirection::Up => Decision::Open,
            GestureDirection::None => return Decision::None,
        };
        if self.triggers(outcome.final_progress, outcome.velocity) {
            action
        } else {
            Decision::None
        }
    }
}

impl Default for ThresholdDecider {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::STANDARD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(direction: GestureDirection, progress: f32, velocity: f32) -> GestureOutcome {
        GestureOutcome {
            direction,
            final_progress: progress,
            velocity,
        }
    }

    #[test]
    fn presets_validate() {
        assert!(Thresholds::STANDARD.validate().is_ok());
        assert!(Thresholds::SENSITIVE.validate().is_ok());
    }

    #[test]
    fn inverted_bounds_rejected() {
        let err = Thresholds::STANDARD
            .lower_distance_bound(0.5)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvertedThresholds { .. }));
    }

    #[test]
    fn distance_above_one_rejected() {
        assert!(Thresholds::STANDARD.distance_fraction(1.2).validate().is_err());
        assert!(Thresholds::STANDARD.velocity(0.0).validate().is_err());
    }

    #[test]
    fn distance_alone_triggers() {
        let d = ThresholdDecider::default();
        assert!(d.triggers(0.4, 0.0));
        assert!(!d.triggers(0.3, 0.0));
    }

    #[test]
    fn velocity_assist_needs_lower_bound() {
        let d = ThresholdDecider::default();
        assert!(d.triggers(0.25, 0.6));
        assert!(!d.triggers(0.25, 0.3));
        assert!(!d.triggers(0.1, 5.0));
    }

    #[test]
    fn thresholds_are_strict() {
        let d = ThresholdDecider::default();
        assert!(!d.triggers(0.35, 0.0));
        assert!(!d.triggers(0.2, 0.9));
        assert!(!d.triggers(0.3, 0.5));
    }

    #[test]
    fn direction_selects_action() {
        let d = ThresholdDecider::default();
        assert_eq!(
            d.decide(&outcome(GestureDirection::Down, 0.6, 0.0)),
            Decision::Close
        );
        assert_eq!(
            d.decide(&outcome(GestureDirection::Up, 0.6, 0.0)),
            Decision::Open
        );
        assert_eq!(
            d.decide(&outcome(GestureDirection::Down, 0.1, 0.0)),
            Decision::None
        );
    }

    #[test]
    fn no_direction_never_triggers() {
        let d = ThresholdDecider::new(Thresholds::SENSITIVE).unwrap();
        assert_eq!(
            d.decide(&outcome(GestureDirection::None, 1.0, 10.0)),
            Decision::None
        );
        assert_eq!(d.decide(&GestureOutcome::NONE), Decision::None);
    }

    #[test]
    fn sensitive_preset_triggers_on_short_drag() {
        let d = ThresholdDecider::new(Thresholds::SENSITIVE).unwrap();
        assert!(d.triggers(0.08, 0.0));
        assert!(d.triggers(0.04, 0.6));
    }
}
