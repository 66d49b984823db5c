#![forbid(unsafe_code)]

//! Per-overlay transition tuning.
//!
//! A [`TransitionConfig`] is built once per overlay mount and never changes
//! afterwards. Every numeric tunable is checked by [`TransitionConfig::validate`]
//! before the controller accepts it.

use std::time::Duration;

use glide_core::animation::SpringSpec;
use glide_core::gesture::{DragDirections, GestureStreamConfig};
use glide_core::progress::ProgressNormalizer;
use glide_core::threshold::Thresholds;
use glide_core::validation::{ConfigError, ConfigResult, ensure_in_range, ensure_positive};

/// Which vertical drags the primary recognizer handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureMode {
    /// Downward drags close; upward drags are ignored.
    #[default]
    Unidirectional,
    /// Downward drags close, upward drags re-open.
    Bidirectional,
}

impl GestureMode {
    /// Directions the primary stream engages on.
    pub fn directions(self) -> DragDirections {
        match self {
            Self::Unidirectional => DragDirections::DOWN,
            Self::Bidirectional => DragDirections::VERTICAL,
        }
    }
}

/// Transition configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionConfig {
    /// Distance / velocity thresholds for the release decision.
    pub thresholds: Thresholds,
    /// Duration of the open and close tweens.
    pub animation_duration: Duration,
    /// Diameter of the circle the background grows out of (px).
    pub origin_diameter: f32,
    /// Fire an impact at every transition start.
    pub haptics_enabled: bool,
    /// Start the entry animation when the controller is mounted.
    pub auto_play_entry_animation: bool,
    /// Imperative close skips the exit animation; the host animates instead.
    pub override_close_animation: bool,
    /// Share of the viewport height that maps to full progress.
    pub capture_fraction: f32,
    /// Progress easing exponent.
    pub progress_exponent: f32,
    /// Vertical px a drag must cover before it engages.
    pub noise_floor: f32,
    /// Required vertical / horizontal ratio before a drag engages.
    pub dominance_ratio: f32,
    /// Which drags the primary recognizer handles.
    pub gesture_mode: GestureMode,
    /// Share of `animation_duration` the content waits during entry.
    pub content_delay_fraction: f32,
    /// Spring used when a drag is released without triggering.
    pub spring: SpringSpec,
    /// Seed the controller as `Open` instead of `Hidden`.
    pub initially_open: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::STANDARD,
            animation_duration: Duration::from_millis(400),
            origin_diameter: 56.0,
            haptics_enabled: true,
            auto_play_entry_animation: false,
            override_close_animation: false,
            capture_fraction: ProgressNormalizer::DEFAULT_CAPTURE_FRACTION,
            progress_exponent: ProgressNormalizer::DEFAULT_EXPONENT,
            noise_floor: 10.0,
            dominance_ratio: 1.5,
            gesture_mode: GestureMode::Unidirectional,
            content_delay_fraction: 0.3,
            spring: SpringSpec::SPRING_BACK,
            initially_open: false,
        }
    }
}

impl TransitionConfig {
    /// Create the standard configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Light-touch overlays dismissed with a short flick.
    pub fn sensitive() -> Self {
        Self {
            thresholds: Thresholds::SENSITIVE,
            ..Self::default()
        }
    }

    /// Overlays that can be dragged back open after starting to close.
    pub fn bidirectional() -> Self {
        Self {
            gesture_mode: GestureMode::Bidirectional,
            ..Self::default()
        }
    }

    /// Set the release thresholds.
    #[must_use]
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the open/close tween duration.
    #[must_use]
    pub fn animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    /// Set the origin circle diameter.
    #[must_use]
    pub fn origin_diameter(mut self, diameter: f32) -> Self {
        self.origin_diameter = diameter;
        self
    }

    /// Enable or disable haptics.
    #[must_use]
    pub fn haptics_enabled(mut self, enabled: bool) -> Self {
        self.haptics_enabled = enabled;
        self
    }

    /// Auto-play the entry animation on mount.
    #[must_use]
    pub fn auto_play_entry_animation(mut self, auto_play: bool) -> Self {
        self.auto_play_entry_animation = auto_play;
        self
    }

    /// Let the host run its own exit on imperative close.
    #[must_use]
    pub fn override_close_animation(mut self, override_close: bool) -> Self {
        self.override_close_animation = override_close;
        self
    }

    /// Set the capture fraction.
    #[must_use]
    pub fn capture_fraction(mut self, fraction: f32) -> Self {
        self.capture_fraction = fraction;
        self
    }

    /// Set the progress easing exponent.
    #[must_use]
    pub fn progress_exponent(mut self, exponent: f32) -> Self {
        self.progress_exponent = exponent;
        self
    }

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

    /// Set the gesture mode.
    #[must_use]
    pub fn gesture_mode(mut self, mode: GestureMode) -> Self {
        self.gesture_mode = mode;
        self
    }

    /// Set the entry content delay as a share of the duration.
    #[must_use]
    pub fn content_delay_fraction(mut self, fraction: f32) -> Self {
        self.content_delay_fraction = fraction;
        self
    }

    /// Set the spring-back spring.
    #[must_use]
    pub fn spring(mut self, spring: SpringSpec) -> Self {
        self.spring = spring;
        self
    }

    /// Seed the controller as open.
    #[must_use]
    pub fn initially_open(mut self, open: bool) -> Self {
        self.initially_open = open;
        self
    }

    /// Check every tunable.
    pub fn validate(self) -> ConfigResult<Self> {
        self.thresholds.validate()?;
        if self.animation_duration.is_zero() {
            return Err(ConfigError::ZeroDuration("animation_duration"));
        }
        ensure_positive("origin_diameter", self.origin_diameter)?;
        self.normalizer()?;
        self.stream_config().validate()?;
        ensure_in_range("content_delay_fraction", self.content_delay_fraction, 0.0, 0.95)?;
        ensure_positive("spring.stiffness", self.spring.stiffness)?;
        ensure_positive("spring.damping_ratio", self.spring.damping_ratio)?;
        ensure_positive("spring.position_threshold", self.spring.position_threshold)?;
        ensure_positive("spring.velocity_threshold", self.spring.velocity_threshold)?;
        Ok(self)
    }

    /// Progress normalizer for the primary stream. Signed when bidirectional.
    pub fn normalizer(&self) -> ConfigResult<ProgressNormalizer> {
        let normalizer = ProgressNormalizer::new(self.capture_fraction, self.progress_exponent)?;
        Ok(normalizer.signed(self.gesture_mode == GestureMode::Bidirectional))
    }

    /// Gating configuration for the primary stream.
    pub fn stream_config(&self) -> GestureStreamConfig {
        GestureStreamConfig::default()
            .noise_floor(self.noise_floor)
            .dominance_ratio(self.dominance_ratio)
            .directions(self.gesture_mode.directions())
    }

    /// Entry stagger: how long content waits, and how long it then animates.
    pub fn content_timing(&self) -> (Duration, Duration) {
        let delay = self
            .animation_duration
            .mul_f32(self.content_delay_fraction.clamp(0.0, 0.95));
        (delay, self.animation_duration.saturating_sub(delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(TransitionConfig::default().validate().is_ok());
        assert!(TransitionConfig::sensitive().validate().is_ok());
        assert!(TransitionConfig::bidirectional().validate().is_ok());
    }

    #[test]
    fn zero_duration_rejected() {
        let err = TransitionConfig::new()
            .animation_duration(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroDuration("animation_duration"));
    }

    #[test]
    fn zero_diameter_rejected() {
        assert!(TransitionConfig::new().origin_diameter(0.0).validate().is_err());
    }

    #[test]
    fn bad_progress_tunables_rejected() {
        assert!(TransitionConfig::new().capture_fraction(0.0).validate().is_err());
        assert!(
            TransitionConfig::new()
                .progress_exponent(f32::NAN)
                .validate()
                .is_err()
        );
        assert!(TransitionConfig::new().dominance_ratio(0.5).validate().is_err());
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let thresholds = Thresholds::STANDARD.lower_distance_bound(0.6);
        assert!(TransitionConfig::new().thresholds(thresholds).validate().is_err());
    }

    #[test]
    fn spring_rest_thresholds_must_be_positive() {
        let stuck = SpringSpec {
            position_threshold: 0.0,
            ..SpringSpec::SPRING_BACK
        };
        let err = TransitionConfig::new().spring(stuck).validate().unwrap_err();
        assert!(err.to_string().contains("spring.position_threshold"));

        let stuck = SpringSpec {
            velocity_threshold: -0.01,
            ..SpringSpec::SPRING_BACK
        };
        let err = TransitionConfig::new().spring(stuck).validate().unwrap_err();
        assert!(err.to_string().contains("spring.velocity_threshold"));
    }

    #[test]
    fn bidirectional_normalizer_is_signed() {
        let config = TransitionConfig::bidirectional();
        assert!(config.normalizer().unwrap().is_signed());
        assert_eq!(config.stream_config().directions, DragDirections::VERTICAL);
        assert!(!TransitionConfig::new().normalizer().unwrap().is_signed());
    }

    #[test]
    fn content_timing_splits_duration() {
        let (delay, rest) = TransitionConfig::new().content_timing();
        assert!((delay.as_secs_f32() - 0.12).abs() < 1e-4);
        assert_eq!(delay + rest, Duration::from_millis(400));
    }
}
