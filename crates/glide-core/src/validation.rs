#![forbid(unsafe_code)]

//! Construction-time validation of tunables.
//!
//! Every tunable that later ends up in a division or an exponent is checked
//! once, when the owning config is built. Runtime paths can then assume
//! finite, positive values and never produce NaN.

use std::fmt;

/// A rejected configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A tunable that must be strictly positive and finite was not.
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// A tunable fell outside its permitted range.
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
        /// Inclusive lower bound.
        min: f32,
        /// Inclusive upper bound.
        max: f32,
    },
    /// The velocity-assisted lower bound exceeds the distance threshold.
    InvertedThresholds {
        /// Lower distance bound.
        lower: f32,
        /// Distance threshold.
        distance: f32,
    },
    /// The viewport has no area.
    EmptyViewport {
        /// Viewport width.
        width: f32,
        /// Viewport height.
        height: f32,
    },
    /// A gesture stream was configured with no allowed drag direction.
    NoDirection,
    /// A duration that must be non-zero was zero.
    ZeroDuration(&'static str),
    /// Two recognizers on one surface compete for the same direction.
    ConflictingRecognizers(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPositive { field, value } => {
                write!(f, "{field} must be positive and finite, got {value}")
            }
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} must be within [{min}, {max}], got {value}"),
            Self::InvertedThresholds { lower, distance } => write!(
                f,
                "lower distance bound {lower} exceeds distance threshold {distance}"
            ),
            Self::EmptyViewport { width, height } => {
                write!(f, "viewport {width}x{height} has no area")
            }
            Self::NoDirection => f.write_str("gesture stream allows no drag direction"),
            Self::ZeroDuration(field) => write!(f, "{field} must be non-zero"),
            Self::ConflictingRecognizers(msg) => write!(f, "conflicting recognizers: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Require `value` to be finite and strictly positive.
pub fn ensure_positive(field: &'static str, value: f32) -> ConfigResult<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Require `value` to be finite and within `[min, max]`.
pub fn ensure_in_range(field: &'static str, value: f32, min: f32, max: f32) -> ConfigResult<f32> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_accepts_and_rejects() {
        assert_eq!(ensure_positive("x", 0.5), Ok(0.5));
        assert!(ensure_positive("x", 0.0).is_err());
        assert!(ensure_positive("x", -1.0).is_err());
        assert!(ensure_positive("x", f32::NAN).is_err());
        assert!(ensure_positive("x", f32::INFINITY).is_err());
    }

    #[test]
    fn range_is_inclusive() {
        assert!(ensure_in_range("r", 1.0, 0.0, 1.0).is_ok());
        assert!(ensure_in_range("r", 0.0, 0.0, 1.0).is_ok());
        assert!(ensure_in_range("r", 1.01, 0.0, 1.0).is_err());
    }

    #[test]
    fn no_direction_display() {
        assert!(ConfigError::NoDirection.to_string().contains("no drag direction"));
    }

    #[test]
    fn display_names_field() {
        let err = ensure_positive("velocity_threshold", -0.5).unwrap_err();
        assert!(err.to_string().contains("velocity_threshold"));
    }
}
