#![forbid(unsafe_code)]

//! Displacement-to-progress normalization.
//!
//! Raw drag displacement is mapped onto an eased progress value:
//!
//! ```text
//! p  = clamp(|d| / (viewport_extent * capture_fraction), 0, 1)
//! p' = p ^ exponent
//! ```
//!
//! `capture_fraction` is the share of the viewport a drag must cover to reach
//! full progress; `exponent > 1` makes the start of a drag feel heavier.
//! The signed variant keeps the sign of `d`, yielding [-1, 1] for recognizers
//! where one channel carries both open and close intent.
//!
//! # Invariants
//!
//! 1. Output magnitude is always within [0, 1].
//! 2. Output magnitude is non-decreasing in |d|.
//! 3. Non-finite displacement maps to 0.

use crate::validation::{ConfigResult, ensure_positive};

/// Maps raw displacement to eased progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressNormalizer {
    capture_fraction: f32,
    exponent: f32,
    signed: bool,
}

impl ProgressNormalizer {
    /// Default share of the viewport that maps to full progress.
    pub const DEFAULT_CAPTURE_FRACTION: f32 = 0.4;
    /// Default easing exponent.
    pub const DEFAULT_EXPONENT: f32 = 1.5;

    /// Create a magnitude-only normalizer.
    pub fn new(capture_fraction: f32, exponent: f32) -> ConfigResult<Self> {
        Ok(Self {
            capture_fraction: ensure_positive("capture_fraction", capture_fraction)?,
            exponent: ensure_positive("progress_exponent", exponent)?,
            signed: false,
        })
    }

    /// Preserve the sign of the displacement (builder).
    #[must_use]
    pub fn signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    /// Whether the sign of the displacement is preserved.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Capture fraction.
    pub fn capture_fraction(&self) -> f32 {
        self.capture_fraction
    }

    /// Easing exponent.
    pub fn exponent(&self) -> f32 {
        self.exponent
    }

    /// Normalize `displacement` against a viewport extent.
    ///
    /// A non-positive extent yields 0; callers validate extents up front.
    pub fn normalize(&self, displacement: f32, viewport_extent: f32) -> f32 {
        if !displacement.is_finite() || viewport_extent.is_nan() || viewport_extent <= 0.0 {
            return 0.0;
        }
        let span = viewport_extent * self.capture_fraction;
        let linear = (displacement.abs() / span).clamp(0.0, 1.0);
        let eased = linear.powf(self.exponent);
        if self.signed {
            eased.copysign(displacement)
        } else {
            eased
        }
    }

    /// Displacement needed to reach `progress` (inverse of [`normalize`](Self::normalize)).
    pub fn displacement_for(&self, progress: f32, viewport_extent: f32) -> f32 {
        let p = progress.abs().clamp(0.0, 1.0);
        let linear = p.powf(1.0 / self.exponent);
        let d = linear * viewport_extent * self.capture_fraction;
        if self.signed { d.copysign(progress) } else { d }
    }
}

impl Default for ProgressNormalizer {
    fn default() -> Self {
        Self {
            capture_fraction: Self::DEFAULT_CAPTURE_FRACTION,
            exponent: Self::DEFAULT_EXPONENT,
            signed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_tunables() {
        assert!(ProgressNormalizer::new(0.0, 1.0).is_err());
        assert!(ProgressNormalizer::new(0.4, -1.0).is_err());
        assert!(ProgressNormalizer::new(f32::NAN, 1.0).is_err());
    }

    #[test]
    fn linear_exponent_is_proportional() {
        let n = ProgressNormalizer::new(0.25, 1.0).unwrap();
        assert!((n.normalize(100.0, 800.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn clamps_at_full_progress() {
        let n = ProgressNormalizer::default();
        assert_eq!(n.normalize(10_000.0, 800.0), 1.0);
    }

    #[test]
    fn exponent_softens_small_drags() {
        let n = ProgressNormalizer::new(0.4, 1.5).unwrap();
        let linear = ProgressNormalizer::new(0.4, 1.0).unwrap();
        assert!(n.normalize(100.0, 800.0) < linear.normalize(100.0, 800.0));
    }

    #[test]
    fn unsigned_drops_sign() {
        let n = ProgressNormalizer::default();
        assert!(n.normalize(-120.0, 800.0) > 0.0);
    }

    #[test]
    fn signed_keeps_sign() {
        let n = ProgressNormalizer::default().signed(true);
        let up = n.normalize(-120.0, 800.0);
        let down = n.normalize(120.0, 800.0);
        assert!(up < 0.0);
        assert!((up + down).abs() < 1e-6);
    }

    #[test]
    fn degenerate_inputs_are_zero() {
        let n = ProgressNormalizer::default();
        assert_eq!(n.normalize(f32::NAN, 800.0), 0.0);
        assert_eq!(n.normalize(100.0, 0.0), 0.0);
        assert_eq!(n.normalize(100.0, f32::NAN), 0.0);
    }

    #[test]
    fn inverse_round_trips_inside_range() {
        let n = ProgressNormalizer::default();
        let d = n.displacement_for(0.35, 800.0);
        assert!((n.normalize(d, 800.0) - 0.35).abs() < 1e-4);
    }

    #[test]
    fn tuned_capture_matches_reference_drag() {
        // 300 px on an 800 px viewport lands just past the midpoint, 100 px
        // stays near a tenth.
        let n = ProgressNormalizer::new(0.5725, 1.5).unwrap();
        assert!((n.normalize(300.0, 800.0) - 0.53).abs() < 0.01);
        assert!((n.normalize(100.0, 800.0) - 0.10).abs() < 0.01);
    }
}
