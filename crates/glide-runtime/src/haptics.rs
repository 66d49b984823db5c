#![forbid(unsafe_code)]

//! Haptic feedback collaborator.
//!
//! The controller asks for one impact each time a transition starts. The
//! request is fire-and-forget: a failing device is logged and otherwise
//! ignored, and never changes transition behavior.

use std::fmt;

/// Strength of an impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactStyle {
    /// Subtle tap.
    Light,
    /// Standard tap.
    Medium,
    /// Strong tap.
    Heavy,
}

/// A haptic request that could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HapticError {
    /// No haptic engine on this device.
    Unsupported,
    /// The engine rejected the request.
    Failed(String),
}

impl fmt::Display for HapticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HapticError::Unsupported => write!(f, "haptics unsupported"),
            HapticError::Failed(msg) => write!(f, "haptic request failed: {msg}"),
        }
    }
}

impl std::error::Error for HapticError {}

/// Plays haptic impacts on behalf of the controller.
pub trait HapticFeedback {
    /// Play one impact.
    fn impact(&self, style: ImpactStyle) -> Result<(), HapticError>;
}

/// Haptics that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHaptics;

impl HapticFeedback for NoopHaptics {
    fn impact(&self, _style: ImpactStyle) -> Result<(), HapticError> {
        Ok(())
    }
}

/// Send one impact and swallow the result.
pub(crate) fn fire(haptics: &dyn HapticFeedback, style: ImpactStyle) {
    if let Err(error) = haptics.impact(style) {
        tracing::debug!(?style, %error, "haptic impact dropped");
    }
}
