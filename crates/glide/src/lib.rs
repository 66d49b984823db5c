#![forbid(unsafe_code)]

//! Glide public facade crate.
//!
//! Re-exports the types most hosts need from the internal crates and offers
//! a small prelude. Without the default `runtime` feature only the pure
//! gesture pipeline from `glide-core` is available.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use glide_core::animation::{Animation, Spring, SpringSpec, Tween};
pub use glide_core::geometry::{Point, Size};
pub use glide_core::gesture::{
    DragDirections, GestureDirection, GestureOutcome, GestureSample, GestureSampleStream,
    GestureStreamConfig,
};
pub use glide_core::pointer::{PointerEvent, PointerPhase, VelocityTracker};
pub use glide_core::progress::ProgressNormalizer;
pub use glide_core::threshold::{Decision, ThresholdDecider, Thresholds};
pub use glide_core::validation::ConfigError;

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use glide_runtime::{
    BackgroundStyle, ChannelKind, ComposedOutputs, ContainerStyle, ContentStyle, ControllerHandle,
    GestureBindings, GestureMode, HapticFeedback, ImpactStyle, KeyValueStore, MemoryStore,
    NoopHaptics, OverlayLayout, SecondaryConfig, SecondaryGestureChannel, SecondaryHandle,
    StorageError, ToggleMode, TransitionConfig, TransitionController, TransitionState,
};

#[cfg(feature = "state-persistence")]
pub use glide_runtime::FileStore;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Glide hosts.
#[derive(Debug)]
pub enum Error {
    /// A tunable or layout was rejected.
    Config(ConfigError),
    /// The key-value store failed.
    #[cfg(feature = "runtime")]
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            #[cfg(feature = "runtime")]
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "runtime")]
impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

/// Standard result type for Glide APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ConfigError, Decision, Error, GestureOutcome, GestureSample, Point, Result, Size,
        Thresholds,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        ControllerHandle, GestureBindings, OverlayLayout, TransitionConfig, TransitionController,
        TransitionState,
    };

    pub use crate::core;
    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use glide_core as core;
#[cfg(feature = "runtime")]
pub use glide_runtime as runtime;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts() {
        let err: Error = ConfigError::ZeroDuration("animation_duration").into();
        assert!(err.to_string().contains("animation_duration"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn storage_error_converts() {
        let err: Error = StorageError::Unavailable("offline".into()).into();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn prelude_builds_a_controller() -> Result<()> {
        use crate::prelude::*;
        let layout = OverlayLayout::centered(Size::new(390.0, 844.0))?;
        let controller = TransitionController::new(TransitionConfig::sensitive(), layout)?;
        assert_eq!(controller.state(), TransitionState::Hidden);
        Ok(())
    }
}
