#![forbid(unsafe_code)]

//! Core: gesture sampling, progress normalization, threshold decisions and
//! the animation primitives that drive overlay transitions.
//!
//! Everything in this crate is pure computation. Time only advances when a
//! caller ticks an animation, and no type here owns callbacks or platform
//! handles.

pub mod animation;
pub mod geometry;
pub mod gesture;
pub mod logging;
pub mod pointer;
pub mod progress;
pub mod threshold;
pub mod validation;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::trace;

pub use geometry::{Point, Size};
pub use gesture::{
    DragDirections, GestureDirection, GestureOutcome, GestureSample, GestureSampleStream,
    GestureStreamConfig,
};
pub use progress::ProgressNormalizer;
pub use threshold::{Decision, ThresholdDecider, Thresholds};
pub use validation::{ConfigError, ConfigResult};
