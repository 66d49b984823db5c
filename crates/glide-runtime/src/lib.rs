#![forbid(unsafe_code)]

//! Glide Runtime
//!
//! Owns the stateful side of a gesture-driven overlay: the transition state
//! machine, its animated channels, the secondary swipe recognizer and the
//! collaborators they call out to.
//!
//! # Key Components
//!
//! - [`TransitionController`] - State machine driving one overlay
//! - [`AnimationChannelSet`] - Appearance, content and gesture channels plus composition
//! - [`SecondaryGestureChannel`] - Upward one-shot swipe toggling a mode
//! - [`ControllerHandle`] / [`GestureBindings`] - Shared ownership and surface wiring
//! - [`HapticFeedback`] / [`KeyValueStore`] - Host collaborators
//!
//! # How it fits in the system
//! `glide-core` turns pointer input into samples, progress and decisions.
//! This crate reacts to those decisions on the UI thread: it starts and
//! interrupts animations, runs completions, and produces the style values a
//! host renders each frame. Time only advances through `tick`.

pub mod channel;
pub mod config;
pub mod controller;
pub mod haptics;
pub mod secondary;
pub mod state_persistence;
pub mod style;
pub mod surface;

pub use channel::{AnimationChannel, AnimationChannelSet, ChannelKind, ComposedOutputs, Motion};
pub use config::{GestureMode, TransitionConfig};
pub use controller::{Callback, Completion, TransitionController, TransitionState};
pub use haptics::{HapticError, HapticFeedback, ImpactStyle, NoopHaptics};
pub use secondary::{DEFAULT_STORAGE_KEY, SecondaryConfig, SecondaryGestureChannel, ToggleMode};
#[cfg(feature = "state-persistence")]
pub use state_persistence::FileStore;
pub use state_persistence::{KeyValueStore, MemoryStore, StorageError, StorageResult};
pub use style::{BackgroundStyle, ContainerStyle, ContentStyle, OverlayLayout};
pub use surface::{ControllerHandle, GestureBindings, SecondaryHandle};
