#![forbid(unsafe_code)]

//! One-shot upward swipe that toggles a mode.
//!
//! The secondary channel shares the overlay's touch surface with the primary
//! recognizer but only listens for upward drags. A recognized swipe flips
//! the [`ToggleMode`], tells the host, and persists the new mode. While the
//! toggle animation runs, further swipes are ignored.
//!
//! # Invariants
//!
//! 1. At most one toggle per latch period.
//! 2. The mode is read from the store once, on mount.
//! 3. Persistence failures are logged and never block a toggle.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use glide_core::animation::{Animation, Tween, ease_out};
use glide_core::gesture::{
    DragDirections, GestureDirection, GestureSample, GestureSampleStream, GestureStreamConfig,
};
use glide_core::progress::ProgressNormalizer;
use glide_core::threshold::{ThresholdDecider, Thresholds};
use glide_core::validation::{ConfigError, ConfigResult};

use crate::state_persistence::KeyValueStore;

/// Default key under which the mode is stored.
pub const DEFAULT_STORAGE_KEY: &str = "glide.secondary_mode";

/// The two modes a secondary swipe flips between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToggleMode {
    /// The mode an overlay starts in.
    #[default]
    Default,
    /// The alternate mode.
    Alternate,
}

impl ToggleMode {
    /// Stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Alternate => "alternate",
        }
    }

    /// Parse a stored value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "default" => Some(Self::Default),
            "alternate" => Some(Self::Alternate),
            _ => None,
        }
    }

    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Default => Self::Alternate,
            Self::Alternate => Self::Default,
        }
    }
}

impl fmt::Display for ToggleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary recognizer tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryConfig {
    /// Release thresholds.
    pub thresholds: Thresholds,
    /// Gating for the upward stream.
    pub noise_floor: f32,
    /// Required vertical / horizontal ratio.
    pub dominance_ratio: f32,
    /// Share of the viewport height that maps to full progress.
    pub capture_fraction: f32,
    /// Progress easing exponent.
    pub progress_exponent: f32,
    /// How long the toggle animation holds the latch.
    pub latch_duration: Duration,
    /// Key for the persisted mode.
    pub storage_key: String,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::STANDARD,
            noise_floor: 10.0,
            dominance_ratio: 1.5,
            capture_fraction: ProgressNormalizer::DEFAULT_CAPTURE_FRACTION,
            progress_exponent: ProgressNormalizer::DEFAULT_EXPONENT,
            latch_duration: Duration::from_millis(250),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
        }
    }
}

impl SecondaryConfig {
    /// Set the release thresholds.
    #[must_use]
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the latch duration.
    #[must_use]
    pub fn latch_duration(mut self, duration: Duration) -> Self {
        self.latch_duration = duration;
        self
    }

    /// Set the storage key.
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    fn stream_config(&self) -> GestureStreamConfig {
        GestureStreamConfig::default()
            .noise_floor(self.noise_floor)
            .dominance_ratio(self.dominance_ratio)
            .directions(DragDirections::UP)
    }
}

/// Side effects of one recognized toggle, run after the channel is updated.
#[must_use]
pub(crate) struct ToggleEffect {
    mode: ToggleMode,
    callback: Option<Rc<dyn Fn(ToggleMode)>>,
    store: Option<Rc<dyn KeyValueStore>>,
    key: String,
}

impl ToggleEffect {
    pub(crate) fn run(self) {
        if let Some(callback) = self.callback {
            callback(self.mode);
        }
        let Some(store) = self.store else {
            return;
        };
        if let Err(error) = store.set(&self.key, self.mode.as_str()) {
            tracing::warn!(
                store = store.name(),
                key = %self.key,
                %error,
                "failed to persist toggle mode"
            );
        }
    }
}

/// Upward one-shot swipe recognizer.
pub struct SecondaryGestureChannel {
    config: SecondaryConfig,
    stream: GestureSampleStream,
    decider: ThresholdDecider,
    mode: ToggleMode,
    latch: Option<Tween>,
    mounted: bool,
    unmounted: bool,
    on_toggle: Option<Rc<dyn Fn(ToggleMode)>>,
    store: Option<Rc<dyn KeyValueStore>>,
}

impl SecondaryGestureChannel {
    /// Create a channel for a viewport of the given height.
    pub fn new(config: SecondaryConfig, viewport_height: f32) -> ConfigResult<Self> {
        if config.latch_duration.is_zero() {
            return Err(ConfigError::ZeroDuration("latch_duration"));
        }
        let normalizer = ProgressNormalizer::new(config.capture_fraction, config.progress_exponent)?;
        let stream = GestureSampleStream::new(config.stream_config(), normalizer, viewport_height)?;
        let decider = ThresholdDecider::new(config.thresholds)?;
        Ok(Self {
            config,
            stream,
            decider,
            mode: ToggleMode::Default,
            latch: None,
            mounted: false,
            unmounted: false,
            on_toggle: None,
            store: None,
        })
    }

    /// Called with the new mode after each toggle.
    #[must_use]
    pub fn on_toggle(mut self, f: impl Fn(ToggleMode) + 'static) -> Self {
        self.on_toggle = Some(Rc::new(f));
        self
    }

    /// Store used to load and persist the mode.
    #[must_use]
    pub fn store(mut self, store: Rc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Current mode.
    pub fn mode(&self) -> ToggleMode {
        self.mode
    }

    /// Whether the toggle animation is holding the latch.
    pub fn is_latched(&self) -> bool {
        self.latch.is_some()
    }

    /// Progress of the toggle animation; 0 when idle.
    pub fn toggle_progress(&self) -> f32 {
        self.latch.as_ref().map_or(0.0, |latch| latch.value())
    }

    /// Whether the current drag has passed the gate.
    pub fn is_engaged(&self) -> bool {
        self.stream.is_engaged()
    }

    /// Load the persisted mode. Only the first call reads the store.
    pub fn mount(&mut self) -> ToggleMode {
        if self.mounted || self.unmounted {
            return self.mode;
        }
        self.mounted = true;
        let Some(store) = &self.store else {
            return self.mode;
        };
        self.mode = match store.get(&self.config.storage_key) {
            Ok(Some(value)) => ToggleMode::parse(&value).unwrap_or_else(|| {
                tracing::warn!(value = %value, "unknown stored toggle mode, using default");
                ToggleMode::Default
            }),
            Ok(None) => ToggleMode::Default,
            Err(error) => {
                tracing::warn!(store = store.name(), %error, "failed to load toggle mode");
                ToggleMode::Default
            }
        };
        tracing::debug!(mode = %self.mode, "secondary channel mounted");
        self.mode
    }

    /// A drag started.
    pub fn grant(&mut self) {
        if self.unmounted {
            return;
        }
        self.stream.on_grant();
    }

    /// The drag moved. Returns `true` if the sample passed the gate.
    pub fn move_to(&mut self, sample: GestureSample) -> bool {
        !self.unmounted && self.stream.on_move(sample).is_some()
    }

    /// The drag was released. Returns `true` if the mode toggled.
    pub fn release(&mut self, sample: GestureSample) -> bool {
        match self.release_inner(sample) {
            Some(effect) => {
                effect.run();
                true
            }
            None => false,
        }
    }

    /// The drag was taken away.
    pub fn terminate(&mut self) {
        self.stream.on_terminate();
    }

    /// Advance the toggle animation; the latch releases when it completes.
    pub fn tick(&mut self, dt: Duration) {
        if let Some(latch) = self.latch.as_mut() {
            latch.tick(dt);
            if latch.is_complete() {
                self.latch = None;
            }
        }
    }

    /// Detach. Later gestures are ignored.
    pub fn unmount(&mut self) {
        self.unmounted = true;
        self.latch = None;
        self.stream.on_terminate();
    }

    pub(crate) fn release_inner(&mut self, sample: GestureSample) -> Option<ToggleEffect> {
        if self.unmounted {
            tracing::trace!("secondary release after unmount dropped");
            return None;
        }
        let outcome = self.stream.on_release(sample);
        if outcome.direction != GestureDirection::Up
            || !self.decider.triggers(outcome.final_progress, outcome.velocity)
        {
            return None;
        }
        if self.latch.is_some() {
            tracing::trace!("secondary swipe ignored while latched");
            return None;
        }
        self.mode = self.mode.toggled();
        self.latch = Some(Tween::new(self.config.latch_duration).easing(ease_out));
        tracing::debug!(mode = %self.mode, "secondary swipe toggled mode");
        Some(ToggleEffect {
            mode: self.mode,
            callback: self.on_toggle.clone(),
            store: self.store.clone(),
            key: self.config.storage_key.clone(),
        })
    }
}

impl fmt::Debug for SecondaryGestureChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecondaryGestureChannel")
            .field("mode", &self.mode)
            .field("latched", &self.latch.is_some())
            .field("mounted", &self.mounted)
            .finish()
    }
}
