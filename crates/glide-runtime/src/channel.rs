#![forbid(unsafe_code)]

//! Animated channels and their composition into render outputs.
//!
//! An overlay is driven by three independent channels:
//!
//! | Channel | Range | Meaning |
//! |---------|-------|---------|
//! | appearance | [0, 1] | 0 = collapsed into the anchor, 1 = fully covering |
//! | content | [0, 1] | opacity of the overlay content before gesture fading |
//! | gesture | [-1, 1] | live drag progress, positive = downward |
//!
//! Each channel holds a value and, while moving, one [`Motion`] toward a
//! target. Stopping a channel freezes its current value, so a new motion
//! always starts from exactly where the previous one was interrupted.
//!
//! # Composition
//!
//! ```text
//! max_scale   = 2 * max(viewport_w, viewport_h) / origin_diameter
//! base_scale  = lerp(1, max_scale, appearance)
//! scale       = base_scale * (1 - min(|gesture|, 0.7))
//! opacity     = clamp(appearance * (1 - |gesture|), 0, 1)
//! content_out = clamp(content + fast_fade(gesture), 0, 1)
//! ```
//!
//! `fast_fade` is piecewise linear on |gesture| through (0, 0), (0.3, -0.7)
//! and (1, -1): content is mostly gone after the first third of a drag.

use std::time::Duration;

use glide_core::animation::{Animation, Delayed, EasingFn, Spring, SpringSpec, Tween, delay};

/// Identifies one of the three channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Background growth and opacity.
    Appearance,
    /// Content opacity.
    Content,
    /// Live drag progress.
    Gesture,
}

impl ChannelKind {
    /// All channels, in a stable order.
    pub const ALL: [Self; 3] = [Self::Appearance, Self::Content, Self::Gesture];

    /// Inclusive value range.
    pub fn range(self) -> (f32, f32) {
        match self {
            Self::Appearance | Self::Content => (0.0, 1.0),
            Self::Gesture => (-1.0, 1.0),
        }
    }

    fn clamp(self, value: f32) -> f32 {
        let (lo, hi) = self.range();
        if value.is_nan() { lo.max(0.0) } else { value.clamp(lo, hi) }
    }
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// How a channel moves toward its target.
#[derive(Debug, Clone, Copy)]
pub enum Motion {
    /// Fixed-duration eased tween.
    Tween(Tween),
    /// Tween that waits before starting.
    Staggered(Delayed<Tween>),
    /// Damped spring.
    Spring(Spring),
}

impl Motion {
    /// Tween over `duration` with `easing`.
    pub fn tween(duration: Duration, easing: EasingFn) -> Self {
        Self::Tween(Tween::new(duration).easing(easing))
    }

    /// Tween over `duration` that starts after `wait`.
    pub fn staggered(wait: Duration, duration: Duration, easing: EasingFn) -> Self {
        Self::Staggered(delay(wait, Tween::new(duration).easing(easing)))
    }

    /// Spring with the given parameters.
    pub fn spring(spec: SpringSpec) -> Self {
        Self::Spring(Spring::new(spec))
    }

    fn animation(&mut self) -> &mut dyn Animation {
        match self {
            Self::Tween(t) => t,
            Self::Staggered(d) => d,
            Self::Spring(s) => s,
        }
    }

    fn progress(&self) -> f32 {
        match self {
            Self::Tween(t) => t.value(),
            Self::Staggered(d) => d.value(),
            Self::Spring(s) => s.value(),
        }
    }

    fn is_complete(&self) -> bool {
        match self {
            Self::Tween(t) => t.is_complete(),
            Self::Staggered(d) => d.is_complete(),
            Self::Spring(s) => s.is_complete(),
        }
    }
}

// ---------------------------------------------------------------------------
// AnimationChannel
// ---------------------------------------------------------------------------

/// One animated value.
#[derive(Debug, Clone, Copy)]
pub struct AnimationChannel {
    kind: ChannelKind,
    value: f32,
    from: f32,
    target: f32,
    motion: Option<Motion>,
}

impl AnimationChannel {
    /// Create a channel at rest at `value`.
    pub fn new(kind: ChannelKind, value: f32) -> Self {
        let value = kind.clamp(value);
        Self {
            kind,
            value,
            from: value,
            target: value,
            motion: None,
        }
    }

    /// Which channel this is.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Value the channel is heading toward (equals `value` at rest).
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether a motion is running.
    pub fn is_animating(&self) -> bool {
        self.motion.is_some()
    }

    /// Freeze at the current value.
    pub fn stop(&mut self) {
        self.motion = None;
        self.from = self.value;
        self.target = self.value;
    }

    /// Jump to `value` immediately, cancelling any motion.
    pub fn set(&mut self, value: f32) {
        self.value = self.kind.clamp(value);
        self.stop();
    }

    /// Start moving from the current value to `target`.
    pub fn animate_to(&mut self, target: f32, motion: Motion) {
        self.from = self.value;
        self.target = self.kind.clamp(target);
        self.motion = Some(motion);
    }

    /// Advance the motion. Returns `true` on the tick the channel comes to rest.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(motion) = self.motion.as_mut() else {
            return false;
        };
        motion.animation().tick(dt);
        let progress = motion.progress();
        let done = motion.is_complete();
        if done {
            self.value = self.target;
            self.stop();
        } else {
            self.value = self
                .kind
                .clamp(self.from + (self.target - self.from) * progress);
        }
        done
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Final render values derived from the three channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposedOutputs {
    /// Background scale.
    pub scale: f32,
    /// Background and container opacity.
    pub opacity: f32,
    /// Content opacity.
    pub content_opacity: f32,
}

/// Background scale before gesture damping.
pub fn base_scale(appearance: f32, max_scale: f32) -> f32 {
    1.0 + (max_scale - 1.0) * appearance
}

/// Share of the scale removed by a drag.
pub fn dampen(gesture: f32) -> f32 {
    gesture.abs().min(0.7)
}

/// Extra content fade applied during a drag, in [-1, 0].
pub fn fast_fade(gesture: f32) -> f32 {
    let g = gesture.abs().min(1.0);
    if g <= 0.3 {
        -0.7 * g / 0.3
    } else {
        -0.7 - 0.3 * (g - 0.3) / 0.7
    }
}

/// The three channels of one overlay.
#[derive(Debug, Clone)]
pub struct AnimationChannelSet {
    appearance: AnimationChannel,
    content: AnimationChannel,
    gesture: AnimationChannel,
}

impl AnimationChannelSet {
    /// Channels at rest, either fully open or fully hidden.
    pub fn new(open: bool) -> Self {
        let level = if open { 1.0 } else { 0.0 };
        Self {
            appearance: AnimationChannel::new(ChannelKind::Appearance, level),
            content: AnimationChannel::new(ChannelKind::Content, level),
            gesture: AnimationChannel::new(ChannelKind::Gesture, 0.0),
        }
    }

    /// Borrow a channel.
    pub fn get(&self, kind: ChannelKind) -> &AnimationChannel {
        match kind {
            ChannelKind::Appearance => &self.appearance,
            ChannelKind::Content => &self.content,
            ChannelKind::Gesture => &self.gesture,
        }
    }

    /// Mutably borrow a channel.
    pub fn get_mut(&mut self, kind: ChannelKind) -> &mut AnimationChannel {
        match kind {
            ChannelKind::Appearance => &mut self.appearance,
            ChannelKind::Content => &mut self.content,
            ChannelKind::Gesture => &mut self.gesture,
        }
    }

    /// Current value of a channel.
    pub fn value(&self, kind: ChannelKind) -> f32 {
        self.get(kind).value()
    }

    /// Freeze every channel at its current value.
    pub fn stop_all(&mut self) {
        for kind in ChannelKind::ALL {
            self.get_mut(kind).stop();
        }
    }

    /// Snap every channel to rest: open (1, 1, 0) or hidden (0, 0, 0).
    pub fn snap(&mut self, open: bool) {
        let level = if open { 1.0 } else { 0.0 };
        self.appearance.set(level);
        self.content.set(level);
        self.gesture.set(0.0);
    }

    /// Whether no channel is moving.
    pub fn at_rest(&self) -> bool {
        ChannelKind::ALL
            .iter()
            .all(|&kind| !self.get(kind).is_animating())
    }

    /// Whether the set is resting at the fully open values (1, 1, 0).
    pub fn is_open_at_rest(&self) -> bool {
        self.at_rest()
            && self.appearance.value() == 1.0
            && self.content.value() == 1.0
            && self.gesture.value() == 0.0
    }

    /// Advance every channel. Returns `true` on the tick the whole set comes to rest.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.at_rest() {
            return false;
        }
        for kind in ChannelKind::ALL {
            self.get_mut(kind).tick(dt);
        }
        self.at_rest()
    }

    /// Combine the channels into render outputs.
    pub fn compose(&self, max_scale: f32) -> ComposedOutputs {
        let a = self.appearance.value();
        let g = self.gesture.value();
        let scale = base_scale(a, max_scale) * (1.0 - dampen(g));
        ComposedOutputs {
            scale,
            opacity: (a * (1.0 - g.abs())).clamp(0.0, 1.0),
            content_opacity: (self.content.value() + fast_fade(g)).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glide_core::animation::{ease_out_cubic, linear};

    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn new_channel_clamps_into_range() {
        assert_eq!(AnimationChannel::new(ChannelKind::Content, 3.0).value(), 1.0);
        assert_eq!(AnimationChannel::new(ChannelKind::Gesture, -4.0).value(), -1.0);
        assert_eq!(AnimationChannel::new(ChannelKind::Appearance, f32::NAN).value(), 0.0);
    }

    #[test]
    fn tween_reaches_target_exactly() {
        let mut ch = AnimationChannel::new(ChannelKind::Appearance, 0.0);
        ch.animate_to(1.0, Motion::tween(MS_100, ease_out_cubic));
        assert!(!ch.tick(Duration::from_millis(50)));
        assert!(ch.value() > 0.0 && ch.value() < 1.0);
        assert!(ch.tick(Duration::from_millis(50)));
        assert_eq!(ch.value(), 1.0);
        assert!(!ch.is_animating());
    }

    #[test]
    fn stop_freezes_mid_flight() {
        let mut ch = AnimationChannel::new(ChannelKind::Appearance, 1.0);
        ch.animate_to(0.0, Motion::tween(MS_100, linear));
        ch.tick(Duration::from_millis(40));
        let frozen = ch.value();
        ch.stop();
        ch.tick(MS_100);
        assert_eq!(ch.value(), frozen);
        assert_eq!(ch.target(), frozen);
    }

    #[test]
    fn restart_continues_from_interrupted_value() {
        let mut ch = AnimationChannel::new(ChannelKind::Appearance, 1.0);
        ch.animate_to(0.0, Motion::tween(MS_100, linear));
        ch.tick(Duration::from_millis(50));
        let mid = ch.value();
        ch.stop();
        ch.animate_to(1.0, Motion::tween(MS_100, linear));
        ch.tick(Duration::from_millis(1));
        assert!((ch.value() - mid).abs() < 0.02, "jumped from {mid} to {}", ch.value());
    }

    #[test]
    fn spring_clamps_overshoot_into_range() {
        let mut ch = AnimationChannel::new(ChannelKind::Content, 0.0);
        ch.animate_to(1.0, Motion::spring(SpringSpec::CRITICAL.damping_ratio(0.2)));
        for _ in 0..400 {
            ch.tick(Duration::from_millis(16));
            assert!(ch.value() <= 1.0);
        }
    }

    #[test]
    fn staggered_holds_start_value() {
        let mut ch = AnimationChannel::new(ChannelKind::Content, 0.0);
        ch.animate_to(1.0, Motion::staggered(MS_100, MS_100, linear));
        ch.tick(Duration::from_millis(60));
        assert_eq!(ch.value(), 0.0);
        ch.tick(Duration::from_millis(90));
        assert!(ch.value() > 0.0);
    }

    #[test]
    fn fast_fade_knots() {
        assert_eq!(fast_fade(0.0), 0.0);
        assert!((fast_fade(0.3) + 0.7).abs() < 1e-6);
        assert!((fast_fade(-0.3) + 0.7).abs() < 1e-6);
        assert!((fast_fade(1.0) + 1.0).abs() < 1e-6);
        assert!((fast_fade(5.0) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn dampen_caps_at_seventy_percent() {
        assert_eq!(dampen(0.2), 0.2);
        assert_eq!(dampen(-0.9), 0.7);
    }

    #[test]
    fn compose_open_at_rest() {
        let set = AnimationChannelSet::new(true);
        let out = set.compose(20.0);
        assert_eq!(out.scale, 20.0);
        assert_eq!(out.opacity, 1.0);
        assert_eq!(out.content_opacity, 1.0);
    }

    #[test]
    fn compose_hidden_collapses_to_origin() {
        let out = AnimationChannelSet::new(false).compose(20.0);
        assert_eq!(out.scale, 1.0);
        assert_eq!(out.opacity, 0.0);
        assert_eq!(out.content_opacity, 0.0);
    }

    #[test]
    fn compose_mid_drag() {
        let mut set = AnimationChannelSet::new(true);
        set.get_mut(ChannelKind::Gesture).set(0.5);
        let out = set.compose(20.0);
        assert!((out.scale - 10.0).abs() < 1e-5);
        assert!((out.opacity - 0.5).abs() < 1e-6);
        // 1 + fast_fade(0.5) = 1 - 0.7 - 0.3 * 0.2 / 0.7
        assert!((out.content_opacity - (0.3 - 0.3 * 0.2 / 0.7)).abs() < 1e-5);
    }

    #[test]
    fn set_reports_rest_once() {
        let mut set = AnimationChannelSet::new(false);
        set.get_mut(ChannelKind::Appearance)
            .animate_to(1.0, Motion::tween(MS_100, linear));
        assert!(!set.at_rest());
        assert!(set.tick(MS_100));
        assert!(!set.tick(MS_100));
    }

    #[test]
    fn snap_resets_everything() {
        let mut set = AnimationChannelSet::new(true);
        set.get_mut(ChannelKind::Gesture).set(0.4);
        set.get_mut(ChannelKind::Content)
            .animate_to(0.0, Motion::tween(MS_100, linear));
        set.snap(false);
        assert!(set.at_rest());
        assert_eq!(set.value(ChannelKind::Gesture), 0.0);
        assert_eq!(set.value(ChannelKind::Appearance), 0.0);
    }
}
