#![forbid(unsafe_code)]

//! Transition controller: the state machine behind one overlay.
//!
//! # State Machine
//!
//! ```text
//!   Hidden ──open──▶ AnimatingIn ──rest──▶ Open ──close──▶ AnimatingOut ──rest──▶ Hidden
//!                        ▲                  │                   ▲
//!                        │                grant                 │
//!                        │                  ▼                   │
//!                        └─release open─ GestureTracking ─release close
//!                                           │
//!                               release none / terminate
//!                                           ▼
//!                                     SpringingBack ──rest──▶ Open
//! ```
//!
//! A grant is also accepted while AnimatingIn, AnimatingOut or SpringingBack:
//! the running animation is frozen where it is and the drag takes over.
//!
//! # Generations
//!
//! Every transition start (and every grant) bumps a generation counter and
//! discards completions registered under older generations. A completion
//! therefore runs at most once, after its own animation comes to rest, and
//! never after it has been superseded.
//!
//! # Effects
//!
//! Callbacks, completions and haptic impacts are queued while the controller
//! updates its state and run afterwards. Through a
//! [`ControllerHandle`](crate::surface::ControllerHandle) they run after the
//! shared borrow is released, so a callback may call back into the handle.
//!
//! # Failure Modes
//!
//! - Calls after [`unmount`](TransitionController::unmount): dropped (trace log).
//! - Grant while Hidden, moves outside a gesture: ignored.
//! - Repeated close while already closing: ignored, returns `false`.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use glide_core::animation::{ease_in, ease_out_cubic};
use glide_core::gesture::{GestureSample, GestureSampleStream};
use glide_core::threshold::{Decision, ThresholdDecider};
use glide_core::validation::ConfigResult;

use crate::channel::{AnimationChannelSet, ChannelKind, ComposedOutputs, Motion};
use crate::config::TransitionConfig;
use crate::haptics::{self, HapticFeedback, ImpactStyle};
use crate::style::{BackgroundStyle, ContainerStyle, ContentStyle, OverlayLayout};

/// Shared notification callback.
pub type Callback = Rc<dyn Fn()>;

/// One-shot completion for an imperative open or close.
pub type Completion = Box<dyn FnOnce()>;

/// Where an overlay is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionState {
    /// Not visible.
    Hidden,
    /// Growing out of the anchor.
    AnimatingIn,
    /// Fully visible and at rest.
    Open,
    /// Following a drag.
    GestureTracking,
    /// Collapsing back into the anchor.
    AnimatingOut,
    /// Returning to Open after a drag that did not trigger.
    SpringingBack,
}

impl TransitionState {
    /// Whether an animation is running.
    pub fn is_animating(self) -> bool {
        matches!(
            self,
            Self::AnimatingIn | Self::AnimatingOut | Self::SpringingBack
        )
    }

    /// Whether any part of the overlay may be on screen.
    pub fn is_visible(self) -> bool {
        self != Self::Hidden
    }

    fn impact(self) -> Option<ImpactStyle> {
        match self {
            Self::AnimatingOut => Some(ImpactStyle::Medium),
            Self::AnimatingIn | Self::SpringingBack => Some(ImpactStyle::Light),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Mounted,
    Unmounted,
}

enum Finish {
    Default,
    Custom(Completion),
}

struct PendingCompletion {
    generation: u64,
    finish: Finish,
}

enum Effect {
    Notify(Callback),
    Complete(Completion),
    Impact(Rc<dyn HapticFeedback>, ImpactStyle),
}

/// Deferred side effects of one controller call.
#[must_use]
pub(crate) struct Effects(Vec<Effect>);

impl Effects {
    pub(crate) fn run(self) {
        for effect in self.0 {
            match effect {
                Effect::Notify(callback) => callback(),
                Effect::Complete(completion) => completion(),
                Effect::Impact(device, style) => haptics::fire(device.as_ref(), style),
            }
        }
    }
}

/// A controller input. Public methods and the shared handle both go through here.
pub(crate) enum Command {
    Mount,
    Grant,
    Move(GestureSample),
    Release(GestureSample),
    Terminate,
    Open(Option<Completion>),
    Close(Option<Completion>),
    Tick(Duration),
    Unmount,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Mount => "mount",
            Self::Grant => "grant",
            Self::Move(_) => "move",
            Self::Release(_) => "release",
            Self::Terminate => "terminate",
            Self::Open(_) => "open",
            Self::Close(_) => "close",
            Self::Tick(_) => "tick",
            Self::Unmount => "unmount",
        }
    }
}

// ---------------------------------------------------------------------------
// TransitionController
// ---------------------------------------------------------------------------

/// Drives one overlay's channels from gestures and imperative calls.
pub struct TransitionController {
    config: TransitionConfig,
    layout: OverlayLayout,
    channels: AnimationChannelSet,
    stream: GestureSampleStream,
    decider: ThresholdDecider,
    state: TransitionState,
    lifecycle: Lifecycle,
    generation: u64,
    fully_hidden: bool,
    pending: Vec<PendingCompletion>,
    outbox: Vec<Effect>,
    on_close: Option<Callback>,
    on_open: Option<Callback>,
    on_swipe_start: Option<Callback>,
    on_swipe_end: Option<Callback>,
    haptics: Option<Rc<dyn HapticFeedback>>,
}

impl TransitionController {
    /// Create a controller seeded Hidden (or Open when `initially_open`).
    pub fn new(config: TransitionConfig, layout: OverlayLayout) -> ConfigResult<Self> {
        let config = config.validate()?;
        let stream = GestureSampleStream::new(
            config.stream_config(),
            config.normalizer()?,
            layout.viewport().height,
        )?;
        let decider = ThresholdDecider::new(config.thresholds)?;
        let open = config.initially_open;
        Ok(Self {
            channels: AnimationChannelSet::new(open),
            stream,
            decider,
            state: if open {
                TransitionState::Open
            } else {
                TransitionState::Hidden
            },
            lifecycle: Lifecycle::Created,
            generation: 0,
            fully_hidden: !open,
            pending: Vec::new(),
            outbox: Vec::new(),
            on_close: None,
            on_open: None,
            on_swipe_start: None,
            on_swipe_end: None,
            haptics: None,
            config,
            layout,
        })
    }

    /// Called when the overlay finishes closing without a custom completion.
    #[must_use]
    pub fn on_close(mut self, f: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(f));
        self
    }

    /// Called when the overlay finishes opening without a custom completion.
    #[must_use]
    pub fn on_open(mut self, f: impl Fn() + 'static) -> Self {
        self.on_open = Some(Rc::new(f));
        self
    }

    /// Called when a drag takes over.
    #[must_use]
    pub fn on_swipe_start(mut self, f: impl Fn() + 'static) -> Self {
        self.on_swipe_start = Some(Rc::new(f));
        self
    }

    /// Called once when that drag is released or terminated.
    #[must_use]
    pub fn on_swipe_end(mut self, f: impl Fn() + 'static) -> Self {
        self.on_swipe_end = Some(Rc::new(f));
        self
    }

    /// Device used for transition impacts.
    #[must_use]
    pub fn haptics(mut self, device: Rc<dyn HapticFeedback>) -> Self {
        self.haptics = Some(device);
        self
    }

    // ---- Public operations ----

    /// Attach to the host. Starts the entry animation when auto-play is configured.
    pub fn mount(&mut self) {
        self.run(Command::Mount);
    }

    /// A drag was granted to this overlay.
    pub fn grant(&mut self) {
        self.run(Command::Grant);
    }

    /// The drag moved. Returns `true` if the sample was forwarded to the channels.
    pub fn move_to(&mut self, sample: GestureSample) -> bool {
        self.run(Command::Move(sample))
    }

    /// The drag was released.
    pub fn release(&mut self, sample: GestureSample) {
        self.run(Command::Release(sample));
    }

    /// The platform took the drag away.
    pub fn terminate(&mut self) {
        self.run(Command::Terminate);
    }

    /// Start closing. Returns `false` if already hidden or closing.
    pub fn handle_close(&mut self, on_complete: Option<Completion>) -> bool {
        self.run(Command::Close(on_complete))
    }

    /// Start opening. Returns `false` if already open or opening.
    pub fn handle_open(&mut self, on_complete: Option<Completion>) -> bool {
        self.run(Command::Open(on_complete))
    }

    /// Advance all animations by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.run(Command::Tick(dt));
    }

    /// Detach: stop channels, drop pending completions, ignore later calls.
    pub fn unmount(&mut self) {
        self.run(Command::Unmount);
    }

    fn run(&mut self, command: Command) -> bool {
        let accepted = self.apply(command);
        self.take_effects().run();
        accepted
    }

    // ---- Accessors ----

    /// Current state.
    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the last close finished and nothing has reopened the overlay.
    pub fn is_fully_hidden(&self) -> bool {
        self.fully_hidden
    }

    /// Whether the entry animation is running.
    pub fn is_animating_in(&self) -> bool {
        self.state == TransitionState::AnimatingIn
    }

    /// Whether the controller has been unmounted.
    pub fn is_unmounted(&self) -> bool {
        self.lifecycle == Lifecycle::Unmounted
    }

    /// Whether the current drag has passed the gate.
    pub fn is_gesture_engaged(&self) -> bool {
        self.state == TransitionState::GestureTracking && self.stream.is_engaged()
    }

    /// Number of completions waiting for their animation.
    pub fn pending_completions(&self) -> usize {
        self.pending.len()
    }

    /// The validated configuration.
    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Current layout.
    pub fn layout(&self) -> &OverlayLayout {
        &self.layout
    }

    /// Replace the layout (rotation, resize, anchor moved).
    pub fn set_layout(&mut self, layout: OverlayLayout) -> ConfigResult<()> {
        self.stream.set_viewport_extent(layout.viewport().height)?;
        self.layout = layout;
        Ok(())
    }

    /// Current value of one channel.
    pub fn channel_value(&self, kind: ChannelKind) -> f32 {
        self.channels.value(kind)
    }

    /// Composed render outputs.
    pub fn composed(&self) -> ComposedOutputs {
        self.channels
            .compose(self.layout.max_scale(self.config.origin_diameter))
    }

    /// Background style with the host's fill.
    pub fn background_style<C>(&self, color: C) -> BackgroundStyle<C> {
        BackgroundStyle::compose(
            &self.layout,
            self.config.origin_diameter,
            &self.composed(),
            color,
        )
    }

    /// Container style.
    pub fn container_style(&self) -> ContainerStyle {
        ContainerStyle {
            opacity: self.composed().opacity,
        }
    }

    /// Content style.
    pub fn content_style(&self) -> ContentStyle {
        ContentStyle {
            opacity: self.composed().content_opacity,
        }
    }

    // ---- Command handling ----

    pub(crate) fn take_effects(&mut self) -> Effects {
        Effects(std::mem::take(&mut self.outbox))
    }

    pub(crate) fn apply(&mut self, command: Command) -> bool {
        if self.lifecycle == Lifecycle::Unmounted {
            tracing::trace!(command = command.name(), "dropped call after unmount");
            return false;
        }
        match command {
            Command::Mount => self.mount_inner(),
            Command::Grant => self.grant_inner(),
            Command::Move(sample) => self.move_inner(sample),
            Command::Release(sample) => self.release_inner(sample),
            Command::Terminate => self.terminate_inner(),
            Command::Open(completion) => self.open_inner(completion),
            Command::Close(completion) => self.close_inner(completion),
            Command::Tick(dt) => self.tick_inner(dt),
            Command::Unmount => self.unmount_inner(),
        }
    }

    fn mount_inner(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Created {
            return false;
        }
        self.lifecycle = Lifecycle::Mounted;
        if self.config.auto_play_entry_animation && self.state == TransitionState::Hidden {
            self.start_entry(Finish::Default, true);
        }
        true
    }

    fn grant_inner(&mut self) -> bool {
        match self.state {
            TransitionState::Hidden => {
                tracing::trace!("grant ignored while hidden");
                false
            }
            TransitionState::GestureTracking => {
                self.stream.on_grant();
                true
            }
            _ => {
                self.begin(TransitionState::GestureTracking);
                self.stream.on_grant();
                self.notify(self.on_swipe_start.clone());
                true
            }
        }
    }

    fn move_inner(&mut self, sample: GestureSample) -> bool {
        if self.state != TransitionState::GestureTracking {
            return false;
        }
        match self.stream.on_move(sample) {
            Some(forwarded) => {
                let progress = self.stream.live_progress(&forwarded);
                self.channels.get_mut(ChannelKind::Gesture).set(progress);
                true
            }
            None => false,
        }
    }

    fn release_inner(&mut self, sample: GestureSample) -> bool {
        if self.state != TransitionState::GestureTracking {
            return false;
        }
        if self.resume_quietly() {
            self.stream.on_terminate();
            return true;
        }
        let outcome = self.stream.on_release(sample);
        let decision = self.decider.decide(&outcome);
        tracing::debug!(
            direction = ?outcome.direction,
            progress = outcome.final_progress,
            velocity = outcome.velocity,
            ?decision,
            "gesture released"
        );
        self.notify(self.on_swipe_end.clone());
        match decision {
            Decision::Close => self.start_exit(Finish::Default),
            Decision::Open => self.start_entry(Finish::Default, false),
            Decision::None => self.start_spring_back(),
        }
        true
    }

    fn terminate_inner(&mut self) -> bool {
        if self.state != TransitionState::GestureTracking {
            return false;
        }
        if self.resume_quietly() {
            self.stream.on_terminate();
            return true;
        }
        self.stream.on_terminate();
        self.notify(self.on_swipe_end.clone());
        self.start_spring_back();
        true
    }

    /// A drag that never engaged over a fully open overlay returns straight
    /// to Open, without a spring or an impact.
    fn resume_quietly(&mut self) -> bool {
        if self.stream.is_engaged() || !self.channels.is_open_at_rest() {
            return false;
        }
        tracing::trace!("unengaged drag ended over open overlay");
        self.state = TransitionState::Open;
        self.notify(self.on_swipe_end.clone());
        true
    }

    fn close_inner(&mut self, completion: Option<Completion>) -> bool {
        match self.state {
            TransitionState::Hidden | TransitionState::AnimatingOut => {
                tracing::trace!(state = ?self.state, "close ignored");
                return false;
            }
            TransitionState::GestureTracking => {
                self.stream.on_terminate();
                self.notify(self.on_swipe_end.clone());
            }
            _ => {}
        }
        let finish = completion.map_or(Finish::Default, Finish::Custom);
        if self.config.override_close_animation {
            self.begin(TransitionState::Hidden);
            self.channels.snap(false);
            self.fully_hidden = true;
            self.finish(finish, TransitionState::Hidden);
        } else {
            self.start_exit(finish);
        }
        true
    }

    fn open_inner(&mut self, completion: Option<Completion>) -> bool {
        match self.state {
            TransitionState::Open
            | TransitionState::AnimatingIn
            | TransitionState::GestureTracking => {
                tracing::trace!(state = ?self.state, "open ignored");
                false
            }
            TransitionState::Hidden => {
                self.start_entry(completion.map_or(Finish::Default, Finish::Custom), true);
                true
            }
            TransitionState::AnimatingOut | TransitionState::SpringingBack => {
                self.start_entry(completion.map_or(Finish::Default, Finish::Custom), false);
                true
            }
        }
    }

    fn tick_inner(&mut self, dt: Duration) -> bool {
        if !self.channels.tick(dt) {
            return false;
        }
        let settled = match self.state {
            TransitionState::AnimatingIn | TransitionState::SpringingBack => TransitionState::Open,
            TransitionState::AnimatingOut => {
                self.fully_hidden = true;
                TransitionState::Hidden
            }
            other => return other != TransitionState::GestureTracking,
        };
        tracing::debug!(from = ?self.state, to = ?settled, generation = self.generation, "transition settled");
        self.state = settled;
        let generation = self.generation;
        let (current, stale): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.generation == generation);
        self.pending = stale;
        for pending in current {
            self.finish(pending.finish, settled);
        }
        true
    }

    fn unmount_inner(&mut self) -> bool {
        self.lifecycle = Lifecycle::Unmounted;
        self.channels.stop_all();
        self.stream.on_terminate();
        let dropped = self.pending.len();
        self.pending.clear();
        self.outbox.clear();
        tracing::debug!(dropped, "controller unmounted");
        true
    }

    // ---- Transitions ----

    /// Supersede whatever is running and enter `next`.
    fn begin(&mut self, next: TransitionState) {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let before = self.pending.len();
        self.pending.retain(|p| p.generation == generation);
        if before > self.pending.len() {
            tracing::trace!(
                discarded = before - self.pending.len(),
                "superseded pending completions"
            );
        }
        self.channels.stop_all();
        tracing::debug!(from = ?self.state, to = ?next, generation, "transition");
        self.state = next;
        if let Some(style) = next.impact() {
            self.impact(style);
        }
    }

    fn start_exit(&mut self, finish: Finish) {
        self.begin(TransitionState::AnimatingOut);
        let duration = self.config.animation_duration;
        for kind in ChannelKind::ALL {
            self.channels
                .get_mut(kind)
                .animate_to(0.0, Motion::tween(duration, ease_in));
        }
        self.push_pending(finish);
    }

    fn start_entry(&mut self, finish: Finish, stagger_content: bool) {
        self.begin(TransitionState::AnimatingIn);
        self.fully_hidden = false;
        let duration = self.config.animation_duration;
        let content_motion = if stagger_content {
            let (wait, rest) = self.config.content_timing();
            Motion::staggered(wait, rest, ease_out_cubic)
        } else {
            Motion::tween(duration, ease_out_cubic)
        };
        self.channels
            .get_mut(ChannelKind::Appearance)
            .animate_to(1.0, Motion::tween(duration, ease_out_cubic));
        self.channels
            .get_mut(ChannelKind::Content)
            .animate_to(1.0, content_motion);
        self.channels
            .get_mut(ChannelKind::Gesture)
            .animate_to(0.0, Motion::tween(duration, ease_out_cubic));
        self.push_pending(finish);
    }

    fn start_spring_back(&mut self) {
        self.begin(TransitionState::SpringingBack);
        let duration = self.config.animation_duration;
        self.channels
            .get_mut(ChannelKind::Appearance)
            .animate_to(1.0, Motion::tween(duration, ease_out_cubic));
        self.channels
            .get_mut(ChannelKind::Content)
            .animate_to(1.0, Motion::tween(duration, ease_out_cubic));
        self.channels
            .get_mut(ChannelKind::Gesture)
            .animate_to(0.0, Motion::spring(self.config.spring));
    }

    // ---- Effects ----

    fn push_pending(&mut self, finish: Finish) {
        self.pending.push(PendingCompletion {
            generation: self.generation,
            finish,
        });
    }

    fn finish(&mut self, finish: Finish, settled: TransitionState) {
        match finish {
            Finish::Custom(completion) => self.outbox.push(Effect::Complete(completion)),
            Finish::Default => {
                let callback = match settled {
                    TransitionState::Hidden => self.on_close.clone(),
                    TransitionState::Open => self.on_open.clone(),
                    _ => None,
                };
                self.notify(callback);
            }
        }
    }

    fn notify(&mut self, callback: Option<Callback>) {
        if let Some(callback) = callback {
            self.outbox.push(Effect::Notify(callback));
        }
    }

    fn impact(&mut self, style: ImpactStyle) {
        if !self.config.haptics_enabled {
            return;
        }
        if let Some(device) = &self.haptics {
            self.outbox.push(Effect::Impact(Rc::clone(device), style));
        }
    }
}

impl fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionController")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("fully_hidden", &self.fully_hidden)
            .field("pending", &self.pending.len())
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}
