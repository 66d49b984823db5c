#![forbid(unsafe_code)]

//! Shared handles and touch-surface bindings.
//!
//! Hosts keep a [`ControllerHandle`] (and optionally a [`SecondaryHandle`])
//! and hand a [`GestureBindings`] to their touch surface. The bindings hold
//! weak references only: once the overlay is dropped, late events from the
//! surface fall through silently.
//!
//! # Claim Routing
//!
//! With a secondary channel attached, both recognizers see the grant. The
//! first whose stream engages claims the gesture; the other is terminated
//! and ignores the rest of it. A bidirectional primary also wants upward
//! drags, so pairing it with a secondary channel is rejected.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use glide_core::gesture::GestureSample;
use glide_core::pointer::{PointerEvent, PointerPhase, VelocityTracker};
use glide_core::validation::{ConfigError, ConfigResult};

use crate::channel::{ChannelKind, ComposedOutputs};
use crate::config::GestureMode;
use crate::controller::{Command, Completion, TransitionController, TransitionState};
use crate::secondary::{SecondaryGestureChannel, ToggleMode};
use crate::style::{BackgroundStyle, ContainerStyle, ContentStyle};

fn dispatch(cell: &RefCell<TransitionController>, command: Command) -> bool {
    let (accepted, effects) = match cell.try_borrow_mut() {
        Ok(mut controller) => {
            let accepted = controller.apply(command);
            (accepted, controller.take_effects())
        }
        Err(_) => {
            tracing::trace!("controller busy, re-entrant call dropped");
            return false;
        }
    };
    effects.run();
    accepted
}

// ---------------------------------------------------------------------------
// ControllerHandle
// ---------------------------------------------------------------------------

/// Shared, clonable owner of a [`TransitionController`].
#[derive(Clone)]
pub struct ControllerHandle {
    inner: Rc<RefCell<TransitionController>>,
}

impl ControllerHandle {
    /// Wrap a controller.
    pub fn new(controller: TransitionController) -> Self {
        Self {
            inner: Rc::new(RefCell::new(controller)),
        }
    }

    /// Bindings for the primary recognizer only.
    pub fn bindings(&self) -> GestureBindings {
        GestureBindings {
            primary: Rc::downgrade(&self.inner),
            secondary: None,
            route: Cell::new(Route::Idle),
            tracker: RefCell::new(VelocityTracker::new()),
        }
    }

    /// Bindings routing between this controller and a secondary channel.
    pub fn bindings_with_secondary(&self, secondary: &SecondaryHandle) -> ConfigResult<GestureBindings> {
        if self.with(|c| c.config().gesture_mode) == GestureMode::Bidirectional {
            return Err(ConfigError::ConflictingRecognizers(
                "a bidirectional primary already handles upward drags",
            ));
        }
        let mut bindings = self.bindings();
        bindings.secondary = Some(Rc::downgrade(&secondary.inner));
        Ok(bindings)
    }

    /// Read the controller.
    pub fn with<R>(&self, f: impl FnOnce(&TransitionController) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// See [`TransitionController::mount`].
    pub fn mount(&self) {
        dispatch(&self.inner, Command::Mount);
    }

    /// See [`TransitionController::grant`].
    pub fn grant(&self) {
        dispatch(&self.inner, Command::Grant);
    }

    /// See [`TransitionController::move_to`].
    pub fn move_to(&self, sample: GestureSample) -> bool {
        dispatch(&self.inner, Command::Move(sample))
    }

    /// See [`TransitionController::release`].
    pub fn release(&self, sample: GestureSample) {
        dispatch(&self.inner, Command::Release(sample));
    }

    /// See [`TransitionController::terminate`].
    pub fn terminate(&self) {
        dispatch(&self.inner, Command::Terminate);
    }

    /// See [`TransitionController::handle_close`].
    pub fn handle_close(&self, on_complete: Option<Completion>) -> bool {
        dispatch(&self.inner, Command::Close(on_complete))
    }

    /// See [`TransitionController::handle_open`].
    pub fn handle_open(&self, on_complete: Option<Completion>) -> bool {
        dispatch(&self.inner, Command::Open(on_complete))
    }

    /// See [`TransitionController::tick`].
    pub fn tick(&self, dt: Duration) {
        dispatch(&self.inner, Command::Tick(dt));
    }

    /// See [`TransitionController::unmount`].
    pub fn unmount(&self) {
        dispatch(&self.inner, Command::Unmount);
    }

    /// Current state.
    pub fn state(&self) -> TransitionState {
        self.with(TransitionController::state)
    }

    /// See [`TransitionController::is_fully_hidden`].
    pub fn is_fully_hidden(&self) -> bool {
        self.with(TransitionController::is_fully_hidden)
    }

    /// See [`TransitionController::is_animating_in`].
    pub fn is_animating_in(&self) -> bool {
        self.with(TransitionController::is_animating_in)
    }

    /// Current value of one channel.
    pub fn channel_value(&self, kind: ChannelKind) -> f32 {
        self.with(|c| c.channel_value(kind))
    }

    /// Composed render outputs.
    pub fn composed(&self) -> ComposedOutputs {
        self.with(TransitionController::composed)
    }

    /// Background style with the host's fill.
    pub fn background_style<C>(&self, color: C) -> BackgroundStyle<C> {
        self.with(|c| c.background_style(color))
    }

    /// Container style.
    pub fn container_style(&self) -> ContainerStyle {
        self.with(TransitionController::container_style)
    }

    /// Content style.
    pub fn content_style(&self) -> ContentStyle {
        self.with(TransitionController::content_style)
    }
}

// ---------------------------------------------------------------------------
// SecondaryHandle
// ---------------------------------------------------------------------------

/// Shared, clonable owner of a [`SecondaryGestureChannel`].
#[derive(Clone)]
pub struct SecondaryHandle {
    inner: Rc<RefCell<SecondaryGestureChannel>>,
}

impl SecondaryHandle {
    /// Wrap a channel.
    pub fn new(channel: SecondaryGestureChannel) -> Self {
        Self {
            inner: Rc::new(RefCell::new(channel)),
        }
    }

    /// Read the channel.
    pub fn with<R>(&self, f: impl FnOnce(&SecondaryGestureChannel) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// See [`SecondaryGestureChannel::mount`].
    pub fn mount(&self) -> ToggleMode {
        match self.inner.try_borrow_mut() {
            Ok(mut channel) => channel.mount(),
            Err(_) => ToggleMode::Default,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> ToggleMode {
        self.with(SecondaryGestureChannel::mode)
    }

    /// Advance the toggle animation.
    pub fn tick(&self, dt: Duration) {
        self.update(|channel| channel.tick(dt));
    }

    /// See [`SecondaryGestureChannel::unmount`].
    pub fn unmount(&self) {
        self.update(SecondaryGestureChannel::unmount);
    }

    fn update(&self, f: impl FnOnce(&mut SecondaryGestureChannel)) {
        match self.inner.try_borrow_mut() {
            Ok(mut channel) => f(&mut channel),
            Err(_) => tracing::trace!("secondary channel busy, re-entrant call dropped"),
        }
    }
}

// ---------------------------------------------------------------------------
// GestureBindings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Idle,
    Pending,
    Primary,
    Secondary,
}

/// Touch-surface callbacks for one overlay.
pub struct GestureBindings {
    primary: Weak<RefCell<TransitionController>>,
    secondary: Option<Weak<RefCell<SecondaryGestureChannel>>>,
    route: Cell<Route>,
    tracker: RefCell<VelocityTracker>,
}

impl GestureBindings {
    /// A drag was granted to the surface.
    pub fn on_grant(&self) {
        self.route.set(Route::Pending);
        self.with_primary(|p| {
            dispatch(p, Command::Grant);
        });
        self.with_secondary(SecondaryGestureChannel::grant);
    }

    /// The drag moved.
    pub fn on_move(&self, sample: GestureSample) {
        match self.route.get() {
            Route::Idle => {}
            Route::Primary => {
                self.with_primary(|p| {
                    dispatch(p, Command::Move(sample));
                });
            }
            Route::Secondary => {
                self.with_secondary(|s| {
                    s.move_to(sample);
                });
            }
            Route::Pending => self.offer(sample),
        }
    }

    /// The drag was released.
    pub fn on_release(&self, sample: GestureSample) {
        let route = self.route.replace(Route::Idle);
        match route {
            Route::Idle => {}
            Route::Primary => {
                self.with_primary(|p| {
                    dispatch(p, Command::Release(sample));
                });
                self.with_secondary(SecondaryGestureChannel::terminate);
            }
            Route::Secondary => self.release_secondary(sample),
            Route::Pending => {
                self.with_primary(|p| {
                    dispatch(p, Command::Release(sample));
                });
                self.release_secondary(sample);
            }
        }
    }

    /// The platform took the drag away.
    pub fn on_terminate(&self) {
        self.route.set(Route::Idle);
        self.with_primary(|p| {
            dispatch(p, Command::Terminate);
        });
        self.with_secondary(SecondaryGestureChannel::terminate);
    }

    /// Feed a raw pointer event; velocity is tracked internally.
    pub fn handle_pointer(&self, event: PointerEvent) {
        match event.phase {
            PointerPhase::Down => {
                self.tracker
                    .borrow_mut()
                    .begin(event.position, event.timestamp);
                self.on_grant();
            }
            PointerPhase::Move => {
                let sample = self
                    .tracker
                    .borrow_mut()
                    .record(event.position, event.timestamp);
                if let Some(sample) = sample {
                    self.on_move(sample);
                }
            }
            PointerPhase::Up => {
                let sample = self
                    .tracker
                    .borrow_mut()
                    .finish(event.position, event.timestamp);
                match sample {
                    Some(sample) => self.on_release(sample),
                    None => self.on_terminate(),
                }
            }
            PointerPhase::Cancel => {
                self.tracker.borrow_mut().cancel();
                self.on_terminate();
            }
        }
    }

    fn offer(&self, sample: GestureSample) {
        let mut claimed = false;
        self.with_primary(|p| {
            claimed = dispatch(p, Command::Move(sample));
        });
        if claimed {
            self.route.set(Route::Primary);
            self.with_secondary(SecondaryGestureChannel::terminate);
            return;
        }
        let mut secondary_claimed = false;
        self.with_secondary(|s| secondary_claimed = s.move_to(sample));
        if secondary_claimed {
            tracing::trace!("secondary channel claimed the gesture");
            self.route.set(Route::Secondary);
            self.with_primary(|p| {
                dispatch(p, Command::Terminate);
            });
        }
    }

    fn release_secondary(&self, sample: GestureSample) {
        let Some(cell) = self.secondary.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        let effect = match cell.try_borrow_mut() {
            Ok(mut channel) => channel.release_inner(sample),
            Err(_) => {
                tracing::trace!("secondary channel busy, release dropped");
                None
            }
        };
        if let Some(effect) = effect {
            effect.run();
        }
    }

    fn with_primary(&self, f: impl FnOnce(&RefCell<TransitionController>)) {
        match self.primary.upgrade() {
            Some(cell) => f(&cell),
            None => tracing::trace!("gesture event for dropped controller"),
        }
    }

    fn with_secondary(&self, f: impl FnOnce(&mut SecondaryGestureChannel)) {
        let Some(cell) = self.secondary.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        match cell.try_borrow_mut() {
            Ok(mut channel) => f(&mut channel),
            Err(_) => tracing::trace!("secondary channel busy, gesture event dropped"),
        }
    }
}

impl std::fmt::Debug for GestureBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureBindings")
            .field("primary_alive", &(self.primary.strong_count() > 0))
            .field("has_secondary", &self.secondary.is_some())
            .field("route", &self.route.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransitionConfig;
    use crate::secondary::SecondaryConfig;
    use crate::style::OverlayLayout;
    use glide_core::geometry::Size;

    fn handle(config: TransitionConfig) -> ControllerHandle {
        let layout = OverlayLayout::centered(Size::new(400.0, 800.0)).unwrap();
        ControllerHandle::new(TransitionController::new(config.initially_open(true), layout).unwrap())
    }

    #[test]
    fn dropped_controller_is_silent() {
        let h = handle(TransitionConfig::new());
        let bindings = h.bindings();
        drop(h);
        bindings.on_grant();
        bindings.on_move(GestureSample::vertical(300.0));
        bindings.on_release(GestureSample::vertical(300.0));
    }

    #[test]
    fn completion_may_reenter_handle() {
        let h = handle(TransitionConfig::new());
        let reopen = h.clone();
        assert!(h.handle_close(Some(Box::new(move || {
            reopen.handle_open(None);
        }))));
        for _ in 0..30 {
            h.tick(Duration::from_millis(16));
        }
        assert!(h.is_animating_in());
    }

    #[test]
    fn bidirectional_primary_rejects_secondary() {
        let h = handle(TransitionConfig::bidirectional());
        let secondary =
            SecondaryHandle::new(SecondaryGestureChannel::new(SecondaryConfig::default(), 800.0).unwrap());
        let err = h.bindings_with_secondary(&secondary).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingRecognizers(_)));
    }

    #[test]
    fn pointer_events_drive_controller() {
        let h = handle(TransitionConfig::new());
        let bindings = h.bindings();
        bindings.handle_pointer(PointerEvent::down(200.0, 100.0, 0));
        for i in 1..=10u64 {
            bindings.handle_pointer(PointerEvent::moved(200.0, 100.0 + i as f32 * 50.0, i * 16));
        }
        assert_eq!(h.state(), TransitionState::GestureTracking);
        bindings.handle_pointer(PointerEvent::up(200.0, 600.0, 176));
        assert_eq!(h.state(), TransitionState::AnimatingOut);
    }

    #[test]
    fn cancel_springs_back() {
        let h = handle(TransitionConfig::new());
        let bindings = h.bindings();
        bindings.handle_pointer(PointerEvent::down(200.0, 100.0, 0));
        bindings.handle_pointer(PointerEvent::moved(200.0, 200.0, 16));
        bindings.handle_pointer(PointerEvent::cancel(32));
        assert_eq!(h.state(), TransitionState::SpringingBack);
    }
}
