#![forbid(unsafe_code)]

//! Structured logging emitted by the runtime.
//!
//!   cargo test -p glide-runtime --test tracing_tests

use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use glide_core::geometry::Size;
use glide_core::gesture::GestureSample;
use glide_runtime::{
    ControllerHandle, KeyValueStore, OverlayLayout, SecondaryConfig, SecondaryGestureChannel,
    SecondaryHandle, StorageError, StorageResult, TransitionConfig, TransitionController,
};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: Vec<(String, String)>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let value = format!("{value:?}");
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor {
            message: String::new(),
            fields: Vec::new(),
        };
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture {
        events: Arc::clone(&events),
    });
    let result = tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    (result, captured)
}

struct OfflineStore;

impl KeyValueStore for OfflineStore {
    fn name(&self) -> &str {
        "OfflineStore"
    }

    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("offline".into()))
    }

    fn clear(&self) -> StorageResult<()> {
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn persist_failure_is_a_warning() {
    let (toggled, events) = capture(|| {
        let mut ch = SecondaryGestureChannel::new(SecondaryConfig::default(), 800.0)
            .unwrap()
            .store(Rc::new(OfflineStore));
        ch.mount();
        ch.grant();
        ch.move_to(GestureSample::vertical(-300.0));
        ch.release(GestureSample::vertical(-300.0).with_vy(-1.0))
    });
    assert!(toggled);
    let warning = events
        .iter()
        .find(|e| e.level == tracing::Level::WARN)
        .expect("a warning");
    assert!(warning.message.contains("failed to persist"));
    assert_eq!(warning.field("store"), Some("OfflineStore"));
}

#[test]
fn transitions_are_logged_with_generation() {
    let (_, events) = capture(|| {
        let layout = OverlayLayout::centered(Size::new(400.0, 800.0)).unwrap();
        let mut c =
            TransitionController::new(TransitionConfig::new().initially_open(true), layout).unwrap();
        c.handle_close(None);
        for _ in 0..40 {
            c.tick(Duration::from_millis(16));
        }
    });
    let debug: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::DEBUG)
        .collect();
    assert!(debug.iter().any(|e| e.message == "transition" && e.field("generation") == Some("1")));
    assert!(debug.iter().any(|e| e.message == "transition settled"));
}

#[test]
fn quiet_tick_logs_nothing() {
    let (_, events) = capture(|| {
        let layout = OverlayLayout::centered(Size::new(400.0, 800.0)).unwrap();
        let mut c = TransitionController::new(TransitionConfig::new(), layout).unwrap();
        for _ in 0..10 {
            c.tick(Duration::from_millis(16));
        }
    });
    assert!(events.is_empty(), "unexpected events: {events:?}");
}

#[test]
fn busy_secondary_is_traced() {
    let (_, events) = capture(|| {
        let layout = OverlayLayout::centered(Size::new(400.0, 800.0)).unwrap();
        let primary = ControllerHandle::new(
            TransitionController::new(TransitionConfig::new().initially_open(true), layout).unwrap(),
        );
        let secondary = SecondaryHandle::new(
            SecondaryGestureChannel::new(SecondaryConfig::default(), 800.0).unwrap(),
        );
        let bindings = primary.bindings_with_secondary(&secondary).unwrap();
        // Holding a read borrow makes the secondary unavailable to the bindings.
        secondary.with(|_| bindings.on_grant());
    });
    assert!(events.iter().any(|e| {
        e.level == tracing::Level::TRACE && e.message == "secondary channel busy, gesture event dropped"
    }));
}
