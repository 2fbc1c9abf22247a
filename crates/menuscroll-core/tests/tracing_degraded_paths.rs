//! Degraded paths are logged, never raised.

use std::sync::{Arc, Mutex};

use menuscroll_core::headless::{HeadlessContainer, ManualScheduler};
use menuscroll_core::{HostServices, MenuScrollConfig, MenuScrollController, Platform, ScrollState};
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: Vec<(String, String)>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0,
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    {
        let _guard = tracing::subscriber::set_default(subscriber);
        tracing::callsite::rebuild_interest_cache();
        f();
    }
    events.lock().unwrap().clone()
}

fn message(event: &CapturedEvent) -> Option<&str> {
    event
        .fields
        .iter()
        .find(|(name, _)| name == "message")
        .map(|(_, value)| value.as_str())
}

#[test]
fn read_failure_logs_each_attempt_then_warns_once() {
    let events = with_captured_events(|| {
        let host = HeadlessContainer::new(800.0, 400.0);
        host.fail_reads(true);
        let mut menu = MenuScrollController::new(
            MenuScrollConfig::default(),
            HostServices::with_scheduler(ManualScheduler::new()),
            Platform::Unknown,
        );
        menu.set_container(Some(host));
        assert_eq!(menu.state(), ScrollState::fallback());
    });

    let failed_attempts = events
        .iter()
        .filter(|e| e.level == tracing::Level::DEBUG && message(e) == Some("attempt failed"))
        .count();
    let fallbacks = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN && message(e) == Some("using fallback"))
        .count();
    assert_eq!(failed_attempts, 3);
    assert_eq!(fallbacks, 1);
}

#[test]
fn invalid_config_is_repaired_with_a_warning() {
    let events = with_captured_events(|| {
        let config = MenuScrollConfig::from_json_lenient(
            r#"{"tracker":{"scrollThreshold":-3},"touch":{"momentumDecay":4.0}}"#,
        );
        let menu = MenuScrollController::new(
            config,
            HostServices::with_scheduler(ManualScheduler::new()),
            Platform::Unknown,
        );
        assert_eq!(menu.config().tracker.scroll_threshold, 5.0);
        assert_eq!(menu.touch_config().momentum_decay, 0.95);
    });

    let warnings = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .count();
    assert!(warnings >= 2, "expected threshold and decay warnings, got {warnings}");
}
