use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// One recorded log event.
#[derive(Debug, Clone, Serialize)]
pub struct CapturedEvent {
    /// Level name as printed by `tracing`, e.g. `INFO`.
    pub level: String,
    /// Module path or explicit `target:` of the event.
    pub target: String,
    /// The event's `message` field, empty when none was given.
    pub message: String,
    /// Structured fields other than `message`.
    pub fields: HashMap<String, serde_json::Value>,
}

impl CapturedEvent {
    /// A field rendered as a string, whatever its recorded type.
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Shared storage for captured events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<RwLock<Vec<CapturedEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A layer that appends to this log.
    pub fn layer(&self) -> CaptureLayer {
        CaptureLayer { log: self.clone() }
    }

    /// All events recorded so far.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.read().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events whose message equals `message`.
    pub fn find(&self, message: &str) -> Vec<CapturedEvent> {
        self.events().into_iter().filter(|e| e.message == message).collect()
    }

    fn push(&self, event: CapturedEvent) {
        if let Ok(mut events) = self.events.write() {
            events.push(event);
        }
    }
}

/// A tracing layer that records events in an [`EventLog`].
pub struct CaptureLayer {
    log: EventLog,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);
        let mut fields = visitor.0;
        let message = match fields.remove("message") {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let metadata = event.metadata();
        self.log.push(CapturedEvent {
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            message,
            fields,
        });
    }
}

#[derive(Default)]
struct JsonVisitor(HashMap<String, serde_json::Value>);

impl tracing::field::Visit for JsonVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::Value::Bool(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }
}
