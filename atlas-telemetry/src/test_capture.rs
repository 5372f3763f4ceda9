use tracing_subscriber::layer::SubscriberExt;

use crate::EventLog;

#[test]
fn captures_message_level_and_structured_fields() {
    let log = EventLog::new();
    let subscriber = tracing_subscriber::registry().with(log.layer());

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(chunk_count = 12u64, source = "vergi.pdf", "processed documents");
        tracing::warn!(reranker = "tei", degraded = true, "reranking degraded");
    });

    let events = log.events();
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].level, "INFO");
    assert_eq!(events[0].target, module_path!());
    assert_eq!(events[0].message, "processed documents");
    assert_eq!(events[0].field("chunk_count").as_deref(), Some("12"));
    assert_eq!(events[0].field("source").as_deref(), Some("vergi.pdf"));
    assert!(!events[0].fields.contains_key("message"));

    let degraded = log.find("reranking degraded");
    assert_eq!(degraded.len(), 1);
    assert_eq!(degraded[0].level, "WARN");
    assert_eq!(degraded[0].fields["degraded"], serde_json::Value::Bool(true));
}

#[test]
fn display_fields_are_recorded_as_strings() {
    let log = EventLog::new();
    let subscriber = tracing_subscriber::registry().with(log.layer());
    let error = std::io::Error::other("connection reset");

    tracing::subscriber::with_default(subscriber, || {
        tracing::error!(target: "atlas::llm", error = %error, "completion failed");
    });

    let events = log.find("completion failed");
    assert_eq!(events[0].target, "atlas::llm");
    assert_eq!(events[0].field("error").as_deref(), Some("connection reset"));
}

#[test]
fn logs_are_independent() {
    let first = EventLog::new();
    let second = EventLog::new();

    tracing::subscriber::with_default(tracing_subscriber::registry().with(first.layer()), || {
        tracing::info!("only in first");
    });

    assert_eq!(first.events().len(), 1);
    assert!(second.events().is_empty());
}

#[test]
fn default_filter_is_info() {
    assert_eq!(crate::DEFAULT_FILTER, "info");
    assert_eq!(crate::LogFormat::default(), crate::LogFormat::Text);
}
