use std::io::{self, IsTerminal};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the global subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line text, ANSI colours on a terminal.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Build the `RUST_LOG` filter, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a text subscriber tagged with `service_name`.
///
/// Returns an error if a global subscriber is already set.
pub fn init_telemetry(service_name: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init(service_name, LogFormat::Text)
}

/// Install a JSON subscriber tagged with `service_name`.
pub fn init_with_json(service_name: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init(service_name, LogFormat::Json)
}

/// Install the global subscriber in the given format.
///
/// Logs go to stderr so answers printed on stdout stay clean.
pub fn init(
    service_name: &str,
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let registry = tracing_subscriber::registry().with(env_filter());
    match format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_ansi(io::stderr().is_terminal())
                    .with_target(true)
                    .compact(),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .try_init()?,
    }

    tracing::info!(service.name = service_name, ?format, "telemetry initialized");
    Ok(())
}
