//! # atlas-telemetry
//!
//! Logging setup for the Atlas document assistant.
//!
//! - [`init_telemetry`] installs a human-readable `fmt` subscriber
//! - [`init_with_json`] installs a JSON-lines subscriber for log shippers
//! - [`EventLog`] and [`CaptureLayer`] record events in memory so tests can
//!   assert on structured fields
//!
//! Both initialisers honour `RUST_LOG` and fall back to `info`.

mod capture;
mod init;

pub use capture::{CaptureLayer, CapturedEvent, EventLog};
pub use init::{DEFAULT_FILTER, LogFormat, env_filter, init, init_telemetry, init_with_json};

#[cfg(test)]
mod test_capture;
