//! Observability subsystem for lexrule
//!
//! - Structured logging (JSON lines on stderr)
//! - Engine counters
//! - Lifecycle event names
//!
//! # Principles
//!
//! 1. Observability is read-only: nothing here changes a run's result
//! 2. No async or background threads
//! 3. Deterministic line format

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Logs a lifecycle event; degraded events go out at WARN.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_degraded() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

/// Logs a per-step event at INFO when `verbose`, otherwise at TRACE.
pub fn log_step(event: Event, verbose: bool, fields: &[(&str, &str)]) {
    let severity = if verbose { Severity::Info } else { Severity::Trace };
    Logger::log(severity, event.as_str(), fields);
}
