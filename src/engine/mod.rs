//! Fixed-point engine for lexrule
//!
//! Repeatedly grounds every rule against the graph plus the facts derived so
//! far, schedules head conclusions, and flushes them until the interpretation
//! stops changing or `tmax` is reached.
//!
//! # Timestep (strict)
//!
//! 1. Overlay derived facts on the base label index
//! 2. For each rule, in `(rule_type, id)` order when deterministic:
//!    ground, group by head, check clause thresholds, compute the head
//!    interval, schedule at `t + delta`
//! 3. Flush the scheduler for `t`
//! 4. Test convergence: bound threshold, then change-count threshold, then
//!    quiescence (no change and nothing queued)
//!
//! # Invariants
//!
//! - The graph-derived index is built once per run and never mutated
//! - Rule order affects trace order only, never facts
//! - A failing rule or aggregator degrades the result; it never aborts a run

mod config;
mod engine;
mod errors;
mod evaluate;

pub use config::{EngineConfig, RunConfig};
pub use engine::{Engine, DEFAULT_AGGREGATOR};
pub use errors::{EngineError, EngineResult};
