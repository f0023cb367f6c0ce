//! lexrule - probabilistic fixed-point rule engine over labeled graphs
//!
//! Facts carry `[lower, upper]` truth intervals. Rules are grounded against
//! a label index, gated by clause thresholds, aggregated into head bounds and
//! scheduled across discrete timesteps until the interpretation converges.

pub mod annotation;
pub mod cli;
pub mod dsl;
pub mod engine;
pub mod graph;
pub mod grounder;
pub mod index;
pub mod interpretation;
pub mod interval;
pub mod observability;
pub mod rules;
pub mod scheduler;
pub mod threshold;
