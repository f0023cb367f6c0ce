//! Interval algebra for lexrule
//!
//! Every fact the engine records is a closed probability interval `[lower, upper]`.
//!
//! # Invariants
//!
//! - Bounds always lie within `[0, 1]`
//! - An inverted pair (`lower > upper`) is the vacuous interval `[0, 1]`
//! - Intersection never fails: a contradiction also yields `[0, 1]`
//! - `has_changed` compares against the last `reset()` snapshot

mod interval;

pub use interval::Interval;
