//! Threshold evaluation for lexrule
//!
//! Decides whether a clause is satisfied from its match counts.

mod evaluator;

pub use evaluator::{evaluate_threshold, ClauseCounts};
