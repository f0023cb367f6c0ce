//! Grounder subsystem for lexrule
//!
//! Produces variable assignments satisfying a rule's clause structure.
//!
//! # Join Ordering (strict)
//!
//! 1. Node and edge clauses ordered by estimated cardinality (label count)
//! 2. Ties broken by original clause position
//! 3. Comparison clauses never bind and are not joined
//!
//! Binding state is known statically once the order is fixed, so every step
//! carries its strategy (scan, filter, adjacency expansion) in the plan.
//!
//! # Invariants
//!
//! - Deterministic: same index + same rule → same assignments, same order
//! - Early exit: the first clause producing no assignment empties the result
//! - Output sorted lexicographically by `(variable, value)` pairs

mod grounder;
mod plan;

pub use grounder::{Assignment, Grounder};
pub use plan::{JoinPlan, JoinStep, JoinStrategy};
