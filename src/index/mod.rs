//! Label index subsystem for lexrule
//!
//! Label indices are derived, in-memory-only state built once per run from a
//! graph snapshot.
//!
//! # Design Principles
//!
//! - Derived state: the graph stays the source of truth
//! - Deterministic: every label→entity collection is a `BTreeSet`
//! - Injectable: label presence is decided by a `LabelPredicate`
//!
//! # Invariants
//!
//! - Built once, read-only for the duration of a run
//! - Edge adjacency (`out_neighbors`, `in_neighbors`) mirrors the edge sets
//! - Lookups iterate in ascending order

mod labels;
mod predicate;

pub use labels::{EdgeLabelIndex, IndexStats, LabelIndex, NodeLabelIndex};
pub use predicate::{LabelPredicate, TruthyPredicate};
