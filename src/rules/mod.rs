//! Rule model for lexrule
//!
//! Rules are plain values: a head (label + variables), body clauses, optional
//! per-clause thresholds, and either a fixed head bound or a named annotation
//! function with per-clause weights.
//!
//! # Invariants
//!
//! - Node rules have one head variable, edge rules two
//! - `ann_fn` and `head_bound` are mutually exclusive
//! - `thresholds` is empty or aligned with `clauses`
//! - `weights` is aligned with `clauses` whenever `ann_fn` is set
//!
//! Validation is structural only and runs once before a rule is used.

mod errors;
mod rule;
mod translate;

pub use errors::{RuleError, RuleResult};
pub use rule::{
    Clause, ClauseType, NativeRule, Quantifier, QuantifierType, RuleType, ThresholdBase,
    ThresholdMode, ThresholdSpec, DEFAULT_HEAD_BOUND,
};
pub use translate::{DescriptorTranslator, ForeignAtom, ForeignRuleDescriptor, Translator};
