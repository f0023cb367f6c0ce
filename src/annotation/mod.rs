//! Annotation functions for lexrule
//!
//! An annotation function maps the matched evidence of a rule body (one
//! interval list per clause) plus per-clause weights to a single head interval.
//!
//! # Design Principles
//!
//! - Pure: no state, no side effects
//! - Injectable: the engine receives an `AnnotationRegistry`; custom
//!   aggregators are registered by name without touching engine internals
//! - Closed: every result passes through `Interval::closed`, so inverted or
//!   out-of-range bounds come back as `[0, 1]` or clamped
//!
//! The `*_alpha` functions are mild placeholders for interpretive canons, not
//! a policy model. Their adjustment magnitude is `AnnotationContext::alpha`.

mod errors;
mod functions;
mod registry;

pub use errors::{AnnotationError, AnnotationResult};
pub use functions::{
    average, average_lower, legal_burden_civil_051, legal_burden_clear_075,
    legal_burden_criminal_090, legal_conservative_min, lenity_alpha, maximum, minimum,
    precedent_weighted, purposivism_alpha, textualism_alpha, AnnotationContext,
};
pub use registry::{AnnotationFn, AnnotationRegistry, BUILTIN_FUNCTIONS};
