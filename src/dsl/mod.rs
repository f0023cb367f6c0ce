//! Rule DSL for lexrule
//!
//! A one-rule-per-line text format compiled into `NativeRule`s. Compilation
//! is lenient: anything malformed is skipped and reported, never fatal.
//! Compiled rules pass through the same `validate()` as rules built in code.

mod compiler;
mod errors;

pub use compiler::{Compilation, Diagnostic, RuleCompiler};
pub use errors::{DslError, DslResult};
