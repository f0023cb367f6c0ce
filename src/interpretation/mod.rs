//! Interpretation subsystem for lexrule
//!
//! The interpretation is the mutable fact store of one run: statement keys
//! mapped to intervals, an ordered debug trace, and optional support paths.
//!
//! # Statement keys
//!
//! Keys are `Label(arg)` for node facts and `Label(arg1,arg2)` for edge facts,
//! with no internal whitespace. External validators consume this format.
//!
//! # Invariants
//!
//! - Only the scheduler's flush writes facts during a run
//! - All maps are ordered, so every export is byte-stable

mod export;
mod interpretation;
mod statement;

pub use export::{ExportProfile, Redaction};
pub use interpretation::{FactRecord, Interpretation, SupportPath, TraceEvent, TraceKind};
pub use statement::Statement;
