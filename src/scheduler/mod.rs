//! Temporal scheduler for lexrule
//!
//! Holds updates keyed by effective timestep and merges them into the
//! interpretation at flush time.
//!
//! # Merge Rules (strict)
//!
//! - `intersection`: the meet of every candidate interval for a statement,
//!   computed in one pass so arrival order cannot matter
//! - `override`: the narrowest candidate wins; ties go to the smaller source
//!   rule id, then to the smaller `(lower, upper)`
//!
//! # Invariants
//!
//! - A statement written static is never written again
//! - No read-your-write: updates for `t` become visible only after `flush(t)`
//! - Statement strings are interned once; the hot path moves `u32` ids

mod arena;
mod scheduler;

pub use arena::{StatementArena, StatementId, StaticSet};
pub use scheduler::{FlushStats, ScheduledUpdate, Scheduler, UpdateMode};
