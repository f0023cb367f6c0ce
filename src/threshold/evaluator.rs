//! Clause satisfaction from match counts
//!
//! - `number` mode compares the satisfied count directly
//! - `percent` mode compares `100 * satisfied / base` (0 when the base is 0)
//! - the base is `available` when requested and known, otherwise `total`

use crate::rules::{ThresholdBase, ThresholdMode, ThresholdSpec};

/// Match counts for one clause within one head group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClauseCounts {
    /// Matches whose evidence lies within the clause bound
    pub satisfied: usize,
    /// Distinct matches
    pub total: usize,
    /// Matches with informative (non-vacuous) evidence
    pub available: Option<usize>,
}

impl ClauseCounts {
    pub fn evaluate(&self, threshold: &ThresholdSpec) -> bool {
        evaluate_threshold(
            threshold,
            self.satisfied as f64,
            self.total as f64,
            self.available.map(|a| a as f64),
        )
    }
}

/// Evaluates `threshold` against the given counts.
pub fn evaluate_threshold(
    threshold: &ThresholdSpec,
    satisfied: f64,
    total: f64,
    available: Option<f64>,
) -> bool {
    let base = match (threshold.quantifier_type.base, available) {
        (ThresholdBase::Available, Some(a)) => a,
        _ => total,
    };
    let base = base.max(0.0);
    let satisfied = satisfied.max(0.0);

    let value = match threshold.quantifier_type.mode {
        ThresholdMode::Number => satisfied,
        ThresholdMode::Percent => {
            if base == 0.0 {
                0.0
            } else {
                100.0 * satisfied / base
            }
        }
    };

    threshold.quantifier.compare(value, threshold.thresh)
}
