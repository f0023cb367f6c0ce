//! Rule model errors
//!
//! Structural errors are configuration errors: they are raised before a run
//! starts and surfaced to the caller unchanged.

use thiserror::Error;

/// Result type for rule operations
pub type RuleResult<T> = Result<T, RuleError>;

/// Structural rule errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("rule '{rule}': {rule_type} rule needs {expected} head variable(s), got {actual}")]
    HeadArity {
        rule: String,
        rule_type: String,
        expected: usize,
        actual: usize,
    },

    #[error("rule '{0}': ann_fn and head_bound are mutually exclusive")]
    HeadConflict(String),

    #[error("rule '{rule}': {actual} thresholds for {clauses} clauses")]
    ThresholdCount {
        rule: String,
        clauses: usize,
        actual: usize,
    },

    #[error("rule '{rule}': {actual} weights for {clauses} clauses")]
    WeightCount {
        rule: String,
        clauses: usize,
        actual: usize,
    },

    #[error("rule '{rule}': clause '{label}' has {actual} variable(s), expected {expected}")]
    ClauseArity {
        rule: String,
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("translation from {source_system} failed: {reason}")]
    Translation {
        source_system: String,
        reason: String,
    },
}

impl RuleError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RuleError::HeadArity { .. } => "LEX_RULE_HEAD_ARITY",
            RuleError::HeadConflict(_) => "LEX_RULE_HEAD_CONFLICT",
            RuleError::ThresholdCount { .. } => "LEX_RULE_THRESHOLD_COUNT",
            RuleError::WeightCount { .. } => "LEX_RULE_WEIGHT_COUNT",
            RuleError::ClauseArity { .. } => "LEX_RULE_CLAUSE_ARITY",
            RuleError::Translation { .. } => "LEX_RULE_TRANSLATION",
        }
    }

    /// Creates a translation error
    pub fn translation(source_system: impl Into<String>, reason: impl Into<String>) -> Self {
        RuleError::Translation {
            source_system: source_system.into(),
            reason: reason.into(),
        }
    }
}
