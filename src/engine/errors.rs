//! Engine errors
//!
//! Raised before a run starts. A running engine never fails: bad rules are
//! skipped and failed aggregations degrade to `[0, 1]`.

use thiserror::Error;

use crate::annotation::AnnotationError;
use crate::rules::RuleError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid update_mode '{0}': expected 'intersection' or 'override'")]
    InvalidUpdateMode(String),

    #[error("invalid alpha {0}: must be finite and non-negative")]
    InvalidAlpha(f64),

    #[error("aggregator '{0}' is not registered")]
    UnknownAggregator(String),

    #[error("invalid tmax {0}: must be -1 or non-negative")]
    InvalidTmax(i64),

    #[error("rule '{rule}' names unregistered aggregator '{name}'")]
    RuleAggregator { rule: String, name: String },

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Annotation(#[from] AnnotationError),
}

impl EngineError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidUpdateMode(_) => "LEX_ENGINE_UPDATE_MODE",
            EngineError::InvalidAlpha(_) => "LEX_ENGINE_ALPHA",
            EngineError::UnknownAggregator(_) => "LEX_ENGINE_AGGREGATOR",
            EngineError::InvalidTmax(_) => "LEX_ENGINE_TMAX",
            EngineError::RuleAggregator { .. } => "LEX_ENGINE_RULE_AGGREGATOR",
            EngineError::Rule(e) => e.code(),
            EngineError::Annotation(e) => e.code(),
        }
    }
}
