//! Annotation function errors
//!
//! These never abort a run: the engine replaces a failed head group's
//! interval with `[0, 1]`.

use thiserror::Error;

/// Result type for annotation operations
pub type AnnotationResult<T> = Result<T, AnnotationError>;

/// Annotation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnotationError {
    #[error("annotation function not found: {0}")]
    UnknownFunction(String),

    #[error("annotation function already registered: {0}")]
    AlreadyRegistered(String),

    #[error("weight {index} is not finite: {value}")]
    NonFiniteWeight { index: usize, value: f64 },

    #[error("alpha is not finite: {0}")]
    NonFiniteAlpha(f64),
}

impl AnnotationError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            AnnotationError::UnknownFunction(_) => "LEX_ANNOTATION_UNKNOWN",
            AnnotationError::AlreadyRegistered(_) => "LEX_ANNOTATION_DUPLICATE",
            AnnotationError::NonFiniteWeight { .. } => "LEX_ANNOTATION_WEIGHT",
            AnnotationError::NonFiniteAlpha(_) => "LEX_ANNOTATION_ALPHA",
        }
    }
}
