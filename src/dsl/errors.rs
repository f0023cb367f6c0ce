//! Rule DSL errors
//!
//! Only `Pattern` is fatal. Every other variant is reported as a diagnostic
//! and the offending line or fragment is skipped.

use thiserror::Error;

use crate::rules::RuleError;

pub type DslResult<T> = Result<T, DslError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DslError {
    #[error("line is not a rule: {0}")]
    NotARule(String),

    #[error("malformed head: {0}")]
    MalformedHead(String),

    #[error("head must bind one or two variables, got {0}")]
    HeadArity(usize),

    #[error("malformed clause: {0}")]
    MalformedClause(String),

    #[error("malformed directive: {0}")]
    MalformedDirective(String),

    #[error("unknown directive: {0}")]
    UnknownDirective(String),

    #[error(transparent)]
    InvalidRule(#[from] RuleError),

    #[error("pattern error: {0}")]
    Pattern(String),
}

impl DslError {
    pub fn code(&self) -> &'static str {
        match self {
            DslError::NotARule(_) => "LEX_DSL_NOT_A_RULE",
            DslError::MalformedHead(_) => "LEX_DSL_HEAD",
            DslError::HeadArity(_) => "LEX_DSL_HEAD_ARITY",
            DslError::MalformedClause(_) => "LEX_DSL_CLAUSE",
            DslError::MalformedDirective(_) => "LEX_DSL_DIRECTIVE",
            DslError::UnknownDirective(_) => "LEX_DSL_UNKNOWN_DIRECTIVE",
            DslError::InvalidRule(e) => e.code(),
            DslError::Pattern(_) => "LEX_DSL_PATTERN",
        }
    }
}

impl From<regex::Error> for DslError {
    fn from(e: regex::Error) -> Self {
        DslError::Pattern(e.to_string())
    }
}
