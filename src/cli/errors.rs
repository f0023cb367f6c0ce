//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::dsl::DslError;
use crate::engine::EngineError;
use crate::graph::GraphError;
use crate::rules::RuleError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// File or stdout error
    IoError,
    /// Graph could not be loaded
    GraphError,
    /// Rules could not be loaded or failed validation
    RulesError,
    /// Engine refused to run
    EngineError,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "LEX_CLI_CONFIG_ERROR",
            Self::IoError => "LEX_CLI_IO_ERROR",
            Self::GraphError => "LEX_CLI_GRAPH_ERROR",
            Self::RulesError => "LEX_CLI_RULES_ERROR",
            Self::EngineError => "LEX_CLI_ENGINE_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn rules_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RulesError, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<GraphError> for CliError {
    fn from(e: GraphError) -> Self {
        Self::new(CliErrorCode::GraphError, format!("{}: {}", e.code(), e))
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        Self::new(CliErrorCode::EngineError, format!("{}: {}", e.code(), e))
    }
}

impl From<RuleError> for CliError {
    fn from(e: RuleError) -> Self {
        Self::rules_error(format!("{}: {}", e.code(), e))
    }
}

impl From<DslError> for CliError {
    fn from(e: DslError) -> Self {
        Self::rules_error(format!("{}: {}", e.code(), e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let e = CliError::config_error("bad alpha");
        assert_eq!(e.to_string(), "LEX_CLI_CONFIG_ERROR: bad alpha");
        assert_eq!(e.message(), "bad alpha");
    }

    #[test]
    fn test_engine_error_conversion() {
        let e: CliError = EngineError::InvalidTmax(-3).into();
        assert_eq!(e.code(), &CliErrorCode::EngineError);
        assert!(e.message().starts_with("LEX_ENGINE_TMAX"));
    }
}
