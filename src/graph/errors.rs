//! Graph loading errors

use thiserror::Error;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Graph loading errors
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to read graph file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed node-link document: {0}")]
    Malformed(String),
}

impl GraphError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            GraphError::Io { .. } => "LEX_GRAPH_IO",
            GraphError::Json(_) => "LEX_GRAPH_JSON",
            GraphError::Malformed(_) => "LEX_GRAPH_MALFORMED",
        }
    }
}
