//! Centralized error types for protgraph.

use std::path::PathBuf;

use thiserror::Error;

/// A source document could not be turned into an attribute tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed document at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("Expected root element 'uniprot', found '{0}'")]
    MissingRoot(String),

    #[error("Document has no 'entry' element")]
    MissingEntry,

    #[error("Document is empty")]
    Empty,
}

/// A required field is absent (or has the wrong shape) in an attribute tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{entity} at '{path}': {message}")]
pub struct SchemaError {
    pub entity: &'static str,
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub fn missing(entity: &'static str, path: impl Into<String>) -> Self {
        Self {
            entity,
            path: path.into(),
            message: "required field is absent".to_string(),
        }
    }

    pub fn invalid(entity: &'static str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entity,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Main error type for document-level and configuration failures.
#[derive(Error, Debug)]
pub enum ProtgraphError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for protgraph operations.
pub type ProtgraphResult<T> = Result<T, ProtgraphError>;

impl ProtgraphError {
    /// Create an IO error bound to the file it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
