//! Error types for spek-navigator
//!
//! This module provides structured error handling using thiserror.
//! Negative classifications are never errors; [`PathError`] is reserved for
//! contract violations of the path builder.

use spek_syntax::{NodeId, SyntaxError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for navigator operations
pub type Result<T> = std::result::Result<T, NavigatorError>;

/// Precondition violations of [`extract_path`](crate::core::path::extract_path)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The call is not a recognized spec block
    #[error("call {0} is not a spec block")]
    NotASpecBlock(NodeId),

    /// The call is not directly inside a closure body
    #[error("call {0} is not nested in a closure body")]
    NotInClosure(NodeId),

    /// The callee is not a bare name reference
    #[error("callee of call {0} is not a name reference")]
    CalleeNotNameReference(NodeId),

    /// The callee does not resolve to a declared function
    #[error("callee of call {0} does not resolve to a function")]
    UnresolvedCallee(NodeId),

    /// The first argument is not a string literal
    #[error("call {0} has no literal description")]
    MissingDescription(NodeId),

    /// The outermost block is not owned by a spec class
    #[error("no spec class owns call {0}")]
    NoOwningSpec(NodeId),

    /// Ascent exceeded the nesting bound
    #[error("blocks around call {node} nest deeper than {limit} levels")]
    NestingTooDeep { node: NodeId, limit: usize },
}

/// Errors that can occur while discovering and analysing spec files
#[derive(Error, Debug)]
pub enum NavigatorError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Path not found
    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parsing or library model error
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Contract violation while building a path
    #[error(transparent)]
    Path(#[from] PathError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<NavigatorError>,
    },
}

impl NavigatorError {
    /// Wrap an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        NavigatorError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        NavigatorError::InvalidConfig {
            message: message.into(),
        }
    }
}
