//! Error types for spek-syntax
//!
//! Syntax errors inside a file are not errors here: the adapter lowers what
//! it can and records unparsable regions on the tree. These variants cover
//! the failures that leave nothing to analyse.

use crate::ir::LanguageId;
use thiserror::Error;

/// Errors from parsing and model loading
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// Language not supported by any adapter
    #[error("Unsupported language: {0:?}")]
    UnsupportedLanguage(LanguageId),

    /// Tree-sitter rejected the grammar or produced no tree
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// I/O error while reading a source file or a library model
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed library model
    #[error("Invalid library model: {0}")]
    InvalidLibrary(#[from] serde_json::Error),
}

/// Result type alias for SyntaxError
pub type Result<T> = std::result::Result<T, SyntaxError>;
