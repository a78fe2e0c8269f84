//! Navigator configuration
//!
//! Loaded from a JSON file such as `.spek_navigator.json`. Every field is
//! optional; missing fields take the defaults below.

use crate::core::error::{NavigatorError, Result};
use crate::core::walker::WalkConfig;
use serde::{Deserialize, Serialize};
use spek_syntax::LibraryModel;
use std::path::{Path, PathBuf};

/// Configuration for discovering and analysing spec files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Files to analyse (globs, relative to the walked root)
    pub include_patterns: Vec<String>,
    /// Paths to skip (directory names or globs)
    pub ignore_patterns: Vec<String>,
    /// Maximum file size in bytes
    pub max_file_size: u64,
    /// Leave out classes annotated with `@RunWith`
    pub skip_junit4_specs: bool,
    /// JSON library model replacing the built-in Spek API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<PathBuf>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            include_patterns: vec!["**/*.kt".to_string(), "**/*.kts".to_string()],
            ignore_patterns: vec![
                ".git".to_string(),
                ".gradle".to_string(),
                ".idea".to_string(),
                "build".to_string(),
                "out".to_string(),
                "target".to_string(),
            ],
            max_file_size: 1_048_576,
            skip_junit4_specs: false,
            library: None,
        }
    }
}

impl NavigatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NavigatorError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
            .map_err(|e| e.with_context(format!("loading config {}", path.display())))
    }

    /// Builder pattern: set the library model file
    pub fn with_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.library = Some(path.into());
        self
    }

    /// Builder pattern: skip JUnit 4 classes
    pub fn with_skip_junit4(mut self, skip: bool) -> Self {
        self.skip_junit4_specs = skip;
        self
    }

    /// Builder pattern: replace include patterns
    pub fn with_include(mut self, patterns: Vec<String>) -> Self {
        self.include_patterns = patterns;
        self
    }

    /// Reject glob patterns that cannot compile
    pub fn validate(&self) -> Result<()> {
        for pattern in self.include_patterns.iter().chain(&self.ignore_patterns) {
            globset::Glob::new(pattern).map_err(|e| {
                NavigatorError::invalid_config(format!("bad pattern '{}': {}", pattern, e))
            })?;
        }
        Ok(())
    }

    pub fn walk_config(&self) -> WalkConfig {
        WalkConfig {
            ignore_patterns: self.ignore_patterns.clone(),
            include_patterns: self.include_patterns.clone(),
            max_file_size: self.max_file_size,
        }
    }

    /// The configured library model, or the built-in Spek API
    pub fn load_library(&self) -> Result<LibraryModel> {
        match &self.library {
            Some(path) => LibraryModel::from_json_file(path).map_err(|e| {
                NavigatorError::from(e)
                    .with_context(format!("loading library model {}", path.display()))
            }),
            None => Ok(LibraryModel::spek_api()),
        }
    }
}
