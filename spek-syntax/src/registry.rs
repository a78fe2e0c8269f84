//! Adapter Registry
//!
//! The registry owns the language adapters and turns source text into
//! lowered [`SyntaxTree`]s.

use crate::adapters::{KotlinTreeSitterAdapter, LanguageAdapter};
use crate::error::{Result, SyntaxError};
use crate::ir::{LanguageId, SyntaxTree};
use std::collections::BTreeMap;
use std::path::Path;

/// Registry of language adapters
pub struct AdapterRegistry {
    adapters: BTreeMap<LanguageId, Box<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    /// Create a new registry with all built-in adapters
    pub fn new() -> Self {
        let mut registry = Self {
            adapters: BTreeMap::new(),
        };
        registry.register(Box::new(KotlinTreeSitterAdapter::new()));
        registry
    }

    /// Register a language adapter
    pub fn register(&mut self, adapter: Box<dyn LanguageAdapter>) {
        self.adapters.insert(adapter.language(), adapter);
    }

    /// Get an adapter for a language. Kotlin scripts share the Kotlin
    /// grammar.
    pub fn get(&self, language: LanguageId) -> Option<&dyn LanguageAdapter> {
        let language = match language {
            LanguageId::KotlinScript => LanguageId::Kotlin,
            other => other,
        };
        self.adapters.get(&language).map(|a| a.as_ref())
    }

    /// Check if a language is supported
    pub fn supports(&self, language: LanguageId) -> bool {
        self.get(language).is_some()
    }

    /// Parse source text
    pub fn parse(&self, source: &str, language: LanguageId) -> Result<SyntaxTree> {
        let adapter = self
            .get(language)
            .ok_or(SyntaxError::UnsupportedLanguage(language))?;

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&adapter.tree_sitter_language())
            .map_err(|e| SyntaxError::TreeSitter(e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SyntaxError::TreeSitter("parser produced no tree".to_string()))?;

        let mut lowered = adapter.lower(&tree, source);
        lowered.language = language;
        Ok(lowered)
    }

    /// Read and parse a file, detecting the language from its extension
    pub fn parse_file(&self, path: &Path) -> Result<SyntaxTree> {
        let language = LanguageId::from_path(path);
        if !self.supports(language) {
            return Err(SyntaxError::UnsupportedLanguage(language));
        }
        let source = std::fs::read_to_string(path)?;
        let mut tree = self.parse(&source, language)?;
        tree.path = Some(path.to_string_lossy().replace('\\', "/"));
        Ok(tree)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_supported_languages() {
        let registry = AdapterRegistry::new();
        assert!(registry.supports(LanguageId::Kotlin));
        assert!(registry.supports(LanguageId::KotlinScript));
        assert!(!registry.supports(LanguageId::Unknown));
    }

    #[test]
    fn test_parse_unsupported_language() {
        let registry = AdapterRegistry::new();
        let err = registry.parse("x", LanguageId::Unknown).unwrap_err();
        assert!(matches!(err, SyntaxError::UnsupportedLanguage(LanguageId::Unknown)));
    }

    #[test]
    fn test_parse_script_keeps_language() {
        let registry = AdapterRegistry::new();
        let tree = registry
            .parse("println(\"hi\")\n", LanguageId::KotlinScript)
            .unwrap();
        assert_eq!(tree.language, LanguageId::KotlinScript);
    }

    #[test]
    fn test_parse_file_sets_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Sample.kt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "package com.example\nclass Sample").unwrap();

        let tree = AdapterRegistry::new().parse_file(&path).unwrap();
        assert_eq!(tree.package(), Some("com.example"));
        assert!(tree.path.unwrap().ends_with("Sample.kt"));
    }

    #[test]
    fn test_parse_file_rejects_other_extensions() {
        let err = AdapterRegistry::new()
            .parse_file(Path::new("notes.txt"))
            .unwrap_err();
        assert!(matches!(err, SyntaxError::UnsupportedLanguage(_)));
    }
}
