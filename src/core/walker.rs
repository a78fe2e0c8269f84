//! Source discovery for spek-navigator
//!
//! This module provides the FileWalker trait and default implementation
//! for walking directory trees and collecting Kotlin sources.

use crate::core::error::{NavigatorError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Normalize path separators for cross-platform compatibility.
/// - Converts Windows backslashes to forward slashes
/// - Strips Windows UNC prefix `\\?\` if present
pub fn normalize_path_separators(path: &str) -> String {
    let mut normalized = path.to_string();

    // Strip Windows UNC prefix (\\?\ or \\.\)
    if normalized.starts_with(r"\\?\") || normalized.starts_with(r"\\.\") {
        normalized = normalized[4..].to_string();
    }

    normalized.replace('\\', "/")
}

/// A source file read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as reported to the user, `/`-separated
    pub path: String,
    /// Location on disk
    pub location: PathBuf,
    pub content: String,
}

impl SourceFile {
    /// Read a single file, reporting it under its path as given
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| NavigatorError::from(e).with_context(path.display().to_string()))?;
        let content = read_file_content(&bytes).ok_or_else(|| {
            NavigatorError::invalid_config(format!("'{}' is not a text file", path.display()))
        })?;
        Ok(Self {
            path: normalize_path_separators(&path.to_string_lossy()),
            location: path.to_path_buf(),
            content,
        })
    }
}

/// Trait for file system walking
///
/// This trait allows for mocking in tests and alternative implementations
/// (e.g., in-memory source sets).
#[cfg_attr(test, automock)]
pub trait FileWalker: Send + Sync {
    /// Walk a directory and return the matching sources
    fn walk(&self, root: &Path, config: &WalkConfig) -> Result<Vec<SourceFile>>;

    /// Check if a path matches ignore patterns
    fn should_ignore(&self, path: &str, patterns: &[String]) -> bool;

    /// Check if a file is too large
    fn is_too_large(&self, size: u64, limit: u64) -> bool {
        size > limit
    }
}

/// Configuration for directory walking
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Patterns to ignore
    pub ignore_patterns: Vec<String>,
    /// Patterns to include (empty = all)
    pub include_patterns: Vec<String>,
    /// Maximum file size in bytes
    pub max_file_size: u64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: vec![".git".to_string(), "build".to_string()],
            include_patterns: vec!["**/*.kt".to_string(), "**/*.kts".to_string()],
            max_file_size: 1_048_576,
        }
    }
}

/// Default file walker implementation
pub struct DefaultWalker;

impl DefaultWalker {
    pub fn new() -> Self {
        Self
    }

    fn build_globset(patterns: &[String]) -> Option<GlobSet> {
        if patterns.is_empty() {
            return None;
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            if let Ok(glob) = Glob::new(pattern) {
                builder.add(glob);
            }
        }
        builder.build().ok()
    }

    fn matches_patterns(path: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| {
            path == pattern
                || path.split('/').any(|component| component == pattern)
                || Glob::new(pattern)
                    .map(|glob| glob.compile_matcher().is_match(path))
                    .unwrap_or(false)
        })
    }
}

impl Default for DefaultWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl FileWalker for DefaultWalker {
    fn walk(&self, root: &Path, config: &WalkConfig) -> Result<Vec<SourceFile>> {
        if !root.exists() {
            return Err(NavigatorError::PathNotFound {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(NavigatorError::invalid_config(format!(
                "'{}' is not a directory",
                root.display()
            )));
        }

        let include_set = Self::build_globset(&config.include_patterns);
        let mut sources = Vec::new();

        for entry in walkdir::WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_dir() {
                continue;
            }

            let location = entry.path();
            let relative_path = normalize_path_separators(
                &location
                    .strip_prefix(root)
                    .unwrap_or(location)
                    .to_string_lossy(),
            );

            if self.should_ignore(&relative_path, &config.ignore_patterns) {
                continue;
            }

            if let Some(ref include_set) = include_set {
                if !include_set.is_match(&relative_path) {
                    continue;
                }
            }

            if let Ok(meta) = entry.metadata() {
                if self.is_too_large(meta.len(), config.max_file_size) {
                    debug!(path = %relative_path, size = meta.len(), "skipping large file");
                    continue;
                }
            }

            let bytes = match std::fs::read(location) {
                Ok(b) => b,
                Err(_) => continue,
            };
            if is_binary(&bytes) {
                continue;
            }
            let Some(content) = read_file_content(&bytes) else {
                continue;
            };

            sources.push(SourceFile {
                path: normalize_path_separators(&root.join(&relative_path).to_string_lossy()),
                location: location.to_path_buf(),
                content,
            });
        }

        debug!(root = %root.display(), files = sources.len(), "walk complete");
        Ok(sources)
    }

    fn should_ignore(&self, path: &str, patterns: &[String]) -> bool {
        Self::matches_patterns(path, patterns)
    }
}

/// Collect the sources named on the command line: directories are walked,
/// files are read as they are.
pub fn collect_sources<W: FileWalker + ?Sized>(
    walker: &W,
    roots: &[PathBuf],
    config: &WalkConfig,
) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    for root in roots {
        if root.is_file() {
            sources.push(SourceFile::read(root)?);
        } else {
            sources.extend(walker.walk(root, config)?);
        }
    }
    Ok(sources)
}

/// Check if content appears to be binary
pub fn is_binary(content: &[u8]) -> bool {
    if content.is_empty() {
        return false;
    }

    // Null bytes in the first 8KB
    let check_len = content.len().min(8192);
    content[..check_len].contains(&0)
}

/// Decode file content, normalizing line endings
pub fn read_file_content(bytes: &[u8]) -> Option<String> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Some(s.replace("\r\n", "\n"));
    }

    let s = String::from_utf8_lossy(bytes);
    if s.chars().filter(|c| *c == '\u{FFFD}').count() < s.len() / 10 {
        Some(s.replace("\r\n", "\n"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path_separators() {
        assert_eq!(normalize_path_separators(r"src\test\FooSpec.kt"), "src/test/FooSpec.kt");
        assert_eq!(
            normalize_path_separators(r"\\?\C:\project\FooSpec.kt"),
            "C:/project/FooSpec.kt"
        );
        assert_eq!(normalize_path_separators("src/FooSpec.kt"), "src/FooSpec.kt");
    }

    #[test]
    fn test_is_binary() {
        assert!(!is_binary(&[]));
        assert!(is_binary(&[0x00, 0x01, 0x02]));
        assert!(!is_binary(b"class FooSpec"));
    }

    #[test]
    fn test_read_file_content_crlf() {
        let content = read_file_content(b"line1\r\nline2");
        assert_eq!(content, Some("line1\nline2".to_string()));
    }

    #[test]
    fn test_walk_nonexistent() {
        let walker = DefaultWalker::new();
        let result = walker.walk(Path::new("/nonexistent/path/xyz"), &WalkConfig::default());
        assert!(matches!(result, Err(NavigatorError::PathNotFound { .. })));
    }

    #[test]
    fn test_walk_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("FooSpec.kt");
        fs::write(&file, "class FooSpec").unwrap();

        let result = DefaultWalker::new().walk(&file, &WalkConfig::default());
        assert!(matches!(result, Err(NavigatorError::InvalidConfig { .. })));
    }

    #[test]
    fn test_walk_selects_kotlin_sources() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/test/kotlin")).unwrap();
        fs::create_dir_all(dir.path().join("build/generated")).unwrap();
        fs::write(dir.path().join("src/test/kotlin/FooSpec.kt"), "class FooSpec").unwrap();
        fs::write(dir.path().join("src/test/kotlin/BarSpec.kt"), "class BarSpec").unwrap();
        fs::write(dir.path().join("src/test/kotlin/notes.md"), "# notes").unwrap();
        fs::write(dir.path().join("build/generated/Gen.kt"), "class Gen").unwrap();
        fs::write(dir.path().join("settings.gradle.kts"), "rootProject.name = \"x\"").unwrap();

        let sources = DefaultWalker::new()
            .walk(dir.path(), &WalkConfig::default())
            .unwrap();
        let names: Vec<_> = sources
            .iter()
            .map(|s| s.location.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["settings.gradle.kts", "BarSpec.kt", "FooSpec.kt"]);
        assert!(sources[1].path.ends_with("src/test/kotlin/BarSpec.kt"));
        assert_eq!(sources[2].content, "class FooSpec");
    }

    #[test]
    fn test_walk_skips_large_and_binary_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Big.kt"), "x".repeat(200)).unwrap();
        fs::write(dir.path().join("Blob.kt"), [0u8, 1, 2]).unwrap();
        fs::write(dir.path().join("Small.kt"), "class Small").unwrap();

        let config = WalkConfig {
            max_file_size: 100,
            ..WalkConfig::default()
        };
        let sources = DefaultWalker::new().walk(dir.path(), &config).unwrap();
        assert_eq!(sources.len(), 1);
        assert!(sources[0].path.ends_with("Small.kt"));
    }

    #[test]
    fn test_should_ignore() {
        let walker = DefaultWalker::new();
        let patterns = vec!["build".to_string(), "*.gen.kt".to_string()];
        assert!(walker.should_ignore("build/tmp/Foo.kt", &patterns));
        assert!(walker.should_ignore("Foo.gen.kt", &patterns));
        assert!(!walker.should_ignore("src/FooSpec.kt", &patterns));
        assert!(walker.is_too_large(2_000_000, 1_000_000));
        assert!(!walker.is_too_large(500_000, 1_000_000));
    }

    #[test]
    fn test_collect_sources_reads_files_and_walks_dirs() {
        let dir = TempDir::new().unwrap();
        let single = dir.path().join("Single.kt");
        fs::write(&single, "class Single").unwrap();

        let mut walker = MockFileWalker::new();
        walker
            .expect_walk()
            .withf(|root, _| root == Path::new("/virtual/specs"))
            .times(1)
            .returning(|_, _| {
                Ok(vec![SourceFile {
                    path: "/virtual/specs/FooSpec.kt".to_string(),
                    location: PathBuf::from("/virtual/specs/FooSpec.kt"),
                    content: "class FooSpec".to_string(),
                }])
            });

        let roots = vec![single.clone(), PathBuf::from("/virtual/specs")];
        let sources = collect_sources(&walker, &roots, &WalkConfig::default()).unwrap();

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].location, single);
        assert_eq!(sources[0].content, "class Single");
        assert_eq!(sources[1].path, "/virtual/specs/FooSpec.kt");
    }

    #[test]
    fn test_collect_sources_propagates_walk_errors() {
        let mut walker = MockFileWalker::new();
        walker.expect_walk().returning(|root, _| {
            Err(NavigatorError::PathNotFound {
                path: root.to_path_buf(),
            })
        });

        let roots = vec![PathBuf::from("/missing")];
        let err = collect_sources(&walker, &roots, &WalkConfig::default()).unwrap_err();
        assert!(matches!(err, NavigatorError::PathNotFound { .. }));
    }
}
