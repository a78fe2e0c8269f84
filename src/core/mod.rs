//! Core module for spek-navigator
//!
//! Structural recognition of Spek suites over an injected syntax navigator
//! and symbol resolver.
//!
//! # Architecture
//!
//! - `dsl`: Closed allow-lists of DSL names
//! - `classifier`: Is a declaration a spec class?
//! - `block`: Is a call a group or test block?
//! - `containment`: Which spec class owns a node; JUnit 4 detection
//! - `path`: Path model and the path builder
//! - `analyzer`: `SpecAnalyzer` facade over both capabilities
//! - `scanner`: Whole-file scans and reports
//! - `walker`: Source discovery with the FileWalker trait
//! - `config`: `NavigatorConfig`
//! - `error`: Error types using thiserror

pub mod analyzer;
pub mod block;
pub mod classifier;
pub mod config;
pub mod containment;
pub mod dsl;
pub mod error;
pub mod path;
pub mod scanner;
pub mod walker;

// Re-export commonly used types
pub use analyzer::SpecAnalyzer;
pub use block::{classify_block, is_spec_block, BlockKind, ClassifiedBlock};
pub use classifier::{is_spec, is_spec_declaration};
pub use config::NavigatorConfig;
pub use containment::{containing_spec_class, is_contained_in_spec, is_junit4};
pub use error::{NavigatorError, PathError, Result};
pub use path::{extract_path, Path, PathKind, PathSegment};
pub use scanner::{
    scan, scan_source, scan_specs, scan_tree, BlockReport, DiscoveredBlock, ScanOptions,
};
pub use walker::{collect_sources, DefaultWalker, FileWalker, SourceFile, WalkConfig};
