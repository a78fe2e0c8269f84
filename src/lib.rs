//! spek-navigator - Structural navigation of Spek test suites
//!
//! This library recognizes the spec classes and the `describe`/`context`/
//! `given`/`on`/`it` blocks of Kotlin Spek suites and reconstructs the
//! hierarchical path of every block. It is designed to be consumed by:
//! - The CLI binary (src/bin/spek_paths.rs)
//! - Test-tree views and run-configuration producers embedding the library
//!
//! # Architecture
//!
//! This crate follows the "Library-First" pattern:
//! - **lib.rs** (this file): Pure logic, no CLI concerns
//! - **bin/spek_paths.rs**: Thin wrapper that calls the library
//!
//! The syntax tree and the symbol resolver are capabilities from the
//! `spek-syntax` crate, injected as [`SyntaxNavigator`] and
//! [`SymbolResolver`] so every query can run against hand-built trees.
//!
//! # Example
//!
//! ```rust,ignore
//! use spek_navigator::{scan_tree, LibraryModel, ScanOptions};
//!
//! let tree = AdapterRegistry::new().parse(source, LanguageId::Kotlin)?;
//! for block in scan_tree(&tree, &LibraryModel::spek_api(), &ScanOptions::default()) {
//!     println!("{}", block.path);
//! }
//! ```

pub mod core;

pub use crate::core::{
    classify_block, collect_sources, containing_spec_class, extract_path, is_contained_in_spec,
    is_junit4, is_spec, is_spec_block, is_spec_declaration, scan, scan_source, scan_specs,
    scan_tree, BlockKind, BlockReport, ClassifiedBlock, DefaultWalker, DiscoveredBlock,
    FileWalker, NavigatorConfig, NavigatorError, Path, PathError, PathKind, PathSegment, Result,
    ScanOptions, SourceFile, SpecAnalyzer, WalkConfig,
};
pub use spek_syntax::{
    AdapterRegistry, ClassSymbol, LanguageId, LibraryModel, NodeId, SymbolIndex, SymbolResolver,
    SyntaxNavigator, SyntaxTree,
};

/// Returns the version of the spek-navigator library
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
