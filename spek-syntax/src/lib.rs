//! spek-syntax: syntax and symbol capabilities for spec-suite analysis
//!
//! This crate provides the two collaborators structural analyses of Kotlin
//! spec files depend on, each behind a narrow trait:
//!
//! - [`SyntaxNavigator`]: parent/child traversal and node-kind tests over a
//!   PSI-shaped tree. [`SyntaxTree`] implements it; trees come from the
//!   Tree-sitter Kotlin adapter or from [`TreeBuilder`] fixtures.
//! - [`SymbolResolver`]: type lookup, inheritance and call resolution.
//!   [`SymbolIndex`] implements it for one file against a [`LibraryModel`].
//!
//! # Example
//!
//! ```rust,ignore
//! use spek_syntax::{AdapterRegistry, LanguageId, LibraryModel, SymbolIndex};
//!
//! let tree = AdapterRegistry::new().parse(source, LanguageId::Kotlin)?;
//! let library = LibraryModel::spek_api();
//! let index = SymbolIndex::build(&tree, &library);
//! ```

pub mod adapters;
pub mod error;
pub mod index;
pub mod ir;
pub mod library;
pub mod navigation;
mod registry;
pub mod symbols;

pub use adapters::{KotlinTreeSitterAdapter, LanguageAdapter};
pub use error::SyntaxError;
pub use index::SymbolIndex;
pub use ir::{
    ClassDeclaration, FunctionDeclaration, ImportDirective, LanguageId, Node, NodeId, NodeKind,
    Span, SyntaxTree, TreeBuilder, TypeRef,
};
pub use library::{LibraryFunction, LibraryModel, LibraryType};
pub use navigation::{Ancestors, SyntaxNavigator};
pub use registry::AdapterRegistry;
pub use symbols::{ClassSymbol, FunctionSymbol, ResolveScope, SymbolResolver};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
