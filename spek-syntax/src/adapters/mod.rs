//! Language Adapters for spek-syntax
//!
//! Each adapter translates a Tree-sitter parse tree into the PSI-shaped
//! [`SyntaxTree`]. Grammar wrapper nodes that the PSI does not have are
//! flattened away and the nodes the PSI synthesises (function literal,
//! block) are added, so structural checks see the same shape whatever
//! grammar produced the tree.

pub mod kotlin_adapter;

use crate::ir::{LanguageId, Span, SyntaxTree};

pub use kotlin_adapter::KotlinTreeSitterAdapter;

/// Trait for language-specific adapters
pub trait LanguageAdapter: Send + Sync {
    /// The language this adapter handles
    fn language(&self) -> LanguageId;

    /// Get the Tree-sitter language
    fn tree_sitter_language(&self) -> tree_sitter::Language;

    /// Lower a parse tree into a [`SyntaxTree`]
    fn lower(&self, tree: &tree_sitter::Tree, source: &str) -> SyntaxTree;

    /// Spans of error and missing nodes
    fn extract_errors(&self, tree: &tree_sitter::Tree) -> Vec<Span> {
        let mut errors = Vec::new();
        let mut cursor = tree.walk();

        fn visit_errors(cursor: &mut tree_sitter::TreeCursor, errors: &mut Vec<Span>) {
            loop {
                let node = cursor.node();

                if node.is_error() || node.is_missing() {
                    errors.push(node_to_span(&node));
                } else if node.has_error() && cursor.goto_first_child() {
                    visit_errors(cursor, errors);
                    cursor.goto_parent();
                }

                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        visit_errors(&mut cursor, &mut errors);
        errors
    }
}

/// Convert a Tree-sitter node to our Span type
pub fn node_to_span(node: &tree_sitter::Node) -> Span {
    Span {
        start: node.start_byte(),
        end: node.end_byte(),
        start_line: node.start_position().row + 1, // 1-indexed
        end_line: node.end_position().row + 1,
        start_column: node.start_position().column,
        end_column: node.end_position().column,
    }
}

/// Get the text content of a Tree-sitter node
pub fn node_text<'a>(node: &tree_sitter::Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// First named child whose kind is one of `kinds`
pub fn find_child_by_kind<'a>(
    node: &tree_sitter::Node<'a>,
    kinds: &[&str],
) -> Option<tree_sitter::Node<'a>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| kinds.contains(&child.kind()));
    found
}

/// First descendant (pre-order, excluding `node`) whose kind is one of `kinds`
pub fn find_descendant_by_kind<'a>(
    node: &tree_sitter::Node<'a>,
    kinds: &[&str],
) -> Option<tree_sitter::Node<'a>> {
    let mut cursor = node.walk();
    let children: Vec<_> = node.named_children(&mut cursor).collect();
    for child in children {
        if kinds.contains(&child.kind()) {
            return Some(child);
        }
        if let Some(found) = find_descendant_by_kind(&child, kinds) {
            return Some(found);
        }
    }
    None
}

/// Whether any node below `node` (named or not) has kind `kind`
pub fn has_descendant_kind(node: &tree_sitter::Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .iter()
        .any(|child| child.kind() == kind || has_descendant_kind(child, kind))
}
