//! Containment checks: which spec class, if any, lexically owns a node.

use crate::core::classifier::is_spec;
use crate::core::dsl::RUN_WITH;
use spek_syntax::{ClassSymbol, NodeId, NodeKind, SymbolResolver, SyntaxNavigator};

/// The spec class owning `node`.
///
/// Only the nearest enclosing class or object counts; functions and lambdas
/// in between are skipped, enclosing classes further out are not consulted.
pub fn containing_spec_class<N, R>(nav: &N, resolver: &R, node: NodeId) -> Option<ClassSymbol>
where
    N: SyntaxNavigator,
    R: SymbolResolver + ?Sized,
{
    let declaration = nav.containing_class_like(node)?;
    resolver
        .class_of(declaration)
        .filter(|class| is_spec(resolver, class))
}

pub fn is_contained_in_spec<N, R>(nav: &N, resolver: &R, node: NodeId) -> bool
where
    N: SyntaxNavigator,
    R: SymbolResolver + ?Sized,
{
    containing_spec_class(nav, resolver, node).is_some()
}

/// Whether the class declaration carries `@RunWith`, i.e. JUnit 4 runs it
/// instead of the Spek platform.
pub fn is_junit4<N, R>(nav: &N, resolver: &R, class: NodeId) -> bool
where
    N: SyntaxNavigator,
    R: SymbolResolver + ?Sized,
{
    if !nav.kind(class).is_some_and(NodeKind::is_class_like) {
        return false;
    }
    nav.children(class).iter().any(|child| match nav.kind(*child) {
        Some(NodeKind::Annotation { type_name }) => {
            let resolved = resolver.resolve_type_name(*child, type_name);
            resolved.as_deref().unwrap_or(type_name.as_str()) == RUN_WITH
        }
        _ => false,
    })
}
