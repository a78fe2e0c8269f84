//! Declaration classifier
//!
//! Decides whether a class-like declaration is a spec: a concrete class that
//! strictly inherits [`SPEK_MARKER`], directly or through intermediate bases.

use crate::core::dsl::SPEK_MARKER;
use spek_syntax::{ClassSymbol, NodeId, SymbolResolver};
use tracing::trace;

/// Whether `class` is a spec class.
///
/// An unresolvable marker type is a plain `false`, as is an abstract class.
/// The marker itself never qualifies.
pub fn is_spec<R: SymbolResolver + ?Sized>(resolver: &R, class: &ClassSymbol) -> bool {
    let Some(marker) = resolver.find_class(SPEK_MARKER, &class.scope) else {
        trace!(class = %class.fq_name, "marker type not resolvable");
        return false;
    };
    if class.is_abstract {
        return false;
    }
    resolver.is_inheritor(class, &marker, true)
}

/// [`is_spec`] for a declaration node
pub fn is_spec_declaration<R: SymbolResolver + ?Sized>(resolver: &R, declaration: NodeId) -> bool {
    resolver
        .class_of(declaration)
        .is_some_and(|class| is_spec(resolver, &class))
}
