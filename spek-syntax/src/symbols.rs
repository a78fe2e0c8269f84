//! Symbol resolution capability
//!
//! [`SymbolResolver`] is the narrow view of a resolver that structural
//! analyses need: find a type by fully qualified name, test inheritance,
//! bind a declaration node to its class model, and resolve a name reference
//! to the function it calls.

use crate::ir::{NodeId, TypeRef};
use serde::{Deserialize, Serialize};

/// Where a lookup is performed from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveScope {
    /// Everything known to the resolver
    #[default]
    Project,
    /// A single module; sees unrestricted types plus those exported to it
    Module(String),
}

impl ResolveScope {
    /// Whether a type restricted to `modules` (empty = unrestricted) is
    /// visible from this scope
    pub fn sees(&self, modules: &[String]) -> bool {
        match self {
            ResolveScope::Project => true,
            ResolveScope::Module(name) => modules.is_empty() || modules.contains(name),
        }
    }
}

/// Bound class model of a class-like declaration or library type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSymbol {
    pub fq_name: String,
    /// Abstract classes and interfaces
    pub is_abstract: bool,
    /// Resolution scope the class was bound in
    #[serde(default)]
    pub scope: ResolveScope,
    /// Declaring node, for classes of the current file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<NodeId>,
}

impl ClassSymbol {
    pub fn simple_name(&self) -> &str {
        self.fq_name.rsplit('.').next().unwrap_or(&self.fq_name)
    }
}

/// A resolved function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub name: String,
    pub fq_name: String,
    /// Declared extension receiver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<TypeRef>,
    /// Declaring node, for functions of the current file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<NodeId>,
}

/// Resolver capability consumed by the classifiers
pub trait SymbolResolver {
    /// Resolution scope of `node`
    fn resolve_scope(&self, node: NodeId) -> ResolveScope;

    /// Look up a type by fully qualified name
    fn find_class(&self, fq_name: &str, scope: &ResolveScope) -> Option<ClassSymbol>;

    /// Bind a class-like declaration node to its class model
    fn class_of(&self, declaration: NodeId) -> Option<ClassSymbol>;

    /// Whether `class` inherits `base`; `deep` follows the whole supertype
    /// graph instead of direct supertypes only. A class never inherits
    /// itself.
    fn is_inheritor(&self, class: &ClassSymbol, base: &ClassSymbol, deep: bool) -> bool;

    /// Resolve a name reference to the declared function it denotes
    fn resolve_function(&self, reference: NodeId) -> Option<FunctionSymbol>;

    /// Resolve a type name as written at `context` to a fully qualified name
    fn resolve_type_name(&self, context: NodeId, written: &str) -> Option<String>;
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for &R {
    fn resolve_scope(&self, node: NodeId) -> ResolveScope {
        (**self).resolve_scope(node)
    }

    fn find_class(&self, fq_name: &str, scope: &ResolveScope) -> Option<ClassSymbol> {
        (**self).find_class(fq_name, scope)
    }

    fn class_of(&self, declaration: NodeId) -> Option<ClassSymbol> {
        (**self).class_of(declaration)
    }

    fn is_inheritor(&self, class: &ClassSymbol, base: &ClassSymbol, deep: bool) -> bool {
        (**self).is_inheritor(class, base, deep)
    }

    fn resolve_function(&self, reference: NodeId) -> Option<FunctionSymbol> {
        (**self).resolve_function(reference)
    }

    fn resolve_type_name(&self, context: NodeId, written: &str) -> Option<String> {
        (**self).resolve_type_name(context, written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_visibility() {
        let restricted = vec!["spec".to_string()];
        assert!(ResolveScope::Project.sees(&restricted));
        assert!(ResolveScope::Module("spec".into()).sees(&restricted));
        assert!(!ResolveScope::Module("main".into()).sees(&restricted));
        assert!(ResolveScope::Module("main".into()).sees(&[]));
    }

    #[test]
    fn test_simple_name() {
        let class = ClassSymbol {
            fq_name: "com.example.FooSpec".into(),
            is_abstract: false,
            scope: ResolveScope::Project,
            declaration: None,
        };
        assert_eq!(class.simple_name(), "FooSpec");
    }
}
