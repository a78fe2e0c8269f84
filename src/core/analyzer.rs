//! Analyzer facade
//!
//! [`SpecAnalyzer`] bundles a syntax navigator and a symbol resolver so
//! callers do not have to thread both capabilities through every query.

use crate::core::block::{classify_block, ClassifiedBlock};
use crate::core::classifier::{is_spec, is_spec_declaration};
use crate::core::containment::{containing_spec_class, is_junit4};
use crate::core::error::PathError;
use crate::core::path::{extract_path, Path};
use spek_syntax::{ClassSymbol, NodeId, SymbolResolver, SyntaxNavigator};

/// Spec queries over one syntax tree and its resolver
pub struct SpecAnalyzer<'a, N, R: ?Sized> {
    nav: &'a N,
    resolver: &'a R,
}

impl<N, R: ?Sized> Clone for SpecAnalyzer<'_, N, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N, R: ?Sized> Copy for SpecAnalyzer<'_, N, R> {}

impl<'a, N, R> SpecAnalyzer<'a, N, R>
where
    N: SyntaxNavigator,
    R: SymbolResolver + ?Sized,
{
    pub fn new(nav: &'a N, resolver: &'a R) -> Self {
        Self { nav, resolver }
    }

    pub fn navigator(&self) -> &'a N {
        self.nav
    }

    pub fn resolver(&self) -> &'a R {
        self.resolver
    }

    pub fn is_spec(&self, class: &ClassSymbol) -> bool {
        is_spec(self.resolver, class)
    }

    pub fn is_spec_declaration(&self, declaration: NodeId) -> bool {
        is_spec_declaration(self.resolver, declaration)
    }

    pub fn classify_block(&self, call: NodeId) -> Option<ClassifiedBlock> {
        classify_block(self.nav, self.resolver, call)
    }

    pub fn is_spec_block(&self, call: NodeId) -> bool {
        self.classify_block(call).is_some()
    }

    pub fn containing_spec_class(&self, node: NodeId) -> Option<ClassSymbol> {
        containing_spec_class(self.nav, self.resolver, node)
    }

    pub fn is_contained_in_spec(&self, node: NodeId) -> bool {
        self.containing_spec_class(node).is_some()
    }

    pub fn is_junit4(&self, class: NodeId) -> bool {
        is_junit4(self.nav, self.resolver, class)
    }

    pub fn extract_path(&self, call: NodeId) -> Result<Path, PathError> {
        extract_path(self.nav, self.resolver, call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spek_syntax::{ClassDeclaration, ImportDirective, LibraryModel, SymbolIndex, TreeBuilder};

    #[test]
    fn test_facade_matches_free_functions() {
        let mut b = TreeBuilder::kotlin(Some("com.example"));
        b.import(ImportDirective::new("org.jetbrains.spek.api.Spek"));
        b.import(ImportDirective::star("org.jetbrains.spek.api.dsl"));
        let (class, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        let (describe, describe_body) = b.block_call(body, "describe", "a widget");
        let (it, _) = b.block_call(describe_body, "it", "is built");
        let tree = b.finish();
        let library = LibraryModel::spek_api();
        let index = SymbolIndex::build(&tree, &library);
        let analyzer = SpecAnalyzer::new(&tree, &index);

        assert!(analyzer.is_spec_declaration(class));
        assert!(!analyzer.is_junit4(class));
        assert!(analyzer.is_spec_block(describe));
        assert!(analyzer.is_contained_in_spec(it));
        assert_eq!(
            analyzer.extract_path(it),
            extract_path(&tree, &index, it)
        );

        let spec = analyzer.containing_spec_class(it).unwrap();
        assert!(analyzer.is_spec(&spec));
    }

    #[test]
    fn test_facade_over_trait_object_resolver() {
        let mut b = TreeBuilder::kotlin(Some("com.example"));
        b.import(ImportDirective::new("org.jetbrains.spek.api.Spek"));
        b.import(ImportDirective::star("org.jetbrains.spek.api.dsl"));
        let (_, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        let (it, _) = b.block_call(body, "it", "runs");
        let tree = b.finish();
        let library = LibraryModel::spek_api();
        let index = SymbolIndex::build(&tree, &library);
        let resolver: &dyn SymbolResolver = &index;
        let analyzer = SpecAnalyzer::new(&tree, resolver);

        assert_eq!(
            analyzer.extract_path(it).unwrap().to_string(),
            "com.example.FooSpec/it runs"
        );
    }
}
