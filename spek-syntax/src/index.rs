//! Symbol Index
//!
//! An in-memory [`SymbolResolver`] for a single file. It knows the classes
//! and functions the file declares plus everything in a [`LibraryModel`],
//! and resolves written names the way Kotlin does for the common cases:
//!
//! 1. classes nested in an enclosing class
//! 2. explicit (possibly aliased) imports
//! 3. the file's own package
//! 4. star imports
//! 5. names that are already fully qualified
//!
//! Anything else stays unresolved. Declarations in other source files are
//! never consulted.

use crate::ir::{NodeId, NodeKind, SyntaxTree};
use crate::library::LibraryModel;
use crate::navigation::SyntaxNavigator;
use crate::symbols::{ClassSymbol, FunctionSymbol, ResolveScope, SymbolResolver};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::debug;

#[derive(Debug, Clone)]
struct TypeEntry {
    supertypes: Vec<String>,
    is_abstract: bool,
    modules: Vec<String>,
    declaration: Option<NodeId>,
}

/// Resolver over one [`SyntaxTree`] and a [`LibraryModel`]
#[derive(Debug)]
pub struct SymbolIndex<'t> {
    tree: &'t SyntaxTree,
    library: &'t LibraryModel,
    scope: ResolveScope,
    types: BTreeMap<String, TypeEntry>,
    file_classes: HashMap<NodeId, String>,
    file_functions: Vec<FunctionSymbol>,
}

impl<'t> SymbolIndex<'t> {
    /// Index the declarations of `tree` on top of `library`
    pub fn build(tree: &'t SyntaxTree, library: &'t LibraryModel) -> Self {
        let mut index = Self {
            tree,
            library,
            scope: ResolveScope::Project,
            types: BTreeMap::new(),
            file_classes: HashMap::new(),
            file_functions: Vec::new(),
        };

        for ty in &library.types {
            index.types.insert(
                ty.fq_name.clone(),
                TypeEntry {
                    supertypes: ty.supertypes.clone(),
                    is_abstract: ty.is_abstract,
                    modules: ty.modules.clone(),
                    declaration: None,
                },
            );
        }

        // File classes first with written supertypes, then resolve once every
        // fully qualified name of the file is known.
        let mut written = Vec::new();
        for id in tree.find_all(NodeKind::is_class_like) {
            let Some(decl) = tree.kind(id).and_then(NodeKind::class_declaration) else {
                continue;
            };
            let fq_name = index.qualified_name_of(id);
            index.types.insert(
                fq_name.clone(),
                TypeEntry {
                    supertypes: Vec::new(),
                    is_abstract: decl.is_abstract || decl.is_interface,
                    modules: Vec::new(),
                    declaration: Some(id),
                },
            );
            index.file_classes.insert(id, fq_name.clone());
            written.push((id, fq_name, decl.supertypes.clone()));
        }

        for (id, fq_name, supertypes) in written {
            let resolved: Vec<String> = supertypes
                .iter()
                .map(|s| index.resolve_type_name(id, s).unwrap_or_else(|| s.clone()))
                .collect();
            if let Some(entry) = index.types.get_mut(&fq_name) {
                entry.supertypes = resolved;
            }
        }

        for id in tree.find_all(|k| matches!(k, NodeKind::Function(_))) {
            if let Some(NodeKind::Function(decl)) = tree.kind(id) {
                let owner = tree
                    .containing_class_like(id)
                    .and_then(|class| index.file_classes.get(&class).cloned())
                    .or_else(|| tree.package().map(str::to_string));
                let fq_name = match owner {
                    Some(owner) => format!("{owner}.{}", decl.name),
                    None => decl.name.clone(),
                };
                index.file_functions.push(FunctionSymbol {
                    name: decl.name.clone(),
                    fq_name,
                    receiver: decl.receiver.clone(),
                    declaration: Some(id),
                });
            }
        }

        debug!(
            file = tree.path.as_deref().unwrap_or("<memory>"),
            classes = index.file_classes.len(),
            functions = index.file_functions.len(),
            library_types = library.types.len(),
            "symbol index built"
        );

        index
    }

    /// Bind every lookup to `scope` instead of the whole project
    pub fn with_scope(mut self, scope: ResolveScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    /// Fully qualified name of a class-like declaration of the file
    pub fn qualified_name_of(&self, declaration: NodeId) -> String {
        let mut parts: Vec<&str> = std::iter::once(declaration)
            .chain(self.tree.ancestors(declaration))
            .filter_map(|id| self.tree.kind(id).and_then(NodeKind::class_declaration))
            .map(|decl| decl.name.as_str())
            .collect();
        parts.reverse();
        let local = parts.join(".");
        match self.tree.package() {
            Some(package) if !package.is_empty() => format!("{package}.{local}"),
            _ => local,
        }
    }

    fn resolve_simple_type(&self, context: NodeId, name: &str) -> Option<String> {
        // Nested in an enclosing class
        for ancestor in self.tree.ancestors(context) {
            if let Some(outer) = self.file_classes.get(&ancestor) {
                let candidate = format!("{outer}.{name}");
                if self.types.contains_key(&candidate) {
                    return Some(candidate);
                }
            }
        }

        let imports = self.tree.imports();
        if let Some(import) = imports.iter().find(|i| i.bound_name() == Some(name)) {
            return Some(import.path.clone());
        }

        if let Some(package) = self.tree.package() {
            let candidate = format!("{package}.{name}");
            if self.types.contains_key(&candidate) {
                return Some(candidate);
            }
        }

        for import in imports.iter().filter(|i| i.star) {
            let candidate = format!("{}.{name}", import.path);
            if self.types.contains_key(&candidate) {
                return Some(candidate);
            }
        }

        self.types.contains_key(name).then(|| name.to_string())
    }

    fn function_visible(&self, fq_name: &str, package: &str, name: &str) -> bool {
        if self.tree.package().unwrap_or("") == package {
            return true;
        }
        self.tree.imports().iter().any(|import| {
            if import.star {
                import.path == package
            } else {
                import.path == fq_name && import.bound_name() == Some(name)
            }
        })
    }

    /// Top-level functions are visible everywhere in the file, members only
    /// from inside their class
    fn function_visible_from(&self, function: &FunctionSymbol, reference: NodeId) -> bool {
        let owner = function
            .declaration
            .and_then(|decl| self.tree.containing_class_like(decl));
        match owner {
            None => true,
            Some(owner) => self.tree.ancestors(reference).any(|id| id == owner),
        }
    }

    fn library_function(&self, name: &str) -> Option<FunctionSymbol> {
        // Aliased import: `import a.b.describe as feature`
        let aliased = self
            .tree
            .imports()
            .into_iter()
            .find(|i| !i.star && i.alias.as_deref() == Some(name))
            .map(|i| i.path.clone());

        let found = match aliased {
            Some(fq_name) => self.library.functions.iter().find(|f| f.fq_name == fq_name),
            None => self
                .library
                .functions_named(name)
                .find(|f| self.function_visible(&f.fq_name, f.package(), name)),
        }?;

        Some(FunctionSymbol {
            name: found.name().to_string(),
            fq_name: found.fq_name.clone(),
            receiver: found.receiver.clone(),
            declaration: None,
        })
    }
}

/// Drop type arguments, nullability and whitespace from a written type
fn clean_type_name(written: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(written.len());
    for c in written.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            '?' => {}
            c if c.is_whitespace() => {}
            c if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

impl SymbolResolver for SymbolIndex<'_> {
    fn resolve_scope(&self, _node: NodeId) -> ResolveScope {
        self.scope.clone()
    }

    fn find_class(&self, fq_name: &str, scope: &ResolveScope) -> Option<ClassSymbol> {
        let entry = self.types.get(fq_name)?;
        if !scope.sees(&entry.modules) {
            return None;
        }
        Some(ClassSymbol {
            fq_name: fq_name.to_string(),
            is_abstract: entry.is_abstract,
            scope: scope.clone(),
            declaration: entry.declaration,
        })
    }

    fn class_of(&self, declaration: NodeId) -> Option<ClassSymbol> {
        let fq_name = self.file_classes.get(&declaration)?;
        let scope = self.resolve_scope(declaration);
        self.find_class(fq_name, &scope)
    }

    fn is_inheritor(&self, class: &ClassSymbol, base: &ClassSymbol, deep: bool) -> bool {
        if class.fq_name == base.fq_name {
            return false;
        }
        let Some(entry) = self.types.get(&class.fq_name) else {
            return false;
        };
        if !deep {
            return entry.supertypes.contains(&base.fq_name);
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = entry.supertypes.iter().map(String::as_str).collect();
        while let Some(current) = queue.pop_front() {
            if current == base.fq_name {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(next) = self.types.get(current) {
                queue.extend(next.supertypes.iter().map(String::as_str));
            }
        }
        false
    }

    fn resolve_function(&self, reference: NodeId) -> Option<FunctionSymbol> {
        let Some(NodeKind::NameReference { name }) = self.tree.kind(reference) else {
            return None;
        };
        self.file_functions
            .iter()
            .find(|f| &f.name == name && self.function_visible_from(f, reference))
            .cloned()
            .or_else(|| self.library_function(name))
    }

    fn resolve_type_name(&self, context: NodeId, written: &str) -> Option<String> {
        let cleaned = clean_type_name(written);
        if cleaned.is_empty() {
            return None;
        }
        if cleaned.contains('.') && self.types.contains_key(&cleaned) {
            return Some(cleaned);
        }
        match cleaned.split_once('.') {
            Some((head, rest)) => self
                .resolve_simple_type(context, head)
                .map(|head| format!("{head}.{rest}"))
                .or_else(|| Some(cleaned.clone())),
            None => self.resolve_simple_type(context, &cleaned),
        }
    }
}
