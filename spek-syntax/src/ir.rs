//! Core IR (Intermediate Representation) Types
//!
//! The syntax tree is an arena of [`Node`]s addressed by [`NodeId`] handles.
//! Its shape follows the Kotlin PSI closely enough that structural checks
//! written against the PSI ("call → block → function literal → lambda
//! expression") can be expressed one-to-one:
//!
//! ```text
//! Call
//! ├── NameReference "describe"
//! ├── ValueArgument
//! │   └── StringTemplate "\"a widget\""
//! └── LambdaArgument
//!     └── LambdaExpression
//!         └── FunctionLiteral
//!             └── Block
//!                 └── Call ...
//! ```
//!
//! Trees are produced either by a language adapter from real source or by
//! [`TreeBuilder`] for in-memory fixtures.

use serde::{Deserialize, Serialize};

// ============================================================================
// Language Identification
// ============================================================================

/// Language identifier for source files
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    Kotlin,
    KotlinScript,
    Unknown,
}

impl LanguageId {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "kt" => Self::Kotlin,
            "kts" => Self::KotlinScript,
            _ => Self::Unknown,
        }
    }

    /// Detect language from a file path
    pub fn from_path(path: &std::path::Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Kotlin => "Kotlin",
            Self::KotlinScript => "Kotlin Script",
            Self::Unknown => "Unknown",
        }
    }
}

// ============================================================================
// Source Location
// ============================================================================

/// A span in the source file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the start
    pub start: usize,
    /// Byte offset of the end (exclusive)
    pub end: usize,
    /// Starting line (1-indexed)
    pub start_line: usize,
    /// Ending line (1-indexed)
    pub end_line: usize,
    /// Starting column (0-indexed)
    pub start_column: usize,
    /// Ending column (0-indexed)
    pub end_column: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Handle to a node inside a [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A type as written in a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum TypeRef {
    /// A plain user type such as `SpecBody` or `org.example.SpecBody<T>`
    User(String),
    /// Nullable, function, parenthesized or otherwise decorated types
    Other(String),
}

impl TypeRef {
    /// The referenced simple name of a user type, without qualifier or type
    /// arguments. `None` for anything that is not a plain user type.
    pub fn referenced_name(&self) -> Option<&str> {
        match self {
            TypeRef::User(text) => {
                let base = text.split('<').next().unwrap_or(text.as_str()).trim();
                let simple = base.rsplit('.').next().unwrap_or(base).trim();
                (!simple.is_empty()).then_some(simple)
            }
            TypeRef::Other(_) => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            TypeRef::User(text) | TypeRef::Other(text) => text,
        }
    }
}

/// An `import` directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDirective {
    /// Imported path without the trailing `.*`
    pub path: String,
    /// `import a.b.C as D`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// `import a.b.*`
    #[serde(default)]
    pub star: bool,
}

impl ImportDirective {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: None,
            star: false,
        }
    }

    pub fn star(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: None,
            star: true,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Simple name this import binds in the file, if it binds one
    pub fn bound_name(&self) -> Option<&str> {
        if self.star {
            return None;
        }
        self.alias
            .as_deref()
            .or_else(|| self.path.rsplit('.').next())
    }
}

/// A class, interface or object declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: String,
    /// Supertypes as written (`Spek`, `org.jetbrains.spek.api.Spek`)
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_interface: bool,
}

impl ClassDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
            is_abstract: false,
            is_interface: false,
        }
    }

    pub fn with_supertype(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self
    }
}

/// A named function declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    /// Extension receiver, if declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<TypeRef>,
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receiver: None,
        }
    }

    pub fn with_receiver(mut self, receiver: TypeRef) -> Self {
        self.receiver = Some(receiver);
        self
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Root of a source file
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        package: Option<String>,
    },
    Import(ImportDirective),
    Class(ClassDeclaration),
    Object(ClassDeclaration),
    Function(FunctionDeclaration),
    /// Annotation entry; `type_name` as written
    Annotation { type_name: String },
    Call,
    /// Bare identifier used as an expression
    NameReference { name: String },
    /// `receiver.selector`
    DotQualified,
    ValueArgument,
    /// Trailing lambda passed outside the parentheses
    LambdaArgument,
    LambdaExpression,
    FunctionLiteral,
    Block,
    /// String literal; `text` includes the quotes
    StringTemplate { text: String },
    /// Anything the analysis does not care about
    Other { kind: String },
}

impl NodeKind {
    pub fn other(kind: impl Into<String>) -> Self {
        NodeKind::Other { kind: kind.into() }
    }

    /// Class-or-object declarations
    pub fn is_class_like(&self) -> bool {
        matches!(self, NodeKind::Class(_) | NodeKind::Object(_))
    }

    pub fn is_call(&self) -> bool {
        matches!(self, NodeKind::Call)
    }

    /// Value-level arguments of a call, including trailing lambdas
    pub fn is_argument(&self) -> bool {
        matches!(self, NodeKind::ValueArgument | NodeKind::LambdaArgument)
    }

    /// Declaration payload of class-like nodes
    pub fn class_declaration(&self) -> Option<&ClassDeclaration> {
        match self {
            NodeKind::Class(decl) | NodeKind::Object(decl) => Some(decl),
            _ => None,
        }
    }

    /// Short label used in logs and debug dumps
    pub fn label(&self) -> &str {
        match self {
            NodeKind::File { .. } => "file",
            NodeKind::Import(_) => "import",
            NodeKind::Class(_) => "class",
            NodeKind::Object(_) => "object",
            NodeKind::Function(_) => "function",
            NodeKind::Annotation { .. } => "annotation",
            NodeKind::Call => "call",
            NodeKind::NameReference { .. } => "name_reference",
            NodeKind::DotQualified => "dot_qualified",
            NodeKind::ValueArgument => "value_argument",
            NodeKind::LambdaArgument => "lambda_argument",
            NodeKind::LambdaExpression => "lambda_expression",
            NodeKind::FunctionLiteral => "function_literal",
            NodeKind::Block => "block",
            NodeKind::StringTemplate { .. } => "string_template",
            NodeKind::Other { kind } => kind,
        }
    }
}

/// A single node of the arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub span: Span,
}

// ============================================================================
// Syntax Tree
// ============================================================================

/// An immutable, arena-backed syntax tree for one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxTree {
    /// Path of the source file, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub language: LanguageId,
    nodes: Vec<Node>,
    /// Regions the parser could not make sense of
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_regions: Vec<Span>,
}

impl SyntaxTree {
    /// The file node; always present
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Package declared by the file
    pub fn package(&self) -> Option<&str> {
        match self.nodes.first().map(|n| &n.kind) {
            Some(NodeKind::File { package }) => package.as_deref(),
            _ => None,
        }
    }

    /// All nodes below (and including) `id`, in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Nodes of the whole file matching `pred`, in document order
    pub fn find_all(&self, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|n| pred(&n.kind)))
            .collect()
    }

    /// Every call node of the file, in document order
    pub fn calls(&self) -> Vec<NodeId> {
        self.find_all(NodeKind::is_call)
    }

    /// Every import directive of the file
    pub fn imports(&self) -> Vec<&ImportDirective> {
        self.nodes
            .iter()
            .filter_map(|n| match &n.kind {
                NodeKind::Import(import) => Some(import),
                _ => None,
            })
            .collect()
    }

    /// Indented dump of the tree, handy when a fixture does not classify
    /// the way a test expects
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            let detail = match &node.kind {
                NodeKind::NameReference { name } => format!(" {name}"),
                NodeKind::StringTemplate { text } => format!(" {text}"),
                NodeKind::Class(d) | NodeKind::Object(d) => format!(" {}", d.name),
                NodeKind::Function(d) => format!(" {}", d.name),
                NodeKind::Annotation { type_name } => format!(" @{type_name}"),
                _ => String::new(),
            };
            out.push_str(&format!(
                "{}{}{} [{}]\n",
                "  ".repeat(depth),
                node.kind.label(),
                detail,
                node.span.start_line
            ));
            for child in node.children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Incremental construction of a [`SyntaxTree`]
///
/// Adapters use the primitive [`TreeBuilder::add`]; the remaining helpers
/// assemble the common Kotlin shapes for hand-written fixtures.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    tree: SyntaxTree,
}

impl TreeBuilder {
    pub fn new(language: LanguageId) -> Self {
        Self {
            tree: SyntaxTree {
                path: None,
                language,
                nodes: vec![Node {
                    kind: NodeKind::File { package: None },
                    parent: None,
                    children: Vec::new(),
                    span: Span::default(),
                }],
                error_regions: Vec::new(),
            },
        }
    }

    /// Kotlin file in `package`
    pub fn kotlin(package: Option<&str>) -> Self {
        let mut builder = Self::new(LanguageId::Kotlin);
        builder.set_package(package.map(str::to_string));
        builder
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.tree.path = Some(path.into());
    }

    pub fn set_package(&mut self, package: Option<String>) {
        self.tree.nodes[0].kind = NodeKind::File { package };
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        if let Some(node) = self.tree.nodes.get_mut(id.index()) {
            node.span = span;
        }
    }

    pub fn push_error_region(&mut self, span: Span) {
        self.tree.error_regions.push(span);
    }

    /// Append a node of `kind` as the last child of `parent`
    pub fn add(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        self.add_with_span(parent, kind, Span::default())
    }

    pub fn add_with_span(&mut self, parent: NodeId, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.tree.nodes.len() as u32);
        self.tree.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            span,
        });
        self.tree.nodes[parent.index()].children.push(id);
        id
    }

    pub fn import(&mut self, import: ImportDirective) -> NodeId {
        let root = self.root();
        self.add(root, NodeKind::Import(import))
    }

    pub fn class(&mut self, parent: NodeId, decl: ClassDeclaration) -> NodeId {
        self.add(parent, NodeKind::Class(decl))
    }

    pub fn object(&mut self, parent: NodeId, decl: ClassDeclaration) -> NodeId {
        self.add(parent, NodeKind::Object(decl))
    }

    pub fn function(&mut self, parent: NodeId, decl: FunctionDeclaration) -> NodeId {
        self.add(parent, NodeKind::Function(decl))
    }

    pub fn annotation(&mut self, parent: NodeId, type_name: impl Into<String>) -> NodeId {
        self.add(
            parent,
            NodeKind::Annotation {
                type_name: type_name.into(),
            },
        )
    }

    /// `LambdaExpression → FunctionLiteral → Block` under `parent`;
    /// returns the block
    pub fn lambda(&mut self, parent: NodeId) -> NodeId {
        let lambda = self.add(parent, NodeKind::LambdaExpression);
        let literal = self.add(lambda, NodeKind::FunctionLiteral);
        self.add(literal, NodeKind::Block)
    }

    /// A call whose callee is the bare name `callee`
    pub fn call(&mut self, parent: NodeId, callee: &str) -> NodeId {
        let call = self.add(parent, NodeKind::Call);
        self.add(
            call,
            NodeKind::NameReference {
                name: callee.to_string(),
            },
        );
        call
    }

    /// Value argument holding the string literal `"text"`
    pub fn string_argument(&mut self, call: NodeId, text: &str) -> NodeId {
        let argument = self.add(call, NodeKind::ValueArgument);
        self.add(
            argument,
            NodeKind::StringTemplate {
                text: format!("\"{text}\""),
            },
        );
        argument
    }

    /// Value argument holding a lambda; returns the lambda's block
    pub fn lambda_value_argument(&mut self, call: NodeId) -> NodeId {
        let argument = self.add(call, NodeKind::ValueArgument);
        self.lambda(argument)
    }

    /// Trailing lambda argument; returns the lambda's block
    pub fn trailing_lambda(&mut self, call: NodeId) -> NodeId {
        let argument = self.add(call, NodeKind::LambdaArgument);
        self.lambda(argument)
    }

    /// `name("description") { }` inside `block`; returns `(call, body)`
    pub fn block_call(&mut self, block: NodeId, name: &str, description: &str) -> (NodeId, NodeId) {
        let call = self.call(block, name);
        self.string_argument(call, description);
        let body = self.trailing_lambda(call);
        (call, body)
    }

    /// `class name : Spek({ ... })` with the Spek lambda passed in
    /// parentheses; returns `(class, spec_body)`
    pub fn spek_class(&mut self, decl: ClassDeclaration) -> (NodeId, NodeId) {
        let root = self.root();
        let class = self.class(root, decl);
        let specifier = self.add(class, NodeKind::other("delegation_specifier"));
        let invocation = self.add(specifier, NodeKind::other("constructor_invocation"));
        let body = self.lambda_value_argument(invocation);
        (class, body)
    }

    pub fn finish(self) -> SyntaxTree {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(LanguageId::from_extension("kt"), LanguageId::Kotlin);
        assert_eq!(LanguageId::from_extension("KTS"), LanguageId::KotlinScript);
        assert_eq!(LanguageId::from_extension("rs"), LanguageId::Unknown);
    }

    #[test]
    fn test_referenced_name() {
        assert_eq!(TypeRef::User("SpecBody".into()).referenced_name(), Some("SpecBody"));
        assert_eq!(
            TypeRef::User("org.jetbrains.spek.api.dsl.SpecBody".into()).referenced_name(),
            Some("SpecBody")
        );
        assert_eq!(
            TypeRef::User("Container<String>".into()).referenced_name(),
            Some("Container")
        );
        assert_eq!(TypeRef::Other("SpecBody?".into()).referenced_name(), None);
    }

    #[test]
    fn test_import_bound_name() {
        assert_eq!(
            ImportDirective::new("org.jetbrains.spek.api.Spek").bound_name(),
            Some("Spek")
        );
        assert_eq!(
            ImportDirective::new("org.jetbrains.spek.api.Spek")
                .with_alias("Base")
                .bound_name(),
            Some("Base")
        );
        assert_eq!(ImportDirective::star("org.jetbrains.spek.api").bound_name(), None);
    }

    #[test]
    fn test_builder_links_parents_and_children() {
        let mut b = TreeBuilder::kotlin(Some("com.example"));
        let (class, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        let (describe, inner) = b.block_call(body, "describe", "a widget");
        let (it, _) = b.block_call(inner, "it", "is built");
        let tree = b.finish();

        assert_eq!(tree.package(), Some("com.example"));
        assert_eq!(tree.get(class).unwrap().parent, Some(tree.root()));
        assert_eq!(tree.calls(), vec![describe, it]);

        let it_node = tree.get(it).unwrap();
        let block = tree.get(it_node.parent.unwrap()).unwrap();
        assert_eq!(block.kind, NodeKind::Block);
    }

    #[test]
    fn test_descendants_document_order() {
        let mut b = TreeBuilder::kotlin(None);
        let root = b.root();
        let first = b.call(root, "first");
        let second = b.call(root, "second");
        let tree = b.finish();

        let order = tree.descendants(root);
        let first_pos = order.iter().position(|id| *id == first).unwrap();
        let second_pos = order.iter().position(|id| *id == second).unwrap();
        assert!(first_pos < second_pos);
        assert_eq!(order[0], root);
    }

    #[test]
    fn test_debug_dump_mentions_names() {
        let mut b = TreeBuilder::kotlin(None);
        let (_, body) = b.spek_class(ClassDeclaration::new("FooSpec"));
        b.block_call(body, "describe", "a widget");
        let dump = b.finish().debug_dump();
        assert!(dump.contains("class FooSpec"));
        assert!(dump.contains("name_reference describe"));
        assert!(dump.contains("\"a widget\""));
    }
}
