//! Kotlin Language Adapter
//!
//! Lowers a Tree-sitter Kotlin parse tree into the PSI-shaped IR. Node kind
//! spellings of the classic grammar (`simple_identifier`, `call_suffix`,
//! `import_header`) and of the newer one (`identifier`, `import`) are both
//! accepted.

use super::{
    find_child_by_kind, find_descendant_by_kind, has_descendant_kind, node_text, node_to_span,
    LanguageAdapter,
};
use crate::ir::{
    ClassDeclaration, FunctionDeclaration, ImportDirective, LanguageId, NodeId, NodeKind,
    SyntaxTree, TreeBuilder, TypeRef,
};
use tracing::debug;

const IDENTIFIER_KINDS: &[&str] = &["simple_identifier", "identifier"];
const CLASS_NAME_KINDS: &[&str] = &["type_identifier", "simple_identifier", "identifier"];
const COMMENT_KINDS: &[&str] = &["line_comment", "multiline_comment", "block_comment", "comment"];
const STRING_KINDS: &[&str] = &["string_literal", "line_string_literal", "multi_line_string_literal"];
const RECEIVER_KINDS: &[&str] = &[
    "receiver_type",
    "type_reference",
    "user_type",
    "nullable_type",
    "function_type",
    "parenthesized_type",
];
/// Grammar wrappers with no PSI counterpart; their children are lowered
/// straight into the parent
const TRANSPARENT_KINDS: &[&str] = &["statements", "value_arguments", "delegation_specifiers"];

/// Kotlin language adapter using Tree-sitter
pub struct KotlinTreeSitterAdapter {
    language: tree_sitter::Language,
}

impl KotlinTreeSitterAdapter {
    /// Create a new Kotlin adapter
    pub fn new() -> Self {
        Self {
            language: tree_sitter_kotlin_ng::LANGUAGE.into(),
        }
    }
}

impl Default for KotlinTreeSitterAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAdapter for KotlinTreeSitterAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Kotlin
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        self.language.clone()
    }

    fn lower(&self, tree: &tree_sitter::Tree, source: &str) -> SyntaxTree {
        let root = tree.root_node();
        let mut lowering = Lowering {
            source,
            builder: TreeBuilder::new(LanguageId::Kotlin),
        };
        let file = lowering.builder.root();
        lowering.builder.set_span(file, node_to_span(&root));

        if let Some(header) = find_child_by_kind(&root, &["package_header"]) {
            let package = strip_keyword(node_text(&header, source), "package");
            if !package.is_empty() {
                lowering.builder.set_package(Some(package));
            }
        }

        lowering.lower_children(&root, file);

        for span in self.extract_errors(tree) {
            lowering.builder.push_error_region(span);
        }

        let lowered = lowering.builder.finish();
        debug!(
            nodes = lowered.len(),
            errors = lowered.error_regions.len(),
            "lowered kotlin parse tree"
        );
        lowered
    }
}

struct Lowering<'s> {
    source: &'s str,
    builder: TreeBuilder,
}

impl Lowering<'_> {
    fn text(&self, node: &tree_sitter::Node) -> &str {
        node_text(node, self.source)
    }

    fn add(&mut self, parent: NodeId, kind: NodeKind, node: &tree_sitter::Node) -> NodeId {
        self.builder.add_with_span(parent, kind, node_to_span(node))
    }

    fn lower_children(&mut self, node: &tree_sitter::Node, parent: NodeId) {
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children {
            self.lower_node(&child, parent);
        }
    }

    fn lower_node(&mut self, node: &tree_sitter::Node, parent: NodeId) {
        let kind = node.kind();
        if COMMENT_KINDS.contains(&kind) || kind == "package_header" {
            return;
        }
        if TRANSPARENT_KINDS.contains(&kind) {
            self.lower_children(node, parent);
            return;
        }
        if STRING_KINDS.contains(&kind) {
            let text = self.text(node).to_string();
            self.add(parent, NodeKind::StringTemplate { text }, node);
            return;
        }
        if IDENTIFIER_KINDS.contains(&kind) {
            let name = self.text(node).to_string();
            self.add(parent, NodeKind::NameReference { name }, node);
            return;
        }

        match kind {
            "import_header" | "import" => {
                let directive = parse_import(self.text(node));
                self.add(parent, NodeKind::Import(directive), node);
            }
            "class_declaration" | "interface_declaration" => self.lower_class(node, parent, false),
            "object_declaration" => self.lower_class(node, parent, true),
            "function_declaration" => self.lower_function(node, parent),
            "call_expression" => self.lower_call(node, parent),
            "lambda_literal" => self.lower_lambda(node, parent),
            "navigation_expression" => {
                let id = self.add(parent, NodeKind::DotQualified, node);
                self.lower_children(node, id);
            }
            "value_argument" => {
                let id = self.add(parent, NodeKind::ValueArgument, node);
                self.lower_children(node, id);
            }
            "annotation" => {
                let type_name = annotation_type_name(node, self.source);
                self.add(parent, NodeKind::Annotation { type_name }, node);
            }
            _ => {
                let id = self.add(parent, NodeKind::other(kind), node);
                self.lower_children(node, id);
            }
        }
    }

    fn lower_call(&mut self, node: &tree_sitter::Node, parent: NodeId) {
        let call = self.add(parent, NodeKind::Call, node);
        self.lower_call_parts(node, call);
    }

    /// Callee and arguments of `node` as children of `call`.
    ///
    /// A trailing lambda parses as `call_expression(call_expression(callee,
    /// value_arguments), annotated_lambda)`; the inner call is merged so the
    /// result is a single `Call(callee, ValueArgument.., LambdaArgument)`.
    fn lower_call_parts(&mut self, node: &tree_sitter::Node, call: NodeId) {
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        let mut children = children.into_iter();

        if let Some(callee) = children.next() {
            if callee.kind() == "call_expression" {
                self.lower_call_parts(&callee, call);
            } else {
                self.lower_node(&callee, call);
            }
        }
        for child in children {
            self.lower_call_suffix(&child, call);
        }
    }

    fn lower_call_suffix(&mut self, node: &tree_sitter::Node, call: NodeId) {
        match node.kind() {
            "call_suffix" | "value_arguments" => {
                let mut cursor = node.walk();
                let children: Vec<_> = node.named_children(&mut cursor).collect();
                for child in children {
                    self.lower_call_suffix(&child, call);
                }
            }
            "annotated_lambda" => {
                let argument = self.add(call, NodeKind::LambdaArgument, node);
                if let Some(lambda) = find_child_by_kind(node, &["lambda_literal"]) {
                    self.lower_lambda(&lambda, argument);
                }
            }
            "lambda_literal" => {
                let argument = self.add(call, NodeKind::LambdaArgument, node);
                self.lower_lambda(node, argument);
            }
            _ => self.lower_node(node, call),
        }
    }

    /// `LambdaExpression → FunctionLiteral → Block`, statements in the block
    fn lower_lambda(&mut self, node: &tree_sitter::Node, parent: NodeId) {
        let lambda = self.add(parent, NodeKind::LambdaExpression, node);
        let literal = self.add(lambda, NodeKind::FunctionLiteral, node);
        let block = self.add(literal, NodeKind::Block, node);

        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children {
            if child.kind() == "lambda_parameters" {
                self.lower_node(&child, literal);
            } else {
                self.lower_node(&child, block);
            }
        }
    }

    fn lower_class(&mut self, node: &tree_sitter::Node, parent: NodeId, is_object: bool) {
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| find_child_by_kind(node, CLASS_NAME_KINDS));
        let modifiers = find_child_by_kind(node, &["modifiers"]);

        let mut decl = ClassDeclaration::new(
            name_node.map(|n| self.text(&n).to_string()).unwrap_or_default(),
        );
        decl.is_abstract = modifiers.is_some_and(|m| has_descendant_kind(&m, "abstract"));
        {
            let mut cursor = node.walk();
            decl.is_interface = node.kind() == "interface_declaration"
                || node.children(&mut cursor).any(|c| c.kind() == "interface");
        }
        for specifier in delegation_specifiers(node) {
            if let Some(user_type) = find_descendant_by_kind(&specifier, &["user_type"]) {
                decl.supertypes.push(strip_whitespace(self.text(&user_type)));
            }
        }

        let kind = if is_object {
            NodeKind::Object(decl)
        } else {
            NodeKind::Class(decl)
        };
        let class = self.add(parent, kind, node);

        if let Some(modifiers) = modifiers {
            self.lower_annotations(&modifiers, class);
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children {
            if Some(child.id()) == name_node.map(|n| n.id()) || child.kind() == "modifiers" {
                continue;
            }
            self.lower_node(&child, class);
        }
    }

    fn lower_annotations(&mut self, modifiers: &tree_sitter::Node, owner: NodeId) {
        let mut cursor = modifiers.walk();
        let children: Vec<_> = modifiers.named_children(&mut cursor).collect();
        for child in children {
            if child.kind() == "annotation" {
                self.lower_node(&child, owner);
            }
        }
    }

    fn lower_function(&mut self, node: &tree_sitter::Node, parent: NodeId) {
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| find_child_by_kind(node, IDENTIFIER_KINDS));

        let mut receiver_node = node.child_by_field_name("receiver");
        if receiver_node.is_none() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.named_children(&mut cursor).collect();
            receiver_node = children
                .into_iter()
                .take_while(|c| Some(c.id()) != name_node.map(|n| n.id()))
                .find(|c| RECEIVER_KINDS.contains(&c.kind()));
        }

        let mut decl = FunctionDeclaration::new(
            name_node.map(|n| self.text(&n).to_string()).unwrap_or_default(),
        );
        decl.receiver = receiver_node.map(|r| type_ref_of(&r, self.source));

        let function = self.add(parent, NodeKind::Function(decl), node);

        let skipped: Vec<usize> = [name_node, receiver_node]
            .iter()
            .flatten()
            .map(|n| n.id())
            .collect();
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children {
            if skipped.contains(&child.id()) {
                continue;
            }
            if child.kind() == "modifiers" {
                self.lower_annotations(&child, function);
                continue;
            }
            self.lower_node(&child, function);
        }
    }
}

/// Delegation specifiers of a class header, looking through wrapper nodes
fn delegation_specifiers<'a>(node: &tree_sitter::Node<'a>) -> Vec<tree_sitter::Node<'a>> {
    let mut found = Vec::new();
    let mut cursor = node.walk();
    let children: Vec<_> = node.named_children(&mut cursor).collect();
    for child in children {
        match child.kind() {
            "delegation_specifier" => found.push(child),
            "delegation_specifiers" => found.extend(delegation_specifiers(&child)),
            _ => {}
        }
    }
    found
}

/// Classify a receiver / type node
fn type_ref_of(node: &tree_sitter::Node, source: &str) -> TypeRef {
    match node.kind() {
        "user_type" => TypeRef::User(strip_whitespace(node_text(node, source))),
        "receiver_type" | "type_reference" | "type" => {
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .find(|c| !matches!(c.kind(), "type_modifiers" | "annotation"));
            match inner {
                Some(inner) => type_ref_of(&inner, source),
                None => TypeRef::Other(node_text(node, source).trim().to_string()),
            }
        }
        _ => TypeRef::Other(node_text(node, source).trim().to_string()),
    }
}

/// Written type name of an annotation entry
fn annotation_type_name(node: &tree_sitter::Node, source: &str) -> String {
    if let Some(user_type) = find_descendant_by_kind(node, &["user_type"]) {
        return strip_whitespace(node_text(&user_type, source));
    }
    let text = node_text(node, source).trim_start_matches('@');
    let text = text.rsplit_once(':').map(|(_, rest)| rest).unwrap_or(text);
    let end = text.find('(').unwrap_or(text.len());
    strip_whitespace(&text[..end])
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `package a.b;` → `a.b`
fn strip_keyword(text: &str, keyword: &str) -> String {
    let rest = text.trim().strip_prefix(keyword).unwrap_or(text);
    strip_whitespace(rest.trim().trim_end_matches(';'))
}

/// Parse the text of an import directive
fn parse_import(text: &str) -> ImportDirective {
    let body = text.trim().strip_prefix("import").unwrap_or(text);
    let body = body.trim().trim_end_matches(';');
    let (path, alias) = match body.split_once(" as ") {
        Some((path, alias)) => (path, Some(strip_whitespace(alias))),
        None => (body, None),
    };
    let path = strip_whitespace(path);

    match path.strip_suffix(".*") {
        Some(package) => ImportDirective::star(package),
        None => {
            let directive = ImportDirective::new(path);
            match alias {
                Some(alias) => directive.with_alias(alias),
                None => directive,
            }
        }
    }
}
