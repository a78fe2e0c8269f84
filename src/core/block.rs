//! Block classifier
//!
//! A spec block is a call such as `describe("a widget") { ... }` that sits
//! directly in a closure body, resolves to one of the DSL extension
//! functions and passes a string literal plus a trailing lambda.

use crate::core::dsl::{is_dsl_receiver, is_group_function, is_test_function};
use serde::{Deserialize, Serialize};
use spek_syntax::{FunctionSymbol, NodeId, NodeKind, SymbolResolver, SyntaxNavigator};
use tracing::trace;

/// Kind of a recognized block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlockKind {
    Group,
    Test,
}

impl BlockKind {
    pub fn of_function(name: &str) -> Option<Self> {
        if is_test_function(name) {
            Some(BlockKind::Test)
        } else if is_group_function(name) {
            Some(BlockKind::Group)
        } else {
            None
        }
    }
}

/// A call accepted by [`classify_block`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedBlock {
    pub kind: BlockKind,
    /// Simple name of the resolved DSL function
    pub function: String,
    /// Description literal without its surrounding quotes
    pub description: String,
}

impl ClassifiedBlock {
    /// `"<function> <description>"`
    pub fn label(&self) -> String {
        format!("{} {}", self.function, self.description)
    }
}

// ============================================================================
// Shape helpers
// ============================================================================

/// The lambda expression whose body directly contains `call`
pub(crate) fn enclosing_lambda<N: SyntaxNavigator>(nav: &N, call: NodeId) -> Option<NodeId> {
    let block = nav.parent_if(call, |k| *k == NodeKind::Block)?;
    let literal = nav.parent_if(block, |k| *k == NodeKind::FunctionLiteral)?;
    nav.parent_if(literal, |k| *k == NodeKind::LambdaExpression)
}

/// The callee of `call` when it is a bare name reference
pub(crate) fn name_reference_callee<N: SyntaxNavigator>(nav: &N, call: NodeId) -> Option<NodeId> {
    let callee = nav.first_child(call)?;
    matches!(nav.kind(callee), Some(NodeKind::NameReference { .. })).then_some(callee)
}

/// Value arguments of `call`, the trailing lambda included
pub(crate) fn value_arguments<N: SyntaxNavigator>(nav: &N, call: NodeId) -> Vec<NodeId> {
    nav.children_where(call, NodeKind::is_argument)
}

/// The first argument's literal with one pair of surrounding quotes removed
pub(crate) fn literal_description<N: SyntaxNavigator>(nav: &N, call: NodeId) -> Option<String> {
    let first = *value_arguments(nav, call).first()?;
    let expression = nav.first_child(first)?;
    match nav.kind(expression)? {
        NodeKind::StringTemplate { text } => Some(remove_surrounding_quotes(text).to_string()),
        _ => None,
    }
}

/// The outer call when `lambda` is its trailing lambda argument
pub(crate) fn trailing_lambda_owner<N: SyntaxNavigator>(nav: &N, lambda: NodeId) -> Option<NodeId> {
    let argument = nav.parent_if(lambda, |k| *k == NodeKind::LambdaArgument)?;
    nav.parent_if(argument, NodeKind::is_call)
}

fn remove_surrounding_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

fn has_dsl_receiver(function: &FunctionSymbol) -> bool {
    function
        .receiver
        .as_ref()
        .and_then(|receiver| receiver.referenced_name())
        .is_some_and(is_dsl_receiver)
}

// ============================================================================
// Classification
// ============================================================================

/// Classify `call`, returning `None` for anything that is not a spec block.
///
/// The checks run in a fixed order and stop at the first failure:
/// closure shape, callee resolution, argument shape, DSL receiver,
/// description literal, function name.
pub fn classify_block<N, R>(nav: &N, resolver: &R, call: NodeId) -> Option<ClassifiedBlock>
where
    N: SyntaxNavigator,
    R: SymbolResolver + ?Sized,
{
    if enclosing_lambda(nav, call).is_none() {
        trace!(%call, "rejected: not directly inside a closure body");
        return None;
    }

    let Some(function) = name_reference_callee(nav, call)
        .and_then(|callee| resolver.resolve_function(callee))
    else {
        trace!(%call, "rejected: callee does not resolve to a function");
        return None;
    };

    let arguments = value_arguments(nav, call);
    let trailing = arguments
        .last()
        .is_some_and(|last| nav.kind(*last) == Some(&NodeKind::LambdaArgument));
    if !trailing || arguments.len() != 2 {
        trace!(%call, arguments = arguments.len(), "rejected: argument shape");
        return None;
    }

    if !has_dsl_receiver(&function) {
        trace!(%call, function = %function.fq_name, "rejected: not a DSL extension");
        return None;
    }

    let Some(description) = literal_description(nav, call) else {
        trace!(%call, "rejected: description is not a string literal");
        return None;
    };

    let Some(kind) = BlockKind::of_function(&function.name) else {
        trace!(%call, function = %function.name, "rejected: not a block function");
        return None;
    };

    Some(ClassifiedBlock {
        kind,
        function: function.name,
        description,
    })
}

/// Whether `call` is a recognized group or test block
pub fn is_spec_block<N, R>(nav: &N, resolver: &R, call: NodeId) -> bool
where
    N: SyntaxNavigator,
    R: SymbolResolver + ?Sized,
{
    classify_block(nav, resolver, call).is_some()
}
