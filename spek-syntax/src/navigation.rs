//! Syntax navigation capability
//!
//! Analyses only ever look at a tree through [`SyntaxNavigator`], so any
//! syntax model that can answer "what is this node, who is its parent, what
//! are its children" can be plugged in. [`SyntaxTree`] is the built-in
//! implementation.

use crate::ir::{NodeId, NodeKind, Span, SyntaxTree};

/// Read-only parent/child traversal and node-kind testing
pub trait SyntaxNavigator {
    /// Kind of `node`; `None` for handles that do not belong to this tree
    fn kind(&self, node: NodeId) -> Option<&NodeKind>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> &[NodeId];

    fn span(&self, node: NodeId) -> Span;

    /// Parent of `node` if the parent satisfies `pred`
    fn parent_if(&self, node: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId>
    where
        Self: Sized,
    {
        let parent = self.parent(node)?;
        self.kind(parent).filter(|kind| pred(kind)).map(|_| parent)
    }

    /// First child of `node`
    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    /// Children of `node` matching `pred`, in order
    fn children_where(&self, node: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId>
    where
        Self: Sized,
    {
        self.children(node)
            .iter()
            .copied()
            .filter(|child| self.kind(*child).is_some_and(&pred))
            .collect()
    }

    /// Strict ancestors of `node`, nearest first
    fn ancestors(&self, node: NodeId) -> Ancestors<'_, Self>
    where
        Self: Sized,
    {
        Ancestors {
            navigator: self,
            next: self.parent(node),
        }
    }

    /// Nearest enclosing class-or-object declaration.
    ///
    /// Function and lambda scopes in between are skipped; this finds the
    /// nearest class-level container, not the nearest lexical scope.
    fn containing_class_like(&self, node: NodeId) -> Option<NodeId>
    where
        Self: Sized,
    {
        self.ancestors(node)
            .find(|ancestor| self.kind(*ancestor).is_some_and(NodeKind::is_class_like))
    }
}

/// Iterator over the ancestors of a node
pub struct Ancestors<'a, N> {
    navigator: &'a N,
    next: Option<NodeId>,
}

impl<N: SyntaxNavigator> Iterator for Ancestors<'_, N> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.navigator.parent(current);
        Some(current)
    }
}

impl SyntaxNavigator for SyntaxTree {
    fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.get(node).map(|n| &n.kind)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn span(&self, node: NodeId) -> Span {
        self.get(node).map(|n| n.span).unwrap_or_default()
    }
}
