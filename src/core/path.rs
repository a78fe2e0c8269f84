//! Hierarchical paths of spec blocks
//!
//! A [`Path`] names one node of a spec suite: the innermost block first,
//! then every enclosing group, then the owning spec class. Rendered
//! outermost first it reads `com.example.FooSpec/describe a widget/it is built`.

use crate::core::block::{
    classify_block, enclosing_lambda, literal_description, name_reference_callee,
    trailing_lambda_owner, BlockKind,
};
use crate::core::containment::containing_spec_class;
use crate::core::dsl::{is_test_function, MAX_NESTING_DEPTH};
use crate::core::error::PathError;
use serde::{Deserialize, Serialize};
use spek_syntax::{NodeId, SymbolResolver, SyntaxNavigator};
use std::fmt;

/// Kind of a path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PathKind {
    Spec,
    Group,
    Test,
}

impl PathKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathKind::Spec => "SPEC",
            PathKind::Group => "GROUP",
            PathKind::Test => "TEST",
        }
    }
}

impl From<BlockKind> for PathKind {
    fn from(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Group => PathKind::Group,
            BlockKind::Test => PathKind::Test,
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One level of a [`Path`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    pub kind: PathKind,
    /// Fully qualified class name for `SPEC`, `"<function> <description>"`
    /// otherwise
    pub label: String,
}

impl PathSegment {
    pub fn new(kind: PathKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

/// Segments are stored innermost first and always end in the `SPEC` root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<PathSegment>", into = "Vec<PathSegment>")]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Build a path from innermost-first segments.
    ///
    /// Returns `None` unless the last segment, and only the last, is `SPEC`.
    pub fn from_segments(segments: Vec<PathSegment>) -> Option<Self> {
        let (root, rest) = segments.split_last()?;
        let well_formed =
            root.kind == PathKind::Spec && rest.iter().all(|s| s.kind != PathKind::Spec);
        well_formed.then_some(Self { segments })
    }

    /// Path consisting of the spec class alone
    pub fn spec(fq_name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::new(PathKind::Spec, fq_name)],
        }
    }

    /// Innermost first
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn iter_outermost_first(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter().rev()
    }

    /// The innermost segment
    pub fn leaf(&self) -> &PathSegment {
        self.segments
            .first()
            .expect("a path always holds its SPEC segment")
    }

    /// The `SPEC` segment
    pub fn root(&self) -> &PathSegment {
        self.segments
            .last()
            .expect("a path always holds its SPEC segment")
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a built path
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn kind(&self) -> PathKind {
        self.leaf().kind
    }

    pub fn spec_class(&self) -> &str {
        &self.root().label
    }

    /// The path of the enclosing node, `None` for a bare `SPEC` path
    pub fn parent(&self) -> Option<Path> {
        (self.segments.len() > 1).then(|| Path {
            segments: self.segments[1..].to_vec(),
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.iter_outermost_first().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(&segment.label)?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<PathSegment>> for Path {
    type Error = String;

    fn try_from(segments: Vec<PathSegment>) -> std::result::Result<Self, Self::Error> {
        Path::from_segments(segments)
            .ok_or_else(|| "a path must end in exactly one SPEC segment".to_string())
    }
}

impl From<Path> for Vec<PathSegment> {
    fn from(path: Path) -> Self {
        path.segments
    }
}

// ============================================================================
// Path Builder
// ============================================================================

/// Build the path of a recognized block.
///
/// `call` must satisfy [`is_spec_block`](crate::core::block::is_spec_block);
/// anything else is reported as a [`PathError`] and no partial path is
/// produced. Enclosing calls are followed for as long as the current lambda
/// is passed as a trailing lambda argument; the ascent then stops and the
/// owning spec class of `call` becomes the root.
pub fn extract_path<N, R>(nav: &N, resolver: &R, call: NodeId) -> Result<Path, PathError>
where
    N: SyntaxNavigator,
    R: SymbolResolver + ?Sized,
{
    if classify_block(nav, resolver, call).is_none() {
        return Err(PathError::NotASpecBlock(call));
    }

    let mut segments = Vec::new();
    let mut current = call;
    loop {
        if segments.len() >= MAX_NESTING_DEPTH {
            return Err(PathError::NestingTooDeep {
                node: call,
                limit: MAX_NESTING_DEPTH,
            });
        }

        let lambda = enclosing_lambda(nav, current).ok_or(PathError::NotInClosure(current))?;
        let callee =
            name_reference_callee(nav, current).ok_or(PathError::CalleeNotNameReference(current))?;
        let function = resolver
            .resolve_function(callee)
            .ok_or(PathError::UnresolvedCallee(current))?;
        let description =
            literal_description(nav, current).ok_or(PathError::MissingDescription(current))?;

        let kind = if is_test_function(&function.name) {
            PathKind::Test
        } else {
            PathKind::Group
        };
        segments.push(PathSegment::new(
            kind,
            format!("{} {}", function.name, description),
        ));

        match trailing_lambda_owner(nav, lambda) {
            Some(outer) => current = outer,
            None => break,
        }
    }

    let class = containing_spec_class(nav, resolver, call).ok_or(PathError::NoOwningSpec(call))?;
    segments.push(PathSegment::new(PathKind::Spec, class.fq_name));
    Ok(Path { segments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::is_spec_block;
    use spek_syntax::{
        ClassDeclaration, ImportDirective, LibraryModel, NodeKind, SymbolIndex, SyntaxTree,
        TreeBuilder,
    };

    fn spek_file() -> TreeBuilder {
        let mut b = TreeBuilder::kotlin(Some("com.example"));
        b.import(ImportDirective::new("org.jetbrains.spek.api.Spek"));
        b.import(ImportDirective::star("org.jetbrains.spek.api.dsl"));
        b
    }

    fn extract(tree: &SyntaxTree, call: NodeId) -> Result<Path, PathError> {
        let library = LibraryModel::spek_api();
        let index = SymbolIndex::build(tree, &library);
        extract_path(tree, &index, call)
    }

    fn labels(path: &Path) -> Vec<(PathKind, &str)> {
        path.segments()
            .iter()
            .map(|s| (s.kind, s.label.as_str()))
            .collect()
    }

    #[test]
    fn test_test_inside_group() {
        let mut b = spek_file();
        let (_, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        let (_, describe_body) = b.block_call(body, "describe", "a widget");
        let (it, _) = b.block_call(describe_body, "it", "is built");
        let tree = b.finish();

        let path = extract(&tree, it).unwrap();
        assert_eq!(
            labels(&path),
            vec![
                (PathKind::Test, "it is built"),
                (PathKind::Group, "describe a widget"),
                (PathKind::Spec, "com.example.FooSpec"),
            ]
        );
        assert_eq!(path.to_string(), "com.example.FooSpec/describe a widget/it is built");
    }

    #[test]
    fn test_top_level_group() {
        let mut b = spek_file();
        let (_, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        let (describe, _) = b.block_call(body, "describe", "a widget");
        let tree = b.finish();

        let path = extract(&tree, describe).unwrap();
        assert_eq!(
            labels(&path),
            vec![
                (PathKind::Group, "describe a widget"),
                (PathKind::Spec, "com.example.FooSpec"),
            ]
        );
        assert_eq!(path.kind(), PathKind::Group);
    }

    #[test]
    fn test_deep_mixed_groups() {
        let mut b = spek_file();
        let (_, body) = b.spek_class(ClassDeclaration::new("StackSpec").with_supertype("Spek"));
        let (_, given) = b.block_call(body, "given", "a stack");
        let (_, on) = b.block_call(given, "on", "push");
        let (_, context) = b.block_call(on, "context", "when full");
        let (it, _) = b.block_call(context, "it", "throws");
        let tree = b.finish();

        let path = extract(&tree, it).unwrap();
        assert_eq!(
            path.to_string(),
            "com.example.StackSpec/given a stack/on push/context when full/it throws"
        );
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_indirect_spec_class() {
        let mut b = spek_file();
        let root = b.root();
        b.class(
            root,
            ClassDeclaration::new("BaseSpec")
                .with_supertype("Spek")
                .abstract_class(),
        );
        let (_, body) = b.spek_class(ClassDeclaration::new("BarSpec").with_supertype("BaseSpec"));
        let (it, _) = b.block_call(body, "it", "runs");
        let tree = b.finish();

        let path = extract(&tree, it).unwrap();
        assert_eq!(path.to_string(), "com.example.BarSpec/it runs");
        assert_eq!(path.spec_class(), "com.example.BarSpec");
    }

    #[test]
    fn test_block_nested_in_test_is_permitted() {
        let mut b = spek_file();
        let (_, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        let (_, it_body) = b.block_call(body, "it", "outer");
        let (describe, _) = b.block_call(it_body, "describe", "inner");
        let tree = b.finish();

        let path = extract(&tree, describe).unwrap();
        assert_eq!(
            labels(&path),
            vec![
                (PathKind::Group, "describe inner"),
                (PathKind::Test, "it outer"),
                (PathKind::Spec, "com.example.FooSpec"),
            ]
        );
    }

    #[test]
    fn test_depth_matches_nesting() {
        for depth in 1..=12 {
            let mut b = spek_file();
            let (_, mut body) =
                b.spek_class(ClassDeclaration::new("DeepSpec").with_supertype("Spek"));
            let mut innermost = None;
            for level in 0..depth {
                let (call, inner) = b.block_call(body, "context", &format!("level {level}"));
                innermost = Some(call);
                body = inner;
            }
            let tree = b.finish();

            let path = extract(&tree, innermost.unwrap()).unwrap();
            assert_eq!(path.len(), depth + 1);
            assert_eq!(path.root().kind, PathKind::Spec);
            assert!(path.segments()[..depth]
                .iter()
                .all(|s| s.kind == PathKind::Group));
            assert_eq!(path.leaf().label, format!("context level {}", depth - 1));
        }
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let mut b = spek_file();
        let (_, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        let (_, describe_body) = b.block_call(body, "describe", "a widget");
        let (it, _) = b.block_call(describe_body, "it", "is built");
        let tree = b.finish();

        assert_eq!(extract(&tree, it), extract(&tree, it));
    }

    #[test]
    fn test_non_block_is_rejected() {
        let mut b = spek_file();
        let (_, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        let call = b.call(body, "println");
        b.string_argument(call, "hello");
        let tree = b.finish();

        assert_eq!(extract(&tree, call), Err(PathError::NotASpecBlock(call)));
    }

    #[test]
    fn test_block_outside_spec_has_no_owner() {
        let mut b = spek_file();
        let (_, body) = b.spek_class(ClassDeclaration::new("Widget"));
        let (call, _) = b.block_call(body, "describe", "not a spec");
        let tree = b.finish();

        assert_eq!(extract(&tree, call), Err(PathError::NoOwningSpec(call)));
    }

    #[test]
    fn test_ascent_stops_at_non_dsl_trailing_lambda() {
        let mut b = spek_file();
        let (_, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        let repeat = b.call(body, "repeat");
        let argument = b.add(repeat, NodeKind::ValueArgument);
        b.add(argument, NodeKind::other("integer_literal"));
        let repeat_body = b.trailing_lambda(repeat);
        let (it, _) = b.block_call(repeat_body, "it", "repeats");
        let tree = b.finish();
        let library = LibraryModel::spek_api();
        let index = SymbolIndex::build(&tree, &library);

        assert!(is_spec_block(&tree, &index, it));
        assert_eq!(
            extract_path(&tree, &index, it),
            Err(PathError::UnresolvedCallee(repeat))
        );
    }

    #[test]
    fn test_nesting_bound() {
        let mut b = spek_file();
        let (_, mut body) = b.spek_class(ClassDeclaration::new("DeepSpec").with_supertype("Spek"));
        let mut innermost = None;
        for level in 0..=MAX_NESTING_DEPTH {
            let (call, inner) = b.block_call(body, "context", &format!("level {level}"));
            innermost = Some(call);
            body = inner;
        }
        let tree = b.finish();
        let call = innermost.unwrap();

        assert_eq!(
            extract(&tree, call),
            Err(PathError::NestingTooDeep {
                node: call,
                limit: MAX_NESTING_DEPTH,
            })
        );
    }

    #[test]
    fn test_path_accessors() {
        let path = Path::from_segments(vec![
            PathSegment::new(PathKind::Test, "it works"),
            PathSegment::new(PathKind::Group, "describe thing"),
            PathSegment::new(PathKind::Spec, "a.B"),
        ])
        .unwrap();

        assert_eq!(path.leaf().label, "it works");
        assert_eq!(path.root().label, "a.B");
        assert_eq!(path.kind(), PathKind::Test);
        assert!(!path.is_empty());

        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "a.B/describe thing");
        let grandparent = parent.parent().unwrap();
        assert_eq!(grandparent, Path::spec("a.B"));
        assert_eq!(grandparent.parent(), None);
        assert_eq!(grandparent.leaf(), grandparent.root());
        assert_eq!(grandparent.leaf().kind, PathKind::Spec);

        let outermost: Vec<_> = path.iter_outermost_first().map(|s| s.kind).collect();
        assert_eq!(outermost, vec![PathKind::Spec, PathKind::Group, PathKind::Test]);
    }

    #[test]
    fn test_malformed_segments_rejected() {
        assert!(Path::from_segments(vec![]).is_none());
        assert!(Path::from_segments(vec![PathSegment::new(PathKind::Group, "describe x")]).is_none());
        assert!(Path::from_segments(vec![
            PathSegment::new(PathKind::Spec, "a.B"),
            PathSegment::new(PathKind::Spec, "a.C"),
        ])
        .is_none());
    }

    #[test]
    fn test_serde_shape() {
        let path = Path::from_segments(vec![
            PathSegment::new(PathKind::Group, "describe thing"),
            PathSegment::new(PathKind::Spec, "a.B"),
        ])
        .unwrap();

        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"kind": "GROUP", "label": "describe thing"},
                {"kind": "SPEC", "label": "a.B"}
            ])
        );
        let back: Path = serde_json::from_value(json).unwrap();
        assert_eq!(back, path);

        let bad = serde_json::json!([{"kind": "TEST", "label": "it x"}]);
        assert!(serde_json::from_value::<Path>(bad).is_err());
    }
}
