//! Whole-file scanning
//!
//! The scanner is the caller of the classifiers: it visits every call of a
//! tree in document order, keeps those inside spec classes that classify as
//! blocks, and builds their paths.

use crate::core::analyzer::SpecAnalyzer;
use crate::core::config::NavigatorConfig;
use crate::core::error::{NavigatorError, Result};
use crate::core::path::{Path, PathKind, PathSegment};
use crate::core::walker::SourceFile;
use serde::Serialize;
use spek_syntax::{
    AdapterRegistry, LanguageId, LibraryModel, NodeId, NodeKind, Span, SymbolIndex,
    SymbolResolver, SyntaxNavigator, SyntaxTree,
};
use tracing::{debug, warn};

/// Options controlling which nodes a scan reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Leave out classes annotated with `@RunWith`
    pub skip_junit4_specs: bool,
    /// Report spec classes themselves as `SPEC` paths
    pub include_specs: bool,
}

impl From<&NavigatorConfig> for ScanOptions {
    fn from(config: &NavigatorConfig) -> Self {
        Self {
            skip_junit4_specs: config.skip_junit4_specs,
            include_specs: false,
        }
    }
}

/// A recognized node and its path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredBlock {
    pub kind: PathKind,
    pub path: Path,
    pub span: Span,
}

impl DiscoveredBlock {
    /// 1-based line of the node
    pub fn line(&self) -> usize {
        self.span.start_line
    }
}

/// Recognized blocks of the analysed tree, in document order
pub fn scan<R>(
    analyzer: &SpecAnalyzer<'_, SyntaxTree, R>,
    options: &ScanOptions,
) -> Vec<DiscoveredBlock>
where
    R: SymbolResolver + ?Sized,
{
    let tree = analyzer.navigator();
    let mut blocks = Vec::new();

    for call in tree.calls() {
        if options.skip_junit4_specs && in_junit4_class(analyzer, call) {
            continue;
        }
        if !analyzer.is_contained_in_spec(call) {
            continue;
        }
        if analyzer.classify_block(call).is_none() {
            continue;
        }
        match analyzer.extract_path(call) {
            Ok(path) => blocks.push(DiscoveredBlock {
                kind: path.kind(),
                path,
                span: tree.span(call),
            }),
            Err(e) => warn!(
                file = tree.path.as_deref().unwrap_or("<memory>"),
                error = %e,
                "skipping block"
            ),
        }
    }

    blocks
}

/// Spec classes declared in the analysed tree, in document order
pub fn scan_specs<R>(
    analyzer: &SpecAnalyzer<'_, SyntaxTree, R>,
    options: &ScanOptions,
) -> Vec<DiscoveredBlock>
where
    R: SymbolResolver + ?Sized,
{
    let tree = analyzer.navigator();
    tree.find_all(NodeKind::is_class_like)
        .into_iter()
        .filter(|class| !(options.skip_junit4_specs && analyzer.is_junit4(*class)))
        .filter_map(|class| {
            let symbol = analyzer.resolver().class_of(class)?;
            analyzer.is_spec(&symbol).then(|| DiscoveredBlock {
                kind: PathKind::Spec,
                path: Path::spec(symbol.fq_name),
                span: tree.span(class),
            })
        })
        .collect()
}

fn in_junit4_class<R>(analyzer: &SpecAnalyzer<'_, SyntaxTree, R>, node: NodeId) -> bool
where
    R: SymbolResolver + ?Sized,
{
    analyzer
        .navigator()
        .containing_class_like(node)
        .is_some_and(|class| analyzer.is_junit4(class))
}

/// Scan one tree against a library model. Spec classes, when requested,
/// come before the blocks of the file, each list in document order.
pub fn scan_tree(
    tree: &SyntaxTree,
    library: &LibraryModel,
    options: &ScanOptions,
) -> Vec<DiscoveredBlock> {
    let index = SymbolIndex::build(tree, library);
    let analyzer = SpecAnalyzer::new(tree, &index);

    let mut found = Vec::new();
    if options.include_specs {
        found.extend(scan_specs(&analyzer, options));
    }
    found.extend(scan(&analyzer, options));
    found
}

// ============================================================================
// Reports
// ============================================================================

/// A discovered node in reporting form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    pub file: String,
    pub line: usize,
    pub kind: PathKind,
    /// Outermost first
    pub path: Vec<PathSegment>,
    /// Rendered path
    pub target: String,
}

impl BlockReport {
    pub fn new(file: &str, block: &DiscoveredBlock) -> Self {
        Self {
            file: file.to_string(),
            line: block.line(),
            kind: block.kind,
            path: block.path.iter_outermost_first().cloned().collect(),
            target: block.path.to_string(),
        }
    }

    /// `<file>:<line>\t<KIND>\t<path>`
    pub fn to_text_line(&self) -> String {
        format!("{}:{}\t{}\t{}", self.file, self.line, self.kind, self.target)
    }
}

/// Parse and scan one source file
pub fn scan_source(
    registry: &AdapterRegistry,
    library: &LibraryModel,
    source: &SourceFile,
    options: &ScanOptions,
) -> Result<Vec<BlockReport>> {
    let language = LanguageId::from_path(&source.location);
    let mut tree = registry
        .parse(&source.content, language)
        .map_err(|e| NavigatorError::from(e).with_context(source.path.clone()))?;
    tree.path = Some(source.path.clone());
    if !tree.error_regions.is_empty() {
        debug!(file = %source.path, regions = tree.error_regions.len(), "source has syntax errors");
    }

    let reports: Vec<BlockReport> = scan_tree(&tree, library, options)
        .iter()
        .map(|block| BlockReport::new(&source.path, block))
        .collect();
    debug!(file = %source.path, blocks = reports.len(), "scanned");
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spek_syntax::{ClassDeclaration, ImportDirective, TreeBuilder};

    fn spek_file() -> TreeBuilder {
        let mut b = TreeBuilder::kotlin(Some("com.example"));
        b.import(ImportDirective::new("org.jetbrains.spek.api.Spek"));
        b.import(ImportDirective::star("org.jetbrains.spek.api.dsl"));
        b
    }

    fn line(n: usize) -> Span {
        Span {
            start_line: n,
            end_line: n,
            ..Span::default()
        }
    }

    fn suite() -> SyntaxTree {
        let mut b = spek_file();
        let (_, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        let (describe, describe_body) = b.block_call(body, "describe", "a widget");
        b.set_span(describe, line(4));
        let (it, _) = b.block_call(describe_body, "it", "is built");
        b.set_span(it, line(5));
        let helper = b.call(describe_body, "println");
        b.string_argument(helper, "noise");
        let (xit, _) = b.block_call(describe_body, "xit", "pending");
        b.set_span(xit, line(7));
        b.finish()
    }

    #[test]
    fn test_scan_in_document_order() {
        let tree = suite();
        let found = scan_tree(&tree, &LibraryModel::spek_api(), &ScanOptions::default());

        let targets: Vec<_> = found.iter().map(|b| b.path.to_string()).collect();
        assert_eq!(
            targets,
            vec![
                "com.example.FooSpec/describe a widget",
                "com.example.FooSpec/describe a widget/it is built",
            ]
        );
        assert_eq!(found[0].kind, PathKind::Group);
        assert_eq!(found[1].kind, PathKind::Test);
        assert_eq!(found[1].line(), 5);
    }

    #[test]
    fn test_scan_includes_specs_first() {
        let tree = suite();
        let options = ScanOptions {
            include_specs: true,
            ..ScanOptions::default()
        };
        let found = scan_tree(&tree, &LibraryModel::spek_api(), &options);

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].kind, PathKind::Spec);
        assert_eq!(found[0].path, Path::spec("com.example.FooSpec"));
    }

    #[test]
    fn test_scan_ignores_non_spec_classes() {
        let mut b = spek_file();
        let (_, body) = b.spek_class(ClassDeclaration::new("Widget"));
        b.block_call(body, "describe", "not a spec");
        let abstract_spec = ClassDeclaration::new("BaseSpec")
            .with_supertype("Spek")
            .abstract_class();
        let (_, base_body) = b.spek_class(abstract_spec);
        b.block_call(base_body, "describe", "shared");
        let tree = b.finish();

        let options = ScanOptions {
            include_specs: true,
            ..ScanOptions::default()
        };
        assert!(scan_tree(&tree, &LibraryModel::spek_api(), &options).is_empty());
    }

    #[test]
    fn test_skip_junit4_specs() {
        let mut b = spek_file();
        b.import(ImportDirective::new("org.junit.runner.RunWith"));
        let (legacy, legacy_body) =
            b.spek_class(ClassDeclaration::new("LegacySpec").with_supertype("Spek"));
        b.annotation(legacy, "RunWith");
        b.block_call(legacy_body, "it", "runs on junit4");
        let (_, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        b.block_call(body, "it", "runs on the platform");
        let tree = b.finish();
        let library = LibraryModel::spek_api();

        let all = scan_tree(&tree, &library, &ScanOptions::default());
        assert_eq!(all.len(), 2);

        let options = ScanOptions {
            skip_junit4_specs: true,
            include_specs: true,
        };
        let filtered = scan_tree(&tree, &library, &options);
        let targets: Vec<_> = filtered.iter().map(|b| b.path.to_string()).collect();
        assert_eq!(
            targets,
            vec!["com.example.FooSpec", "com.example.FooSpec/it runs on the platform"]
        );
    }

    #[test]
    fn test_block_under_foreign_lambda_is_skipped() {
        let mut b = spek_file();
        let (_, body) = b.spek_class(ClassDeclaration::new("FooSpec").with_supertype("Spek"));
        let repeat = b.call(body, "repeat");
        let argument = b.add(repeat, NodeKind::ValueArgument);
        b.add(argument, NodeKind::other("integer_literal"));
        let repeat_body = b.trailing_lambda(repeat);
        b.block_call(repeat_body, "it", "repeats");
        b.block_call(body, "it", "stands alone");
        let tree = b.finish();

        let found = scan_tree(&tree, &LibraryModel::spek_api(), &ScanOptions::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path.to_string(), "com.example.FooSpec/it stands alone");
    }

    #[test]
    fn test_block_report() {
        let tree = suite();
        let found = scan_tree(&tree, &LibraryModel::spek_api(), &ScanOptions::default());
        let report = BlockReport::new("src/FooSpec.kt", &found[1]);

        assert_eq!(
            report.to_text_line(),
            "src/FooSpec.kt:5\tTEST\tcom.example.FooSpec/describe a widget/it is built"
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "TEST");
        assert_eq!(json["path"][0]["kind"], "SPEC");
        assert_eq!(json["path"][2]["label"], "it is built");
        assert_eq!(json["target"], "com.example.FooSpec/describe a widget/it is built");
    }

    #[test]
    fn test_options_from_config() {
        let config = NavigatorConfig::new().with_skip_junit4(true);
        let options = ScanOptions::from(&config);
        assert!(options.skip_junit4_specs);
        assert!(!options.include_specs);
    }
}
