use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::trace;
use tree_sitter::Node;

use super::languages::Grammar;
use super::references::IdentifierCounts;
use super::{
    LanguageFrontEnd, first_child_of_kind, named_children, node_text, parse_source, position,
    string_literal, walk_tree,
};
use crate::error::Result;
use crate::graph::record::{
    ExportDeclaration, FileRecord, ImportDeclaration, ImportSpecifier, ImportTarget, LocalSymbol,
    SymbolKind,
};
use crate::language::LanguageKind;
use crate::resolver::{ResolutionContext, golang};

const IDENTIFIER_KINDS: &[&str] = &["identifier", "type_identifier", "field_identifier"];

/// Go front end.
///
/// A package is a directory: capitalized top-level names are exports, everything
/// else is package-local. Because a lowercase name can be used from any file of the
/// package, each file implicitly imports its sibling files, and local reference
/// counts include occurrences in sibling files.
pub struct GoFrontEnd;

impl LanguageFrontEnd for GoFrontEnd {
    fn name(&self) -> &'static str {
        "go"
    }

    fn build_file_record(
        &self,
        text: &str,
        path: &Path,
        ctx: &ResolutionContext,
    ) -> Result<FileRecord> {
        let tree = parse_source(Grammar::Go, text, path)?;
        let root = tree.root_node();
        let source = text.as_bytes();

        let usage = SelectorUsage::collect(root, source);
        let mut record = FileRecord::empty(path, LanguageKind::Go);

        for declaration in named_children(root)
            .into_iter()
            .filter(|n| n.kind() == "import_declaration")
        {
            for spec in import_specs(declaration) {
                record.imports.extend(import_for_spec(spec, source, ctx, &usage));
            }
        }
        record.imports.extend(sibling_imports(path, ctx, &usage));

        let declared = top_level_declarations(root, source);
        let mut declaration_sites: HashMap<&str, usize> = HashMap::new();
        for (name, _, _) in &declared {
            *declaration_sites.entry(name.as_str()).or_default() += 1;
        }

        let mut counts = IdentifierCounts::from_tree(root, source, IDENTIFIER_KINDS);
        if declared.iter().any(|(name, _, kind)| is_local(name, *kind)) {
            counts.add(&sibling_identifier_counts(path, ctx));
        }

        for (name, node, kind) in &declared {
            let (line, column) = position(*node);
            if is_exported(name) {
                record.exports.push(ExportDeclaration::new(name, *kind, line, column));
            } else if is_local(name, *kind) {
                let sites = declaration_sites.get(name.as_str()).copied().unwrap_or(1);
                record.locals.push(LocalSymbol {
                    name: name.clone(),
                    line,
                    column,
                    kind: *kind,
                    reference_count: counts.references(name, sites),
                });
            }
        }
        Ok(record)
    }
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// `main` and `init` are called by the runtime; `_` declares nothing.
fn is_local(name: &str, kind: SymbolKind) -> bool {
    if name == "_" || is_exported(name) {
        return false;
    }
    !(kind == SymbolKind::Function && (name == "main" || name == "init"))
}

/// Names selected from other packages (`pkg.Name`, `pkg.Type`) and every selected
/// member name (`x.Method`), which is how methods on imported types get used.
#[derive(Default)]
struct SelectorUsage {
    /// operand -> selected names, for selectors whose operand is a plain identifier.
    qualified: HashMap<String, BTreeSet<String>>,
    /// Every selected field or method name in the file.
    members: BTreeSet<String>,
    /// Every identifier in the file, for implicit same-package imports.
    identifiers: BTreeSet<String>,
}

impl SelectorUsage {
    fn collect(root: Node<'_>, source: &[u8]) -> Self {
        let mut usage = Self::default();
        walk_tree(root, |node| match node.kind() {
            "selector_expression" => {
                let (Some(operand), Some(field)) =
                    (node.child_by_field_name("operand"), node.child_by_field_name("field"))
                else {
                    return;
                };
                let field = node_text(field, source).to_owned();
                if operand.kind() == "identifier" {
                    usage
                        .qualified
                        .entry(node_text(operand, source).to_owned())
                        .or_default()
                        .insert(field.clone());
                }
                usage.members.insert(field);
            }
            "qualified_type" => {
                let (Some(package), Some(name)) =
                    (node.child_by_field_name("package"), node.child_by_field_name("name"))
                else {
                    return;
                };
                let name = node_text(name, source).to_owned();
                usage
                    .qualified
                    .entry(node_text(package, source).to_owned())
                    .or_default()
                    .insert(name.clone());
                usage.members.insert(name);
            }
            kind if IDENTIFIER_KINDS.contains(&kind) => {
                usage.identifiers.insert(node_text(node, source).to_owned());
            }
            _ => {}
        });
        usage
    }
}

fn import_specs<'t>(declaration: Node<'t>) -> Vec<Node<'t>> {
    let mut specs = Vec::new();
    for child in named_children(declaration) {
        match child.kind() {
            "import_spec" => specs.push(child),
            "import_spec_list" => specs.extend(
                named_children(child)
                    .into_iter()
                    .filter(|s| s.kind() == "import_spec"),
            ),
            _ => {}
        }
    }
    specs
}

fn import_for_spec(
    spec: Node<'_>,
    source: &[u8],
    ctx: &ResolutionContext,
    usage: &SelectorUsage,
) -> Vec<ImportDeclaration> {
    let Some(path_node) = spec.child_by_field_name("path") else {
        return Vec::new();
    };
    let import_path = string_literal(path_node, source).to_owned();
    let alias = spec.child_by_field_name("name").map(|n| node_text(n, source));
    let qualifier = alias.unwrap_or_else(|| golang::package_qualifier(&import_path));

    let files = golang::resolve_package(ctx, &import_path);
    let specifiers: Vec<ImportSpecifier> = match alias {
        Some("_") => Vec::new(),
        Some(".") => vec![ImportSpecifier::namespace(None)],
        _ if files.is_empty() => usage
            .qualified
            .get(qualifier)
            .into_iter()
            .flatten()
            .map(ImportSpecifier::named)
            .collect(),
        _ => usage.members.iter().map(ImportSpecifier::named).collect(),
    };

    if files.is_empty() {
        let target = ImportTarget::External(import_path.clone());
        return vec![ImportDeclaration::new(&import_path, target).with_specifiers(specifiers)];
    }
    trace!(import = %import_path, files = files.len(), "go package resolved");
    files
        .into_iter()
        .map(|file| {
            ImportDeclaration::new(&import_path, ImportTarget::Internal(file))
                .with_specifiers(specifiers.clone())
        })
        .collect()
}

/// Same-package files see each other without an import statement.
fn sibling_imports(
    path: &Path,
    ctx: &ResolutionContext,
    usage: &SelectorUsage,
) -> Vec<ImportDeclaration> {
    let Some(dir) = path.parent() else {
        return Vec::new();
    };
    let siblings: Vec<_> = ctx
        .files_in_dir(dir)
        .iter()
        .filter(|p| p.as_path() != path && p.extension().is_some_and(|e| e == "go"))
        .collect();
    if siblings.is_empty() {
        return Vec::new();
    }
    let specifiers: Vec<ImportSpecifier> = usage
        .identifiers
        .iter()
        .chain(usage.members.iter())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ImportSpecifier::named)
        .collect();
    siblings
        .into_iter()
        .map(|sibling| {
            let name = sibling
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ImportDeclaration::new(format!("./{name}"), ImportTarget::Internal(sibling.clone()))
                .with_specifiers(specifiers.clone())
        })
        .collect()
}

fn sibling_identifier_counts(path: &Path, ctx: &ResolutionContext) -> IdentifierCounts {
    let mut counts = IdentifierCounts::default();
    let Some(dir) = path.parent() else {
        return counts;
    };
    for sibling in ctx.files_in_dir(dir) {
        if sibling.as_path() == path || sibling.extension().is_none_or(|e| e != "go") {
            continue;
        }
        match std::fs::read_to_string(sibling) {
            Ok(text) => counts.add(&IdentifierCounts::from_text(&text)),
            Err(err) => trace!(file = %sibling.display(), %err, "sibling unreadable, not counted"),
        }
    }
    counts
}

/// Top-level declared names with their name nodes and kinds, in source order.
fn top_level_declarations<'t>(
    root: Node<'t>,
    source: &[u8],
) -> Vec<(String, Node<'t>, SymbolKind)> {
    let mut out = Vec::new();
    let mut push = |node: Node<'t>, kind: SymbolKind| {
        out.push((node_text(node, source).to_owned(), node, kind));
    };

    for declaration in named_children(root) {
        match declaration.kind() {
            "function_declaration" => {
                if let Some(name) = declaration.child_by_field_name("name") {
                    push(name, SymbolKind::Function);
                }
            }
            "method_declaration" => {
                if let Some(name) = declaration.child_by_field_name("name") {
                    push(name, SymbolKind::Method);
                }
            }
            "type_declaration" => {
                for spec in named_children(declaration)
                    .into_iter()
                    .filter(|s| matches!(s.kind(), "type_spec" | "type_alias"))
                {
                    let Some(name) = spec.child_by_field_name("name") else {
                        continue;
                    };
                    let kind = match spec.child_by_field_name("type").map(|t| t.kind()) {
                        Some("struct_type") => SymbolKind::Struct,
                        Some("interface_type") => SymbolKind::Interface,
                        _ => SymbolKind::Type,
                    };
                    push(name, kind);
                }
            }
            "const_declaration" | "var_declaration" => {
                let (spec_kind, kind) = if declaration.kind() == "const_declaration" {
                    ("const_spec", SymbolKind::Constant)
                } else {
                    ("var_spec", SymbolKind::Variable)
                };
                for spec in value_specs(declaration, spec_kind) {
                    let mut cursor = spec.walk();
                    // The field also covers the commas between names.
                    for name in spec
                        .children_by_field_name("name", &mut cursor)
                        .filter(|n| n.kind() == "identifier")
                    {
                        push(name, kind);
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// `const_spec` / `var_spec` children, looking through a parenthesized list.
fn value_specs<'t>(declaration: Node<'t>, spec_kind: &str) -> Vec<Node<'t>> {
    let mut specs = Vec::new();
    for child in named_children(declaration) {
        if child.kind() == spec_kind {
            specs.push(child);
        } else if child.kind().ends_with("_spec_list") {
            specs.extend(named_children(child).into_iter().filter(|s| s.kind() == spec_kind));
        }
    }
    if specs.is_empty()
        && let Some(spec) = first_child_of_kind(declaration, &[spec_kind])
    {
        specs.push(spec);
    }
    specs
}
