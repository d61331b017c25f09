use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tree_sitter::Node;

use super::languages::Grammar;
use super::references::IdentifierCounts;
use super::{
    LanguageFrontEnd, first_child_of_kind, has_child_kind, named_children, node_text, parse_source,
    position, walk_tree,
};
use crate::error::Result;
use crate::graph::record::{
    ExportDeclaration, FileRecord, ImportDeclaration, ImportSpecifier, ImportTarget, LocalSymbol,
    SymbolKind,
};
use crate::language::LanguageKind;
use crate::resolver::{ResolutionContext, java};

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Public,
    Private,
    /// Package-private or protected: reachable from code this tool cannot rule out.
    Other,
}

/// Java front end.
///
/// `public` top-level types and `public` members are exports; `private` members are
/// file-local. Package-private and protected declarations, constructors, `@Override`
/// methods and interface members without modifiers are not tracked.
pub struct JavaFrontEnd;

impl LanguageFrontEnd for JavaFrontEnd {
    fn name(&self) -> &'static str {
        "java"
    }

    fn build_file_record(
        &self,
        text: &str,
        path: &Path,
        ctx: &ResolutionContext,
    ) -> Result<FileRecord> {
        let tree = parse_source(Grammar::Java, text, path)?;
        let root = tree.root_node();
        let source = text.as_bytes();

        let package = first_child_of_kind(root, &["package_declaration"])
            .and_then(|p| first_child_of_kind(p, &["scoped_identifier", "identifier"]))
            .map(|n| node_text(n, source).to_owned());
        let source_root = java::source_root(path, package.as_deref());
        let usage = MemberUsage::collect(root, source);

        let mut record = FileRecord::empty(path, LanguageKind::Java);
        for import in named_children(root)
            .into_iter()
            .filter(|n| n.kind() == "import_declaration")
        {
            record
                .imports
                .extend(import_declaration(import, source, ctx, source_root.as_deref(), &usage));
        }
        record.imports.extend(same_package_imports(
            path,
            package.as_deref(),
            ctx,
            &usage,
        ));

        let mut collector = Declarations::default();
        for declaration in named_children(root)
            .into_iter()
            .filter(|n| TYPE_DECLARATIONS.contains(&n.kind()))
        {
            collector.type_declaration(declaration, source);
        }

        let counts = IdentifierCounts::from_tree(root, source, &["identifier", "type_identifier"]);
        for (name, node, kind, visibility) in collector.items {
            let (line, column) = position(node);
            match visibility {
                Visibility::Public => {
                    record.exports.push(ExportDeclaration::new(name, kind, line, column))
                }
                Visibility::Private => {
                    let sites = collector.sites.get(&name).copied().unwrap_or(1);
                    let reference_count = counts.references(&name, sites);
                    record.locals.push(LocalSymbol {
                        name,
                        line,
                        column,
                        kind,
                        reference_count,
                    });
                }
                Visibility::Other => {}
            }
        }
        Ok(record)
    }
}

/// Type names and member names the file refers to.
#[derive(Default)]
struct MemberUsage {
    types: BTreeSet<String>,
    members: BTreeSet<String>,
}

impl MemberUsage {
    fn collect(root: Node<'_>, source: &[u8]) -> Self {
        let mut usage = Self::default();
        walk_tree(root, |node| match node.kind() {
            "type_identifier" => {
                usage.types.insert(node_text(node, source).to_owned());
            }
            "method_invocation" => {
                if let Some(name) = node.child_by_field_name("name") {
                    usage.members.insert(node_text(name, source).to_owned());
                }
                // `Helper.run()`: the receiver may be a class.
                if let Some(object) = node
                    .child_by_field_name("object")
                    .filter(|o| o.kind() == "identifier")
                {
                    usage.types.insert(node_text(object, source).to_owned());
                }
            }
            "field_access" => {
                if let Some(field) = node.child_by_field_name("field") {
                    usage.members.insert(node_text(field, source).to_owned());
                }
                if let Some(object) = node
                    .child_by_field_name("object")
                    .filter(|o| o.kind() == "identifier")
                {
                    usage.types.insert(node_text(object, source).to_owned());
                }
            }
            "method_reference" => {
                let parts = named_children(node);
                if let Some(last) = parts.last().filter(|n| n.kind() == "identifier") {
                    usage.members.insert(node_text(*last, source).to_owned());
                }
                if let Some(first) = parts.first().filter(|n| n.kind() == "identifier") {
                    usage.types.insert(node_text(*first, source).to_owned());
                }
            }
            _ => {}
        });
        usage
    }

    fn specifiers_for(&self, type_name: &str) -> Vec<ImportSpecifier> {
        std::iter::once(type_name.to_owned())
            .chain(self.members.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(ImportSpecifier::named)
            .collect()
    }
}

fn import_declaration(
    node: Node<'_>,
    source: &[u8],
    ctx: &ResolutionContext,
    source_root: Option<&Path>,
    usage: &MemberUsage,
) -> Vec<ImportDeclaration> {
    let Some(name_node) = first_child_of_kind(node, &["scoped_identifier", "identifier"]) else {
        return Vec::new();
    };
    let name = node_text(name_node, source).to_owned();
    let is_static = has_child_kind(node, "static");
    let is_wildcard = has_child_kind(node, "asterisk");

    match (is_static, is_wildcard) {
        // import a.b.*;
        (false, true) => {
            let files = java::package_files(ctx, source_root, &name);
            let written = format!("{name}.*");
            if files.is_empty() {
                return vec![external(&written, vec![ImportSpecifier::namespace(None)])];
            }
            files
                .into_iter()
                .map(|file| {
                    ImportDeclaration::new(&written, ImportTarget::Internal(file))
                        .with_specifiers(vec![ImportSpecifier::namespace(None)])
                })
                .collect()
        }
        // import static a.b.C.*;
        (true, true) => {
            let written = format!("{name}.*");
            let specifiers = vec![ImportSpecifier::namespace(None)];
            vec![match java::resolve_type(ctx, source_root, &name) {
                Some(file) => ImportDeclaration::new(&written, ImportTarget::Internal(file))
                    .with_specifiers(specifiers),
                None => external(&written, specifiers),
            }]
        }
        // import static a.b.C.member;
        (true, false) => {
            let Some((class, member)) = name.rsplit_once('.') else {
                return Vec::new();
            };
            let specifiers = vec![ImportSpecifier::named(member)];
            vec![match java::resolve_type(ctx, source_root, class) {
                Some(file) => ImportDeclaration::new(&name, ImportTarget::Internal(file))
                    .with_specifiers(specifiers),
                None => external(&name, specifiers),
            }]
        }
        // import a.b.C;
        (false, false) => {
            let simple = name.rsplit('.').next().unwrap_or(&name).to_owned();
            vec![match java::resolve_type(ctx, source_root, &name) {
                Some(file) => ImportDeclaration::new(&name, ImportTarget::Internal(file))
                    .with_specifiers(usage.specifiers_for(&simple)),
                None => external(&name, vec![ImportSpecifier::named(simple)]),
            }]
        }
    }
}

fn external(name: &str, specifiers: Vec<ImportSpecifier>) -> ImportDeclaration {
    ImportDeclaration::new(name, ImportTarget::External(name.to_owned()))
        .with_specifiers(specifiers)
}

/// Classes in the same package are visible without an import.
fn same_package_imports(
    path: &Path,
    package: Option<&str>,
    ctx: &ResolutionContext,
    usage: &MemberUsage,
) -> Vec<ImportDeclaration> {
    let Some(dir) = path.parent() else {
        return Vec::new();
    };
    let siblings: Vec<&PathBuf> = ctx
        .files_in_dir(dir)
        .iter()
        .filter(|p| p.as_path() != path && p.extension().is_some_and(|e| e == "java"))
        .collect();

    siblings
        .into_iter()
        .filter_map(|sibling| {
            let stem = sibling.file_stem()?.to_str()?;
            if !usage.types.contains(stem) {
                return None;
            }
            let qualified = match package {
                Some(package) => format!("{package}.{stem}"),
                None => stem.to_owned(),
            };
            Some(
                ImportDeclaration::new(qualified, ImportTarget::Internal(sibling.clone()))
                    .with_specifiers(usage.specifiers_for(stem)),
            )
        })
        .collect()
}

#[derive(Default)]
struct Declarations<'t> {
    items: Vec<(String, Node<'t>, SymbolKind, Visibility)>,
    /// Declaration count per name, tracked or not.
    sites: HashMap<String, usize>,
}

impl<'t> Declarations<'t> {
    fn push(&mut self, name: Node<'t>, source: &[u8], kind: SymbolKind, visibility: Visibility) {
        let text = node_text(name, source).to_owned();
        *self.sites.entry(text.clone()).or_default() += 1;
        self.items.push((text, name, kind, visibility));
    }

    fn type_declaration(&mut self, node: Node<'t>, source: &[u8]) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let kind = match node.kind() {
            "interface_declaration" | "annotation_type_declaration" => SymbolKind::Interface,
            "enum_declaration" => SymbolKind::Enum,
            _ => SymbolKind::Class,
        };
        self.push(name, source, kind, visibility(node));

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        self.body(body, source);
    }

    fn body(&mut self, body: Node<'t>, source: &[u8]) {
        for member in named_children(body) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    let access = visibility(member);
                    let kind = if is_static_final(member)
                        || member.kind() == "constant_declaration"
                    {
                        SymbolKind::Constant
                    } else {
                        SymbolKind::Variable
                    };
                    let mut cursor = member.walk();
                    let declarators: Vec<Node<'t>> =
                        member.children_by_field_name("declarator", &mut cursor).collect();
                    for declarator in declarators {
                        if let Some(name) = declarator.child_by_field_name("name") {
                            self.push(name, source, kind, access);
                        }
                    }
                }
                "method_declaration" => {
                    let Some(name) = member.child_by_field_name("name") else {
                        continue;
                    };
                    let access = if has_annotation(member, source, "Override") {
                        Visibility::Other
                    } else {
                        visibility(member)
                    };
                    self.push(name, source, SymbolKind::Method, access);
                }
                kind if TYPE_DECLARATIONS.contains(&kind) => {
                    self.type_declaration(member, source);
                }
                // Enum constants first, then ordinary members.
                "enum_body_declarations" => self.body(member, source),
                _ => {}
            }
        }
    }
}

fn modifiers(node: Node<'_>) -> Option<Node<'_>> {
    first_child_of_kind(node, &["modifiers"])
}

/// Interface members without modifiers are implicitly public but stay untracked.
fn visibility(node: Node<'_>) -> Visibility {
    match modifiers(node) {
        Some(m) if has_child_kind(m, "private") => Visibility::Private,
        Some(m) if has_child_kind(m, "public") => Visibility::Public,
        _ => Visibility::Other,
    }
}

fn is_static_final(node: Node<'_>) -> bool {
    modifiers(node).is_some_and(|m| has_child_kind(m, "static") && has_child_kind(m, "final"))
}

fn has_annotation(node: Node<'_>, source: &[u8], annotation: &str) -> bool {
    let Some(modifiers) = modifiers(node) else {
        return false;
    };
    named_children(modifiers).into_iter().any(|child| {
        matches!(child.kind(), "marker_annotation" | "annotation")
            && child
                .child_by_field_name("name")
                .is_some_and(|n| node_text(n, source) == annotation)
    })
}
