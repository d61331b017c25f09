use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tree_sitter::Node;

use super::languages::Grammar;
use super::references::IdentifierCounts;
use super::{
    LanguageFrontEnd, has_child_kind, named_children, node_text, parse_source, position,
    string_literal, walk_tree,
};
use crate::error::Result;
use crate::graph::record::{
    ExportDeclaration, FileRecord, ImportDeclaration, ImportSpecifier, ImportTarget, LocalSymbol,
    SymbolKind,
};
use crate::language::LanguageKind;
use crate::resolver::{ResolutionContext, python};

/// Python front end.
///
/// Exports follow the module convention: an `__all__` list restricts them,
/// otherwise every top-level name without a leading underscore is public.
/// Underscore-prefixed top-level names are file-local. A package `__init__.py`
/// re-exports what it imports from its own project modules.
pub struct PythonFrontEnd;

impl LanguageFrontEnd for PythonFrontEnd {
    fn name(&self) -> &'static str {
        "python"
    }

    fn build_file_record(
        &self,
        text: &str,
        path: &Path,
        ctx: &ResolutionContext,
    ) -> Result<FileRecord> {
        let tree = parse_source(Grammar::Python, text, path)?;
        let root = tree.root_node();
        let source = text.as_bytes();

        let listed = public_names(root, source);
        let mut imports = ImportCollector {
            source,
            path,
            ctx,
            is_init: python::is_package_init(path),
            listed: listed.as_ref(),
            imports: Vec::new(),
            re_exports: Vec::new(),
        };
        walk_tree(root, |node| match node.kind() {
            "import_statement" => imports.plain_import(node),
            "import_from_statement" => imports.from_import(node),
            _ => {}
        });
        let ImportCollector {
            imports, re_exports, ..
        } = imports;

        let mut record = FileRecord::empty(path, LanguageKind::Python);
        record.imports = imports;
        record.exports = re_exports;

        let declared = top_level_declarations(root, source);
        let counts = IdentifierCounts::from_tree(root, source, &["identifier"]);
        let mut seen = HashSet::new();
        for (name, node, kind) in &declared {
            if !seen.insert(name.as_str()) {
                continue;
            }
            let (line, column) = position(*node);
            let is_listed = listed.as_ref().map(|l| l.contains(name));
            if is_dunder(name) {
                if is_listed == Some(true) {
                    record.exports.push(ExportDeclaration::new(name, *kind, line, column));
                }
            } else if name.starts_with('_') && is_listed != Some(true) {
                let sites = declared.iter().filter(|(n, _, _)| n == name).count();
                record.locals.push(LocalSymbol {
                    name: name.clone(),
                    line,
                    column,
                    kind: *kind,
                    reference_count: counts.references(name, sites),
                });
            } else if is_listed.unwrap_or(true) {
                record.exports.push(ExportDeclaration::new(name, *kind, line, column));
            }
        }
        record.exports.sort_by_key(|e| (e.line, e.column));
        Ok(record)
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

fn value_kind(name: &str) -> SymbolKind {
    let letters = name.trim_start_matches('_');
    if !letters.is_empty()
        && letters.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    {
        SymbolKind::Constant
    } else {
        SymbolKind::Variable
    }
}

/// Names listed in `__all__`, from `=` and `+=` statements with a list or tuple of
/// string literals. `None` when the module does not define it.
fn public_names(root: Node<'_>, source: &[u8]) -> Option<HashSet<String>> {
    let mut names: Option<HashSet<String>> = None;
    for statement in named_children(root)
        .into_iter()
        .filter(|n| n.kind() == "expression_statement")
    {
        for assignment in named_children(statement) {
            if !matches!(assignment.kind(), "assignment" | "augmented_assignment") {
                continue;
            }
            let (Some(left), Some(right)) =
                (assignment.child_by_field_name("left"), assignment.child_by_field_name("right"))
            else {
                continue;
            };
            if node_text(left, source) != "__all__" || !matches!(right.kind(), "list" | "tuple") {
                continue;
            }
            let entries = names.get_or_insert_with(HashSet::new);
            if assignment.kind() == "assignment" {
                entries.clear();
            }
            entries.extend(
                named_children(right)
                    .into_iter()
                    .filter(|n| n.kind() == "string")
                    .map(|n| string_literal(n, source).to_owned()),
            );
        }
    }
    names
}

/// Top-level functions, classes and assigned names in source order. A name
/// assigned twice appears twice.
fn top_level_declarations<'t>(
    root: Node<'t>,
    source: &[u8],
) -> Vec<(String, Node<'t>, SymbolKind)> {
    let mut out = Vec::new();
    for statement in named_children(root) {
        let statement = if statement.kind() == "decorated_definition" {
            match statement.child_by_field_name("definition") {
                Some(definition) => definition,
                None => continue,
            }
        } else {
            statement
        };
        match statement.kind() {
            "function_definition" | "class_definition" => {
                let Some(name) = statement.child_by_field_name("name") else {
                    continue;
                };
                let kind = if statement.kind() == "class_definition" {
                    SymbolKind::Class
                } else {
                    SymbolKind::Function
                };
                out.push((node_text(name, source).to_owned(), name, kind));
            }
            "expression_statement" => {
                for assignment in named_children(statement)
                    .into_iter()
                    .filter(|n| n.kind() == "assignment")
                {
                    let Some(left) = assignment.child_by_field_name("left") else {
                        continue;
                    };
                    for target in assignment_targets(left) {
                        let name = node_text(target, source).to_owned();
                        let kind = value_kind(&name);
                        out.push((name, target, kind));
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Identifiers bound by an assignment target: `x`, `a, b`, `(a, [b, c])`.
fn assignment_targets(left: Node<'_>) -> Vec<Node<'_>> {
    match left.kind() {
        "identifier" => vec![left],
        "pattern_list" | "tuple_pattern" | "list_pattern" => {
            named_children(left).into_iter().flat_map(assignment_targets).collect()
        }
        _ => Vec::new(),
    }
}

struct ImportCollector<'s, 'c> {
    source: &'s [u8],
    path: &'c Path,
    ctx: &'c ResolutionContext,
    is_init: bool,
    listed: Option<&'c HashSet<String>>,
    imports: Vec<ImportDeclaration>,
    re_exports: Vec<ExportDeclaration>,
}

impl ImportCollector<'_, '_> {
    fn resolve(&self, module: &str) -> Option<PathBuf> {
        python::resolve_module(self.ctx, self.path, module).filter(|file| file != self.path)
    }

    /// `import a.b.c` and `import a.b as c`.
    fn plain_import(&mut self, node: Node<'_>) {
        let mut cursor = node.walk();
        let names: Vec<Node<'_>> = node.children_by_field_name("name", &mut cursor).collect();
        for name in names {
            let (module, local) = match name.kind() {
                "dotted_name" => {
                    let module = node_text(name, self.source);
                    (module, module.split('.').next().unwrap_or(module))
                }
                "aliased_import" => {
                    let (Some(module), Some(alias)) =
                        (name.child_by_field_name("name"), name.child_by_field_name("alias"))
                    else {
                        continue;
                    };
                    (node_text(module, self.source), node_text(alias, self.source))
                }
                _ => continue,
            };
            self.package_edges(module);
            let specifiers = vec![ImportSpecifier::namespace(Some(local.to_owned()))];
            let target = self
                .resolve(module)
                .map_or_else(|| ImportTarget::External(module.to_owned()), ImportTarget::Internal);
            self.imports
                .push(ImportDeclaration::new(module, target).with_specifiers(specifiers));
        }
    }

    /// `from m import a, b as c`, `from . import mod` and `from m import *`.
    fn from_import(&mut self, node: Node<'_>) {
        let Some(module_node) = node.child_by_field_name("module_name") else {
            return;
        };
        let module = node_text(module_node, self.source);
        let base = self.resolve(module);
        let top_level = node.parent().is_some_and(|p| p.kind() == "module");
        self.package_edges(module);

        if has_child_kind(node, "wildcard_import") {
            let target = base
                .clone()
                .map_or_else(|| ImportTarget::External(module.to_owned()), ImportTarget::Internal);
            if self.is_init && top_level && base.is_some() {
                let (line, column) = position(node);
                self.re_exports.push(
                    ExportDeclaration::new("*", SymbolKind::Unknown, line, column)
                        .re_export(module, target.clone()),
                );
                self.imports.push(ImportDeclaration::new(module, target));
            } else {
                self.imports.push(
                    ImportDeclaration::new(module, target)
                        .with_specifiers(vec![ImportSpecifier::namespace(None)]),
                );
            }
            return;
        }

        let mut cursor = node.walk();
        let names: Vec<Node<'_>> = node.children_by_field_name("name", &mut cursor).collect();
        let mut specifiers = Vec::new();
        let mut submodules = Vec::new();
        for name in names {
            let (imported, local, anchor) = match name.kind() {
                "dotted_name" => (node_text(name, self.source), node_text(name, self.source), name),
                "aliased_import" => {
                    let (Some(imported), Some(alias)) =
                        (name.child_by_field_name("name"), name.child_by_field_name("alias"))
                    else {
                        continue;
                    };
                    (node_text(imported, self.source), node_text(alias, self.source), alias)
                }
                _ => continue,
            };

            let submodule = join_module(module, imported);
            if let Some(file) = self.resolve(&submodule) {
                submodules.push(
                    ImportDeclaration::new(submodule, ImportTarget::Internal(file))
                        .with_specifiers(vec![ImportSpecifier::namespace(Some(local.to_owned()))]),
                );
                continue;
            }

            specifiers.push(if imported == local {
                ImportSpecifier::named(imported)
            } else {
                ImportSpecifier::aliased(imported, local)
            });
            if let Some(file) = &base
                && top_level
                && self.re_exports_name(local)
            {
                let (line, column) = position(anchor);
                self.re_exports.push(
                    ExportDeclaration::new(local, SymbolKind::Unknown, line, column)
                        .re_export(module, ImportTarget::Internal(file.clone())),
                );
            }
        }

        match base {
            Some(file) => {
                // Importing only submodules still loads the package itself.
                self.imports.push(
                    ImportDeclaration::new(module, ImportTarget::Internal(file))
                        .with_specifiers(specifiers),
                );
            }
            None if !specifiers.is_empty() => {
                self.imports.push(
                    ImportDeclaration::new(module, ImportTarget::External(module.to_owned()))
                        .with_specifiers(specifiers),
                );
            }
            None => {}
        }
        self.imports.extend(submodules);
    }

    fn re_exports_name(&self, local: &str) -> bool {
        match self.listed {
            Some(listed) => listed.contains(local),
            None => self.is_init,
        }
    }

    /// `import a.b.c` runs `a/__init__.py` and `a/b/__init__.py` first.
    fn package_edges(&mut self, module: &str) {
        if module.starts_with('.') {
            return;
        }
        let segments: Vec<&str> = module.split('.').collect();
        for len in 1..segments.len() {
            let package = segments[..len].join(".");
            if let Some(file) = self.resolve(&package).filter(|f| python::is_package_init(f)) {
                self.imports.push(ImportDeclaration::new(package, ImportTarget::Internal(file)));
            }
        }
    }
}

fn join_module(module: &str, name: &str) -> String {
    if module.ends_with('.') {
        format!("{module}{name}")
    } else {
        format!("{module}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(files: &[&str]) -> ResolutionContext {
        ResolutionContext::new("/p", files.iter().map(PathBuf::from))
    }

    fn export_names(record: &FileRecord) -> Vec<&str> {
        record.exports.iter().map(|e| e.name.as_str()).collect()
    }

    const UTILS: &str = r#"import os
from .helpers import format_name as fmt, _internal

SOME_CONSTANT = 42
_cache = {}
__version__ = "1.0"


def helper_function(value):
    return _normalize(value)


def _normalize(value):
    return value.strip()


def _unused_helper():
    return None


class Widget:
    pass
"#;

    #[test]
    fn test_convention_exports_and_locals() {
        let path = "/p/pkg/utils.py";
        let files = ctx(&[path, "/p/pkg/helpers.py"]);
        let record = PythonFrontEnd.build_file_record(UTILS, Path::new(path), &files).unwrap();

        assert_eq!(export_names(&record), vec!["SOME_CONSTANT", "helper_function", "Widget"]);
        assert_eq!(record.exports[0].kind, SymbolKind::Constant);
        assert_eq!(record.exports[1].kind, SymbolKind::Function);
        assert_eq!(record.exports[2].kind, SymbolKind::Class);

        let locals: Vec<(&str, usize)> = record
            .locals
            .iter()
            .map(|l| (l.name.as_str(), l.reference_count))
            .collect();
        assert_eq!(locals, vec![("_cache", 0), ("_normalize", 1), ("_unused_helper", 0)]);

        assert_eq!(record.imports.len(), 2);
        assert_eq!(record.imports[0].resolved_target, ImportTarget::External("os".into()));
        assert!(record.imports[0].is_namespace_import);

        let helpers = &record.imports[1];
        assert_eq!(
            helpers.resolved_target,
            ImportTarget::Internal(PathBuf::from("/p/pkg/helpers.py"))
        );
        assert_eq!(helpers.specifiers[0].imported_name, "format_name");
        assert_eq!(helpers.specifiers[0].local_name(), "fmt");
        assert_eq!(helpers.specifiers[1].imported_name, "_internal");
    }

    #[test]
    fn test_dunder_all_restricts_exports_in_package_init() {
        let text = r#"from .core import Engine, _private_thing
from .extras import *

__all__ = ["Engine", "build"]
__all__ += ("VERSION",)

VERSION = "2"


def build():
    return Engine()


def unlisted():
    return None
"#;
        let init = "/p/pkg/__init__.py";
        let files = ctx(&[init, "/p/pkg/core.py", "/p/pkg/extras.py"]);
        let record = PythonFrontEnd.build_file_record(text, Path::new(init), &files).unwrap();

        assert_eq!(export_names(&record), vec!["Engine", "*", "VERSION", "build"]);
        let engine = &record.exports[0];
        assert!(engine.is_re_export);
        assert_eq!(
            engine.resolved_source,
            Some(ImportTarget::Internal(PathBuf::from("/p/pkg/core.py")))
        );
        assert!(record.exports[1].is_wildcard());
        assert!(record.locals.is_empty());

        let extras = record
            .imports
            .iter()
            .find(|i| i.source == ".extras")
            .unwrap();
        assert!(extras.is_side_effect());
    }

    #[test]
    fn test_submodules_packages_and_nested_imports() {
        let text = r#"from pkg import core
from pkg.extras import *
import pkg.core as engine_core


def main():
    from pkg.core import Engine
    return Engine()
"#;
        let main = "/p/main.py";
        let files = ctx(&[main, "/p/pkg/__init__.py", "/p/pkg/core.py", "/p/pkg/extras.py"]);
        let record = PythonFrontEnd.build_file_record(text, Path::new(main), &files).unwrap();

        let core = PathBuf::from("/p/pkg/core.py");
        let to_core: Vec<&ImportDeclaration> = record
            .imports
            .iter()
            .filter(|i| i.resolved_target == ImportTarget::Internal(core.clone()))
            .collect();
        assert_eq!(to_core.len(), 3);
        assert!(to_core[0].is_namespace_import);
        assert_eq!(to_core[1].specifiers[0].local_name(), "engine_core");
        assert_eq!(to_core[2].specifiers[0].imported_name, "Engine");
        assert!(!to_core[2].is_namespace_import);

        let extras = record.imports.iter().find(|i| i.source == "pkg.extras").unwrap();
        assert!(extras.is_namespace_import);

        let init = ImportTarget::Internal(PathBuf::from("/p/pkg/__init__.py"));
        assert!(record.imports.iter().any(|i| i.resolved_target == init));
        assert_eq!(export_names(&record), vec!["main"]);
    }

    #[test]
    fn test_unresolved_from_import_is_external() {
        let path = "/p/app.py";
        let record = PythonFrontEnd
            .build_file_record(
                "from typing import List, Optional\n",
                Path::new(path),
                &ctx(&[path]),
            )
            .unwrap();
        assert_eq!(record.imports.len(), 1);
        assert_eq!(record.imports[0].resolved_target, ImportTarget::External("typing".into()));
        assert_eq!(record.imports[0].specifiers.len(), 2);
    }
}
