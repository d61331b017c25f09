use std::collections::{HashMap, HashSet};
use std::path::Path;

use tree_sitter::Node;

use super::languages::Grammar;
use super::references::IdentifierCounts;
use super::{
    LanguageFrontEnd, first_child_of_kind, has_child_kind, named_children, node_text, parse_source,
    position, string_literal, walk_tree,
};
use crate::error::{DeadwoodError, Result};
use crate::graph::record::{
    ExportDeclaration, FileRecord, ImportDeclaration, ImportSpecifier, ImportTarget, LocalSymbol,
    SymbolKind,
};
use crate::language::LanguageKind;
use crate::resolver::{ResolutionContext, file_resolver};

/// Node kinds whose text is a reference to a value or type binding.
const VALUE_IDENTIFIERS: &[&str] = &[
    "identifier",
    "type_identifier",
    "shorthand_property_identifier",
    "shorthand_property_identifier_pattern",
];

/// Node kinds naming class members (`this.x`, `obj.#y`).
const MEMBER_IDENTIFIERS: &[&str] = &["property_identifier", "private_property_identifier"];

/// TypeScript and JavaScript front end: ES modules, CommonJS `require`/`exports`,
/// dynamic `import()` and TypeScript's `import x = require()`.
pub struct EcmaScriptFrontEnd;

impl LanguageFrontEnd for EcmaScriptFrontEnd {
    fn name(&self) -> &'static str {
        "ecmascript"
    }

    fn build_file_record(
        &self,
        text: &str,
        path: &Path,
        ctx: &ResolutionContext,
    ) -> Result<FileRecord> {
        let grammar = Grammar::for_path(path)
            .filter(|g| matches!(g, Grammar::TypeScript | Grammar::Tsx | Grammar::JavaScript))
            .ok_or_else(|| DeadwoodError::UnsupportedFile(path.to_path_buf()))?;
        let language = if grammar == Grammar::JavaScript {
            LanguageKind::JavaScript
        } else {
            LanguageKind::TypeScript
        };

        let tree = parse_source(grammar, text, path)?;
        let mut collector = Collector::new(text.as_bytes(), path, ctx);
        collector.collect(tree.root_node());
        Ok(collector.finish(tree.root_node(), language))
    }
}

struct PendingLocal {
    name: String,
    line: usize,
    column: usize,
    kind: SymbolKind,
    top_level: bool,
    member: bool,
}

/// `export { a, b as c }` without a `from` clause; resolved once all top-level
/// declarations are known.
struct ClauseExport {
    local: String,
    exported: String,
    line: usize,
    column: usize,
    type_only: bool,
}

struct Collector<'s, 'c> {
    source: &'s [u8],
    path: &'c Path,
    ctx: &'c ResolutionContext,
    imports: Vec<ImportDeclaration>,
    exports: Vec<ExportDeclaration>,
    clause_exports: Vec<ClauseExport>,
    /// Non-exported top-level declarations: name -> (line, column, kind).
    top_level: HashMap<String, (usize, usize, SymbolKind)>,
    /// Local import bindings: name -> (source, resolved target).
    imported_bindings: HashMap<String, (String, ImportTarget)>,
    pending: Vec<PendingLocal>,
    /// How many times each name is declared (exported or not), so declarations are
    /// not mistaken for references.
    declaration_sites: HashMap<String, usize>,
    member_sites: HashMap<String, usize>,
}

impl<'s, 'c> Collector<'s, 'c> {
    fn new(source: &'s [u8], path: &'c Path, ctx: &'c ResolutionContext) -> Self {
        Self {
            source,
            path,
            ctx,
            imports: Vec::new(),
            exports: Vec::new(),
            clause_exports: Vec::new(),
            top_level: HashMap::new(),
            imported_bindings: HashMap::new(),
            pending: Vec::new(),
            declaration_sites: HashMap::new(),
            member_sites: HashMap::new(),
        }
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        node_text(node, self.source)
    }

    fn resolve(&self, specifier: &str) -> ImportTarget {
        file_resolver::resolve_specifier(self.ctx, self.path, specifier)
    }

    fn collect(&mut self, root: Node<'_>) {
        for statement in named_children(root) {
            match statement.kind() {
                "import_statement" => self.collect_import(statement),
                "export_statement" => self.collect_export(statement),
                _ => {}
            }
        }
        walk_tree(root, |node| self.visit(node));
    }

    // -----------------------------------------------------------------------
    // Imports
    // -----------------------------------------------------------------------

    fn collect_import(&mut self, node: Node<'_>) {
        let type_only = has_child_kind(node, "type") || has_child_kind(node, "typeof");

        if let Some(clause) = first_child_of_kind(node, &["import_require_clause"]) {
            let Some(source_node) = clause.child_by_field_name("source") else {
                return;
            };
            let source = string_literal(source_node, self.source).to_owned();
            let local =
                first_child_of_kind(clause, &["identifier"]).map(|n| self.text(n).to_owned());
            let target = self.resolve(&source);
            self.imports.push(
                ImportDeclaration::new(source, target)
                    .with_specifiers(vec![ImportSpecifier::namespace(local)])
                    .type_only(type_only),
            );
            return;
        }

        let Some(source_node) = node.child_by_field_name("source") else {
            return;
        };
        let source = string_literal(source_node, self.source).to_owned();
        let target = self.resolve(&source);

        let mut specifiers = Vec::new();
        if let Some(clause) = first_child_of_kind(node, &["import_clause"]) {
            for child in named_children(clause) {
                match child.kind() {
                    "identifier" => {
                        specifiers.push(ImportSpecifier::default_import(self.text(child)))
                    }
                    "namespace_import" => {
                        let local = first_child_of_kind(child, &["identifier"])
                            .map(|n| self.text(n).to_owned());
                        specifiers.push(ImportSpecifier::namespace(local));
                    }
                    "named_imports" => {
                        for spec in named_children(child)
                            .into_iter()
                            .filter(|s| s.kind() == "import_specifier")
                        {
                            if let Some(specifier) = self.import_specifier(spec) {
                                specifiers.push(specifier);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        for specifier in specifiers.iter().filter(|s| !s.is_namespace) {
            self.imported_bindings
                .insert(specifier.local_name().to_owned(), (source.clone(), target.clone()));
        }
        self.imports.push(
            ImportDeclaration::new(source, target)
                .with_specifiers(specifiers)
                .type_only(type_only),
        );
    }

    fn import_specifier(&self, spec: Node<'_>) -> Option<ImportSpecifier> {
        let name = self.module_export_name(spec.child_by_field_name("name")?);
        let alias = spec.child_by_field_name("alias").map(|a| self.module_export_name(a));
        Some(match (name, alias) {
            ("default", Some(alias)) => ImportSpecifier::default_import(alias),
            (name, Some(alias)) if alias != name => ImportSpecifier::aliased(name, alias),
            (name, _) => ImportSpecifier::named(name),
        })
    }

    fn module_export_name(&self, node: Node<'_>) -> &'s str {
        if node.kind() == "string" {
            string_literal(node, self.source)
        } else {
            self.text(node)
        }
    }

    /// `require('x')` and `import('x')` anywhere in the file.
    fn collect_call(&mut self, call: Node<'_>) {
        let Some(function) = call.child_by_field_name("function") else {
            return;
        };
        let is_dynamic = function.kind() == "import";
        let is_require = function.kind() == "identifier" && self.text(function) == "require";
        if !is_dynamic && !is_require {
            return;
        }
        let Some(first_arg) = call
            .child_by_field_name("arguments")
            .and_then(|args| named_children(args).into_iter().next())
        else {
            return;
        };
        if first_arg.kind() != "string" {
            return;
        }
        let source = string_literal(first_arg, self.source).to_owned();
        let target = self.resolve(&source);

        let import = if is_dynamic {
            ImportDeclaration::new(source, target)
                .with_specifiers(vec![ImportSpecifier::namespace(None)])
                .dynamic()
        } else {
            ImportDeclaration::new(source, target).with_specifiers(self.require_bindings(call))
        };
        self.imports.push(import);
    }

    /// What a `require()` call binds, judged by where the call sits.
    fn require_bindings(&self, call: Node<'_>) -> Vec<ImportSpecifier> {
        let Some(parent) = call.parent() else {
            return Vec::new();
        };
        match parent.kind() {
            "expression_statement" => Vec::new(),
            "member_expression" => parent
                .child_by_field_name("property")
                .map(|p| vec![ImportSpecifier::named(self.text(p))])
                .unwrap_or_else(|| vec![ImportSpecifier::namespace(None)]),
            "variable_declarator" => {
                let Some(binding) = parent.child_by_field_name("name") else {
                    return vec![ImportSpecifier::namespace(None)];
                };
                match binding.kind() {
                    "identifier" => {
                        vec![ImportSpecifier::namespace(Some(self.text(binding).to_owned()))]
                    }
                    "object_pattern" => self.destructured_require(binding),
                    _ => vec![ImportSpecifier::namespace(None)],
                }
            }
            _ => vec![ImportSpecifier::namespace(None)],
        }
    }

    fn destructured_require(&self, pattern: Node<'_>) -> Vec<ImportSpecifier> {
        let mut specifiers = Vec::new();
        for child in named_children(pattern) {
            match child.kind() {
                "shorthand_property_identifier_pattern" => {
                    specifiers.push(ImportSpecifier::named(self.text(child)));
                }
                "object_assignment_pattern" => {
                    if let Some(left) = child.child_by_field_name("left") {
                        specifiers.push(ImportSpecifier::named(self.text(left)));
                    }
                }
                "pair_pattern" => {
                    let Some(key) = child.child_by_field_name("key") else {
                        continue;
                    };
                    let key = self.module_export_name(key);
                    match child.child_by_field_name("value") {
                        Some(value) if value.kind() == "identifier" => {
                            specifiers.push(ImportSpecifier::aliased(key, self.text(value)));
                        }
                        _ => specifiers.push(ImportSpecifier::named(key)),
                    }
                }
                // `...rest` can reach every export.
                "rest_pattern" => specifiers.push(ImportSpecifier::namespace(None)),
                _ => {}
            }
        }
        specifiers
    }

    // -----------------------------------------------------------------------
    // Exports
    // -----------------------------------------------------------------------

    fn collect_export(&mut self, node: Node<'_>) {
        let type_only = has_child_kind(node, "type");
        let (line, column) = position(node);

        if let Some(source_node) = node.child_by_field_name("source") {
            self.collect_re_export(node, source_node, type_only);
            return;
        }

        if let Some(clause) = first_child_of_kind(node, &["export_clause"]) {
            for spec in named_children(clause)
                .into_iter()
                .filter(|s| s.kind() == "export_specifier")
            {
                let Some(name_node) = spec.child_by_field_name("name") else {
                    continue;
                };
                let alias_node = spec.child_by_field_name("alias");
                let local = self.module_export_name(name_node).to_owned();
                let exported = alias_node
                    .map(|a| self.module_export_name(a).to_owned())
                    .unwrap_or_else(|| local.clone());
                let (line, column) = position(alias_node.unwrap_or(name_node));
                self.clause_exports.push(ClauseExport {
                    local,
                    exported,
                    line,
                    column,
                    type_only: type_only || has_child_kind(spec, "type"),
                });
            }
            return;
        }

        if has_child_kind(node, "default") || has_child_kind(node, "=") {
            let export = if let Some(declaration) = node.child_by_field_name("declaration") {
                let declared = self.declared_names(declaration);
                let (local, kind) = declared
                    .first()
                    .map(|(n, k)| (Some(self.text(*n).to_owned()), *k))
                    .unwrap_or((None, SymbolKind::Unknown));
                ExportDeclaration::new("default", kind, line, column).default_export(local)
            } else {
                let value = node
                    .child_by_field_name("value")
                    .or_else(|| named_children(node).into_iter().last());
                let local = value.and_then(|v| match v.kind() {
                    "identifier" => Some(self.text(v).to_owned()),
                    // Named function or class expressions.
                    _ => v.child_by_field_name("name").map(|n| self.text(n).to_owned()),
                });
                let kind = value.map_or(SymbolKind::Unknown, value_kind);
                ExportDeclaration::new("default", kind, line, column).default_export(local)
            };
            self.exports.push(export);
            return;
        }

        if let Some(declaration) = node.child_by_field_name("declaration") {
            for (name, kind) in self.declared_names(declaration) {
                let (line, column) = position(name);
                let type_only =
                    type_only || matches!(kind, SymbolKind::Interface | SymbolKind::Type);
                self.exports.push(
                    ExportDeclaration::new(self.text(name), kind, line, column)
                        .type_only(type_only),
                );
            }
        }
    }

    fn collect_re_export(&mut self, node: Node<'_>, source_node: Node<'_>, type_only: bool) {
        let source = string_literal(source_node, self.source).to_owned();
        let target = self.resolve(&source);
        let (line, column) = position(node);

        if has_child_kind(node, "*") {
            self.exports.push(
                ExportDeclaration::new("*", SymbolKind::Unknown, line, column)
                    .re_export(&source, target.clone())
                    .type_only(type_only),
            );
            // Edge only: forwarding everything consumes nothing by itself.
            self.imports
                .push(ImportDeclaration::new(source, target).type_only(type_only));
            return;
        }

        if let Some(namespace) = first_child_of_kind(node, &["namespace_export"]) {
            let Some(name_node) = named_children(namespace).into_iter().last() else {
                return;
            };
            let name = self.module_export_name(name_node).to_owned();
            let (line, column) = position(name_node);
            self.exports.push(
                ExportDeclaration::new(&name, SymbolKind::Unknown, line, column)
                    .re_export(&source, target.clone())
                    .type_only(type_only),
            );
            self.imports.push(
                ImportDeclaration::new(source, target)
                    .with_specifiers(vec![ImportSpecifier::namespace(Some(name))])
                    .type_only(type_only),
            );
            return;
        }

        let Some(clause) = first_child_of_kind(node, &["export_clause"]) else {
            return;
        };
        let mut specifiers = Vec::new();
        for spec in named_children(clause).into_iter().filter(|s| s.kind() == "export_specifier") {
            let Some(name_node) = spec.child_by_field_name("name") else {
                continue;
            };
            let alias_node = spec.child_by_field_name("alias");
            let imported = self.module_export_name(name_node).to_owned();
            let exported = alias_node
                .map(|a| self.module_export_name(a).to_owned())
                .unwrap_or_else(|| imported.clone());
            let (line, column) = position(alias_node.unwrap_or(name_node));
            let spec_type_only = type_only || has_child_kind(spec, "type");

            let mut export = ExportDeclaration::new(&exported, SymbolKind::Unknown, line, column)
                .re_export(&source, target.clone())
                .type_only(spec_type_only);
            if exported == "default" {
                export = export.default_export(Some(imported.clone()));
            }
            self.exports.push(export);

            specifiers.push(if imported == "default" {
                ImportSpecifier::default_import(exported)
            } else if imported != exported {
                ImportSpecifier::aliased(imported, exported)
            } else {
                ImportSpecifier::named(imported)
            });
        }
        self.imports.push(
            ImportDeclaration::new(source, target)
                .with_specifiers(specifiers)
                .type_only(type_only),
        );
    }

    /// `exports.x = ...`, `module.exports.x = ...` and `module.exports = ...` at top level.
    fn collect_commonjs_export(&mut self, assignment: Node<'_>) {
        let top_level = assignment
            .parent()
            .filter(|p| p.kind() == "expression_statement")
            .and_then(|p| p.parent())
            .is_some_and(|p| p.kind() == "program");
        if !top_level {
            return;
        }
        let (Some(left), Some(right)) = (
            assignment.child_by_field_name("left"),
            assignment.child_by_field_name("right"),
        ) else {
            return;
        };
        if left.kind() != "member_expression" {
            return;
        }
        let left_text = self.text(left);
        let (line, column) = position(left);

        if left_text == "module.exports" {
            if right.kind() == "object" {
                for member in named_children(right) {
                    let (name, kind) = match member.kind() {
                        "shorthand_property_identifier" => (Some(member), SymbolKind::Variable),
                        "pair" => (
                            member.child_by_field_name("key"),
                            member
                                .child_by_field_name("value")
                                .map_or(SymbolKind::Variable, value_kind),
                        ),
                        "method_definition" => {
                            (member.child_by_field_name("name"), SymbolKind::Function)
                        }
                        _ => (None, SymbolKind::Unknown),
                    };
                    if let Some(name) = name {
                        let (line, column) = position(name);
                        self.exports.push(ExportDeclaration::new(
                            self.module_export_name(name),
                            kind,
                            line,
                            column,
                        ));
                    }
                }
            } else {
                let local = (right.kind() == "identifier").then(|| self.text(right).to_owned());
                self.exports.push(
                    ExportDeclaration::new("default", value_kind(right), line, column)
                        .default_export(local),
                );
            }
            return;
        }

        let Some(object) = left.child_by_field_name("object") else {
            return;
        };
        let object_text = self.text(object);
        if object_text == "exports" || object_text == "module.exports" {
            if let Some(property) = left.child_by_field_name("property") {
                self.exports.push(ExportDeclaration::new(
                    self.text(property),
                    value_kind(right),
                    line,
                    column,
                ));
            }
        }
    }

    /// Names (and kinds) introduced by a declaration node.
    fn declared_names<'t>(&self, declaration: Node<'t>) -> Vec<(Node<'t>, SymbolKind)> {
        let single = |kind| {
            declaration
                .child_by_field_name("name")
                .map(|name| vec![(name, kind)])
                .unwrap_or_default()
        };
        match declaration.kind() {
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                single(SymbolKind::Function)
            }
            "class_declaration" | "abstract_class_declaration" | "class" => {
                single(SymbolKind::Class)
            }
            "interface_declaration" => single(SymbolKind::Interface),
            "type_alias_declaration" => single(SymbolKind::Type),
            "enum_declaration" => single(SymbolKind::Enum),
            "internal_module" | "module" => single(SymbolKind::Unknown),
            "lexical_declaration" | "variable_declaration" => {
                let mut names = Vec::new();
                for declarator in named_children(declaration)
                    .into_iter()
                    .filter(|d| d.kind() == "variable_declarator")
                {
                    let kind = self.declarator_kind(declaration, declarator);
                    if let Some(binding) = declarator.child_by_field_name("name") {
                        let mut bound = Vec::new();
                        binding_names(binding, &mut bound);
                        names.extend(bound.into_iter().map(|n| (n, kind)));
                    }
                }
                names
            }
            "ambient_declaration" => named_children(declaration)
                .into_iter()
                .flat_map(|inner| self.declared_names(inner))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn declarator_kind(&self, declaration: Node<'_>, declarator: Node<'_>) -> SymbolKind {
        match declarator.child_by_field_name("value").map(value_kind) {
            Some(SymbolKind::Function) => SymbolKind::Function,
            Some(SymbolKind::Class) => SymbolKind::Class,
            _ => {
                let keyword = declaration
                    .child_by_field_name("kind")
                    .map(|k| self.text(k))
                    .unwrap_or_else(|| self.text(declaration));
                if keyword.starts_with("const") {
                    SymbolKind::Constant
                } else {
                    SymbolKind::Variable
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Whole-tree visit: calls, CommonJS exports, declarations
    // -----------------------------------------------------------------------

    fn visit(&mut self, node: Node<'_>) {
        match node.kind() {
            "call_expression" => self.collect_call(node),
            "assignment_expression" => self.collect_commonjs_export(node),
            "function_declaration"
            | "generator_function_declaration"
            | "class_declaration"
            | "abstract_class_declaration"
            | "interface_declaration"
            | "type_alias_declaration"
            | "enum_declaration" => {
                for (name, kind) in self.declared_names(node) {
                    self.declare(node, name, kind);
                }
            }
            "variable_declarator" => {
                let Some(declaration) = node.parent() else {
                    return;
                };
                if !matches!(declaration.kind(), "lexical_declaration" | "variable_declaration") {
                    return;
                }
                let kind = self.declarator_kind(declaration, node);
                if let Some(binding) = node.child_by_field_name("name") {
                    let mut bound = Vec::new();
                    binding_names(binding, &mut bound);
                    for name in bound {
                        self.declare(declaration, name, kind);
                    }
                }
            }
            "method_definition" | "public_field_definition" | "field_definition" => {
                self.declare_private_member(node);
            }
            _ => {}
        }
    }

    /// Record a declaration site; non-exported ones become pending locals.
    fn declare(&mut self, holder: Node<'_>, name: Node<'_>, kind: SymbolKind) {
        let text = self.text(name).to_owned();
        *self.declaration_sites.entry(text.clone()).or_default() += 1;

        if in_ambient_context(holder) {
            return;
        }
        let parent_kind = holder.parent().map(|p| p.kind()).unwrap_or("program");
        if parent_kind == "export_statement" {
            return;
        }
        let top_level = parent_kind == "program";
        let (line, column) = position(name);
        if top_level {
            self.top_level.insert(text.clone(), (line, column, kind));
        }
        self.pending.push(PendingLocal {
            name: text,
            line,
            column,
            kind,
            top_level,
            member: false,
        });
    }

    /// TypeScript `private` members and `#private` members are file-local.
    fn declare_private_member(&mut self, node: Node<'_>) {
        let Some(name) = node
            .child_by_field_name("name")
            .or_else(|| node.child_by_field_name("property"))
        else {
            return;
        };
        let hash_private = name.kind() == "private_property_identifier";
        let ts_private = first_child_of_kind(node, &["accessibility_modifier"])
            .is_some_and(|m| self.text(m) == "private");
        if !hash_private && !ts_private {
            return;
        }
        let text = self.text(name).to_owned();
        if text == "constructor" {
            return;
        }
        *self.member_sites.entry(text.clone()).or_default() += 1;
        let (line, column) = position(name);
        let kind = if node.kind() == "method_definition" {
            SymbolKind::Method
        } else {
            SymbolKind::Variable
        };
        self.pending.push(PendingLocal {
            name: text,
            line,
            column,
            kind,
            top_level: false,
            member: true,
        });
    }

    // -----------------------------------------------------------------------
    // Assembly
    // -----------------------------------------------------------------------

    fn finish(mut self, root: Node<'_>, language: LanguageKind) -> FileRecord {
        let mut exported_locals: HashSet<String> = HashSet::new();

        for clause in std::mem::take(&mut self.clause_exports) {
            let export = if let Some(&(line, column, kind)) = self.top_level.get(&clause.local) {
                exported_locals.insert(clause.local.clone());
                ExportDeclaration::new(&clause.exported, kind, line, column)
            } else if let Some((source, target)) = self.imported_bindings.get(&clause.local) {
                ExportDeclaration::new(
                    &clause.exported,
                    SymbolKind::Unknown,
                    clause.line,
                    clause.column,
                )
                .re_export(source, target.clone())
            } else {
                ExportDeclaration::new(
                    &clause.exported,
                    SymbolKind::Unknown,
                    clause.line,
                    clause.column,
                )
            };
            let mut export = export.type_only(clause.type_only);
            if clause.exported == "default" {
                export = export.default_export(Some(clause.local.clone()));
            } else if clause.exported != clause.local {
                export.local_name = Some(clause.local.clone());
            }
            self.exports.push(export);
        }

        for export in self.exports.iter_mut().filter(|e| e.is_default && !e.is_re_export) {
            if let Some(local) = &export.local_name
                && let Some(&(_, _, kind)) = self.top_level.get(local)
            {
                exported_locals.insert(local.clone());
                if export.kind == SymbolKind::Unknown || export.kind == SymbolKind::Variable {
                    export.kind = kind;
                }
            }
        }

        let values = IdentifierCounts::from_tree(root, self.source, VALUE_IDENTIFIERS);
        let members = IdentifierCounts::from_tree(root, self.source, MEMBER_IDENTIFIERS);

        let locals = self
            .pending
            .into_iter()
            .filter(|p| !(p.top_level && exported_locals.contains(&p.name)))
            .map(|p| {
                let reference_count = if p.member {
                    let sites = self.member_sites.get(&p.name).copied().unwrap_or(1);
                    members.references(&p.name, sites)
                } else {
                    let sites = self.declaration_sites.get(&p.name).copied().unwrap_or(1);
                    values.references(&p.name, sites)
                };
                LocalSymbol {
                    name: p.name,
                    line: p.line,
                    column: p.column,
                    kind: p.kind,
                    reference_count,
                }
            })
            .collect();

        let mut record = FileRecord::empty(self.path, language);
        record.imports = self.imports;
        record.exports = self.exports;
        record.locals = locals;
        record
    }
}

fn value_kind(node: Node<'_>) -> SymbolKind {
    match node.kind() {
        "arrow_function" | "function_expression" | "function" | "generator_function" => {
            SymbolKind::Function
        }
        "class" => SymbolKind::Class,
        _ => SymbolKind::Variable,
    }
}

/// Identifier nodes bound by a declarator name or destructuring pattern.
fn binding_names<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => out.push(node),
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                binding_names(value, out);
            }
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                binding_names(left, out);
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            for child in named_children(node) {
                binding_names(child, out);
            }
        }
        _ => {}
    }
}

fn in_ambient_context(node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind() == "ambient_declaration" {
            return true;
        }
        current = parent.parent();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn collect(path: &str, source: &str, known: &[&str]) -> FileRecord {
        let root = std::env::temp_dir().join("deadwood-ecmascript-test-missing-root");
        let ctx = ResolutionContext::new(root, known.iter().map(PathBuf::from));
        EcmaScriptFrontEnd
            .build_file_record(source, Path::new(path), &ctx)
            .unwrap()
    }

    fn export_names(record: &FileRecord) -> Vec<&str> {
        record.exports.iter().map(|e| e.name.as_str()).collect()
    }

    fn local<'r>(record: &'r FileRecord, name: &str) -> Option<&'r LocalSymbol> {
        record.locals.iter().find(|l| l.name == name)
    }

    #[test]
    fn test_named_and_default_imports() {
        let record = collect(
            "/p/src/app.ts",
            "import React, { useState as useS, type FC } from 'react';\n\
             import * as utils from './utils';\nimport './polyfill';\n",
            &["/p/src/app.ts", "/p/src/utils.ts", "/p/src/polyfill.ts"],
        );
        assert_eq!(record.imports.len(), 3);

        let react = &record.imports[0];
        assert_eq!(react.source, "react");
        assert_eq!(react.resolved_target, ImportTarget::External("react".into()));
        assert!(react.specifiers[0].is_default);
        assert_eq!(react.specifiers[0].local_name(), "React");
        assert_eq!(react.specifiers[1].imported_name, "useState");
        assert_eq!(react.specifiers[1].local_alias.as_deref(), Some("useS"));
        assert_eq!(react.specifiers[2].imported_name, "FC");

        let utils = &record.imports[1];
        assert!(utils.is_namespace_import);
        assert_eq!(utils.resolved_target, ImportTarget::Internal("/p/src/utils.ts".into()));

        let polyfill = &record.imports[2];
        assert!(polyfill.is_side_effect());
        assert_eq!(polyfill.resolved_target, ImportTarget::Internal("/p/src/polyfill.ts".into()));
    }

    #[test]
    fn test_type_only_import() {
        let record = collect(
            "/p/a.ts",
            "import type { Props } from './types';\n",
            &["/p/types.ts"],
        );
        assert!(record.imports[0].is_type_only);
        assert_eq!(record.imports[0].specifiers[0].imported_name, "Props");
    }

    #[test]
    fn test_export_declarations() {
        let source = "\
export function used() {}
export const LIMIT = 10, other = () => 1;
export class Widget {}
export interface Props {}
export type Id = string;
export enum Color { Red }
export default function App() {}
";
        let record = collect("/p/a.ts", source, &[]);
        assert_eq!(
            export_names(&record),
            vec!["used", "LIMIT", "other", "Widget", "Props", "Id", "Color", "default"]
        );
        let by_name = |n: &str| record.exports.iter().find(|e| e.name == n).unwrap();
        assert_eq!(by_name("used").kind, SymbolKind::Function);
        assert_eq!(by_name("used").line, 1);
        assert_eq!(by_name("used").column, 16);
        assert_eq!(by_name("LIMIT").kind, SymbolKind::Constant);
        assert_eq!(by_name("other").kind, SymbolKind::Function);
        assert_eq!(by_name("Widget").kind, SymbolKind::Class);
        assert!(by_name("Props").is_type_only);
        assert_eq!(by_name("Color").kind, SymbolKind::Enum);
        let default = by_name("default");
        assert!(default.is_default);
        assert_eq!(default.local_name.as_deref(), Some("App"));
        assert_eq!(default.kind, SymbolKind::Function);
        assert!(record.locals.is_empty());
    }

    #[test]
    fn test_export_clause_points_at_declaration() {
        let source =
            "function helper() {}\nconst value = 1;\nexport { helper, value as renamed };\n";
        let record = collect("/p/a.js", source, &[]);
        let helper = record.exports.iter().find(|e| e.name == "helper").unwrap();
        assert_eq!(helper.line, 1);
        assert_eq!(helper.kind, SymbolKind::Function);
        assert!(!helper.is_re_export);
        let renamed = record.exports.iter().find(|e| e.name == "renamed").unwrap();
        assert_eq!(renamed.line, 2);
        assert_eq!(renamed.local_name.as_deref(), Some("value"));
        // Exported through the clause, so neither is a file-local symbol.
        assert!(record.locals.is_empty());
    }

    #[test]
    fn test_re_exports() {
        let source = "\
export * from './a';
export * as ns from './b';
export { x as y, z } from './c';
";
        let record = collect("/p/index.ts", source, &["/p/a.ts", "/p/b.ts", "/p/c.ts"]);
        assert_eq!(export_names(&record), vec!["*", "ns", "y", "z"]);
        assert!(record.exports.iter().all(|e| e.is_re_export));
        assert_eq!(
            record.exports[0].resolved_source,
            Some(ImportTarget::Internal("/p/a.ts".into()))
        );

        // Wildcard: edge-only import.
        assert!(record.imports[0].is_side_effect());
        // Namespace re-export consumes everything.
        assert!(record.imports[1].is_namespace_import);
        // Named re-export consumes the original names.
        let named = &record.imports[2];
        assert_eq!(named.specifiers[0].imported_name, "x");
        assert_eq!(named.specifiers[0].local_name(), "y");
        assert_eq!(named.specifiers[1].imported_name, "z");
        assert!(named.specifiers[1].local_alias.is_none());
        assert!(!record.has_own_declarations());
    }

    #[test]
    fn test_imported_binding_exported_again_is_a_re_export() {
        let source = "import { a } from './a';\nexport { a };\n";
        let record = collect("/p/index.ts", source, &["/p/a.ts"]);
        let a = &record.exports[0];
        assert!(a.is_re_export);
        assert_eq!(a.re_export_source.as_deref(), Some("./a"));
    }

    #[test]
    fn test_require_and_dynamic_import() {
        let source = "\
const fs = require('fs');
const { join, resolve: r } = require('./paths');
require('./setup');
const lazy = () => import('./lazy');
";
        let record = collect(
            "/p/main.js",
            source,
            &["/p/paths.js", "/p/setup.js", "/p/lazy.js"],
        );
        assert_eq!(record.imports.len(), 4);
        assert!(record.imports[0].is_namespace_import);
        let paths = &record.imports[1];
        assert_eq!(paths.specifiers.len(), 2);
        assert_eq!(paths.specifiers[0].imported_name, "join");
        assert_eq!(paths.specifiers[1].imported_name, "resolve");
        assert_eq!(paths.specifiers[1].local_name(), "r");
        assert!(record.imports[2].is_side_effect());
        assert!(record.imports[3].is_dynamic_import);
        assert!(record.imports[3].is_namespace_import);
    }

    #[test]
    fn test_commonjs_exports() {
        let source = "\
function a() {}
exports.b = function () {};
module.exports = { a, c: 1 };
";
        let record = collect("/p/lib.js", source, &[]);
        assert_eq!(export_names(&record), vec!["b", "a", "c"]);
        assert_eq!(record.exports[0].kind, SymbolKind::Function);
    }

    #[test]
    fn test_locals_and_reference_counts() {
        let source = "\
const used = 1;
const unused = 2;
function helper() { return used; }
export function main() {
  const [count, setCount] = useState(0);
  return helper() + count;
}
";
        let record = collect("/p/a.tsx", source, &[]);
        assert_eq!(local(&record, "used").unwrap().reference_count, 1);
        assert_eq!(local(&record, "unused").unwrap().reference_count, 0);
        assert_eq!(local(&record, "unused").unwrap().kind, SymbolKind::Constant);
        assert_eq!(local(&record, "helper").unwrap().reference_count, 1);
        assert_eq!(local(&record, "count").unwrap().reference_count, 1);
        let set_count = local(&record, "setCount").unwrap();
        assert_eq!(set_count.reference_count, 0);
        assert_eq!(set_count.line, 5);
        assert!(local(&record, "main").is_none());
    }

    #[test]
    fn test_private_members() {
        let source = "\
export class Service {
  private cache = new Map();
  private unusedHelper() {}
  #secret = 1;
  run() { return this.cache.size + this.#secret; }
}
";
        let record = collect("/p/service.ts", source, &[]);
        assert_eq!(local(&record, "cache").unwrap().reference_count, 1);
        let helper = local(&record, "unusedHelper").unwrap();
        assert_eq!(helper.reference_count, 0);
        assert_eq!(helper.kind, SymbolKind::Method);
        assert_eq!(local(&record, "#secret").unwrap().reference_count, 1);
        assert!(local(&record, "run").is_none());
    }

    #[test]
    fn test_malformed_source_degrades() {
        let record = collect("/p/broken.ts", "export function ok() {}\nexport const = ;\n", &[]);
        assert!(record.exports.iter().any(|e| e.name == "ok"));
    }
}
