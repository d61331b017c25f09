use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::language::LanguageKind;
use crate::suppression::Directives;

/// The kind of a declared symbol, normalized across languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Variable,
    Type,
    Interface,
    Enum,
    Constant,
    Struct,
    Method,
    Unknown,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Variable => "variable",
            SymbolKind::Type => "type",
            SymbolKind::Interface => "interface",
            SymbolKind::Enum => "enum",
            SymbolKind::Constant => "constant",
            SymbolKind::Struct => "struct",
            SymbolKind::Method => "method",
            SymbolKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an import specifier points after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportTarget {
    /// A file under the project root. Only these become graph edges.
    Internal(PathBuf),
    /// Anything that did not resolve to a project file; carries the raw specifier.
    External(String),
}

impl ImportTarget {
    pub fn internal_path(&self) -> Option<&Path> {
        match self {
            ImportTarget::Internal(path) => Some(path),
            ImportTarget::External(_) => None,
        }
    }
}

/// One imported binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    /// The name as declared by the target module (`"default"` for default imports,
    /// `"*"` for namespace imports).
    pub imported_name: String,
    /// Local binding name when it differs from `imported_name`.
    pub local_alias: Option<String>,
    pub is_default: bool,
    pub is_namespace: bool,
}

impl ImportSpecifier {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            imported_name: name.into(),
            local_alias: None,
            is_default: false,
            is_namespace: false,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            local_alias: Some(alias.into()),
            ..Self::named(name)
        }
    }

    pub fn default_import(local: impl Into<String>) -> Self {
        Self {
            imported_name: "default".to_owned(),
            local_alias: Some(local.into()),
            is_default: true,
            is_namespace: false,
        }
    }

    pub fn namespace(local: Option<String>) -> Self {
        Self {
            imported_name: "*".to_owned(),
            local_alias: local,
            is_default: false,
            is_namespace: true,
        }
    }

    /// The export name this specifier consumes on the target.
    pub fn target_name(&self) -> &str {
        if self.is_default {
            "default"
        } else {
            &self.imported_name
        }
    }

    /// The name this binding is known by inside the importing file.
    pub fn local_name(&self) -> &str {
        self.local_alias.as_deref().unwrap_or(&self.imported_name)
    }
}

/// An import as written in a source file, plus where it resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDeclaration {
    /// Raw specifier text as written (`"./utils"`, `"fmt"`, `"com.example.Foo"`).
    pub source: String,
    pub resolved_target: ImportTarget,
    /// Empty for side-effect imports that bind nothing.
    pub specifiers: Vec<ImportSpecifier>,
    pub is_namespace_import: bool,
    pub is_dynamic_import: bool,
    pub is_type_only: bool,
}

impl ImportDeclaration {
    pub fn new(source: impl Into<String>, resolved_target: ImportTarget) -> Self {
        Self {
            source: source.into(),
            resolved_target,
            specifiers: Vec::new(),
            is_namespace_import: false,
            is_dynamic_import: false,
            is_type_only: false,
        }
    }

    pub fn with_specifiers(mut self, specifiers: Vec<ImportSpecifier>) -> Self {
        self.is_namespace_import = specifiers.iter().any(|s| s.is_namespace);
        self.specifiers = specifiers;
        self
    }

    pub fn dynamic(mut self) -> Self {
        self.is_dynamic_import = true;
        self
    }

    pub fn type_only(mut self, type_only: bool) -> Self {
        self.is_type_only = type_only;
        self
    }

    pub fn is_side_effect(&self) -> bool {
        self.specifiers.is_empty()
    }
}

/// An exported symbol (or aggregation, for `name == "*"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDeclaration {
    /// Declared identifier, `"default"`, or `"*"` for a wildcard re-export.
    pub name: String,
    pub is_default: bool,
    pub is_re_export: bool,
    /// The module specifier being re-exported from.
    pub re_export_source: Option<String>,
    /// Where `re_export_source` resolved, so re-export chains can be followed.
    pub resolved_source: Option<ImportTarget>,
    /// The identifier behind a default export (`export default function Foo`).
    pub local_name: Option<String>,
    /// 1-based line.
    pub line: usize,
    /// 0-based column.
    pub column: usize,
    pub kind: SymbolKind,
    pub is_type_only: bool,
}

impl ExportDeclaration {
    pub fn new(name: impl Into<String>, kind: SymbolKind, line: usize, column: usize) -> Self {
        Self {
            name: name.into(),
            is_default: false,
            is_re_export: false,
            re_export_source: None,
            resolved_source: None,
            local_name: None,
            line,
            column,
            kind,
            is_type_only: false,
        }
    }

    pub fn default_export(mut self, local_name: Option<String>) -> Self {
        self.is_default = true;
        self.local_name = local_name;
        self
    }

    pub fn re_export(mut self, source: impl Into<String>, target: ImportTarget) -> Self {
        self.is_re_export = true;
        self.re_export_source = Some(source.into());
        self.resolved_source = Some(target);
        self
    }

    pub fn type_only(mut self, type_only: bool) -> Self {
        self.is_type_only = type_only;
        self
    }

    /// `export * from '...'` and friends: an aggregation, never a reportable unit.
    pub fn is_wildcard(&self) -> bool {
        self.name == "*"
    }

    /// The name used for naming-convention heuristics: the local identifier of a
    /// default export when there is one, otherwise the exported name.
    pub fn display_name(&self) -> &str {
        self.local_name.as_deref().unwrap_or(&self.name)
    }
}

/// A symbol visible only inside its file (or compilation unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSymbol {
    pub name: String,
    pub line: usize,
    pub column: usize,
    pub kind: SymbolKind,
    /// Occurrences of the identifier other than its own declaration.
    pub reference_count: usize,
}

/// Everything one front end learned about one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub language: LanguageKind,
    pub imports: Vec<ImportDeclaration>,
    pub exports: Vec<ExportDeclaration>,
    pub locals: Vec<LocalSymbol>,
    /// Suppression directives found in the file text.
    pub directives: Directives,
}

impl FileRecord {
    pub fn empty(path: impl Into<PathBuf>, language: LanguageKind) -> Self {
        Self {
            path: path.into(),
            language,
            imports: Vec::new(),
            exports: Vec::new(),
            locals: Vec::new(),
            directives: Directives::default(),
        }
    }

    /// True when the file declares code of its own: any local, or any export that is
    /// not just forwarded from another module.
    pub fn has_own_declarations(&self) -> bool {
        !self.locals.is_empty() || self.exports.iter().any(|e| !e.is_re_export)
    }

    /// Exports that are reportable units (everything except wildcard aggregations).
    pub fn named_exports(&self) -> impl Iterator<Item = &ExportDeclaration> {
        self.exports.iter().filter(|e| !e.is_wildcard())
    }
}
