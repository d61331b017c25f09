//! Confidence rules for unused exports and unused locals.
//!
//! Each table is an ordered list evaluated first-match. Language rows come before
//! the generic rows so a language can lower the confidence of its own idioms
//! without touching the shared order.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::Confidence;
use crate::graph::record::{ExportDeclaration, LocalSymbol, SymbolKind};
use crate::language::LanguageKind;

/// Hook, HOC, render-prop, handler, selector and context/provider naming idioms.
static IDIOM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:use[A-Z0-9]|with[A-Z]|render[A-Z]|handle[A-Z]|on[A-Z]|select[A-Z])",
        r"|(?:Context|Provider|Consumer)$",
    ))
    .expect("idiom pattern compiles")
});

static STATEFUL_SETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^set[A-Z]").expect("setter pattern compiles"));

const JAVA_LIFECYCLE_METHODS: &[&str] = &[
    "main",
    "toString",
    "equals",
    "hashCode",
    "compareTo",
    "run",
    "call",
    "close",
];

const JAVA_SERIALIZATION_HOOKS: &[&str] =
    &["readObject", "writeObject", "readResolve", "writeReplace", "readObjectNoData"];

const GO_INTERFACE_METHODS: &[&str] = &[
    "String",
    "Error",
    "ServeHTTP",
    "MarshalJSON",
    "UnmarshalJSON",
    "Len",
    "Less",
    "Swap",
];

const DIAGNOSTIC_HANDLES: &[&str] = &["log", "logger", "LOG", "LOGGER"];

const COMPONENT_EXTENSIONS: &[&str] = &["tsx", "jsx"];

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// What the export rules look at.
pub struct ExportFacts<'a> {
    pub export: &'a ExportDeclaration,
    pub path: &'a Path,
    pub language: LanguageKind,
    pub conventional_exports: &'a HashSet<String>,
}

pub struct ExportRule {
    pub name: &'static str,
    pub applies: fn(&ExportFacts<'_>) -> bool,
    pub confidence: Confidence,
    pub rationale: &'static str,
}

pub const LANGUAGE_EXPORT_RULES: &[ExportRule] = &[
    ExportRule {
        name: "python-dunder",
        applies: |f| f.language == LanguageKind::Python && is_dunder(&f.export.name),
        confidence: Confidence::Low,
        rationale: "dunder names are looked up by the interpreter",
    },
    ExportRule {
        name: "java-lifecycle",
        applies: |f| {
            f.language == LanguageKind::Java
                && f.export.kind == SymbolKind::Method
                && JAVA_LIFECYCLE_METHODS.contains(&f.export.name.as_str())
        },
        confidence: Confidence::Low,
        rationale: "called by the runtime or through a standard interface",
    },
    ExportRule {
        name: "java-serialization",
        applies: |f| {
            f.language == LanguageKind::Java
                && JAVA_SERIALIZATION_HOOKS.contains(&f.export.name.as_str())
        },
        confidence: Confidence::Low,
        rationale: "serialization hooks are invoked reflectively",
    },
    ExportRule {
        name: "go-interface-method",
        applies: |f| {
            f.language == LanguageKind::Go
                && f.export.kind == SymbolKind::Method
                && GO_INTERFACE_METHODS.contains(&f.export.name.as_str())
        },
        confidence: Confidence::Low,
        rationale: "satisfies a standard library interface",
    },
];

pub const GENERIC_EXPORT_RULES: &[ExportRule] = &[
    ExportRule {
        name: "conventional-name",
        applies: |f| f.conventional_exports.contains(&f.export.name),
        confidence: Confidence::Low,
        rationale: "framework or runtime calls it by convention",
    },
    ExportRule {
        name: "default-component",
        applies: |f| {
            f.export.is_default
                && has_component_extension(f.path)
                && f.export.display_name().starts_with(|c: char| c.is_ascii_uppercase())
        },
        confidence: Confidence::Low,
        rationale: "likely consumed by a rendering mechanism",
    },
    ExportRule {
        name: "naming-idiom",
        applies: |f| IDIOM.is_match(f.export.display_name()),
        confidence: Confidence::Low,
        rationale: "common indirect-consumption idiom",
    },
    ExportRule {
        name: "test-file",
        applies: |f| f.language.is_test_path(f.path),
        confidence: Confidence::Low,
        rationale: "consumed by a test or story runner",
    },
    ExportRule {
        name: "re-export",
        applies: |f| f.export.is_re_export,
        confidence: Confidence::Low,
        rationale: "may be part of an intentional public barrel",
    },
    ExportRule {
        name: "type-only",
        applies: |f| f.export.is_type_only,
        confidence: Confidence::Medium,
        rationale: "type-only usage is harder to track",
    },
    ExportRule {
        name: "default-export",
        applies: |f| f.export.is_default,
        confidence: Confidence::Low,
        rationale: "default exports are often intentional public surface",
    },
    ExportRule {
        name: "named-export",
        applies: |_| true,
        confidence: Confidence::Medium,
        rationale: "plain named export with no importer",
    },
];

/// The first rule that applies, language rows first.
pub fn classify_export(facts: &ExportFacts<'_>) -> &'static ExportRule {
    LANGUAGE_EXPORT_RULES
        .iter()
        .chain(GENERIC_EXPORT_RULES)
        .find(|rule| (rule.applies)(facts))
        .unwrap_or(&GENERIC_EXPORT_RULES[GENERIC_EXPORT_RULES.len() - 1])
}

pub fn export_confidence(facts: &ExportFacts<'_>) -> Confidence {
    classify_export(facts).confidence
}

// ---------------------------------------------------------------------------
// Locals
// ---------------------------------------------------------------------------

pub struct LocalFacts<'a> {
    pub local: &'a LocalSymbol,
    pub language: LanguageKind,
}

pub struct LocalRule {
    pub name: &'static str,
    pub applies: fn(&LocalFacts<'_>) -> bool,
    pub confidence: Confidence,
    pub rationale: &'static str,
}

pub const LOCAL_RULES: &[LocalRule] = &[
    LocalRule {
        name: "serialization-marker",
        applies: |f| f.local.name == "serialVersionUID",
        confidence: Confidence::Low,
        rationale: "read by the serialization runtime",
    },
    LocalRule {
        name: "stateful-binding",
        applies: |f| STATEFUL_SETTER.is_match(&f.local.name) || f.local.name == "dispatch",
        confidence: Confidence::Medium,
        rationale: "half of a state/setter pair, often unused on purpose",
    },
    LocalRule {
        name: "diagnostic-handle",
        applies: |f| DIAGNOSTIC_HANDLES.contains(&f.local.name.as_str()),
        confidence: Confidence::Medium,
        rationale: "logger kept around for future diagnostics",
    },
    LocalRule {
        name: "java-serialization",
        applies: |f| {
            f.language == LanguageKind::Java
                && JAVA_SERIALIZATION_HOOKS.contains(&f.local.name.as_str())
        },
        confidence: Confidence::Medium,
        rationale: "private serialization hooks are invoked reflectively",
    },
];

/// High unless one of [`LOCAL_RULES`] applies.
pub fn local_confidence(facts: &LocalFacts<'_>) -> Confidence {
    LOCAL_RULES
        .iter()
        .find(|rule| (rule.applies)(facts))
        .map_or(Confidence::High, |rule| rule.confidence)
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

fn has_component_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| COMPONENT_EXTENSIONS.contains(&e))
}
