use std::path::Path;

use serde::{Deserialize, Serialize};

/// A source language handled by deadwood.
///
/// Uses a plain enum (not trait objects) so it is cheap to copy and can key
/// per-language maps. The matching front end is picked with
/// [`crate::parser::front_end_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageKind {
    TypeScript,
    JavaScript,
    Go,
    Java,
    Python,
}

impl LanguageKind {
    pub const ALL: [LanguageKind; 5] = [
        LanguageKind::TypeScript,
        LanguageKind::JavaScript,
        LanguageKind::Go,
        LanguageKind::Java,
        LanguageKind::Python,
    ];

    /// Returns true if this language kind matches a given file extension.
    pub fn matches_extension(&self, ext: &str) -> bool {
        match self {
            LanguageKind::TypeScript => matches!(ext, "ts" | "tsx" | "mts" | "cts"),
            LanguageKind::JavaScript => matches!(ext, "js" | "jsx" | "mjs" | "cjs"),
            LanguageKind::Go => ext == "go",
            LanguageKind::Java => ext == "java",
            LanguageKind::Python => matches!(ext, "py" | "pyi"),
        }
    }

    /// Pick the language for a file path by extension. `None` for anything unsupported,
    /// including TypeScript declaration files (`.d.ts`), which declare but never define.
    pub fn from_path(path: &Path) -> Option<LanguageKind> {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if file_name.ends_with(".d.ts") || file_name.ends_with(".d.mts") {
            return None;
        }
        let ext = path.extension().and_then(|e| e.to_str())?;
        Self::ALL.into_iter().find(|lk| lk.matches_extension(ext))
    }

    /// Human-readable display name for stats output.
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageKind::TypeScript => "TypeScript",
            LanguageKind::JavaScript => "JavaScript",
            LanguageKind::Go => "Go",
            LanguageKind::Java => "Java",
            LanguageKind::Python => "Python",
        }
    }

    /// Parse a CLI flag string into a `LanguageKind`. Case-insensitive.
    ///
    /// Accepted values:
    /// - "typescript" or "ts" -> TypeScript
    /// - "javascript" or "js" -> JavaScript
    /// - "go" or "golang"     -> Go
    /// - "java"               -> Java
    /// - "python" or "py"     -> Python
    pub fn from_str_loose(s: &str) -> Option<LanguageKind> {
        match s.to_lowercase().as_str() {
            "typescript" | "ts" => Some(LanguageKind::TypeScript),
            "javascript" | "js" => Some(LanguageKind::JavaScript),
            "go" | "golang" => Some(LanguageKind::Go),
            "java" => Some(LanguageKind::Java),
            "python" | "py" => Some(LanguageKind::Python),
            _ => None,
        }
    }

    /// True for the two ECMAScript-family languages, which share one front end.
    pub fn is_ecmascript(&self) -> bool {
        matches!(self, LanguageKind::TypeScript | LanguageKind::JavaScript)
    }

    /// Prefix of a single-line comment in this language.
    pub fn line_comment(&self) -> &'static str {
        match self {
            LanguageKind::Python => "#",
            _ => "//",
        }
    }

    /// Whether `name` carries the language's "intentionally unused" marker.
    ///
    /// A leading underscore everywhere except Python, where the leading underscore
    /// already means "module private" and only the bare `_` is a throwaway binding.
    pub fn is_intentionally_unused(&self, name: &str) -> bool {
        match self {
            LanguageKind::Python => name == "_",
            _ => name.starts_with('_'),
        }
    }

    /// Whether `path` follows this language's test / spec / story file convention.
    pub fn is_test_path(&self, path: &Path) -> bool {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let in_dir = |dir: &str| {
            path.components()
                .any(|c| c.as_os_str().to_str().map(|s| s == dir).unwrap_or(false))
        };

        match self {
            LanguageKind::TypeScript | LanguageKind::JavaScript => {
                file_name.contains(".test.")
                    || file_name.contains(".spec.")
                    || file_name.contains(".stories.")
                    || file_name.contains(".story.")
                    || in_dir("__tests__")
                    || in_dir("__mocks__")
            }
            LanguageKind::Go => file_name.ends_with("_test.go"),
            LanguageKind::Java => {
                let stem = file_name.trim_end_matches(".java");
                stem.ends_with("Test")
                    || stem.ends_with("Tests")
                    || stem.ends_with("IT")
                    || path.to_string_lossy().replace('\\', "/").contains("src/test/")
            }
            LanguageKind::Python => {
                file_name.starts_with("test_")
                    || file_name.ends_with("_test.py")
                    || file_name == "conftest.py"
                    || in_dir("tests")
            }
        }
    }
}

impl std::fmt::Display for LanguageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
