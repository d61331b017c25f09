use std::path::Path;

use tree_sitter::Language;

use crate::language::LanguageKind;

/// One tree-sitter grammar. TypeScript needs two: the plain grammar cannot parse JSX
/// and the TSX grammar rejects angle-bracket type assertions (`<T>expr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    TypeScript,
    Tsx,
    JavaScript,
    Go,
    Java,
    Python,
}

impl Grammar {
    pub fn language(&self) -> Language {
        match self {
            Grammar::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Grammar::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Grammar::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Grammar::Go => tree_sitter_go::LANGUAGE.into(),
            Grammar::Java => tree_sitter_java::LANGUAGE.into(),
            Grammar::Python => tree_sitter_python::LANGUAGE.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Grammar::TypeScript => "typescript",
            Grammar::Tsx => "tsx",
            Grammar::JavaScript => "javascript",
            Grammar::Go => "go",
            Grammar::Java => "java",
            Grammar::Python => "python",
        }
    }

    /// Grammar for a source path.
    ///
    /// - `.ts` / `.mts` / `.cts` -> TypeScript
    /// - `.tsx`                  -> TSX
    /// - `.js` / `.jsx` / `.mjs` / `.cjs` -> JavaScript (the grammar includes JSX)
    pub fn for_path(path: &Path) -> Option<Grammar> {
        let language = LanguageKind::from_path(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Some(match language {
            LanguageKind::TypeScript if ext == "tsx" => Grammar::Tsx,
            LanguageKind::TypeScript => Grammar::TypeScript,
            LanguageKind::JavaScript => Grammar::JavaScript,
            LanguageKind::Go => Grammar::Go,
            LanguageKind::Java => Grammar::Java,
            LanguageKind::Python => Grammar::Python,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_for_path() {
        assert_eq!(Grammar::for_path(Path::new("a.ts")), Some(Grammar::TypeScript));
        assert_eq!(Grammar::for_path(Path::new("a.tsx")), Some(Grammar::Tsx));
        assert_eq!(Grammar::for_path(Path::new("a.jsx")), Some(Grammar::JavaScript));
        assert_eq!(Grammar::for_path(Path::new("a.go")), Some(Grammar::Go));
        assert_eq!(Grammar::for_path(Path::new("A.java")), Some(Grammar::Java));
        assert_eq!(Grammar::for_path(Path::new("a.pyi")), Some(Grammar::Python));
        assert_eq!(Grammar::for_path(Path::new("a.d.ts")), None);
        assert_eq!(Grammar::for_path(Path::new("a.rs")), None);
    }

    #[test]
    fn test_every_grammar_loads() {
        for grammar in [
            Grammar::TypeScript,
            Grammar::Tsx,
            Grammar::JavaScript,
            Grammar::Go,
            Grammar::Java,
            Grammar::Python,
        ] {
            let mut parser = tree_sitter::Parser::new();
            parser
                .set_language(&grammar.language())
                .unwrap_or_else(|e| panic!("{} grammar failed to load: {e}", grammar.name()));
        }
    }
}
