pub mod ecmascript;
pub mod golang;
pub mod java;
pub mod languages;
pub mod python;
pub mod references;

use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::error::{DeadwoodError, Result};
use crate::graph::record::FileRecord;
use crate::language::LanguageKind;
use crate::resolver::ResolutionContext;
use crate::suppression::Directives;
use languages::Grammar;

/// A per-language collector: source text in, [`FileRecord`] out.
///
/// Front ends never fail on malformed source. tree-sitter recovers with `ERROR`
/// nodes and constructs it cannot make sense of are simply not recorded; only a
/// grammar that cannot be loaded or a parser that returns no tree is an error.
pub trait LanguageFrontEnd: Send + Sync {
    fn name(&self) -> &'static str;

    fn build_file_record(
        &self,
        text: &str,
        path: &Path,
        ctx: &ResolutionContext,
    ) -> Result<FileRecord>;
}

static ECMASCRIPT: ecmascript::EcmaScriptFrontEnd = ecmascript::EcmaScriptFrontEnd;
static GO: golang::GoFrontEnd = golang::GoFrontEnd;
static JAVA: java::JavaFrontEnd = java::JavaFrontEnd;
static PYTHON: python::PythonFrontEnd = python::PythonFrontEnd;

/// The front end responsible for `language`. TypeScript and JavaScript share one.
pub fn front_end_for(language: LanguageKind) -> &'static dyn LanguageFrontEnd {
    match language {
        LanguageKind::TypeScript | LanguageKind::JavaScript => &ECMASCRIPT,
        LanguageKind::Go => &GO,
        LanguageKind::Java => &JAVA,
        LanguageKind::Python => &PYTHON,
    }
}

/// Collect one file with the front end for its extension and attach its
/// suppression directives.
pub fn collect_file(text: &str, path: &Path, ctx: &ResolutionContext) -> Result<FileRecord> {
    let language = LanguageKind::from_path(path)
        .ok_or_else(|| DeadwoodError::UnsupportedFile(path.to_path_buf()))?;
    let mut record = front_end_for(language).build_file_record(text, path, ctx)?;
    record.language = language;
    record.directives = Directives::scan(text, language.line_comment());
    Ok(record)
}

// Thread-local parsers: one per rayon worker and grammar, created on first use.
thread_local! {
    static PARSERS: RefCell<HashMap<Grammar, Parser>> = RefCell::new(HashMap::new());
}

pub(crate) fn parse_source(grammar: Grammar, text: &str, path: &Path) -> Result<Tree> {
    PARSERS.with(|cell| {
        let mut parsers = cell.borrow_mut();
        let parser = match parsers.entry(grammar) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let mut parser = Parser::new();
                parser
                    .set_language(&grammar.language())
                    .map_err(|e| DeadwoodError::Grammar {
                        language: grammar.name(),
                        message: e.to_string(),
                    })?;
                entry.insert(parser)
            }
        };
        parser
            .parse(text, None)
            .ok_or_else(|| DeadwoodError::Parse(path.to_path_buf()))
    })
}

// ---------------------------------------------------------------------------
// Node helpers shared by the front ends
// ---------------------------------------------------------------------------

pub(crate) fn node_text<'s>(node: Node<'_>, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// 1-based line, 0-based column.
pub(crate) fn position(node: Node<'_>) -> (usize, usize) {
    let point = node.start_position();
    (point.row + 1, point.column)
}

/// Whether `node` has a direct child (named or anonymous) of `kind`.
pub(crate) fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == kind)
}

pub(crate) fn first_child_of_kind<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| kinds.contains(&c.kind()))
}

pub(crate) fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Pre-order visit of every node under `root` (inclusive), without recursion.
pub(crate) fn walk_tree<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut cursor = root.walk();
    loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Contents of a string literal node without its quotes.
pub(crate) fn string_literal<'s>(node: Node<'_>, source: &'s [u8]) -> &'s str {
    let text = node_text(node, source);
    let quote_chars: &[char] = &['"', '\'', '`'];
    let text = text.trim_start_matches(['r', 'b', 'u', 'f', 'R', 'B', 'U', 'F']);
    text.strip_prefix("\"\"\"")
        .and_then(|t| t.strip_suffix("\"\"\""))
        .unwrap_or_else(|| text.trim_matches(quote_chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_reuses_thread_parser() {
        let path = Path::new("a.ts");
        let first = parse_source(Grammar::TypeScript, "const a = 1;", path).unwrap();
        let second = parse_source(Grammar::TypeScript, "let b = 2;", path).unwrap();
        assert_eq!(first.root_node().kind(), "program");
        assert_eq!(second.root_node().kind(), "program");
    }

    #[test]
    fn test_walk_tree_visits_every_node() {
        let tree = parse_source(Grammar::JavaScript, "f(a, b);", Path::new("a.js")).unwrap();
        let mut identifiers = Vec::new();
        walk_tree(tree.root_node(), |node| {
            if node.kind() == "identifier" {
                identifiers.push(node_text(node, b"f(a, b);").to_owned());
            }
        });
        assert_eq!(identifiers, vec!["f", "a", "b"]);
    }

    #[test]
    fn test_collect_file_rejects_unsupported_extension() {
        let ctx = ResolutionContext::new("/p", Vec::new());
        let err = collect_file("", Path::new("/p/notes.txt"), &ctx).unwrap_err();
        assert!(matches!(err, DeadwoodError::UnsupportedFile(_)));
    }

    #[test]
    fn test_collect_file_scans_directives() {
        let ctx = ResolutionContext::new("/p", vec![Path::new("/p/a.py").to_path_buf()]);
        let record =
            collect_file("# deadwood-ignore\nx = 1\n", Path::new("/p/a.py"), &ctx).unwrap();
        assert!(record.directives.file_level);
        assert_eq!(record.language, LanguageKind::Python);
    }
}
