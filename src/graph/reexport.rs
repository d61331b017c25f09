use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::Graph;
use super::key::ExportKey;
use super::record::ImportTarget;

/// Upper bound on barrel nesting followed for one lookup.
pub const MAX_REEXPORT_DEPTH: usize = 32;

/// Find the file that actually declares `name` when it is requested from `barrel`
/// but `barrel` only forwards it through `export * from '...'`.
///
/// Follows wildcard re-exports depth-first in declaration order, guarding against
/// circular barrels with a visited set. `default` is never forwarded by a wildcard.
/// Returns `None` when no file in the chain declares the name.
pub fn resolve_through_wildcards(graph: &Graph, barrel: &Path, name: &str) -> Option<ExportKey> {
    if name == "default" || name == "*" {
        return None;
    }
    let mut visited: HashSet<PathBuf> = HashSet::new();
    follow(graph, barrel, name, &mut visited, 0)
}

fn follow(
    graph: &Graph,
    file: &Path,
    name: &str,
    visited: &mut HashSet<PathBuf>,
    depth: usize,
) -> Option<ExportKey> {
    if depth >= MAX_REEXPORT_DEPTH || !visited.insert(file.to_path_buf()) {
        trace!(file = %file.display(), name, "re-export chain stopped (cycle or depth)");
        return None;
    }
    let record = graph.files.get(file)?;

    for export in record.exports.iter().filter(|e| e.is_wildcard()) {
        let Some(source) = export
            .resolved_source
            .as_ref()
            .and_then(ImportTarget::internal_path)
        else {
            continue;
        };
        let candidate = ExportKey::new(source, name);
        if graph.export_usage.contains_key(&candidate) {
            return Some(candidate);
        }
        if let Some(found) = follow(graph, source, name, visited, depth + 1) {
            return Some(found);
        }
    }
    None
}

/// Every file whose exports `barrel` forwards through `export * from '...'`,
/// directly or through further wildcard barrels, in depth-first declaration order.
///
/// Shares the cycle guard and depth bound of [`resolve_through_wildcards`]. The
/// barrel itself is not included.
pub fn wildcard_sources(graph: &Graph, barrel: &Path) -> Vec<PathBuf> {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut reached = Vec::new();
    collect_sources(graph, barrel, &mut visited, &mut reached, 0);
    reached.retain(|file| file != barrel);
    reached
}

fn collect_sources(
    graph: &Graph,
    file: &Path,
    visited: &mut HashSet<PathBuf>,
    reached: &mut Vec<PathBuf>,
    depth: usize,
) {
    if depth >= MAX_REEXPORT_DEPTH || !visited.insert(file.to_path_buf()) {
        return;
    }
    reached.push(file.to_path_buf());
    let Some(record) = graph.files.get(file) else {
        return;
    };
    for export in record.exports.iter().filter(|e| e.is_wildcard()) {
        if let Some(source) = export
            .resolved_source
            .as_ref()
            .and_then(ImportTarget::internal_path)
        {
            collect_sources(graph, source, visited, reached, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::record::{ExportDeclaration, FileRecord, SymbolKind};
    use crate::language::LanguageKind;

    fn barrel(path: &str, sources: &[&str]) -> FileRecord {
        let mut record = FileRecord::empty(path, LanguageKind::TypeScript);
        for source in sources {
            record.exports.push(
                ExportDeclaration::new("*", SymbolKind::Unknown, 1, 0)
                    .re_export(*source, ImportTarget::Internal((*source).into())),
            );
        }
        record
    }

    fn module(path: &str, names: &[&str]) -> FileRecord {
        let mut record = FileRecord::empty(path, LanguageKind::TypeScript);
        for name in names {
            record
                .exports
                .push(ExportDeclaration::new(*name, SymbolKind::Function, 1, 0));
        }
        record
    }

    #[test]
    fn test_two_level_barrel_chain() {
        let graph = Graph::build(vec![
            barrel("/p/index.ts", &["/p/inner/index.ts"]),
            barrel("/p/inner/index.ts", &["/p/inner/a.ts"]),
            module("/p/inner/a.ts", &["deep"]),
        ]);
        let found = resolve_through_wildcards(&graph, Path::new("/p/index.ts"), "deep");
        assert_eq!(found, Some(ExportKey::new("/p/inner/a.ts", "deep")));
    }

    #[test]
    fn test_circular_barrels_terminate() {
        let graph = Graph::build(vec![
            barrel("/p/a.ts", &["/p/b.ts"]),
            barrel("/p/b.ts", &["/p/a.ts"]),
        ]);
        assert_eq!(
            resolve_through_wildcards(&graph, Path::new("/p/a.ts"), "missing"),
            None
        );
    }

    #[test]
    fn test_default_is_not_forwarded() {
        let graph = Graph::build(vec![
            barrel("/p/index.ts", &["/p/a.ts"]),
            module("/p/a.ts", &["default"]),
        ]);
        assert_eq!(
            resolve_through_wildcards(&graph, Path::new("/p/index.ts"), "default"),
            None
        );
    }

    #[test]
    fn test_wildcard_sources_follow_nested_barrels() {
        let graph = Graph::build(vec![
            barrel("/p/index.ts", &["/p/inner/index.ts", "/p/b.ts"]),
            barrel("/p/inner/index.ts", &["/p/inner/a.ts", "/p/index.ts"]),
            module("/p/inner/a.ts", &["deep"]),
            module("/p/b.ts", &["shallow"]),
        ]);
        assert_eq!(
            wildcard_sources(&graph, Path::new("/p/index.ts")),
            vec![
                PathBuf::from("/p/inner/index.ts"),
                PathBuf::from("/p/inner/a.ts"),
                PathBuf::from("/p/b.ts"),
            ]
        );
        assert!(wildcard_sources(&graph, Path::new("/p/b.ts")).is_empty());
    }

    #[test]
    fn test_first_declaring_source_wins() {
        let graph = Graph::build(vec![
            barrel("/p/index.ts", &["/p/a.ts", "/p/b.ts"]),
            module("/p/a.ts", &["other"]),
            module("/p/b.ts", &["shared"]),
        ]);
        assert_eq!(
            resolve_through_wildcards(&graph, Path::new("/p/index.ts"), "shared"),
            Some(ExportKey::new("/p/b.ts", "shared"))
        );
    }
}
