use super::heuristics::{LocalFacts, local_confidence};
use super::{DetectionContext, UnusedLocal};

/// File-local symbols with zero references. Runs over every file, entry points
/// included: being an entry point says nothing about a file's private helpers.
pub fn find_unused_locals(ctx: &DetectionContext<'_>) -> Vec<UnusedLocal> {
    let mut unused = Vec::new();
    for path in ctx.graph.file_order() {
        let Some(record) = ctx.graph.record(path) else {
            continue;
        };
        if record.directives.file_level {
            continue;
        }
        for local in &record.locals {
            if local.reference_count > 0
                || record.language.is_intentionally_unused(&local.name)
                || record.directives.suppresses_line(local.line)
            {
                continue;
            }
            unused.push(UnusedLocal {
                file_path: path.clone(),
                symbol_name: local.name.clone(),
                line: local.line,
                column: local.column,
                confidence: local_confidence(&LocalFacts {
                    local,
                    language: record.language,
                }),
                kind: local.kind,
            });
        }
    }
    unused
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::PathBuf;

    use super::*;
    use crate::dead_code::Confidence;
    use crate::graph::Graph;
    use crate::graph::record::{FileRecord, LocalSymbol, SymbolKind};
    use crate::language::LanguageKind;

    fn local(name: &str, line: usize, reference_count: usize) -> LocalSymbol {
        LocalSymbol {
            name: name.into(),
            line,
            column: 6,
            kind: SymbolKind::Variable,
            reference_count,
        }
    }

    fn detect(records: Vec<FileRecord>) -> Vec<UnusedLocal> {
        let graph = Graph::build(records);
        let entries: HashSet<PathBuf> = [PathBuf::from("/p/main.ts")].into_iter().collect();
        let conventional = HashSet::new();
        find_unused_locals(&DetectionContext {
            graph: &graph,
            entry_points: &entries,
            conventional_exports: &conventional,
        })
    }

    #[test]
    fn test_zero_reference_locals_reported_in_entry_files_too() {
        let mut main = FileRecord::empty("/p/main.ts", LanguageKind::TypeScript);
        main.locals = vec![
            local("used", 4, 2),
            local("orphan", 5, 0),
            local("_ignored", 6, 0),
            local("setCount", 7, 0),
        ];
        let unused = detect(vec![main]);
        let found: Vec<(&str, Confidence)> = unused
            .iter()
            .map(|u| (u.symbol_name.as_str(), u.confidence))
            .collect();
        assert_eq!(found, vec![("orphan", Confidence::High), ("setCount", Confidence::Medium)]);
    }

    #[test]
    fn test_python_underscore_is_privacy_not_intent() {
        let mut module = FileRecord::empty("/p/util.py", LanguageKind::Python);
        module.locals = vec![local("_cache", 4, 0), local("_", 5, 0)];
        let unused = detect(vec![module]);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].symbol_name, "_cache");
    }
}
