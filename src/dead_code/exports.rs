use tracing::trace;

use super::heuristics::{ExportFacts, export_confidence};
use super::{DetectionContext, UnusedExport};
use crate::graph::key::ExportKey;

/// Exports with an empty usage set, skipping entry-point files, wildcard
/// aggregations and suppressed declarations.
pub fn find_unused_exports(ctx: &DetectionContext<'_>) -> Vec<UnusedExport> {
    let mut unused = Vec::new();
    for path in ctx.graph.file_order() {
        if ctx.is_entry_point(path) {
            continue;
        }
        let Some(record) = ctx.graph.record(path) else {
            continue;
        };
        if record.directives.file_level {
            trace!(file = %path.display(), "exports suppressed by file directive");
            continue;
        }

        for export in record.named_exports() {
            let used = ctx
                .graph
                .usages(&ExportKey::new(path, &export.name))
                .is_some_and(|importers| !importers.is_empty());
            if used || record.directives.suppresses_line(export.line) {
                continue;
            }
            let confidence = export_confidence(&ExportFacts {
                export,
                path,
                language: record.language,
                conventional_exports: ctx.conventional_exports,
            });
            unused.push(UnusedExport {
                file_path: path.clone(),
                export_name: export.name.clone(),
                line: export.line,
                column: export.column,
                confidence,
                kind: export.kind,
            });
        }
    }
    unused
}
