use tracing::debug;

use super::{Confidence, DetectionContext, UnusedFile};

const REASON_OWN_CODE: &str =
    "no file imports it, but it declares code of its own (possible side effects on load)";
const REASON_BARREL: &str = "no file imports it and it only forwards other modules";

/// Files outside the entry-point set with no inbound edges, in file order.
pub fn find_unused_files(ctx: &DetectionContext<'_>) -> Vec<UnusedFile> {
    let mut unused = Vec::new();
    for path in ctx.graph.file_order() {
        if ctx.is_entry_point(path) || ctx.graph.importers_of(path) > 0 {
            continue;
        }
        let Some(record) = ctx.graph.record(path) else {
            continue;
        };
        let (confidence, reason) = if record.has_own_declarations() {
            (Confidence::Medium, REASON_OWN_CODE)
        } else {
            (Confidence::Low, REASON_BARREL)
        };
        debug!(file = %path.display(), %confidence, "unused file");
        unused.push(UnusedFile {
            file_path: path.clone(),
            confidence,
            reason: reason.to_string(),
        });
    }
    unused
}
