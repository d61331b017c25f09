use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use deadwood::{AnalysisReport, Confidence};

use crate::cli::OutputFormat;

/// Drop findings below `min`. Summary counts are left untouched.
pub fn retain_confidence(report: &mut AnalysisReport, min: Confidence) {
    report.unused_files.retain(|f| f.confidence >= min);
    report.unused_exports.retain(|e| e.confidence >= min);
    report.unused_locals.retain(|l| l.confidence >= min);
}

/// Render the report in the selected format. Paths are shown relative to
/// `project_root` except in JSON, which keeps the absolute paths of the report.
pub fn render_report(
    report: &AnalysisReport,
    format: &OutputFormat,
    project_root: &Path,
    use_color: bool,
) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Compact => render_compact(report, project_root),
        OutputFormat::Table => render_table(report, project_root, use_color),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("failed to serialize report as JSON")?
        }
    })
}

fn relative<'a>(path: &'a Path, root: &Path) -> std::path::Display<'a> {
    path.strip_prefix(root).unwrap_or(path).display()
}

fn render_compact(report: &AnalysisReport, root: &Path) -> String {
    let mut out = String::new();
    for f in &report.unused_files {
        let _ = writeln!(
            out,
            "file {} {} {}",
            relative(&f.file_path, root),
            f.confidence,
            f.reason
        );
    }
    for e in &report.unused_exports {
        let _ = writeln!(
            out,
            "export {} {}:{}:{} {} {}",
            e.export_name,
            relative(&e.file_path, root),
            e.line,
            e.column,
            e.kind,
            e.confidence
        );
    }
    for l in &report.unused_locals {
        let _ = writeln!(
            out,
            "local {} {}:{}:{} {} {}",
            l.symbol_name,
            relative(&l.file_path, root),
            l.line,
            l.column,
            l.kind,
            l.confidence
        );
    }
    let _ = writeln!(out, "{}", summary_line(report));
    out
}

fn summary_line(report: &AnalysisReport) -> String {
    let s = &report.summary;
    format!(
        "{} unused files, {} unused exports, {} unused locals \
         ({} files, {} exports, {} locals analyzed in {} ms)",
        report.unused_files.len(),
        report.unused_exports.len(),
        report.unused_locals.len(),
        s.analyzed_files,
        s.total_exports,
        s.total_locals,
        s.duration_ms
    )
}

fn render_table(report: &AnalysisReport, root: &Path, use_color: bool) -> String {
    let header = |s: &str| {
        if use_color {
            format!("\x1b[1m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    };
    let mut out = String::new();

    if !report.unused_files.is_empty() {
        let file_w = report
            .unused_files
            .iter()
            .map(|f| relative(&f.file_path, root).to_string().len())
            .max()
            .unwrap_or(4)
            .max(4);
        let _ = writeln!(out, "{}", header("=== Unused files ==="));
        let _ = writeln!(out, "{:<file_w$}  {:<10}  REASON", "FILE", "CONFIDENCE");
        let _ = writeln!(out, "{}", "-".repeat(file_w + 20));
        for f in &report.unused_files {
            let _ = writeln!(
                out,
                "{:<file_w$}  {:<10}  {}",
                relative(&f.file_path, root).to_string(),
                f.confidence.as_str(),
                f.reason
            );
        }
        out.push('\n');
    }

    let symbol_rows: Vec<(&str, String, &str, &str)> = report
        .unused_exports
        .iter()
        .map(|e| {
            (
                e.export_name.as_str(),
                format!("{}:{}", relative(&e.file_path, root), e.line),
                e.kind.as_str(),
                e.confidence.as_str(),
            )
        })
        .collect();
    render_symbol_table(&mut out, &header("=== Unused exports ==="), &symbol_rows);

    let symbol_rows: Vec<(&str, String, &str, &str)> = report
        .unused_locals
        .iter()
        .map(|l| {
            (
                l.symbol_name.as_str(),
                format!("{}:{}", relative(&l.file_path, root), l.line),
                l.kind.as_str(),
                l.confidence.as_str(),
            )
        })
        .collect();
    render_symbol_table(&mut out, &header("=== Unused locals ==="), &symbol_rows);

    let _ = writeln!(out, "{}", summary_line(report));
    out
}

fn render_symbol_table(out: &mut String, title: &str, rows: &[(&str, String, &str, &str)]) {
    if rows.is_empty() {
        return;
    }
    let name_w = rows.iter().map(|r| r.0.len()).max().unwrap_or(6).max(6);
    let loc_w = rows.iter().map(|r| r.1.len()).max().unwrap_or(8).max(8);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(
        out,
        "{:<name_w$}  {:<loc_w$}  {:<9}  CONFIDENCE",
        "SYMBOL",
        "LOCATION",
        "KIND"
    );
    let _ = writeln!(out, "{}", "-".repeat(name_w + loc_w + 25));
    for (name, location, kind, confidence) in rows {
        let _ = writeln!(out, "{name:<name_w$}  {location:<loc_w$}  {kind:<9}  {confidence}");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;
    use deadwood::graph::record::SymbolKind;
    use deadwood::{AnalysisSummary, UnusedExport, UnusedFile, UnusedLocal};

    fn report() -> AnalysisReport {
        AnalysisReport {
            unused_files: vec![UnusedFile {
                file_path: PathBuf::from("/p/src/old.ts"),
                confidence: Confidence::Low,
                reason: "no file imports it".into(),
            }],
            unused_exports: vec![UnusedExport {
                file_path: PathBuf::from("/p/src/lib.ts"),
                export_name: "deadThing".into(),
                line: 3,
                column: 16,
                confidence: Confidence::Medium,
                kind: SymbolKind::Function,
            }],
            unused_locals: vec![UnusedLocal {
                file_path: PathBuf::from("/p/src/main.ts"),
                symbol_name: "orphan".into(),
                line: 5,
                column: 6,
                confidence: Confidence::High,
                kind: SymbolKind::Variable,
            }],
            summary: AnalysisSummary {
                analyzed_files: 3,
                total_exports: 2,
                total_locals: 1,
                skipped_files: 0,
                duration_ms: 7,
                timestamp: chrono::Utc::now(),
                languages: BTreeMap::new(),
            },
        }
    }

    #[test]
    fn test_compact_lines() {
        let text =
            render_report(&report(), &OutputFormat::Compact, Path::new("/p"), false).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "file src/old.ts low no file imports it");
        assert_eq!(lines[1], "export deadThing src/lib.ts:3:16 function medium");
        assert_eq!(lines[2], "local orphan src/main.ts:5:6 variable high");
        assert!(lines[3].starts_with("1 unused files, 1 unused exports, 1 unused locals"));
    }

    #[test]
    fn test_table_has_sections() {
        let text = render_report(&report(), &OutputFormat::Table, Path::new("/p"), false).unwrap();
        assert!(text.contains("=== Unused files ==="));
        assert!(text.contains("=== Unused exports ==="));
        assert!(text.contains("src/lib.ts:3"));
        assert!(!text.contains("\x1b["));
    }

    #[test]
    fn test_json_is_camel_case() {
        let text = render_report(&report(), &OutputFormat::Json, Path::new("/p"), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["unusedExports"][0]["exportName"], "deadThing");
        assert_eq!(value["summary"]["analyzedFiles"], 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_json_failure_is_an_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut report = report();
        report.unused_files[0].file_path = PathBuf::from(OsStr::from_bytes(b"/p/src/\xff.ts"));
        assert!(render_report(&report, &OutputFormat::Json, Path::new("/p"), false).is_err());
    }

    #[test]
    fn test_retain_confidence() {
        let mut report = report();
        retain_confidence(&mut report, Confidence::Medium);
        assert!(report.unused_files.is_empty());
        assert_eq!(report.unused_exports.len(), 1);
        assert_eq!(report.unused_locals.len(), 1);
    }
}
