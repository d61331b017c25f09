use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{FileMeta, ParseCache};
use crate::dead_code::exports::find_unused_exports;
use crate::dead_code::files::find_unused_files;
use crate::dead_code::locals::find_unused_locals;
use crate::dead_code::{DetectionContext, UnusedExport, UnusedFile, UnusedLocal};
use crate::error::DeadwoodError;
use crate::graph::Graph;
use crate::graph::record::FileRecord;
use crate::language::LanguageKind;
use crate::parser::{collect_file, front_end_for};
use crate::resolver::{ResolutionContext, normalize};
use crate::suppression::Directives;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Inputs of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Files to analyze. Relative paths are taken relative to `root_dir`.
    pub files: Vec<PathBuf>,
    /// Project root for module resolution.
    pub root_dir: PathBuf,
    /// Files whose declarations always count as used.
    pub entry_points: Vec<PathBuf>,
    /// Export names consumed by convention (framework hooks, runtime callbacks).
    pub conventional_export_names: Vec<String>,
    /// Glob patterns; findings whose path matches are dropped.
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub analyzed_files: usize,
    pub total_exports: usize,
    pub total_locals: usize,
    /// Files that could not be read or parsed.
    pub skipped_files: usize,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    /// Analyzed file count per language.
    pub languages: BTreeMap<LanguageKind, usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub unused_files: Vec<UnusedFile>,
    pub unused_exports: Vec<UnusedExport>,
    pub unused_locals: Vec<UnusedLocal>,
    pub summary: AnalysisSummary,
}

/// Outcome of collecting one file.
enum Collected {
    Record(FileRecord),
    /// Read but not parseable: contributes an empty record.
    Degraded(FileRecord),
    Unreadable,
}

/// One front end's collected files, linked into a graph of their own.
struct FrontEndBatch {
    graph: Graph,
    skipped: usize,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the whole pipeline: collect every file with its language's front end,
/// build and merge the per-front-end graphs, then run the three detectors.
///
/// Never fails. Unreadable files are logged and skipped, unparseable files count
/// as empty. `cache`, when given, serves TypeScript records collected by an
/// earlier run over the same file set.
pub fn analyze(request: &AnalysisRequest, cache: Option<&ParseCache>) -> AnalysisReport {
    let started = Instant::now();
    let timestamp = Utc::now();

    let root = absolute(&request.root_dir, None);
    let files = supported_files(&request.files, &root);
    if let Some(cache) = cache {
        cache.prepare(&files);
    }
    let ctx = ResolutionContext::new(root.clone(), files.iter().cloned());

    let collected: Vec<FrontEndBatch> = front_end_batches(&files)
        .par_iter()
        .map(|(front_end, paths)| collect_batch(front_end, paths, &ctx, cache))
        .collect();

    // Merge runs on this thread only, after every front end is collected.
    let mut graph = Graph::new();
    let mut skipped_files = 0;
    for batch in collected {
        skipped_files += batch.skipped;
        graph.merge(batch.graph);
    }
    graph.set_file_order(&files);

    let entry_points: HashSet<PathBuf> = request
        .entry_points
        .iter()
        .map(|p| absolute(p, Some(&root)))
        .collect();
    let conventional_exports: HashSet<String> =
        request.conventional_export_names.iter().cloned().collect();
    let detection = DetectionContext {
        graph: &graph,
        entry_points: &entry_points,
        conventional_exports: &conventional_exports,
    };

    let ignore = IgnoreSet::new(&request.ignore_patterns, &root);
    let unused_files: Vec<UnusedFile> = find_unused_files(&detection)
        .into_iter()
        .filter(|f| !ignore.matches(&f.file_path))
        .collect();
    let unused_exports: Vec<UnusedExport> = find_unused_exports(&detection)
        .into_iter()
        .filter(|e| !ignore.matches(&e.file_path))
        .collect();
    let unused_locals: Vec<UnusedLocal> = find_unused_locals(&detection)
        .into_iter()
        .filter(|l| !ignore.matches(&l.file_path))
        .collect();

    let mut languages: BTreeMap<LanguageKind, usize> = BTreeMap::new();
    for record in graph.records() {
        *languages.entry(record.language).or_default() += 1;
    }

    let summary = AnalysisSummary {
        analyzed_files: graph.file_count(),
        total_exports: graph.export_count(),
        total_locals: graph.local_count(),
        skipped_files,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        timestamp,
        languages,
    };
    info!(
        files = summary.analyzed_files,
        unused_files = unused_files.len(),
        unused_exports = unused_exports.len(),
        unused_locals = unused_locals.len(),
        skipped = skipped_files,
        elapsed_ms = summary.duration_ms,
        "analysis complete"
    );

    AnalysisReport {
        unused_files,
        unused_exports,
        unused_locals,
        summary,
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Group files by the front end that collects them, in first-seen order.
///
/// TypeScript and JavaScript share a batch: imports only link inside one batch's
/// graph, and the two import each other freely.
fn front_end_batches(files: &[PathBuf]) -> Vec<(&'static str, Vec<PathBuf>)> {
    let mut batches: Vec<(&'static str, Vec<PathBuf>)> = Vec::new();
    for file in files {
        let Some(language) = LanguageKind::from_path(file) else {
            continue;
        };
        let front_end = front_end_for(language).name();
        match batches.iter_mut().find(|(name, _)| *name == front_end) {
            Some((_, paths)) => paths.push(file.clone()),
            None => batches.push((front_end, vec![file.clone()])),
        }
    }
    batches
}

fn collect_batch(
    front_end: &str,
    paths: &[PathBuf],
    ctx: &ResolutionContext,
    cache: Option<&ParseCache>,
) -> FrontEndBatch {
    let outcomes: Vec<Collected> = paths
        .par_iter()
        .filter_map(|path| {
            LanguageKind::from_path(path).map(|language| collect_one(language, path, ctx, cache))
        })
        .collect();

    let mut records = Vec::with_capacity(outcomes.len());
    let mut skipped = 0;
    for outcome in outcomes {
        match outcome {
            Collected::Record(record) => records.push(record),
            Collected::Degraded(record) => {
                skipped += 1;
                records.push(record);
            }
            Collected::Unreadable => skipped += 1,
        }
    }
    debug!(front_end, files = records.len(), skipped, "front end collected");
    FrontEndBatch {
        graph: Graph::build(records),
        skipped,
    }
}

fn collect_one(
    language: LanguageKind,
    path: &Path,
    ctx: &ResolutionContext,
    cache: Option<&ParseCache>,
) -> Collected {
    // Only the typed front end is worth caching.
    let cache = cache.filter(|_| language == LanguageKind::TypeScript);
    let meta = cache.and_then(|_| FileMeta::of(path));
    if let (Some(cache), Some(meta)) = (cache, meta.as_ref())
        && let Some(record) = cache.get(path, meta)
    {
        return Collected::Record(record);
    }

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) => {
            let err = DeadwoodError::Read {
                path: path.to_path_buf(),
                source,
            };
            warn!("{err}, skipping");
            return Collected::Unreadable;
        }
    };

    match collect_file(&text, path, ctx) {
        Ok(record) => {
            if let (Some(cache), Some(meta)) = (cache, meta) {
                cache.insert(path.to_path_buf(), meta, record.clone());
            }
            Collected::Record(record)
        }
        Err(err) => {
            warn!("{err}, treating file as empty");
            let mut record = FileRecord::empty(path, language);
            record.directives = Directives::scan(&text, language.line_comment());
            Collected::Degraded(record)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Absolute, lexically normalized form of `path`, resolving relative paths
/// against `base` (or the working directory).
fn absolute(path: &Path, base: Option<&Path>) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }
    let base = match base {
        Some(base) => base.to_path_buf(),
        None => std::env::current_dir().unwrap_or_default(),
    };
    normalize(&base.join(path))
}

/// Input files with a supported extension, absolute, deduplicated, input order kept.
fn supported_files(files: &[PathBuf], root: &Path) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut supported = Vec::with_capacity(files.len());
    for file in files {
        let path = absolute(file, Some(root));
        if LanguageKind::from_path(&path).is_none() {
            debug!(file = %path.display(), "no front end for file, ignored");
            continue;
        }
        if seen.insert(path.clone()) {
            supported.push(path);
        }
    }
    supported
}

/// Compiled ignore globs, matched against absolute and root-relative paths.
struct IgnoreSet<'a> {
    patterns: Vec<glob::Pattern>,
    root: &'a Path,
}

impl<'a> IgnoreSet<'a> {
    fn new(patterns: &[String], root: &'a Path) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|pattern| match glob::Pattern::new(pattern) {
                Ok(compiled) => Some(compiled),
                Err(err) => {
                    warn!(%pattern, %err, "invalid ignore pattern, not applied");
                    None
                }
            })
            .collect();
        Self { patterns, root }
    }

    fn matches(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(self.root).ok();
        self.patterns.iter().any(|pattern| {
            pattern.matches_path(path) || relative.is_some_and(|rel| pattern.matches_path(rel))
        })
    }
}
