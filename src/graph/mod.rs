pub mod key;
pub mod record;
pub mod reexport;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use key::ExportKey;
use record::{FileRecord, ImportDeclaration};

/// The cross-file usage graph: which file imports which, and which exports are consumed.
///
/// Built in two passes. The first seeds one entry per file and one empty usage set per
/// declared export, so "never used" is an empty set rather than a missing key. The
/// second walks every import whose target is a project file, adds the edge in both
/// directions and marks the consumed exports (following wildcard re-exports).
///
/// Edges only ever connect files that are present in `files`.
#[derive(Debug, Default)]
pub struct Graph {
    /// Path -> per-file collection results.
    pub files: HashMap<PathBuf, FileRecord>,
    /// File -> set of files importing it.
    pub inbound_edges: HashMap<PathBuf, HashSet<PathBuf>>,
    /// File -> set of files it imports.
    pub outbound_edges: HashMap<PathBuf, HashSet<PathBuf>>,
    /// Export -> set of importing files that consume it.
    pub export_usage: HashMap<ExportKey, HashSet<PathBuf>>,
    /// Files in the order they were supplied; detectors report in this order.
    order: Vec<PathBuf>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from one batch of file records.
    pub fn build(records: Vec<FileRecord>) -> Self {
        let mut graph = Self::new();
        for record in records {
            graph.seed(record);
        }
        graph.link_all();
        debug!(
            files = graph.files.len(),
            exports = graph.export_usage.len(),
            "usage graph built"
        );
        graph
    }

    /// Pass one: register a file, its empty edge sets and its empty export usage sets.
    fn seed(&mut self, record: FileRecord) {
        let path = record.path.clone();
        for export in &record.exports {
            self.export_usage
                .entry(ExportKey::new(&path, &export.name))
                .or_default();
        }
        self.inbound_edges.entry(path.clone()).or_default();
        self.outbound_edges.entry(path.clone()).or_default();
        if self.files.insert(path.clone(), record).is_none() {
            self.order.push(path);
        }
    }

    /// Pass two: add edges and usage marks for every import of every file.
    fn link_all(&mut self) {
        let mut edges: Vec<(PathBuf, PathBuf)> = Vec::new();
        let mut marks: Vec<(ExportKey, PathBuf)> = Vec::new();

        for importer in &self.order {
            let Some(record) = self.files.get(importer) else {
                continue;
            };
            for import in &record.imports {
                let Some(target) = import.resolved_target.internal_path() else {
                    continue;
                };
                if !self.files.contains_key(target) || target == importer.as_path() {
                    continue;
                }
                edges.push((importer.clone(), target.to_path_buf()));
                self.usage_marks(importer, target, import, &mut marks);
            }
        }

        for (from, to) in edges {
            self.add_edge(from, to);
        }
        for (key, importer) in marks {
            self.export_usage.entry(key).or_default().insert(importer);
        }
    }

    /// Work out which export keys one import consumes.
    fn usage_marks(
        &self,
        importer: &Path,
        target: &Path,
        import: &ImportDeclaration,
        marks: &mut Vec<(ExportKey, PathBuf)>,
    ) {
        if import.is_namespace_import {
            // Everything the target declares or forwards with `export *` is reachable
            // through the namespace binding.
            let forwarded = reexport::wildcard_sources(self, target);
            for file in std::iter::once(target).chain(forwarded.iter().map(PathBuf::as_path)) {
                let Some(record) = self.files.get(file) else {
                    continue;
                };
                for export in &record.exports {
                    marks.push((ExportKey::new(file, &export.name), importer.to_path_buf()));
                }
            }
            return;
        }

        for specifier in &import.specifiers {
            let name = specifier.target_name();
            let direct = ExportKey::new(target, name);
            if self.export_usage.contains_key(&direct) {
                marks.push((direct, importer.to_path_buf()));
            } else if let Some(origin) = reexport::resolve_through_wildcards(self, target, name) {
                marks.push((origin, importer.to_path_buf()));
            }
        }
    }

    fn add_edge(&mut self, from: PathBuf, to: PathBuf) {
        self.inbound_edges
            .entry(to.clone())
            .or_default()
            .insert(from.clone());
        self.outbound_edges.entry(from).or_default().insert(to);
    }

    /// Union another graph into this one. Used to combine per-language graphs.
    pub fn merge(&mut self, other: Graph) {
        let Graph {
            files,
            inbound_edges,
            outbound_edges,
            export_usage,
            order,
        } = other;

        for (path, sources) in inbound_edges {
            self.inbound_edges.entry(path).or_default().extend(sources);
        }
        for (path, targets) in outbound_edges {
            self.outbound_edges.entry(path).or_default().extend(targets);
        }
        for (key, users) in export_usage {
            self.export_usage.entry(key).or_default().extend(users);
        }
        let mut files = files;
        for path in order {
            if let Some(record) = files.remove(&path)
                && self.files.insert(path.clone(), record).is_none()
            {
                self.order.push(path);
            }
        }
    }

    /// Reorder files to follow `paths` (the caller's input order). Files not named in
    /// `paths` keep their relative order and go last.
    pub fn set_file_order(&mut self, paths: &[PathBuf]) {
        let mut seen: HashSet<&Path> = HashSet::new();
        let mut ordered = Vec::with_capacity(self.order.len());
        for path in paths.iter().chain(self.order.iter()) {
            if self.files.contains_key(path) && seen.insert(path.as_path()) {
                ordered.push(path.clone());
            }
        }
        self.order = ordered;
    }

    /// Files in reporting order.
    pub fn file_order(&self) -> &[PathBuf] {
        &self.order
    }

    /// Records in reporting order.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.order.iter().filter_map(|p| self.files.get(p))
    }

    pub fn record(&self, path: &Path) -> Option<&FileRecord> {
        self.files.get(path)
    }

    /// Files importing `path`. Empty for unknown paths.
    pub fn importers_of(&self, path: &Path) -> usize {
        self.inbound_edges.get(path).map_or(0, HashSet::len)
    }

    /// Files consuming the export, or `None` if no such export was declared.
    pub fn usages(&self, key: &ExportKey) -> Option<&HashSet<PathBuf>> {
        self.export_usage.get(key)
    }

    /// Same as [`Graph::usages`] for callers holding the `"path::name"` string form.
    pub fn usages_for_key(&self, key: &str) -> Result<Option<&HashSet<PathBuf>>> {
        let key = ExportKey::parse(key)?;
        Ok(self.export_usage.get(&key))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Declared exports, not counting wildcard aggregations.
    pub fn export_count(&self) -> usize {
        self.files
            .values()
            .map(|record| record.named_exports().count())
            .sum()
    }

    pub fn local_count(&self) -> usize {
        self.files.values().map(|record| record.locals.len()).sum()
    }

    /// Every edge is recorded on both ends and only between known files.
    pub fn edges_consistent(&self) -> bool {
        let outbound_ok = self.outbound_edges.iter().all(|(from, targets)| {
            self.files.contains_key(from)
                && targets.iter().all(|to| {
                    self.files.contains_key(to)
                        && self
                            .inbound_edges
                            .get(to)
                            .is_some_and(|sources| sources.contains(from))
                })
        });
        let inbound_ok = self.inbound_edges.iter().all(|(to, sources)| {
            sources.iter().all(|from| {
                self.outbound_edges
                    .get(from)
                    .is_some_and(|targets| targets.contains(to))
            })
        });
        outbound_ok && inbound_ok
    }
}
