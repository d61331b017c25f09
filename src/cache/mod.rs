use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::graph::record::FileRecord;

/// Staleness stamp for a cached file: mtime (nanoseconds since epoch) + file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub mtime_nanos: u128,
    pub size: u64,
}

impl FileMeta {
    /// Current filesystem metadata for `path`, or `None` when it cannot be read.
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        let mtime_nanos = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Some(Self {
            mtime_nanos,
            size: metadata.len(),
        })
    }
}

#[derive(Debug)]
struct CachedRecord {
    meta: FileMeta,
    record: FileRecord,
}

/// Process-scoped cache of TypeScript file records for repeated runs over the
/// same project.
///
/// Entries are only valid for the exact file set they were collected against,
/// because import resolution depends on which files exist. [`ParseCache::prepare`]
/// drops everything when the set changes; a changed file is re-collected when its
/// [`FileMeta`] no longer matches.
#[derive(Debug, Default)]
pub struct ParseCache {
    file_set: Mutex<Vec<PathBuf>>,
    entries: DashMap<PathBuf, CachedRecord>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key the cache to `files`. Returns `true` when existing entries were kept.
    pub fn prepare(&self, files: &[PathBuf]) -> bool {
        let mut key = files.to_vec();
        key.sort();
        key.dedup();

        let mut current = self.file_set.lock();
        if *current == key {
            return true;
        }
        if !self.entries.is_empty() {
            debug!(entries = self.entries.len(), "file set changed, parse cache cleared");
        }
        self.entries.clear();
        *current = key;
        false
    }

    /// The cached record for `path` if it was collected from a file with `meta`.
    pub fn get(&self, path: &Path, meta: &FileMeta) -> Option<FileRecord> {
        let entry = self.entries.get(path)?;
        (entry.meta == *meta).then(|| entry.record.clone())
    }

    pub fn insert(&self, path: PathBuf, meta: FileMeta, record: FileRecord) {
        self.entries.insert(path, CachedRecord { meta, record });
    }

    /// Drop every entry and forget the file set.
    pub fn clear(&self) {
        self.entries.clear();
        self.file_set.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
