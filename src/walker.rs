use std::path::{Path, PathBuf};

use anyhow::bail;
use tracing::{debug, warn};

use crate::config::DeadwoodConfig;
use deadwood::LanguageKind;

/// Directory names never walked: installed dependencies, virtualenvs, bytecode caches.
const EXCLUDED_DIRS: &[&str] = &["node_modules", "vendor", "__pycache__", ".venv", "venv", ".git"];

/// Walk a project directory and collect every file a front end understands.
///
/// Respects `.gitignore` rules, prunes [`EXCLUDED_DIRS`] and applies any extra
/// exclusions from `config.exclude`. The result is sorted so runs are
/// reproducible regardless of directory iteration order.
pub fn walk_project(root: &Path, config: &DeadwoodConfig) -> anyhow::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let exclude: Vec<glob::Pattern> = config
        .exclude
        .iter()
        .filter_map(|pattern| match glob::Pattern::new(pattern) {
            Ok(compiled) => Some(compiled),
            Err(err) => {
                warn!(%pattern, %err, "invalid exclude pattern, not applied");
                None
            }
        })
        .collect();

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        // Read .gitignore files even when the directory is not inside a git repository.
        .require_git(false)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            let excluded = entry
                .file_name()
                .to_str()
                .is_some_and(|name| EXCLUDED_DIRS.contains(&name));
            !(is_dir && excluded)
        })
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };
        if entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }

        let path = entry.path();
        if LanguageKind::from_path(path).is_none() || is_excluded(path, root, &exclude) {
            continue;
        }
        debug!(file = %path.display(), "discovered");
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// True if `path`, its root-relative form, or any single component below the root
/// matches an exclusion pattern.
fn is_excluded(path: &Path, root: &Path, patterns: &[glob::Pattern]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    patterns.iter().any(|pattern| {
        pattern.matches_path(path)
            || pattern.matches_path(relative)
            || relative
                .components()
                .any(|c| c.as_os_str().to_str().is_some_and(|s| pattern.matches(s)))
    })
}
