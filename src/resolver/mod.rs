pub mod file_resolver;
pub mod golang;
pub mod java;
pub mod python;
pub mod workspace;

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use oxc_resolver::Resolver;
use tracing::debug;

/// Everything a front end needs to turn a raw import specifier into a project file.
///
/// Built once per analysis run from the full input file set and shared (read-only)
/// across all collection threads. The ECMAScript resolver is built lazily, so runs
/// without TypeScript or JavaScript files never touch `tsconfig.json`.
pub struct ResolutionContext {
    root: PathBuf,
    known_files: HashSet<PathBuf>,
    /// Directory -> known files directly inside it, sorted.
    by_dir: HashMap<PathBuf, Vec<PathBuf>>,
    go_module: Option<String>,
    ecmascript: OnceLock<Resolver>,
}

impl ResolutionContext {
    pub fn new(root: impl Into<PathBuf>, files: impl IntoIterator<Item = PathBuf>) -> Self {
        let root = root.into();
        let known_files: HashSet<PathBuf> = files.into_iter().collect();

        let mut by_dir: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
        for file in &known_files {
            if let Some(dir) = file.parent() {
                by_dir.entry(dir.to_path_buf()).or_default().push(file.clone());
            }
        }
        for files in by_dir.values_mut() {
            files.sort();
        }

        let go_module = golang::read_module_path(&root);
        if let Some(module) = &go_module {
            debug!(module = %module, "go module detected");
        }

        Self {
            root,
            known_files,
            by_dir,
            go_module,
            ecmascript: OnceLock::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_known(&self, path: &Path) -> bool {
        self.known_files.contains(path)
    }

    pub fn known_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.known_files.iter()
    }

    /// Known files directly inside `dir` (not recursive), sorted.
    pub fn files_in_dir(&self, dir: &Path) -> &[PathBuf] {
        self.by_dir.get(dir).map_or(&[], Vec::as_slice)
    }

    /// Known directories, in no particular order.
    pub fn known_dirs(&self) -> impl Iterator<Item = &PathBuf> {
        self.by_dir.keys()
    }

    /// Module path declared by `go.mod` at the root, if any.
    pub fn go_module(&self) -> Option<&str> {
        self.go_module.as_deref()
    }

    pub(crate) fn ecmascript_resolver(&self) -> &Resolver {
        self.ecmascript.get_or_init(|| {
            let aliases = workspace::discover_workspace_aliases(&self.root);
            file_resolver::build_resolver(&self.root, aliases)
        })
    }

    /// First candidate that is a known project file.
    pub(crate) fn first_known<I>(&self, candidates: I) -> Option<PathBuf>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        candidates
            .into_iter()
            .map(|candidate| normalize(&candidate))
            .find(|candidate| self.is_known(candidate))
    }
}

/// Lexically resolve `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_dots() {
        assert_eq!(
            normalize(Path::new("/p/src/./components/../utils.ts")),
            PathBuf::from("/p/src/utils.ts")
        );
        assert_eq!(normalize(Path::new("/p/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn test_files_in_dir_is_not_recursive() {
        let ctx = ResolutionContext::new(
            "/nonexistent-root",
            vec![
                PathBuf::from("/nonexistent-root/pkg/b.go"),
                PathBuf::from("/nonexistent-root/pkg/a.go"),
                PathBuf::from("/nonexistent-root/pkg/sub/c.go"),
            ],
        );
        assert_eq!(
            ctx.files_in_dir(Path::new("/nonexistent-root/pkg")),
            &[
                PathBuf::from("/nonexistent-root/pkg/a.go"),
                PathBuf::from("/nonexistent-root/pkg/b.go")
            ]
        );
        assert!(ctx.files_in_dir(Path::new("/elsewhere")).is_empty());
        assert!(ctx.go_module().is_none());
    }

    #[test]
    fn test_first_known_returns_earliest_candidate() {
        let ctx = ResolutionContext::new("/r", vec![PathBuf::from("/r/src/x/index.ts")]);
        let found = ctx.first_known(vec![
            PathBuf::from("/r/src/x.ts"),
            PathBuf::from("/r/src/lib/../x/index.ts"),
        ]);
        assert_eq!(found, Some(PathBuf::from("/r/src/x/index.ts")));
    }
}
