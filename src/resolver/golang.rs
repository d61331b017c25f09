use std::path::{Path, PathBuf};

use super::ResolutionContext;

/// Read the `module` directive from `<root>/go.mod`.
pub fn read_module_path(root: &Path) -> Option<String> {
    let content = std::fs::read_to_string(root.join("go.mod")).ok()?;
    parse_module_directive(&content)
}

pub(crate) fn parse_module_directive(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim().trim_matches('"');
        (!module.is_empty()).then(|| module.to_owned())
    })
}

/// The identifier a Go import is referred to by when it has no explicit alias:
/// the last path segment, skipping a trailing major-version segment (`/v2`).
pub fn package_qualifier(import_path: &str) -> &str {
    let mut segments = import_path.rsplit('/');
    let last = segments.next().unwrap_or(import_path);
    let is_major_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    if is_major_version {
        segments.next().unwrap_or(last)
    } else {
        last
    }
}

/// Resolve a Go import path to the non-test `.go` files of the package directory.
///
/// Paths under the root module (from `go.mod`) map straight onto directories. Without
/// a module match, a known directory whose root-relative path is a suffix of the
/// import path is accepted, which covers nested modules and repos without `go.mod`.
/// Standard library and third-party packages resolve to nothing.
pub fn resolve_package(ctx: &ResolutionContext, import_path: &str) -> Vec<PathBuf> {
    package_dir(ctx, import_path)
        .map(|dir| package_files(ctx, &dir))
        .unwrap_or_default()
}

fn package_dir(ctx: &ResolutionContext, import_path: &str) -> Option<PathBuf> {
    if let Some(module) = ctx.go_module() {
        if import_path == module {
            return Some(ctx.root().to_path_buf());
        }
        if let Some(rest) = import_path.strip_prefix(module).and_then(|r| r.strip_prefix('/')) {
            let dir = ctx.root().join(rest);
            if !ctx.files_in_dir(&dir).is_empty() {
                return Some(dir);
            }
        }
    }

    if !import_path.contains('/') {
        return None;
    }
    let mut best: Option<(usize, &PathBuf)> = None;
    for dir in ctx.known_dirs() {
        let Ok(relative) = dir.strip_prefix(ctx.root()) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        if relative.is_empty() {
            continue;
        }
        let matches = import_path == relative || import_path.ends_with(&format!("/{relative}"));
        if matches && best.is_none_or(|(len, _)| relative.len() > len) {
            best = Some((relative.len(), dir));
        }
    }
    best.map(|(_, dir)| dir.clone())
}

/// Non-test Go files directly inside `dir`.
pub fn package_files(ctx: &ResolutionContext, dir: &Path) -> Vec<PathBuf> {
    ctx.files_in_dir(dir)
        .iter()
        .filter(|p| is_go_source(p))
        .cloned()
        .collect()
}

fn is_go_source(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.ends_with(".go") && !name.ends_with("_test.go")
}
