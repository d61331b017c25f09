use std::path::{Path, PathBuf};

use super::ResolutionContext;

/// The directory a file's package path hangs off: the file's directory with the
/// package segments stripped from its end. `None` when the directory layout does
/// not match the declared package.
pub fn source_root(file: &Path, package: Option<&str>) -> Option<PathBuf> {
    let mut dir = file.parent()?.to_path_buf();
    let Some(package) = package else {
        return Some(dir);
    };
    for segment in package.rsplit('.') {
        if dir.file_name().and_then(|n| n.to_str()) != Some(segment) {
            return None;
        }
        dir.pop();
    }
    Some(dir)
}

/// Resolve a fully-qualified type name to a file.
///
/// Tries `a/b/C.java` under `source_root`, then shorter prefixes so nested types
/// (`a.b.C.Inner`) land on their outer file. Falls back to any known file whose
/// path ends with the same relative path, which handles multi-module layouts.
pub fn resolve_type(
    ctx: &ResolutionContext,
    source_root: Option<&Path>,
    qualified: &str,
) -> Option<PathBuf> {
    let segments: Vec<&str> = qualified.split('.').collect();
    for len in (1..=segments.len()).rev() {
        let relative = format!("{}.java", segments[..len].join("/"));
        if let Some(root) = source_root {
            let candidate = root.join(&relative);
            if ctx.is_known(&candidate) {
                return Some(candidate);
            }
        }
        if len >= 2
            && let Some(found) = find_by_suffix(ctx, &relative)
        {
            return Some(found);
        }
    }
    None
}

/// Every known `.java` file in a package directory.
pub fn package_files(
    ctx: &ResolutionContext,
    source_root: Option<&Path>,
    package: &str,
) -> Vec<PathBuf> {
    let relative: PathBuf = package.split('.').collect();
    let dir = match source_root {
        Some(root) if !ctx.files_in_dir(&root.join(&relative)).is_empty() => root.join(&relative),
        _ => {
            let suffix = relative.to_string_lossy().replace('\\', "/");
            let Some(dir) = ctx
                .known_dirs()
                .filter(|d| d.to_string_lossy().replace('\\', "/").ends_with(&format!("/{suffix}")))
                .min()
            else {
                return Vec::new();
            };
            dir.clone()
        }
    };
    ctx.files_in_dir(&dir)
        .iter()
        .filter(|p| p.extension().is_some_and(|e| e == "java"))
        .cloned()
        .collect()
}

fn find_by_suffix(ctx: &ResolutionContext, relative: &str) -> Option<PathBuf> {
    let suffix = format!("/{relative}");
    ctx.known_files()
        .filter(|p| p.to_string_lossy().replace('\\', "/").ends_with(&suffix))
        .min()
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_root_strips_package() {
        let file = Path::new("/p/src/main/java/com/example/util/StringHelper.java");
        assert_eq!(
            source_root(file, Some("com.example.util")),
            Some(PathBuf::from("/p/src/main/java"))
        );
        assert_eq!(source_root(file, Some("org.other")), None);
        assert_eq!(
            source_root(file, None),
            Some(PathBuf::from("/p/src/main/java/com/example/util"))
        );
    }

    #[test]
    fn test_resolve_type_and_nested_type() {
        let helper = PathBuf::from("/p/src/com/example/util/StringHelper.java");
        let ctx = ResolutionContext::new("/p", vec![helper.clone()]);
        let root = Path::new("/p/src");

        assert_eq!(
            resolve_type(&ctx, Some(root), "com.example.util.StringHelper"),
            Some(helper.clone())
        );
        assert_eq!(
            resolve_type(&ctx, Some(root), "com.example.util.StringHelper.Inner"),
            Some(helper.clone())
        );
        // Different module root: suffix match.
        assert_eq!(
            resolve_type(&ctx, Some(Path::new("/p/other/src")), "com.example.util.StringHelper"),
            Some(helper)
        );
        assert_eq!(resolve_type(&ctx, Some(root), "java.util.List"), None);
    }

    #[test]
    fn test_package_files() {
        let a = PathBuf::from("/p/src/com/x/A.java");
        let b = PathBuf::from("/p/src/com/x/B.java");
        let c = PathBuf::from("/p/src/com/y/C.java");
        let ctx = ResolutionContext::new("/p", vec![b.clone(), a.clone(), c]);
        assert_eq!(
            package_files(&ctx, Some(Path::new("/p/src")), "com.x"),
            vec![a.clone(), b.clone()]
        );
        assert_eq!(package_files(&ctx, None, "com.x"), vec![a, b]);
        assert!(package_files(&ctx, None, "java.util").is_empty());
    }
}
