use std::path::{Path, PathBuf};

use super::ResolutionContext;

/// Resolve a Python module name (`"models.user"`, `".helpers"`, `"..core"`) imported
/// from `from_file` to a project file.
///
/// Relative names climb one directory per extra leading dot. Absolute names are
/// tried against the project root, `<root>/src`, the importing file's directory and
/// then each ancestor directory up to the root. Each base tries `x/y.py`, `x/y.pyi`
/// and `x/y/__init__.py`.
pub fn resolve_module(ctx: &ResolutionContext, from_file: &Path, module: &str) -> Option<PathBuf> {
    let dots = module.chars().take_while(|c| *c == '.').count();
    let name = &module[dots..];
    let from_dir = from_file.parent()?;

    if dots > 0 {
        let mut base = from_dir.to_path_buf();
        for _ in 1..dots {
            if !base.pop() {
                return None;
            }
        }
        return ctx.first_known(module_candidates(&base, name));
    }

    if name.is_empty() {
        return None;
    }
    search_bases(ctx.root(), from_dir)
        .into_iter()
        .find_map(|base| ctx.first_known(module_candidates(&base, name)))
}

fn search_bases(root: &Path, from_dir: &Path) -> Vec<PathBuf> {
    let mut bases = vec![root.to_path_buf(), root.join("src"), from_dir.to_path_buf()];
    let mut dir = from_dir.parent();
    while let Some(current) = dir {
        if !current.starts_with(root) || current == root {
            break;
        }
        bases.push(current.to_path_buf());
        dir = current.parent();
    }
    bases.dedup();
    bases
}

fn module_candidates(base: &Path, dotted: &str) -> Vec<PathBuf> {
    if dotted.is_empty() {
        return vec![base.join("__init__.py")];
    }
    let relative: PathBuf = dotted.split('.').collect();
    let module = base.join(&relative);
    vec![
        module.with_extension("py"),
        module.with_extension("pyi"),
        module.join("__init__.py"),
    ]
}

/// Whether `path` is a package initializer.
pub fn is_package_init(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == "__init__.py")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(files: &[&str]) -> ResolutionContext {
        ResolutionContext::new("/p", files.iter().map(PathBuf::from))
    }

    #[test]
    fn test_absolute_module_from_root() {
        let ctx = ctx(&["/p/main.py", "/p/utils/helpers.py", "/p/models/__init__.py"]);
        assert_eq!(
            resolve_module(&ctx, Path::new("/p/main.py"), "utils.helpers"),
            Some(PathBuf::from("/p/utils/helpers.py"))
        );
        assert_eq!(
            resolve_module(&ctx, Path::new("/p/main.py"), "models"),
            Some(PathBuf::from("/p/models/__init__.py"))
        );
        assert_eq!(resolve_module(&ctx, Path::new("/p/main.py"), "os.path"), None);
    }

    #[test]
    fn test_relative_modules() {
        let ctx = ctx(&["/p/models/__init__.py", "/p/models/user.py", "/p/core.py"]);
        let init = Path::new("/p/models/__init__.py");
        assert_eq!(
            resolve_module(&ctx, init, ".user"),
            Some(PathBuf::from("/p/models/user.py"))
        );
        assert_eq!(
            resolve_module(&ctx, Path::new("/p/models/user.py"), "."),
            Some(PathBuf::from("/p/models/__init__.py"))
        );
        assert_eq!(
            resolve_module(&ctx, Path::new("/p/models/user.py"), "..core"),
            Some(PathBuf::from("/p/core.py"))
        );
    }

    #[test]
    fn test_src_layout_and_sibling() {
        let ctx = ctx(&["/p/src/app/service.py", "/p/src/app/config.py"]);
        assert_eq!(
            resolve_module(&ctx, Path::new("/p/src/app/service.py"), "app.config"),
            Some(PathBuf::from("/p/src/app/config.py"))
        );
        assert_eq!(
            resolve_module(&ctx, Path::new("/p/src/app/service.py"), "config"),
            Some(PathBuf::from("/p/src/app/config.py"))
        );
    }
}
