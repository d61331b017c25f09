use std::path::{Path, PathBuf};

use oxc_resolver::{
    AliasValue, ResolveError, ResolveOptions, Resolver, TsconfigOptions, TsconfigReferences,
};
use tracing::trace;

use super::ResolutionContext;
use crate::graph::record::ImportTarget;

/// Extensions tried for extensionless relative specifiers, TypeScript first.
const SOURCE_EXTENSIONS: [&str; 8] = [".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs"];

const INDEX_FILES: [&str; 4] = ["index.ts", "index.tsx", "index.js", "index.jsx"];

/// Build an `oxc_resolver::Resolver` for TypeScript and JavaScript sources.
///
/// `tsconfig.json` at the root (when present) contributes `paths` aliases and
/// project references; `.js` specifiers written in TypeScript sources map back to
/// `.ts`/`.tsx`. Workspace package names resolve to local source directories.
pub fn build_resolver(
    project_root: &Path,
    workspace_aliases: Vec<(String, Vec<AliasValue>)>,
) -> Resolver {
    let tsconfig_path = project_root.join("tsconfig.json");
    let tsconfig = tsconfig_path.exists().then(|| TsconfigOptions {
        config_file: tsconfig_path,
        references: TsconfigReferences::Auto,
    });

    Resolver::new(ResolveOptions {
        extensions: SOURCE_EXTENSIONS
            .iter()
            .map(|ext| (*ext).to_owned())
            .chain([".json".to_owned()])
            .collect(),
        extension_alias: vec![
            (".js".into(), vec![".ts".into(), ".tsx".into(), ".js".into()]),
            (".mjs".into(), vec![".mts".into(), ".mjs".into()]),
            (".cjs".into(), vec![".cts".into(), ".cjs".into()]),
        ],
        tsconfig,
        alias: workspace_aliases,
        condition_names: vec!["node".into(), "import".into(), "require".into()],
        builtin_modules: true,
        ..ResolveOptions::default()
    })
}

/// Resolve one ECMAScript module specifier as seen from `from_file`.
///
/// A result only counts as internal when it lands on a file in the analysed set;
/// packages under `node_modules`, builtins and unresolvable specifiers are external.
/// When the resolver gives up on a relative specifier, extension and `index`
/// probing against the known file set is tried before giving up.
pub fn resolve_specifier(
    ctx: &ResolutionContext,
    from_file: &Path,
    specifier: &str,
) -> ImportTarget {
    let Some(dir) = from_file.parent() else {
        return ImportTarget::External(specifier.to_owned());
    };

    match ctx.ecmascript_resolver().resolve(dir, specifier) {
        Ok(resolution) => {
            let path = resolution.into_path_buf();
            if ctx.is_known(&path) {
                return ImportTarget::Internal(path);
            }
            trace!(
                from = %from_file.display(),
                specifier,
                resolved = %path.display(),
                "resolved outside the analysed file set"
            );
        }
        Err(ResolveError::Builtin { resolved, .. }) => return ImportTarget::External(resolved),
        Err(err) => trace!(from = %from_file.display(), specifier, %err, "resolver miss"),
    }

    relative_candidate(ctx, dir, specifier)
        .map(ImportTarget::Internal)
        .unwrap_or_else(|| ImportTarget::External(specifier.to_owned()))
}

/// Extension and directory-index probing for `./` and `../` specifiers.
fn relative_candidate(
    ctx: &ResolutionContext,
    from_dir: &Path,
    specifier: &str,
) -> Option<PathBuf> {
    if !specifier.starts_with('.') {
        return None;
    }
    let base = from_dir.join(specifier);
    let base_str = base.to_string_lossy().into_owned();

    let mut candidates = vec![base.clone()];
    // TypeScript ESM sources import `./x.js` while the file on disk is `./x.ts`.
    let stem = [".js", ".jsx", ".mjs", ".cjs"]
        .iter()
        .find_map(|ext| base_str.strip_suffix(ext))
        .unwrap_or(&base_str);
    candidates.extend(SOURCE_EXTENSIONS.iter().map(|ext| PathBuf::from(format!("{stem}{ext}"))));
    candidates.extend(INDEX_FILES.iter().map(|index| base.join(index)));

    ctx.first_known(candidates)
}
