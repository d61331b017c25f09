use std::path::{Path, PathBuf};

use oxc_resolver::AliasValue;
use tracing::debug;

/// Map npm/yarn/pnpm workspace package names to their local source directories,
/// in the alias format `oxc_resolver` expects.
///
/// A package resolves to `<pkg>/src` when that exists, otherwise to `<pkg>`.
/// Returns an empty list for projects that are not workspaces.
pub fn discover_workspace_aliases(root: &Path) -> Vec<(String, Vec<AliasValue>)> {
    let mut aliases = Vec::new();
    for pattern in workspace_globs(root) {
        let manifest_glob = format!("{}/{}/package.json", root.display(), pattern);
        let Ok(manifests) = glob::glob(&manifest_glob) else {
            continue;
        };
        for manifest in manifests.flatten() {
            if let Some((name, dir)) = package_source_dir(&manifest) {
                debug!(package = %name, dir = %dir.display(), "workspace package");
                aliases.push((name, vec![AliasValue::Path(dir.to_string_lossy().into_owned())]));
            }
        }
    }
    aliases
}

fn package_source_dir(manifest: &Path) -> Option<(String, PathBuf)> {
    let package_dir = manifest.parent()?;
    let content = std::fs::read_to_string(manifest).ok()?;
    let json: serde_json::Value = serde_json::from_str(&content).ok()?;
    let name = json.get("name")?.as_str()?.to_owned();
    let src = package_dir.join("src");
    let dir = if src.is_dir() { src } else { package_dir.to_path_buf() };
    Some((name, dir))
}

/// Workspace globs from `pnpm-workspace.yaml`, else from `package.json#workspaces`
/// (either the array form or the `{ "packages": [...] }` form).
fn workspace_globs(root: &Path) -> Vec<String> {
    if let Ok(content) = std::fs::read_to_string(root.join("pnpm-workspace.yaml")) {
        return pnpm_packages(&content);
    }
    let Ok(content) = std::fs::read_to_string(root.join("package.json")) else {
        return Vec::new();
    };
    let Ok(json) = serde_json::from_str::<serde_json::Value>(&content) else {
        return Vec::new();
    };
    let workspaces = &json["workspaces"];
    let list = workspaces
        .as_array()
        .or_else(|| workspaces["packages"].as_array());
    list.map(|items| {
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect()
    })
    .unwrap_or_default()
}

/// Read the `packages:` list of a pnpm workspace file. Only the flat list form is
/// understood; anything after the next top-level key is ignored.
pub(crate) fn pnpm_packages(content: &str) -> Vec<String> {
    content
        .lines()
        .skip_while(|line| line.trim_end() != "packages:")
        .skip(1)
        .take_while(|line| line.trim().is_empty() || line.starts_with(' ') || line.starts_with('-'))
        .filter_map(|line| line.trim().strip_prefix('-'))
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_owned())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pnpm_packages_quote_styles() {
        let yaml = "packages:\n  - 'packages/*'\n  - \"apps/*\"\n  - tools/*\n";
        assert_eq!(pnpm_packages(yaml), vec!["packages/*", "apps/*", "tools/*"]);
    }

    #[test]
    fn test_pnpm_packages_stops_at_next_key() {
        let yaml = "packages:\n  - 'packages/*'\ncatalog:\n  - react\n";
        assert_eq!(pnpm_packages(yaml), vec!["packages/*"]);
    }

    #[test]
    fn test_pnpm_packages_missing_key() {
        assert!(pnpm_packages("catalog:\n  react: ^18\n").is_empty());
    }

    #[test]
    fn test_discover_workspace_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(
            root.join("package.json"),
            r#"{ "name": "root", "workspaces": ["packages/*"] }"#,
        )
        .unwrap();
        let pkg = root.join("packages/ui");
        std::fs::create_dir_all(pkg.join("src")).unwrap();
        std::fs::write(pkg.join("package.json"), r#"{ "name": "@acme/ui" }"#).unwrap();

        let aliases = discover_workspace_aliases(root);
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].0, "@acme/ui");
        match &aliases[0].1[0] {
            AliasValue::Path(p) => assert!(p.ends_with("packages/ui/src")),
            other => panic!("expected a path alias, got {other:?}"),
        }
    }
}
