mod cli;
mod config;
mod output;
mod walker;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};

use cli::{Cli, Commands};
use config::DeadwoodConfig;
use deadwood::{AnalysisRequest, LanguageKind, ParseCache, analyze};
use walker::walk_project;

/// Entry files recognised without configuration, relative to the project root.
const DEFAULT_ENTRY_PATTERNS: &[&str] = &[
    "index.ts",
    "index.tsx",
    "index.js",
    "index.jsx",
    "main.ts",
    "main.js",
    "src/index.ts",
    "src/index.tsx",
    "src/index.js",
    "src/index.jsx",
    "src/main.ts",
    "src/main.js",
    "**/main.go",
    "**/__main__.py",
    "**/main.py",
    "**/manage.py",
    "**/setup.py",
    "**/conftest.py",
    "**/Main.java",
    "**/Application.java",
];

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Analyze {
            path,
            entries,
            ignores,
            conventional,
            no_default_entries,
            min_confidence,
            format,
        } => {
            let root = canonical_root(&path)?;
            let config = DeadwoodConfig::load(&root);
            let files = walk_project(&root, &config)?;

            let mut patterns: Vec<String> =
                config.entry.iter().chain(entries.iter()).cloned().collect();
            if !no_default_entries {
                patterns.extend(DEFAULT_ENTRY_PATTERNS.iter().map(|p| p.to_string()));
            }
            let entry_points = expand_entries(&files, &root, &patterns, !no_default_entries);
            debug!(count = entry_points.len(), "entry points");

            let request = AnalysisRequest {
                files,
                root_dir: root.clone(),
                entry_points,
                conventional_export_names: config
                    .conventional_exports
                    .into_iter()
                    .chain(conventional)
                    .collect(),
                ignore_patterns: config.ignore.into_iter().chain(ignores).collect(),
            };

            let cache = ParseCache::new();
            let mut report = analyze(&request, Some(&cache));
            output::retain_confidence(&mut report, min_confidence.into());

            let use_color = std::io::stdout().is_terminal();
            print!("{}", output::render_report(&report, &format, &root, use_color)?);
            if matches!(format, cli::OutputFormat::Json) {
                println!();
            }
        }
        Commands::Files { path } => {
            let root = canonical_root(&path)?;
            let config = DeadwoodConfig::load(&root);
            for file in walk_project(&root, &config)? {
                println!("{}", file.strip_prefix(&root).unwrap_or(&file).display());
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn canonical_root(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("cannot open project root {}", path.display()))
}

/// Select the walked files matching any entry glob (relative to `root`), plus test
/// files when `include_tests` is set.
fn expand_entries(
    files: &[PathBuf],
    root: &Path,
    patterns: &[String],
    include_tests: bool,
) -> Vec<PathBuf> {
    let compiled: Vec<glob::Pattern> = patterns
        .iter()
        .filter_map(|pattern| match glob::Pattern::new(pattern) {
            Ok(p) => Some(p),
            Err(err) => {
                warn!(%pattern, %err, "invalid entry pattern, not applied");
                None
            }
        })
        .collect();

    files
        .iter()
        .filter(|file| {
            let relative = file.strip_prefix(root).unwrap_or(file);
            let is_test = include_tests
                && LanguageKind::from_path(file).is_some_and(|lang| lang.is_test_path(relative));
            compiled.iter().any(|p| p.matches_path(relative)) || is_test
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        DEFAULT_ENTRY_PATTERNS.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_default_entries() {
        let root = Path::new("/p");
        let files: Vec<PathBuf> = [
            "/p/src/index.ts",
            "/p/src/lib/index.ts",
            "/p/cmd/server/main.go",
            "/p/pkg/util.go",
            "/p/pkg/util_test.go",
            "/p/app/__main__.py",
            "/p/tests/test_api.py",
            "/p/src/com/x/Main.java",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        let entries = expand_entries(&files, root, &defaults(), true);
        let names: Vec<&str> = entries.iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(
            names,
            vec![
                "/p/src/index.ts",
                "/p/cmd/server/main.go",
                "/p/pkg/util_test.go",
                "/p/app/__main__.py",
                "/p/tests/test_api.py",
                "/p/src/com/x/Main.java",
            ]
        );
    }

    #[test]
    fn test_explicit_entries_only() {
        let root = Path::new("/p");
        let files = vec![PathBuf::from("/p/src/server.ts"), PathBuf::from("/p/src/app.test.ts")];
        let entries = expand_entries(&files, root, &["src/server.ts".to_string()], false);
        assert_eq!(entries, vec![PathBuf::from("/p/src/server.ts")]);
    }
}
