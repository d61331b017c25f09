use std::path::Path;

use serde::Deserialize;
use tracing::warn;

pub const CONFIG_FILE: &str = "deadwood.toml";

/// Configuration loaded from `deadwood.toml` at the project root. Command-line
/// flags add to these lists.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DeadwoodConfig {
    /// Path patterns to leave out of the walk (beyond .gitignore and dependency dirs).
    pub exclude: Vec<String>,
    /// Entry-point globs, relative to the project root.
    pub entry: Vec<String>,
    /// Findings whose path matches one of these globs are dropped.
    pub ignore: Vec<String>,
    /// Export names a framework or runtime consumes by convention.
    pub conventional_exports: Vec<String>,
}

impl DeadwoodConfig {
    /// Load `deadwood.toml` from `root`.
    ///
    /// Returns the default (empty) configuration if the file does not exist or
    /// cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!("failed to parse {CONFIG_FILE}: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                warn!("failed to read {CONFIG_FILE}: {err}. Using defaults.");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(DeadwoodConfig::load(dir.path()), DeadwoodConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "entry = [\"src/server.ts\"]\nconventional_exports = [\"loader\", \"action\"]\n",
        )
        .unwrap();
        let config = DeadwoodConfig::load(dir.path());
        assert_eq!(config.entry, vec!["src/server.ts"]);
        assert_eq!(config.conventional_exports, vec!["loader", "action"]);
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "entry = 3\n").unwrap();
        assert_eq!(DeadwoodConfig::load(dir.path()), DeadwoodConfig::default());
    }
}
