use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{DeadwoodError, Result};

/// Separator between the file path and the export name in the string form of a key.
pub const KEY_SEPARATOR: &str = "::";

/// Identifies one export: `(file, name)`.
///
/// Kept structured so that paths containing `::` (or names that do) can never be
/// confused. The string form `"<path>::<name>"` exists for output and for callers
/// that carry keys around as text; it splits at the *first* separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExportKey {
    pub file: PathBuf,
    pub name: String,
}

impl ExportKey {
    pub fn new(file: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
        }
    }

    /// Build the string form of a key without allocating a structured key first.
    pub fn make(file: &Path, name: &str) -> String {
        format!("{}{KEY_SEPARATOR}{name}", file.display())
    }

    /// Split a string key at the first `::`.
    pub fn parse(key: &str) -> Result<Self> {
        let (file, name) = key
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| DeadwoodError::MalformedKey(key.to_owned()))?;
        Ok(Self::new(file, name))
    }
}

impl fmt::Display for ExportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.file.display(), self.name)
    }
}

impl FromStr for ExportKey {
    type Err = DeadwoodError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
