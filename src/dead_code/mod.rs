pub mod exports;
pub mod files;
pub mod heuristics;
pub mod locals;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::graph::record::SymbolKind;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// How safe it is to treat a finding as real dead code. Ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            other => Err(format!("unknown confidence level {other:?}")),
        }
    }
}

/// A file nothing imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedFile {
    pub file_path: PathBuf,
    pub confidence: Confidence,
    pub reason: String,
}

/// An exported symbol no other file consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedExport {
    pub file_path: PathBuf,
    pub export_name: String,
    pub line: usize,
    pub column: usize,
    pub confidence: Confidence,
    pub kind: SymbolKind,
}

/// A file-local symbol with no references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedLocal {
    pub file_path: PathBuf,
    pub symbol_name: String,
    pub line: usize,
    pub column: usize,
    pub confidence: Confidence,
    pub kind: SymbolKind,
}

/// Read-only inputs shared by the three detectors.
pub struct DetectionContext<'a> {
    pub graph: &'a Graph,
    /// Files whose declarations always count as used.
    pub entry_points: &'a HashSet<PathBuf>,
    /// Names an outside convention says are consumed by a framework or runtime.
    pub conventional_exports: &'a HashSet<String>,
}

impl DetectionContext<'_> {
    pub fn is_entry_point(&self, path: &Path) -> bool {
        self.entry_points.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_ordering_and_parsing() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
        assert_eq!("HIGH".parse::<Confidence>(), Ok(Confidence::High));
        assert!("certain".parse::<Confidence>().is_err());
    }

    #[test]
    fn test_findings_serialize_camel_case() {
        let finding = UnusedExport {
            file_path: PathBuf::from("/p/lib.ts"),
            export_name: "deadThing".into(),
            line: 3,
            column: 16,
            confidence: Confidence::Medium,
            kind: SymbolKind::Function,
        };
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["filePath"], "/p/lib.ts");
        assert_eq!(json["exportName"], "deadThing");
        assert_eq!(json["confidence"], "medium");
        assert_eq!(json["kind"], "function");
    }
}
