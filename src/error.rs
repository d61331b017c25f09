use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the analysis engine.
///
/// Everything except [`DeadwoodError::MalformedKey`] is recovered per file by the
/// orchestrator: the file is logged, skipped, and the run continues.
#[derive(Debug, Error)]
pub enum DeadwoodError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported source file: {0}")]
    UnsupportedFile(PathBuf),

    #[error("tree-sitter could not parse {0}")]
    Parse(PathBuf),

    #[error("failed to load {language} grammar: {message}")]
    Grammar {
        language: &'static str,
        message: String,
    },

    /// A composite export key without the `::` separator. This is a caller bug.
    #[error("malformed export key {0:?}: missing \"::\" separator")]
    MalformedKey(String),
}

pub type Result<T> = std::result::Result<T, DeadwoodError>;
