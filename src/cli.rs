use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use deadwood::Confidence;

/// Find dead code in TypeScript, JavaScript, Go, Java and Python projects.
///
/// deadwood builds a cross-file usage graph of a project and reports files nothing
/// imports, exports nothing consumes, and file-local symbols nothing references.
#[derive(Parser, Debug)]
#[command(
    name = "deadwood",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug details to stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Output format for findings.
#[derive(Clone, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    /// Compact one-line-per-finding format (default).
    #[default]
    Compact,
    /// Human-readable columnar table with optional ANSI color when stdout is a terminal.
    Table,
    /// The full report as JSON, for programmatic consumption.
    Json,
}

/// Lowest confidence level to report.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum MinConfidence {
    #[default]
    Low,
    Medium,
    High,
}

impl From<MinConfidence> for Confidence {
    fn from(value: MinConfidence) -> Self {
        match value {
            MinConfidence::Low => Confidence::Low,
            MinConfidence::Medium => Confidence::Medium,
            MinConfidence::High => Confidence::High,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a project and report unused files, exports and locals.
    ///
    /// Entry points, ignore globs and conventional export names from
    /// `deadwood.toml` are combined with the ones given here.
    Analyze {
        /// Path to the project root.
        path: PathBuf,

        /// Entry-point glob relative to the project root (repeatable).
        #[arg(long = "entry", value_name = "GLOB")]
        entries: Vec<String>,

        /// Drop findings in files matching this glob (repeatable).
        #[arg(long = "ignore", value_name = "GLOB")]
        ignores: Vec<String>,

        /// Export name consumed by convention, e.g. a framework hook (repeatable).
        #[arg(long = "conventional", value_name = "NAME")]
        conventional: Vec<String>,

        /// Do not treat conventional entry files (index.ts, main.go, __main__.py,
        /// tests...) as entry points.
        #[arg(long)]
        no_default_entries: bool,

        /// Hide findings below this confidence.
        #[arg(long, value_enum, default_value_t = MinConfidence::Low)]
        min_confidence: MinConfidence,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// List the source files deadwood would analyze.
    Files {
        /// Path to the project root.
        path: PathBuf,
    },
}
