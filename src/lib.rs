//! deadwood: finds unused files, unused exports and unused file-local symbols in
//! TypeScript, JavaScript, Go, Java and Python projects.
//!
//! Every file is collected by its language's front end into a [`FileRecord`], the
//! records become one cross-file usage [`Graph`], and three detectors read the
//! finished graph. [`analyze`] runs the whole pipeline.

pub mod analyzer;
pub mod cache;
pub mod dead_code;
pub mod error;
pub mod graph;
pub mod language;
pub mod parser;
pub mod resolver;
pub mod suppression;

pub use analyzer::{AnalysisReport, AnalysisRequest, AnalysisSummary, analyze};
pub use cache::ParseCache;
pub use dead_code::{Confidence, UnusedExport, UnusedFile, UnusedLocal};
pub use error::{DeadwoodError, Result};
pub use graph::Graph;
pub use graph::key::ExportKey;
pub use graph::record::FileRecord;
pub use language::LanguageKind;
