//! `deadwood-ignore` comment directives.
//!
//! A directive is the token `deadwood-ignore` inside a single-line comment
//! (`//` for TypeScript, JavaScript, Go and Java; `#` for Python):
//! - on the declaration's own line or the line directly above it, it suppresses
//!   that declaration;
//! - anywhere in the first three lines of a file, it suppresses every finding in
//!   the file.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const SUPPRESSION_TOKEN: &str = "deadwood-ignore";

/// Number of leading lines that may carry a file-level directive.
pub const FILE_DIRECTIVE_LINES: usize = 3;

/// Whether the declaration on 1-based `line` is suppressed by a directive on that
/// line or the one above it. Line numbers past the end of the text are never
/// suppressed.
pub fn is_line_suppressed(text: &str, line: usize, comment_prefix: &str) -> bool {
    if line == 0 {
        return false;
    }
    let mut previous = false;
    for (index, content) in text.lines().enumerate() {
        let current = line_has_directive(content, comment_prefix);
        if index + 1 == line {
            return current || previous;
        }
        previous = current;
    }
    false
}

/// Whether any of the first [`FILE_DIRECTIVE_LINES`] lines carries a directive.
pub fn is_file_suppressed(text: &str, comment_prefix: &str) -> bool {
    text.lines()
        .take(FILE_DIRECTIVE_LINES)
        .any(|line| line_has_directive(line, comment_prefix))
}

/// The token only counts after the comment prefix on the same line.
fn line_has_directive(line: &str, comment_prefix: &str) -> bool {
    line.find(comment_prefix)
        .is_some_and(|idx| line[idx + comment_prefix.len()..].contains(SUPPRESSION_TOKEN))
}

/// Directive positions of one file, scanned once at collection time so detectors
/// never need the file text again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directives {
    pub file_level: bool,
    /// 1-based lines carrying a directive.
    pub lines: BTreeSet<usize>,
}

impl Directives {
    pub fn scan(text: &str, comment_prefix: &str) -> Self {
        let lines: BTreeSet<usize> = text
            .lines()
            .enumerate()
            .filter(|(_, content)| line_has_directive(content, comment_prefix))
            .map(|(index, _)| index + 1)
            .collect();
        let file_level = lines.iter().any(|&l| l <= FILE_DIRECTIVE_LINES);
        Self { file_level, lines }
    }

    /// Same answer as [`is_line_suppressed`] on the scanned text.
    pub fn suppresses_line(&self, line: usize) -> bool {
        line > 0 && (self.lines.contains(&line) || self.lines.contains(&(line - 1)))
    }

    /// A finding at `line` is hidden by either a file-level or a line directive.
    pub fn suppresses(&self, line: usize) -> bool {
        self.file_level || self.suppresses_line(line)
    }
}
