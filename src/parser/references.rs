use std::collections::HashMap;

use tree_sitter::Node;

use super::{node_text, walk_tree};

/// How often each identifier occurs in a file (or a set of files).
///
/// Reference counts for file-local symbols are derived from these: occurrences of
/// the name minus the occurrences that are its own declarations.
#[derive(Debug, Default, Clone)]
pub struct IdentifierCounts {
    counts: HashMap<String, usize>,
}

impl IdentifierCounts {
    /// Count the text of every node whose kind is in `kinds`.
    pub fn from_tree(root: Node<'_>, source: &[u8], kinds: &[&str]) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        walk_tree(root, |node| {
            if kinds.contains(&node.kind()) {
                *counts.entry(node_text(node, source).to_owned()).or_default() += 1;
            }
        });
        Self { counts }
    }

    /// Count identifier tokens in C-family source text, skipping `//` and `/* */`
    /// comments and `"`, `'` and `` ` `` literals. Used for sibling files that are
    /// not worth a full parse.
    pub fn from_text(text: &str) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            match b {
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    i = find_from(bytes, i + 2, b"\n").unwrap_or(bytes.len());
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i = find_from(bytes, i + 2, b"*/").map_or(bytes.len(), |end| end + 2);
                }
                b'"' | b'\'' | b'`' => {
                    i = skip_literal(bytes, i, b);
                }
                _ if b == b'_' || b.is_ascii_alphabetic() => {
                    let start = i;
                    while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric())
                    {
                        i += 1;
                    }
                    *counts.entry(text[start..i].to_owned()).or_default() += 1;
                }
                _ if b.is_ascii_digit() => {
                    // Skip numeric literals whole so `0x1F` does not yield `x1F`.
                    while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric())
                    {
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }
        Self { counts }
    }

    pub fn get(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn add(&mut self, other: &IdentifierCounts) {
        for (name, count) in &other.counts {
            *self.counts.entry(name.clone()).or_default() += count;
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Occurrences of `name` that are not one of its `declarations`.
    pub fn references(&self, name: &str, declarations: usize) -> usize {
        self.get(name).saturating_sub(declarations)
    }
}

fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Index just past the literal opened at `start`. Backtick literals are raw.
fn skip_literal(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quote != b'`' => i += 2,
            b'\n' if quote != b'`' => return i + 1,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}
