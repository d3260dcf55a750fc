//! Line normalization shared by extraction and comparison.

use unicode_normalization::UnicodeNormalization;

/// Collapse every whitespace run to a single space and trim the ends.
///
/// A byte order mark counts as whitespace too.
pub fn normalize_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(is_line_space).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

fn is_line_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Split a page block on `\n` into normalized, non-empty lines.
pub fn split_into_lines(block: &str) -> Vec<String> {
    block
        .split('\n')
        .map(normalize_line)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Key used to drop repeated lines on a page (case-insensitive).
pub fn dedup_key(line: &str) -> String {
    line.to_lowercase()
}

/// Apply NFKC so ligatures and compatibility forms compare equal.
///
/// Whitespace is re-normalized since NFKC can map some characters to spaces.
pub fn fold_compatibility(line: &str) -> String {
    let folded: String = line.nfkc().collect();
    normalize_line(&folded)
}
