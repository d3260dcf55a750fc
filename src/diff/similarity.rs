//! Edit-distance similarity between normalized lines.

/// Levenshtein distance over Unicode code points (unit-cost insert, delete,
/// substitute; no transposition).
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// `1 - distance / max(len(a), len(b), 1)`, lengths in code points.
pub fn similarity(a: &str, b: &str) -> f64 {
    score(levenshtein(a, b), a.chars().count(), b.chars().count())
}

/// Similarity from a known distance and the two lengths.
pub(crate) fn score(distance: usize, len_a: usize, len_b: usize) -> f64 {
    let max_len = len_a.max(len_b).max(1);
    1.0 - distance as f64 / max_len as f64
}

/// Highest similarity two lines of these lengths can reach.
///
/// The distance is at least the length difference, so any pair whose bound
/// is below the threshold can be skipped without computing the distance.
pub(crate) fn upper_bound(len_a: usize, len_b: usize) -> f64 {
    score(len_a.abs_diff(len_b), len_a, len_b)
}
