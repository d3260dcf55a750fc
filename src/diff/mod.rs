//! Difference engine: which lines of the latest document are new.

mod engine;
mod similarity;

pub use engine::DiffEngine;
pub use similarity::{levenshtein, similarity};

use crate::model::{DifferenceRecord, PageText};

/// Compare two documents with default options.
///
/// Pure and deterministic: the same inputs always give the same records.
pub fn diff(latest: &PageText, outdated: &PageText) -> Vec<DifferenceRecord> {
    DiffEngine::default().diff(latest, outdated)
}
