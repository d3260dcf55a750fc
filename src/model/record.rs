//! Comparison result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a comparison a document plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRole {
    /// The newer document, whose additions are reported
    Latest,
    /// The older document used as the baseline
    Outdated,
}

impl DocumentRole {
    /// Both roles, latest first.
    pub const ALL: [DocumentRole; 2] = [DocumentRole::Latest, DocumentRole::Outdated];

    /// Display label used in progress output.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentRole::Latest => "Latest PDF",
            DocumentRole::Outdated => "Outdated PDF",
        }
    }
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRole::Latest => f.write_str("latest"),
            DocumentRole::Outdated => f.write_str("outdated"),
        }
    }
}

/// One page's summary of lines unique to the latest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferenceRecord {
    /// Page number (1-indexed)
    pub page: u32,

    /// First unique line on the page
    pub example: String,

    /// Number of unique lines on the page (always at least 1)
    pub total: usize,
}

impl DifferenceRecord {
    /// Create a new record.
    pub fn new(page: u32, example: impl Into<String>, total: usize) -> Self {
        Self {
            page,
            example: example.into(),
            total,
        }
    }
}

/// Full result of a comparison run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Pages with unique lines, in page order
    pub records: Vec<DifferenceRecord>,

    /// Number of latest pages examined
    pub pages_compared: u32,

    /// Pages that exceeded the fuzzy-matching caps and were compared exactly
    pub exact_mode_pages: Vec<u32>,
}

impl DiffReport {
    /// True when the latest document adds nothing.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of unique lines over all pages.
    pub fn total_unique_lines(&self) -> usize {
        self.records.iter().map(|r| r.total).sum()
    }
}
