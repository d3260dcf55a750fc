//! Page-level text types.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::normalize::split_into_lines;

/// A contiguous string emitted by the decoder for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    /// Raw text content, whitespace not yet normalized
    pub text: String,

    /// Whether this run terminates a visual line
    pub end_of_line: bool,
}

impl TextRun {
    /// Create a run that continues the current line.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            end_of_line: false,
        }
    }

    /// Create a run that ends its visual line.
    pub fn eol(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            end_of_line: true,
        }
    }
}

/// Extracted text of a document, one block per page.
///
/// Each block holds the page's visual lines joined by `\n`. Index 0 is page 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    pages: Vec<String>,
}

impl PageText {
    /// Create an empty page sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// True when the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Text block for a 1-indexed page number.
    pub fn page(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .map(String::as_str)
    }

    /// Iterate over page blocks in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(String::as_str)
    }

    /// Normalized, non-empty lines of a 1-indexed page (empty if absent).
    pub fn lines(&self, number: usize) -> Vec<String> {
        self.page(number).map(split_into_lines).unwrap_or_default()
    }

    /// All pages joined with blank lines.
    pub fn plain_text(&self) -> String {
        self.pages.join("\n\n")
    }

    /// Serialize to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let result = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
    }
}

impl From<Vec<String>> for PageText {
    fn from(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

impl<'a> From<Vec<&'a str>> for PageText {
    fn from(pages: Vec<&'a str>) -> Self {
        Self {
            pages: pages.into_iter().map(str::to_string).collect(),
        }
    }
}

impl FromIterator<String> for PageText {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}
