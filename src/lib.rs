//! # pdfdiff
//!
//! Find the text a newer PDF adds over an older one.
//!
//! Both documents are reduced to per-page blocks of visual lines. Every line
//! of the latest document is then matched against the outdated page with the
//! same number using normalized edit-distance similarity; lines without a
//! close enough counterpart are reported, grouped by page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfdiff::{compare_bytes, report};
//!
//! fn main() -> pdfdiff::Result<()> {
//!     let latest = std::fs::read("contract-v2.pdf")?;
//!     let outdated = std::fs::read("contract-v1.pdf")?;
//!
//!     let records = compare_bytes(&latest, &outdated)?;
//!     print!("{}", report::to_text(&records, chrono::Utc::now()));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Fuzzy line matching**: edits below the similarity threshold (0.94 by
//!   default) are not reported
//! - **One-to-one pairing**: repeated lines are matched as a multiset
//! - **Exact-mode fallback**: oversized pages skip fuzzy matching
//! - **Parallel extraction**: Rayon over pages and over both documents
//! - **Pluggable decoders**: lopdf by default, any [`DecodeEngine`] otherwise

pub mod backend;
pub mod compare;
pub mod detect;
pub mod diff;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod options;
pub mod progress;
pub mod report;

// Re-export commonly used types
pub use backend::{DecodeEngine, EngineRegistry, LopdfEngine, TextLayer};
pub use compare::{Comparator, ComparisonStatus};
pub use detect::{is_pdf_bytes, sniff_header, PdfHeader};
pub use diff::{diff, similarity, DiffEngine};
pub use error::{Error, Result};
pub use extract::{fold_runs_into_lines, TextExtractor};
pub use model::{DiffReport, DifferenceRecord, DocumentRole, PageText, TextRun};
pub use options::{DiffOptions, ErrorMode, ExtractOptions};
pub use progress::{ExtractProgress, ProgressTracker};
pub use report::JsonFormat;

use std::path::Path;

/// Extract per-page text from PDF bytes.
///
/// # Example
///
/// ```no_run
/// use pdfdiff::extract_bytes;
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let pages = extract_bytes(&data).unwrap();
/// println!("Pages: {}", pages.page_count());
/// ```
pub fn extract_bytes(data: &[u8]) -> Result<PageText> {
    TextExtractor::lopdf().extract(data, &|_| {})
}

/// Extract per-page text from a PDF file.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<PageText> {
    let data = std::fs::read(path)?;
    extract_bytes(&data)
}

/// Compare two PDFs held in memory with default options.
///
/// Returns one record per latest page that has text the outdated document
/// lacks.
pub fn compare_bytes(latest: &[u8], outdated: &[u8]) -> Result<Vec<DifferenceRecord>> {
    let report = Comparator::lopdf().compare_bytes(latest, outdated, &|_, _| {})?;
    Ok(report.records)
}

/// Compare two PDF files with default options.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> pdfdiff::Result<()> {
/// let records = pdfdiff::compare_files("v2.pdf", "v1.pdf").await?;
/// println!("{} pages changed", records.len());
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "async")]
pub async fn compare_files<P, Q>(latest: P, outdated: Q) -> Result<Vec<DifferenceRecord>>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let on_progress = std::sync::Arc::new(|_: DocumentRole, _: ExtractProgress| {});
    let report = Comparator::lopdf()
        .compare_files(latest, outdated, on_progress)
        .await?;
    Ok(report.records)
}
