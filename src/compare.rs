//! Comparison orchestration: extract both documents, then diff them.

use std::fmt;
use std::sync::Arc;

use crate::backend::DecodeEngine;
use crate::diff::DiffEngine;
use crate::error::{Error, Result};
use crate::extract::TextExtractor;
use crate::model::{DiffReport, DocumentRole, PageText};
use crate::options::{DiffOptions, ExtractOptions};
use crate::progress::ComparisonProgressFn;

#[cfg(feature = "async")]
use crate::progress::{ExtractProgress, ProgressFn};

/// Where a comparison currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonStatus {
    /// No documents yet
    Waiting,
    /// Extracting text from both documents
    Extracting,
    /// Running the difference engine
    Diffing,
    /// Finished with at least one record
    Ready,
    /// Finished with no records
    NoDifferences,
    /// Extraction or engine failure
    Failed,
}

impl ComparisonStatus {
    /// Final status for a finished comparison.
    pub fn finished(report: &DiffReport) -> Self {
        if report.is_empty() {
            ComparisonStatus::NoDifferences
        } else {
            ComparisonStatus::Ready
        }
    }

    /// Status line shown to users.
    pub fn message(&self) -> &'static str {
        match self {
            ComparisonStatus::Waiting => "Waiting for files",
            ComparisonStatus::Extracting => "Extracting text...",
            ComparisonStatus::Diffing => "Computing differences...",
            ComparisonStatus::Ready => "Differences ready",
            ComparisonStatus::NoDifferences => "No new text detected",
            ComparisonStatus::Failed => "Something went wrong",
        }
    }

    /// True once no more work is pending.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ComparisonStatus::Ready | ComparisonStatus::NoDifferences | ComparisonStatus::Failed
        )
    }
}

impl fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Compares a latest document against an outdated one.
///
/// Both documents are extracted concurrently; if either fails the whole
/// comparison fails and neither result is kept. The error names the failing
/// document.
///
/// # Example
///
/// ```no_run
/// use pdfdiff::Comparator;
///
/// let latest = std::fs::read("v2.pdf")?;
/// let outdated = std::fs::read("v1.pdf")?;
/// let report = Comparator::lopdf().compare_bytes(&latest, &outdated, &|_, _| {})?;
/// for record in &report.records {
///     println!("page {}: {}", record.page, record.example);
/// }
/// # Ok::<(), pdfdiff::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Comparator {
    extractor: TextExtractor,
    diff: DiffEngine,
}

impl Comparator {
    /// Create a comparator, initialising the engine.
    pub fn new(engine: Arc<dyn DecodeEngine>) -> Result<Self> {
        Ok(Self {
            extractor: TextExtractor::new(engine)?,
            diff: DiffEngine::default(),
        })
    }

    /// Create a comparator backed by lopdf.
    pub fn lopdf() -> Self {
        Self {
            extractor: TextExtractor::lopdf(),
            diff: DiffEngine::default(),
        }
    }

    /// Set extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extractor = self.extractor.with_options(options);
        self
    }

    /// Set difference options.
    pub fn with_diff_options(mut self, options: DiffOptions) -> Self {
        self.diff = DiffEngine::new(options);
        self
    }

    /// The extractor used for both documents.
    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    /// The difference engine.
    pub fn diff_engine(&self) -> &DiffEngine {
        &self.diff
    }

    /// Compare two in-memory documents.
    pub fn compare_bytes(
        &self,
        latest: &[u8],
        outdated: &[u8],
        on_progress: &ComparisonProgressFn<'_>,
    ) -> Result<DiffReport> {
        let (latest_text, outdated_text) = rayon::join(
            || self.extract_bytes(DocumentRole::Latest, latest, on_progress),
            || self.extract_bytes(DocumentRole::Outdated, outdated, on_progress),
        );
        Ok(self.compare_text(&latest_text?, &outdated_text?))
    }

    /// Compare two files, reading them asynchronously.
    #[cfg(feature = "async")]
    pub async fn compare_files<P, Q>(
        &self,
        latest: P,
        outdated: Q,
        on_progress: Arc<ComparisonProgressFn<'static>>,
    ) -> Result<DiffReport>
    where
        P: AsRef<std::path::Path>,
        Q: AsRef<std::path::Path>,
    {
        let (latest_text, outdated_text) =
            self.extract_files(latest, outdated, on_progress).await?;
        Ok(self.compare_text(&latest_text, &outdated_text))
    }

    /// Extract both files without diffing them.
    ///
    /// Returns `(latest, outdated)` for a later [`Comparator::compare_text`].
    #[cfg(feature = "async")]
    pub async fn extract_files<P, Q>(
        &self,
        latest: P,
        outdated: Q,
        on_progress: Arc<ComparisonProgressFn<'static>>,
    ) -> Result<(PageText, PageText)>
    where
        P: AsRef<std::path::Path>,
        Q: AsRef<std::path::Path>,
    {
        // Both sides run to completion so a double failure reports the latest
        // document, as `compare_bytes` does.
        let (latest_text, outdated_text) = tokio::join!(
            self.extract_file(DocumentRole::Latest, latest.as_ref(), &on_progress),
            self.extract_file(DocumentRole::Outdated, outdated.as_ref(), &on_progress),
        );
        Ok((latest_text?, outdated_text?))
    }

    /// Diff already extracted documents.
    pub fn compare_text(&self, latest: &PageText, outdated: &PageText) -> DiffReport {
        let report = self.diff.report(latest, outdated);
        log::debug!(
            "Compared {} pages: {} with new text, {} unique lines",
            report.pages_compared,
            report.records.len(),
            report.total_unique_lines()
        );
        report
    }

    fn extract_bytes(
        &self,
        role: DocumentRole,
        data: &[u8],
        on_progress: &ComparisonProgressFn<'_>,
    ) -> Result<PageText> {
        self.extractor
            .extract(data, &|progress| on_progress(role, progress))
            .map_err(|e| tag_failure(e, role))
    }

    #[cfg(feature = "async")]
    async fn extract_file(
        &self,
        role: DocumentRole,
        path: &std::path::Path,
        on_progress: &Arc<ComparisonProgressFn<'static>>,
    ) -> Result<PageText> {
        let callback = Arc::clone(on_progress);
        let progress: Arc<ProgressFn<'static>> =
            Arc::new(move |progress: ExtractProgress| callback(role, progress));
        self.extractor
            .extract_file(path, progress)
            .await
            .map_err(|e| tag_failure(e, role))
    }
}

fn tag_failure(err: Error, role: DocumentRole) -> Error {
    log::error!("{} extraction failed: {}", role.label(), err);
    err.for_document(role)
}
