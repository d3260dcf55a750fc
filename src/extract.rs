//! Text extraction: document bytes to per-page text blocks.
//!
//! A decoder exposes text runs, not lines. [`fold_runs_into_lines`] rebuilds
//! visual lines from each run's end-of-line hint, with the last run on a page
//! always closing its line since producers rarely mark it.

use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;

use crate::backend::{DecodeEngine, LopdfEngine, TextLayer};
use crate::error::{Error, Result};
use crate::model::{PageText, TextRun};
use crate::normalize::normalize_line;
use crate::options::{ErrorMode, ExtractOptions};
use crate::progress::{ExtractProgress, ProgressFn};

#[cfg(feature = "async")]
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Fold a page's runs into its text block (lines joined by `\n`).
pub fn fold_runs_into_lines(runs: &[TextRun]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for run in runs {
        let normalized = normalize_line(&run.text);
        if normalized.is_empty() {
            continue;
        }
        current.push(normalized);

        if run.end_of_line {
            lines.push(current.join(" "));
            current.clear();
        }
    }
    // The page's last line usually carries no end-of-line hint.
    if !current.is_empty() {
        lines.push(current.join(" "));
    }

    lines.join("\n")
}

/// Extracts [`PageText`] through a [`DecodeEngine`].
#[derive(Clone)]
pub struct TextExtractor {
    engine: Arc<dyn DecodeEngine>,
    options: ExtractOptions,
}

impl TextExtractor {
    /// Create an extractor, initialising the engine.
    ///
    /// Any initialisation failure is reported as [`Error::EngineUnavailable`].
    pub fn new(engine: Arc<dyn DecodeEngine>) -> Result<Self> {
        engine.initialize().map_err(|e| match e {
            err @ Error::EngineUnavailable(_) => err,
            other => Error::EngineUnavailable(format!("{}: {}", engine.name(), other)),
        })?;
        Ok(Self {
            engine,
            options: ExtractOptions::default(),
        })
    }

    /// Create an extractor backed by lopdf.
    pub fn lopdf() -> Self {
        Self {
            engine: Arc::new(LopdfEngine::new()),
            options: ExtractOptions::default(),
        }
    }

    /// Set extraction options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Name of the underlying engine.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Extract page text from an in-memory document.
    pub fn extract(&self, data: &[u8], on_progress: &ProgressFn<'_>) -> Result<PageText> {
        let total = data.len() as u64;
        on_progress(ExtractProgress::Loading {
            loaded: total,
            total,
        });
        self.decode(data, on_progress)
    }

    /// Extract page text from a file, streaming it in with loading progress.
    #[cfg(feature = "async")]
    pub async fn extract_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
        on_progress: Arc<ProgressFn<'static>>,
    ) -> Result<PageText> {
        let data = read_with_progress(path.as_ref(), &*on_progress).await?;
        let extractor = self.clone();
        tokio::task::spawn_blocking(move || extractor.decode(&data, &*on_progress))
            .await
            .map_err(|e| Error::Task(e.to_string()))?
    }

    fn decode(&self, data: &[u8], on_progress: &ProgressFn<'_>) -> Result<PageText> {
        let layer = self.engine.open(data)?;
        self.extract_layer(layer.as_ref(), on_progress)
    }

    /// Extract every page of an opened text layer.
    pub fn extract_layer(
        &self,
        layer: &dyn TextLayer,
        on_progress: &ProgressFn<'_>,
    ) -> Result<PageText> {
        let page_count = layer.page_count();
        let total = u64::from(page_count);
        // Counting and reporting share one lock so reports arrive in order.
        let done = Mutex::new(0u64);

        let extract_page = |page_number: u32| -> Result<String> {
            let block = match layer.text_runs(page_number) {
                Ok(runs) => fold_runs_into_lines(&runs),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", page_number, e);
                    String::new()
                }
                Err(e) => return Err(e),
            };
            let mut loaded = done.lock().unwrap_or_else(PoisonError::into_inner);
            *loaded += 1;
            on_progress(ExtractProgress::Pages {
                loaded: *loaded,
                total,
            });
            Ok(block)
        };

        let pages: Vec<String> = if self.options.parallel && page_count > 1 {
            (1..=page_count)
                .into_par_iter()
                .map(extract_page)
                .collect::<Result<_>>()?
        } else {
            (1..=page_count).map(extract_page).collect::<Result<_>>()?
        };

        log::debug!(
            "Extracted {} pages with {}",
            pages.len(),
            self.engine.name()
        );
        Ok(PageText::from(pages))
    }
}

impl std::fmt::Debug for TextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextExtractor")
            .field("engine", &self.engine.name())
            .field("options", &self.options)
            .finish()
    }
}

/// Read a file in chunks, reporting cumulative bytes.
#[cfg(feature = "async")]
async fn read_with_progress(
    path: &std::path::Path,
    on_progress: &ProgressFn<'_>,
) -> Result<Vec<u8>> {
    use tokio::io::AsyncReadExt;

    let mut file = tokio::fs::File::open(path).await?;
    let total = file.metadata().await?.len();
    let mut data = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = file.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        let loaded = data.len() as u64;
        on_progress(ExtractProgress::Loading {
            loaded,
            total: total.max(loaded),
        });
    }

    if data.is_empty() {
        on_progress(ExtractProgress::Loading {
            loaded: 0,
            total: 0,
        });
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct FixedLayer {
        pages: Vec<Result<Vec<TextRun>>>,
    }

    impl TextLayer for FixedLayer {
        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        fn text_runs(&self, page_number: u32) -> Result<Vec<TextRun>> {
            match &self.pages[(page_number - 1) as usize] {
                Ok(runs) => Ok(runs.clone()),
                Err(e) => Err(Error::Decode(e.to_string())),
            }
        }
    }

    struct BrokenEngine;

    impl DecodeEngine for BrokenEngine {
        fn name(&self) -> &str {
            "broken"
        }

        fn initialize(&self) -> Result<()> {
            Err(Error::Decode("worker script missing".into()))
        }

        fn open(&self, _data: &[u8]) -> Result<Box<dyn TextLayer>> {
            unreachable!("never initialised")
        }
    }

    #[test]
    fn test_fold_joins_runs_until_eol() {
        let runs = vec![
            TextRun::new("The  sky"),
            TextRun::eol("is blue."),
            TextRun::new("Grass"),
            TextRun::new("is green."),
        ];
        assert_eq!(
            fold_runs_into_lines(&runs),
            "The sky is blue.\nGrass is green."
        );
    }

    #[test]
    fn test_fold_skips_blank_runs() {
        let runs = vec![
            TextRun::new("  "),
            TextRun::new("Hello"),
            TextRun::eol(" \t "),
            TextRun::new("world"),
        ];
        // The blank EOL run is dropped entirely, so its hint is lost too.
        assert_eq!(fold_runs_into_lines(&runs), "Hello world");
    }

    #[test]
    fn test_fold_last_run_flushes_line() {
        let runs = vec![TextRun::eol("One"), TextRun::new("Two")];
        assert_eq!(fold_runs_into_lines(&runs), "One\nTwo");
    }

    #[test]
    fn test_fold_blank_last_run_keeps_pending_text() {
        let runs = vec![TextRun::eol("One"), TextRun::new("Two"), TextRun::new(" ")];
        assert_eq!(fold_runs_into_lines(&runs), "One\nTwo");
    }

    #[test]
    fn test_fold_empty_page() {
        assert_eq!(fold_runs_into_lines(&[]), "");
    }

    #[test]
    fn test_extract_layer_reports_pages_in_order() {
        let layer = FixedLayer {
            pages: vec![
                Ok(vec![TextRun::eol("Page one")]),
                Ok(vec![TextRun::new("Page"), TextRun::new("two")]),
                Ok(vec![]),
            ],
        };
        let seen = Mutex::new(Vec::new());
        let extractor = TextExtractor::lopdf().with_options(ExtractOptions::new().sequential());
        let text = extractor
            .extract_layer(&layer, &|p| seen.lock().unwrap().push(p))
            .unwrap();

        assert_eq!(text, PageText::from(vec!["Page one", "Page two", ""]));
        let seen = seen.into_inner().unwrap();
        assert_eq!(
            seen,
            (1..=3)
                .map(|loaded| ExtractProgress::Pages { loaded, total: 3 })
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_parallel_extraction_keeps_page_order() {
        let layer = FixedLayer {
            pages: (1..=40)
                .map(|i| Ok(vec![TextRun::new(format!("Line {}", i))]))
                .collect(),
        };
        let count = AtomicU64::new(0);
        let text = TextExtractor::lopdf()
            .extract_layer(&layer, &|_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert_eq!(text.page_count(), 40);
        assert_eq!(text.page(17), Some("Line 17"));
        assert_eq!(count.load(Ordering::SeqCst), 40);
    }

    #[test]
    fn test_parallel_progress_never_goes_backwards() {
        let layer = FixedLayer {
            pages: (1..=200)
                .map(|i| Ok(vec![TextRun::new(format!("Line {}", i))]))
                .collect(),
        };
        let seen = Mutex::new(Vec::new());
        TextExtractor::lopdf()
            .extract_layer(&layer, &|p| seen.lock().unwrap().push(p))
            .unwrap();

        assert_eq!(
            seen.into_inner().unwrap(),
            (1..=200)
                .map(|loaded| ExtractProgress::Pages { loaded, total: 200 })
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_strict_mode_fails_on_bad_page() {
        let layer = FixedLayer {
            pages: vec![
                Ok(vec![TextRun::new("fine")]),
                Err(Error::Decode("bad stream".into())),
            ],
        };
        let err = TextExtractor::lopdf()
            .with_options(ExtractOptions::new().sequential())
            .extract_layer(&layer, &|_| {})
            .unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_lenient_mode_blanks_bad_page() {
        let layer = FixedLayer {
            pages: vec![
                Err(Error::Decode("bad stream".into())),
                Ok(vec![TextRun::new("fine")]),
            ],
        };
        let text = TextExtractor::lopdf()
            .with_options(ExtractOptions::new().lenient())
            .extract_layer(&layer, &|_| {})
            .unwrap();
        assert_eq!(text, PageText::from(vec!["", "fine"]));
    }

    #[test]
    fn test_engine_init_failure_is_unavailable() {
        let err = TextExtractor::new(Arc::new(BrokenEngine)).unwrap_err();
        assert!(matches!(err, Error::EngineUnavailable(msg) if msg.contains("broken")));
    }

    #[test]
    fn test_extract_reports_loading_then_fails_on_garbage() {
        let seen = Mutex::new(Vec::new());
        let err = TextExtractor::lopdf()
            .extract(b"not a pdf", &|p| seen.lock().unwrap().push(p))
            .unwrap_err();
        assert!(err.is_decode_error());
        assert_eq!(
            seen.into_inner().unwrap(),
            vec![ExtractProgress::Loading { loaded: 9, total: 9 }]
        );
    }
}
