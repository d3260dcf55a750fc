//! Extraction and comparison options.

use regex::Regex;

/// Similarity at or above which two lines are considered the same.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.94;

/// Pages with more lines than this are compared in exact mode.
pub const DEFAULT_MAX_LINES_PER_PAGE: usize = 2_000;

/// Pages holding a line longer than this (in characters) are compared in exact mode.
pub const DEFAULT_MAX_LINE_CHARS: usize = 4_000;

/// Options for extracting page text.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to extract pages in parallel
    pub parallel: bool,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (undecodable pages become empty).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            parallel: true,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any page error
    #[default]
    Strict,
    /// Replace undecodable pages with empty text and continue
    Lenient,
}

/// Options for the difference engine.
///
/// The line and character caps bound the quadratic fuzzy matcher: a page
/// beyond either cap is compared in exact mode, where a latest line only
/// matches an identical outdated line. Such pages are listed in
/// [`DiffReport::exact_mode_pages`](crate::model::DiffReport::exact_mode_pages).
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Minimum similarity for a fuzzy match, in `[0, 1]`
    pub similarity_threshold: f64,

    /// Line cap per page for fuzzy matching
    pub max_lines_per_page: usize,

    /// Character cap per line for fuzzy matching
    pub max_line_chars: usize,

    /// Lines matching any of these are ignored on both sides
    pub ignore_patterns: Vec<Regex>,

    /// Apply NFKC before comparing
    pub unicode_normalization: bool,
}

impl DiffOptions {
    /// Create new diff options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the similarity threshold (clamped to `[0, 1]`).
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = if threshold.is_nan() {
            DEFAULT_SIMILARITY_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        self
    }

    /// Set the per-page line cap.
    pub fn with_max_lines_per_page(mut self, max: usize) -> Self {
        self.max_lines_per_page = max;
        self
    }

    /// Set the per-line character cap.
    pub fn with_max_line_chars(mut self, max: usize) -> Self {
        self.max_line_chars = max;
        self
    }

    /// Ignore lines matching a pattern.
    pub fn with_ignore_pattern(mut self, pattern: Regex) -> Self {
        self.ignore_patterns.push(pattern);
        self
    }

    /// Enable or disable NFKC folding.
    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.unicode_normalization = enabled;
        self
    }
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_lines_per_page: DEFAULT_MAX_LINES_PER_PAGE,
            max_line_chars: DEFAULT_MAX_LINE_CHARS,
            ignore_patterns: Vec::new(),
            unicode_normalization: false,
        }
    }
}
