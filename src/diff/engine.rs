//! Per-page greedy fuzzy matching.

use std::collections::{HashMap, HashSet};

use super::similarity::{levenshtein, score, upper_bound};
use crate::model::{DiffReport, DifferenceRecord, PageText};
use crate::normalize::{dedup_key, fold_compatibility, split_into_lines};
use crate::options::DiffOptions;

/// A normalized line with its length in code points.
struct Line {
    text: String,
    chars: usize,
}

impl Line {
    fn new(text: String) -> Self {
        let chars = text.chars().count();
        Self { text, chars }
    }
}

/// Outcome of comparing one page.
struct PageOutcome<'a> {
    unique: Vec<&'a str>,
    exact_mode: bool,
}

/// Computes the lines each latest page adds over the outdated page at the
/// same index.
///
/// Each latest line (deduplicated case-insensitively) is paired with its most
/// similar outdated line that no earlier latest line has claimed. Pairs at or
/// above the similarity threshold count as unchanged and consume the outdated
/// line; everything else is unique to the latest document.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    options: DiffOptions,
}

impl DiffEngine {
    /// Create an engine with the given options.
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    /// Current options.
    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Records for pages with unique lines, in page order.
    pub fn diff(&self, latest: &PageText, outdated: &PageText) -> Vec<DifferenceRecord> {
        self.report(latest, outdated).records
    }

    /// Full comparison result, including pages compared in exact mode.
    pub fn report(&self, latest: &PageText, outdated: &PageText) -> DiffReport {
        let mut report = DiffReport::default();

        for (idx, block) in latest.iter().enumerate() {
            let page = idx as u32 + 1;
            let latest_lines = self.prepare_lines(block);
            let outdated_lines = self.prepare_lines(outdated.page(idx + 1).unwrap_or(""));

            let outcome = self.compare_page(&latest_lines, &outdated_lines);
            if outcome.exact_mode {
                log::debug!(
                    "Page {} exceeds fuzzy-matching caps ({} vs {} lines), comparing exactly",
                    page,
                    latest_lines.len(),
                    outdated_lines.len()
                );
                report.exact_mode_pages.push(page);
            }

            if let Some(first) = outcome.unique.first() {
                report.records.push(DifferenceRecord::new(
                    page,
                    *first,
                    outcome.unique.len(),
                ));
            }
        }

        report.pages_compared = latest.page_count() as u32;
        report
    }

    fn prepare_lines(&self, block: &str) -> Vec<Line> {
        split_into_lines(block)
            .into_iter()
            .map(|line| {
                if self.options.unicode_normalization {
                    fold_compatibility(&line)
                } else {
                    line
                }
            })
            .filter(|line| !line.is_empty())
            .filter(|line| !self.options.ignore_patterns.iter().any(|re| re.is_match(line)))
            .map(Line::new)
            .collect()
    }

    fn compare_page<'a>(&self, latest: &'a [Line], outdated: &[Line]) -> PageOutcome<'a> {
        let mut seen = HashSet::new();
        let candidates: Vec<&Line> = latest
            .iter()
            .filter(|line| seen.insert(dedup_key(&line.text)))
            .collect();

        if outdated.is_empty() {
            return PageOutcome {
                unique: candidates.into_iter().map(|l| l.text.as_str()).collect(),
                exact_mode: false,
            };
        }

        if self.exceeds_caps(latest, outdated) {
            return PageOutcome {
                unique: exact_unique(&candidates, outdated),
                exact_mode: true,
            };
        }

        let mut consumed = vec![false; outdated.len()];
        let mut unique = Vec::new();
        for line in candidates {
            match self.best_match(line, outdated, &consumed) {
                Some(idx) => consumed[idx] = true,
                None => unique.push(line.text.as_str()),
            }
        }

        PageOutcome {
            unique,
            exact_mode: false,
        }
    }

    fn exceeds_caps(&self, latest: &[Line], outdated: &[Line]) -> bool {
        let max_lines = self.options.max_lines_per_page;
        let max_chars = self.options.max_line_chars;
        latest.len() > max_lines
            || outdated.len() > max_lines
            || latest.iter().chain(outdated).any(|l| l.chars > max_chars)
    }

    /// Index of the unconsumed outdated line that matches `line`, if any.
    ///
    /// Ties keep the earliest candidate; a candidate must score above zero.
    fn best_match(&self, line: &Line, outdated: &[Line], consumed: &[bool]) -> Option<usize> {
        let threshold = self.options.similarity_threshold;
        let mut best_idx = None;
        let mut best_score = 0.0;

        for (idx, candidate) in outdated.iter().enumerate() {
            if consumed[idx] || upper_bound(line.chars, candidate.chars) < threshold {
                continue;
            }
            let similarity = if line.text == candidate.text {
                1.0
            } else {
                score(
                    levenshtein(&line.text, &candidate.text),
                    line.chars,
                    candidate.chars,
                )
            };
            if similarity > best_score {
                best_score = similarity;
                best_idx = Some(idx);
                if similarity >= 1.0 {
                    break;
                }
            }
        }

        best_idx.filter(|_| best_score >= threshold)
    }
}

/// Exact-mode comparison: a line matches only an identical unclaimed line.
fn exact_unique<'a>(candidates: &[&'a Line], outdated: &[Line]) -> Vec<&'a str> {
    let mut available: HashMap<&str, usize> = HashMap::new();
    for line in outdated {
        *available.entry(line.text.as_str()).or_default() += 1;
    }

    candidates
        .iter()
        .copied()
        .filter(|line| match available.get_mut(line.text.as_str()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .map(|line| line.text.as_str())
        .collect()
}
