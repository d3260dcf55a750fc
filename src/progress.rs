//! Extraction progress reporting.
//!
//! Progress is a side channel: the extractor emits [`ExtractProgress`] values
//! and [`ProgressTracker`] turns the latest value per document into the
//! percentages, phase descriptions and ETA a front end displays.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::DocumentRole;

/// One progress report from an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum ExtractProgress {
    /// Bytes handed to the decoder so far
    Loading {
        /// Bytes loaded
        loaded: u64,
        /// Total bytes
        total: u64,
    },
    /// Pages fully extracted so far
    Pages {
        /// Pages done
        loaded: u64,
        /// Total pages
        total: u64,
    },
}

impl ExtractProgress {
    /// `(loaded, total)` regardless of phase.
    pub fn counts(&self) -> (u64, u64) {
        match *self {
            ExtractProgress::Loading { loaded, total } | ExtractProgress::Pages { loaded, total } => {
                (loaded, total)
            }
        }
    }

    /// Completion in percent, rounded and capped at 100.
    pub fn percent(&self) -> u8 {
        let (loaded, total) = self.counts();
        if total == 0 {
            return 0;
        }
        let pct = (loaded as f64 / total as f64 * 100.0).round();
        pct.min(100.0) as u8
    }

    /// Human-readable description of this phase.
    pub fn describe(&self) -> String {
        match *self {
            ExtractProgress::Loading { loaded, total } => format!(
                "{} KB of {} KB loaded",
                (loaded as f64 / 1024.0).round() as u64,
                (total as f64 / 1024.0).round() as u64
            ),
            ExtractProgress::Pages { loaded, total } => {
                format!("{} of {} pages processed", loaded, total)
            }
        }
    }
}

/// Callback receiving progress for one document.
pub type ProgressFn<'a> = dyn Fn(ExtractProgress) + Send + Sync + 'a;

/// Callback receiving progress for either document of a comparison.
pub type ComparisonProgressFn<'a> = dyn Fn(DocumentRole, ExtractProgress) + Send + Sync + 'a;

/// Latest progress per document.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    latest: HashMap<DocumentRole, ExtractProgress>,
}

impl ProgressTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a report, replacing the previous one for that document.
    pub fn update(&mut self, role: DocumentRole, progress: ExtractProgress) {
        self.latest.insert(role, progress);
    }

    /// Forget all reports.
    pub fn reset(&mut self) {
        self.latest.clear();
    }

    /// Latest report for a document.
    pub fn get(&self, role: DocumentRole) -> Option<ExtractProgress> {
        self.latest.get(&role).copied()
    }

    /// Completion percent for a document (0 before any report).
    pub fn percent(&self, role: DocumentRole) -> u8 {
        self.get(role).map(|p| p.percent()).unwrap_or(0)
    }

    /// Phase description for a document.
    pub fn describe(&self, role: DocumentRole) -> String {
        self.get(role)
            .map(|p| p.describe())
            .unwrap_or_else(|| "Awaiting file".to_string())
    }

    /// Remaining-time estimate across both documents.
    ///
    /// Sums `loaded` and `total` over the reported documents and
    /// extrapolates from `elapsed`; never reports less than one second.
    pub fn eta(&self, elapsed: Duration) -> String {
        let (loaded, total) = self
            .latest
            .values()
            .map(ExtractProgress::counts)
            .fold((0u64, 0u64), |(l, t), (dl, dt)| (l + dl, t + dt));

        if loaded == 0 || total == 0 {
            return "estimating".to_string();
        }

        let fraction = loaded as f64 / total as f64;
        let remaining = elapsed.as_secs_f64() * (1.0 / fraction - 1.0);
        format_duration(Duration::from_secs_f64(remaining.max(1.0)))
    }
}

/// Format a duration as `"42s"` or `"3m 5s"`.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    let minutes = seconds / 60;
    let remaining_seconds = seconds % 60;
    if minutes == 0 {
        format!("{}s", remaining_seconds)
    } else {
        format!("{}m {}s", minutes, remaining_seconds)
    }
}
