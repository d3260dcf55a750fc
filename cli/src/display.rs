//! Terminal progress for a running comparison.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use pdfdiff::{ComparisonStatus, DocumentRole, ExtractProgress, ProgressTracker};

/// One bar per document plus a status line with the ETA.
pub struct ComparisonDisplay {
    multi: MultiProgress,
    latest: ProgressBar,
    outdated: ProgressBar,
    status: ProgressBar,
    tracker: Mutex<ProgressTracker>,
    started: Instant,
}

impl ComparisonDisplay {
    pub fn new(quiet: bool) -> Arc<Self> {
        let multi = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };

        let status = multi.add(ProgressBar::new_spinner());
        status.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        let latest = multi.add(document_bar(DocumentRole::Latest));
        let outdated = multi.add(document_bar(DocumentRole::Outdated));

        let display = Arc::new(Self {
            multi,
            latest,
            outdated,
            status,
            tracker: Mutex::new(ProgressTracker::new()),
            started: Instant::now(),
        });
        display.set_status(ComparisonStatus::Waiting);
        display
    }

    fn bar(&self, role: DocumentRole) -> &ProgressBar {
        match role {
            DocumentRole::Latest => &self.latest,
            DocumentRole::Outdated => &self.outdated,
        }
    }

    pub fn set_status(&self, status: ComparisonStatus) {
        self.status.set_message(status.message());
    }

    /// The current status line.
    pub fn status_line(&self) -> String {
        self.status.message()
    }

    /// Record a progress report and redraw.
    pub fn update(&self, role: DocumentRole, progress: ExtractProgress) {
        let Ok(mut tracker) = self.tracker.lock() else {
            return;
        };
        tracker.update(role, progress);

        let bar = self.bar(role);
        bar.set_position(u64::from(tracker.percent(role)));
        bar.set_message(tracker.describe(role));

        let eta = tracker.eta(self.started.elapsed());
        self.status.set_message(format!(
            "{} {}",
            ComparisonStatus::Extracting.message(),
            format!("(remaining: {})", eta).dimmed()
        ));
    }

    /// Stop drawing, leaving the final status line.
    pub fn finish(&self, status: ComparisonStatus) {
        self.latest.finish();
        self.outdated.finish();
        self.status.finish_with_message(status.message());
        let _ = self.multi.clear();
    }
}

fn document_bar(role: DocumentRole) -> ProgressBar {
    let bar = ProgressBar::new(100);
    let template = format!(
        "  {:<13} [{{bar:30.cyan/blue}}] {{pos:>3}}% {{msg}}",
        role.label()
    );
    bar.set_style(
        ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar.set_message("Awaiting file");
    bar
}
