//! CLI-specific progress handling for serial-dl
//!
//! Turns fetch events into a progress bar over the series, with retry and
//! failure lines printed above it.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use serial_dl::{FetchEvent, FetchObserver};

/// Creates a progress bar counting finished items
pub fn create_progress_bar(total_items: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_items);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .expect("Failed to create progress style")
            .progress_chars("#>-")
    );
    pb
}

/// Console lines for events worth printing above the bar
fn event_lines(event: &FetchEvent) -> Vec<String> {
    match event {
        FetchEvent::Retry { retry, max_retries, reason, .. } => vec![
            format!("Download error: {reason}"),
            format!("Retry: {retry}/{max_retries}"),
        ],
        FetchEvent::Failed { url, .. } => vec![
            "The number of retries has reached the maximum".to_string(),
            format!("Download failed: {url}"),
        ],
        FetchEvent::Attempt { .. } | FetchEvent::Succeeded { .. } => Vec::new(),
    }
}

/// Per-attempt progress text
fn progress_line(position: usize, total: usize) -> String {
    format!("Progress ... {position}/{total}")
}

/// Print above the bar, or straight to stderr when the bar is hidden
fn print_line(pb: &ProgressBar, line: String) {
    // indicatif draws nothing when stderr is not a terminal
    if pb.is_hidden() {
        eprintln!("{line}");
    } else {
        pb.println(line);
    }
}

/// Progress manager for a series download
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_items: u64, message: &str) -> Self {
        let pb = create_progress_bar(total_items);

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    /// Observer that drives this manager's bar
    pub fn observer(&self) -> FetchObserver {
        let pb = self.pb.clone();
        Arc::new(move |event: &FetchEvent| {
            for line in event_lines(event) {
                print_line(&pb, line);
            }
            match event {
                FetchEvent::Attempt { position, total, .. } => {
                    let line = progress_line(*position, *total);
                    if pb.is_hidden() {
                        eprintln!("{line}");
                    }
                    pb.set_message(line);
                }
                FetchEvent::Succeeded { .. } | FetchEvent::Failed { .. } => pb.inc(1),
                FetchEvent::Retry { .. } => {}
            }
        })
    }

    pub fn finish(&self) {
        self.pb.finish_with_message("Finish");
        if self.pb.is_hidden() {
            eprintln!("Finish");
        }
    }
}
