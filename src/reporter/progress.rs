use indicatif::{ProgressBar, ProgressStyle};

use super::console::ConsoleReporter;
use crate::error::ProbeError;
use crate::models::ProbeResult;
use crate::scanner::ScanObserver;

/// Progress bar for the current pass. Findings are printed above it as they arrive.
pub struct ProgressObserver {
    bar: ProgressBar,
    verbose: bool,
}

impl ProgressObserver {
    pub fn new(verbose: bool) -> Self {
        let bar = ProgressBar::new(0);
        let template = if verbose {
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {per_sec}"
        } else {
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len}"
        };
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            bar.set_style(style.progress_chars("#>-"));
        }

        Self { bar, verbose }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ScanObserver for ProgressObserver {
    fn on_progress(&self, current: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
        }
        self.bar.set_position(current as u64);
    }

    fn on_result(&self, result: &ProbeResult) {
        self.bar.println(ConsoleReporter::format_result(result));
    }

    fn on_error(&self, error: &ProbeError) {
        if self.verbose {
            self.bar.println(format!("error: {}", error));
        }
    }
}
