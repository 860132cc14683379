use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use crate::config::Region;
use crate::driver::RunSummary;
use crate::traits::CommandOutput;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Creates the per-region log context and, optionally, a progress bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    show_progress: bool,
}

impl Reporter {
    pub const fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }

    pub fn region_started(&self, region: &Region) {
        info!(
            region = %region.name,
            input_dir = %region.input_dir.display(),
            output_dir = %region.output_dir.display(),
            "Processing region"
        );
    }

    pub fn track(
        &self,
        region: &Region,
        eligible: usize,
        already_processed: usize,
    ) -> RegionProgress {
        debug!(region = %region.name, eligible, already_processed, "Scanned region");

        let bar = if self.show_progress && eligible > 0 {
            let bar = ProgressBar::new(eligible as u64);
            if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar.set_message(region.name.clone());
            Some(bar)
        } else {
            None
        };

        RegionProgress {
            region: region.name.clone(),
            bar,
        }
    }

    pub fn run_finished(&self, summary: &RunSummary) {
        if summary.has_failures() {
            warn!(
                regions = summary.regions.len(),
                succeeded = summary.succeeded(),
                skipped = summary.skipped(),
                failed = summary.failed(),
                "Finished with failures"
            );
        } else {
            info!(
                regions = summary.regions.len(),
                succeeded = summary.succeeded(),
                skipped = summary.skipped(),
                "Finished"
            );
        }
    }
}

/// Log sink for one region. Lines are printed with the progress bar suspended.
pub struct RegionProgress {
    region: String,
    bar: Option<ProgressBar>,
}

impl RegionProgress {
    fn emit(&self, log: impl FnOnce()) {
        match &self.bar {
            Some(bar) => bar.suspend(log),
            None => log(),
        }
    }

    fn advance(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    pub fn processing(&self, input: &std::path::Path) {
        self.emit(|| info!(region = %self.region, input = %input.display(), "Processing"));
    }

    /// Captured stdout/stderr of the tool, visible with `RUST_LOG=debug`.
    pub fn tool_output(&self, file: &str, output: &CommandOutput) {
        let (stdout, stderr) = (output.stdout.trim_end(), output.stderr.trim_end());
        if stdout.is_empty() && stderr.is_empty() {
            return;
        }
        self.emit(|| debug!(region = %self.region, file, stdout, stderr, "Tool output"));
    }

    pub fn skipped(&self, file: &str) {
        self.emit(|| info!(region = %self.region, file, "Skipping (already processed)"));
        self.advance();
    }

    pub fn succeeded(&self, file: &str) {
        self.emit(|| info!(region = %self.region, file, "Successfully processed"));
        self.advance();
    }

    pub fn failed(&self, file: &str, detail: &str) {
        self.emit(|| error!(region = %self.region, file, detail, "Error processing"));
        self.advance();
    }

    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
