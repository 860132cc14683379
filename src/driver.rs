use std::collections::BTreeSet;
use std::path::Path;

use crate::config::Region;
use crate::errors::{BatchError, Result};
use crate::invocation::ToolCommand;
use crate::report::{RegionProgress, Reporter};
use crate::scan;
use crate::traits::CommandRunner;

/// Terminal state of one eligible input within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Skipped,
    Succeeded,
    Failed { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// File name inside the input directory.
    pub file: String,
    pub status: FileStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionReport {
    pub region: String,
    pub outcomes: Vec<FileOutcome>,
}

impl RegionReport {
    fn count(&self, f: impl Fn(&FileStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| f(&o.status)).count()
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Skipped))
    }

    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Succeeded))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Failed { .. }))
    }

    pub fn outcome(&self, file: &str) -> Option<&FileStatus> {
        self.outcomes
            .iter()
            .find(|o| o.file == file)
            .map(|o| &o.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub regions: Vec<RegionReport>,
}

impl RunSummary {
    pub fn skipped(&self) -> usize {
        self.regions.iter().map(RegionReport::skipped).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.regions.iter().map(RegionReport::succeeded).sum()
    }

    pub fn failed(&self) -> usize {
        self.regions.iter().map(RegionReport::failed).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Sequential, idempotent driver: scan each region, skip what the output directory already
/// holds, invoke the external tool once for everything else.
///
/// Filesystem errors abort the run. Per-file invocation failures are recorded and the batch
/// continues with the next file.
pub struct BatchDriver<R: CommandRunner> {
    runner: R,
    command: ToolCommand,
    reporter: Reporter,
}

impl<R: CommandRunner> BatchDriver<R> {
    pub fn new(runner: R, command: ToolCommand) -> Self {
        Self {
            runner,
            command,
            reporter: Reporter::new(false),
        }
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn run_all_regions(&self, regions: &[Region]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for region in regions {
            summary.regions.push(self.process_region(region)?);
        }

        self.reporter.run_finished(&summary);
        Ok(summary)
    }

    pub fn process_region(&self, region: &Region) -> Result<RegionReport> {
        self.reporter.region_started(region);

        scan::ensure_output_ready(&region.output_dir)?;
        let inputs = scan::list_eligible_inputs(&region.input_dir)?;
        // Snapshot: outputs written during this run are not folded back in.
        let processed = scan::compute_processed_set(&region.output_dir)?;

        let progress = self.reporter.track(region, inputs.len(), processed.len());
        let outcomes = inputs
            .iter()
            .map(|input| {
                self.process_file(input, &region.output_dir, &processed, &progress)
            })
            .collect();
        progress.finish();

        Ok(RegionReport {
            region: region.name.clone(),
            outcomes,
        })
    }

    fn process_file(
        &self,
        input: &Path,
        output_dir: &Path,
        processed: &BTreeSet<String>,
        progress: &RegionProgress,
    ) -> FileOutcome {
        let file = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = scan::base_name(input).unwrap_or_default();

        if processed.contains(&base) {
            progress.skipped(&file);
            return FileOutcome {
                file,
                status: FileStatus::Skipped,
            };
        }

        progress.processing(input);
        let status = match self.invoke(&file, input, output_dir, progress) {
            Ok(()) => {
                progress.succeeded(&file);
                FileStatus::Succeeded
            }
            Err(e) => {
                let detail = e.detail();
                progress.failed(&file, &detail);
                FileStatus::Failed { detail }
            }
        };

        FileOutcome { file, status }
    }

    fn invoke(
        &self,
        file: &str,
        input: &Path,
        output_dir: &Path,
        progress: &RegionProgress,
    ) -> Result<()> {
        let args = self.command.args_for(input, output_dir);
        let output = self.runner.execute(self.command.program(), &args)?;
        progress.tool_output(file, &output);

        if output.success() {
            Ok(())
        } else {
            Err(BatchError::Invocation {
                file: file.to_string(),
                detail: output.diagnostic(),
            })
        }
    }
}
