use clap::Parser;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{BatchError, Result};
use crate::invocation::ToolCommand;

/// One (input directory, output directory) processing unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Region {
    pub fn new(
        name: impl Into<String>,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={},{}",
            self.name,
            self.input_dir.display(),
            self.output_dir.display()
        )
    }
}

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Region to process, in order. Repeat for several regions.
    #[arg(
        short,
        long = "region",
        value_name = "NAME=INPUT_DIR,OUTPUT_DIR",
        value_parser = parse_region,
        default_values = ["hk=lz/hk/images,outputs/hk", "sg=lz/singapore/images,outputs/sg"]
    )]
    pub regions: Vec<Region>,

    #[arg(short, long, default_value = "day_to_night")]
    pub model_name: String,

    /// Executable that runs the inference tool.
    #[arg(short, long, default_value = "python")]
    pub program: PathBuf,

    /// First argument passed to the program. Empty to pass none.
    #[arg(short, long, default_value = "src/inference_unpaired.py")]
    pub script: String,

    /// Kill an invocation that runs longer than this. No limit when absent.
    #[arg(short, long)]
    pub timeout_secs: Option<u64>,

    /// Exit with status 1 if any file failed.
    #[arg(long, default_value_t = false)]
    pub fail_on_error: bool,

    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl Config {
    /// Regions in the order given, rejecting duplicate names.
    pub fn regions(&self) -> Result<Vec<Region>> {
        if self.regions.is_empty() {
            return Err(BatchError::Configuration {
                message: "at least one region is required".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for region in &self.regions {
            if !seen.insert(region.name.as_str()) {
                return Err(BatchError::Configuration {
                    message: format!("region `{}` is configured more than once", region.name),
                });
            }
        }

        Ok(self.regions.clone())
    }

    pub fn tool_command(&self) -> ToolCommand {
        let command = ToolCommand::new(self.program.as_os_str(), self.model_name.as_str());
        if self.script.is_empty() {
            command
        } else {
            command.with_prefix_arg(self.script.as_str())
        }
    }

    pub fn invocation_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn parse_region(s: &str) -> std::result::Result<Region, String> {
    let usage = "expected NAME=INPUT_DIR,OUTPUT_DIR";

    let (name, dirs) = s
        .split_once('=')
        .ok_or_else(|| format!("`{}`: {}", s, usage))?;
    let (input_dir, output_dir) = dirs
        .split_once(',')
        .ok_or_else(|| format!("`{}`: {}", s, usage))?;

    let (name, input_dir, output_dir) = (name.trim(), input_dir.trim(), output_dir.trim());
    if name.is_empty() || input_dir.is_empty() || output_dir.is_empty() {
        return Err(format!("`{}`: name and both directories must be non-empty", s));
    }

    Ok(Region::new(name, input_dir, output_dir))
}
