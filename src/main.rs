use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use img2img_batch::{BatchDriver, Config, ProcessRunner, Reporter};

fn main() -> Result<ExitCode> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let regions = config.regions()?;
    let runner = ProcessRunner::new().with_timeout(config.invocation_timeout());
    let driver = BatchDriver::new(runner, config.tool_command())
        .with_reporter(Reporter::new(!config.no_progress));

    let summary = driver.run_all_regions(&regions)?;

    if config.fail_on_error && summary.has_failures() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
