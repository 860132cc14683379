pub mod config;
pub mod driver;
pub mod errors;
pub mod invocation;
pub mod report;
pub mod runner;
pub mod scan;
pub mod traits;

pub mod mocks;

pub use config::{Config, Region};
pub use driver::{BatchDriver, FileOutcome, FileStatus, RegionReport, RunSummary};
pub use errors::{BatchError, Result};
pub use invocation::ToolCommand;
pub use report::Reporter;
pub use runner::ProcessRunner;
pub use traits::*;
