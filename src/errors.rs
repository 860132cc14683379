use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Structured error types for the batch driver.
///
/// Filesystem failures abort the run. Invocation and launch failures belong to a single
/// input file and are reported per file by the driver.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invocation error: {file}: {detail}")]
    Invocation { file: String, detail: String },

    #[error("Timeout error: {program} ran longer than {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("Launch error: could not start {program}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl BatchError {
    pub(crate) fn file_system(
        path: impl Into<PathBuf>,
        operation: &str,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            path: path.into(),
            operation: operation.to_string(),
            source,
        }
    }

    /// Errors that belong to one input file and must not stop the batch.
    pub const fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::Invocation { .. } | Self::Launch { .. } | Self::Timeout { .. }
        )
    }

    /// One-line description including the source chain, used as the logged failure detail.
    pub fn detail(&self) -> String {
        match self {
            Self::Invocation { detail, .. } => detail.clone(),
            Self::Launch { program, source } => format!("could not start {}: {}", program, source),
            Self::Timeout { timeout, .. } => format!("timed out after {}s", timeout.as_secs_f64()),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;

/// Convert I/O errors to filesystem errors.
///
/// Callers with a concrete path should build `BatchError::FileSystem` through
/// `BatchError::file_system` instead.
impl From<std::io::Error> for BatchError {
    fn from(err: std::io::Error) -> Self {
        Self::file_system("unknown", "unknown", err)
    }
}

impl From<walkdir::Error> for BatchError {
    fn from(err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("unknown"));
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("walk failed"));
        Self::file_system(path, "directory listing", source)
    }
}
