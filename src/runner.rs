use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::errors::{BatchError, Result};
use crate::traits::{CommandOutput, CommandRunner};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs the external tool as a child process and captures its output.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub const fn new() -> Self {
        Self { timeout: None }
    }

    /// Kill the child if it runs longer than `timeout`.
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn spawn(program: &OsStr, args: &[OsString]) -> Result<Child> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BatchError::Launch {
                program: program.to_string_lossy().into_owned(),
                source: e,
            })
    }

    fn wait_with_deadline(
        child: &mut Child,
        program: &OsStr,
        timeout: Duration,
    ) -> Result<Option<i32>> {
        let deadline = Instant::now() + timeout;
        loop {
            let status = child.try_wait().map_err(|e| BatchError::Launch {
                program: program.to_string_lossy().into_owned(),
                source: e,
            })?;

            if let Some(status) = status {
                return Ok(status.code());
            }

            if Instant::now() >= deadline {
                // kill fails only if the child already exited
                let _ = child.kill();
                let _ = child.wait();
                return Err(BatchError::Timeout {
                    program: program.to_string_lossy().into_owned(),
                    timeout,
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

impl CommandRunner for ProcessRunner {
    fn execute(&self, program: &OsStr, args: &[OsString]) -> Result<CommandOutput> {
        let mut child = Self::spawn(program, args)?;

        // Pipes are drained on their own threads so a chatty child never blocks on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let code = match self.timeout {
            Some(timeout) => Self::wait_with_deadline(&mut child, program, timeout),
            None => child
                .wait()
                .map(|status| status.code())
                .map_err(|e| BatchError::Launch {
                    program: program.to_string_lossy().into_owned(),
                    source: e,
                }),
        }?;

        Ok(CommandOutput {
            code,
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        })
    }
}
