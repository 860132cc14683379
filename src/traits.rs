use crate::errors::Result;
use std::ffi::{OsStr, OsString};

/// 外部プロセス実行の抽象化
///
/// 依存関係逆転原則（DIP）に従い、ドライバーは具象プロセスではなくこの抽象に依存する
pub trait CommandRunner {
    /// コマンドを同期的に実行し、終了するまでブロックする
    ///
    /// `Err` は起動できなかった場合（またはタイムアウト等で待機に失敗した場合）を表す
    fn execute(&self, program: &OsStr, args: &[OsString]) -> Result<CommandOutput>;
}

/// Exit status and captured output of one finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Failure description: the exit status followed by the last line of stderr, if any.
    pub fn diagnostic(&self) -> String {
        let status = match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };

        match self.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(line) => format!("{}: {}", status, line.trim()),
            None => status,
        }
    }
}
