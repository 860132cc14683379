use parking_lot::Mutex;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::PathBuf;

use crate::errors::{BatchError, Result};
use crate::scan::base_name;
use crate::traits::{CommandOutput, CommandRunner};

/// 記録された外部コマンド呼び出し
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl RecordedCall {
    fn value_of(&self, flag: &str) -> Option<&OsString> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
    }

    pub fn input_image(&self) -> Option<PathBuf> {
        self.value_of("--input_image").map(PathBuf::from)
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        self.value_of("--output_dir").map(PathBuf::from)
    }

    pub fn model_name(&self) -> Option<String> {
        self.value_of("--model_name")
            .map(|s| s.to_string_lossy().into_owned())
    }
}

/// テスト用のフェイク推論ツール
///
/// 実プロセスを起動せずに呼び出しを記録し、成功時は `<output_dir>/<base>.png` を書き出す
#[derive(Debug, Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<RecordedCall>>,
    failing: HashSet<String>,
    unlaunchable: HashSet<String>,
    skip_outputs: bool,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定したベース名の入力に対して非ゼロ終了コードを返す
    pub fn failing_on(mut self, base: &str) -> Self {
        self.failing.insert(base.to_string());
        self
    }

    /// 指定したベース名の入力に対して起動失敗を返す
    pub fn unlaunchable_on(mut self, base: &str) -> Self {
        self.unlaunchable.insert(base.to_string());
        self
    }

    /// 成功しても出力ファイルを書き出さない
    pub fn without_outputs(mut self) -> Self {
        self.skip_outputs = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn execute(&self, program: &OsStr, args: &[OsString]) -> Result<CommandOutput> {
        let call = RecordedCall {
            program: program.to_os_string(),
            args: args.to_vec(),
        };
        self.calls.lock().push(call.clone());

        let base = call
            .input_image()
            .and_then(|p| base_name(&p))
            .unwrap_or_default();

        if self.unlaunchable.contains(&base) {
            return Err(BatchError::Launch {
                program: program.to_string_lossy().into_owned(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "simulated launch failure"),
            });
        }

        if self.failing.contains(&base) {
            return Ok(CommandOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: format!("simulated failure for {}\n", base),
            });
        }

        let mut result = CommandOutput::with_code(0);
        if !self.skip_outputs {
            if let Some(output_dir) = call.output_dir() {
                let output = output_dir.join(format!("{}.png", base));
                fs::write(&output, b"")
                    .map_err(|e| BatchError::file_system(&output, "fake output write", e))?;
                result.stdout = format!("wrote {}\n", output.display());
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(input: &str, output_dir: &std::path::Path) -> Vec<OsString> {
        vec![
            "--model_name".into(),
            "day_to_night".into(),
            "--input_image".into(),
            input.into(),
            "--output_dir".into(),
            output_dir.as_os_str().to_os_string(),
        ]
    }

    #[test]
    fn test_fake_runner_writes_output() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let runner = FakeRunner::new();

        let output = runner.execute(OsStr::new("tool"), &args("in/a.jpg", temp_dir.path()))?;

        assert!(output.success());
        assert!(temp_dir.path().join("a.png").exists());
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model_name().as_deref(), Some("day_to_night"));
        assert_eq!(calls[0].input_image(), Some(PathBuf::from("in/a.jpg")));
        Ok(())
    }

    #[test]
    fn test_fake_runner_scripted_failures() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let runner = FakeRunner::new().failing_on("a").unlaunchable_on("b");

        let output = runner.execute(OsStr::new("tool"), &args("in/a.jpg", temp_dir.path()))?;
        assert_eq!(output.code, Some(1));
        assert!(!temp_dir.path().join("a.png").exists());

        let err = runner
            .execute(OsStr::new("tool"), &args("in/b.jpg", temp_dir.path()))
            .unwrap_err();
        assert!(matches!(err, BatchError::Launch { .. }));
        assert_eq!(runner.calls().len(), 2);
        Ok(())
    }
}
