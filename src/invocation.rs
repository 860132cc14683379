use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Command line of the external image-to-image tool.
///
/// Produces `<program> <prefix_args..> --model_name <name> --input_image <path> --output_dir <dir>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: OsString,
    prefix_args: Vec<OsString>,
    model_name: String,
}

impl ToolCommand {
    pub fn new(program: impl Into<OsString>, model_name: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
            model_name: model_name.into(),
        }
    }

    pub fn with_prefix_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.prefix_args.push(arg.into());
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn args_for(&self, input_image: &Path, output_dir: &Path) -> Vec<OsString> {
        let mut args = self.prefix_args.clone();
        args.extend([
            OsString::from("--model_name"),
            OsString::from(&self.model_name),
            OsString::from("--input_image"),
            input_image.as_os_str().to_os_string(),
            OsString::from("--output_dir"),
            output_dir.as_os_str().to_os_string(),
        ]);
        args
    }
}
