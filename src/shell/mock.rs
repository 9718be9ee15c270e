//! Mock process runner for testing.
//!
//! `MockRunner` implements [`ProcessRunner`] without starting anything. It
//! records every command and answers from a list of scripted responses,
//! matched by substring against the command line.
//!
//! # Example
//!
//! ```
//! use venvstrap::shell::{CommandSpec, MockRunner, ProcessRunner};
//!
//! let mut runner = MockRunner::new();
//! runner.respond("--version", 0, "Python 3.12.1");
//! runner.respond("pytest", 1, "");
//!
//! let result = runner.run(&CommandSpec::new("python3").arg("--version")).unwrap();
//! assert!(result.stdout.contains("3.12.1"));
//!
//! let result = runner.run(&CommandSpec::new("python").args(["-m", "pytest"])).unwrap();
//! assert!(!result.success);
//! assert_eq!(runner.calls().len(), 2);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::venv::VenvLayout;

use super::command::{CommandResult, CommandSpec, ProcessRunner};

#[derive(Debug, Clone)]
struct Response {
    pattern: String,
    exit_code: i32,
    stdout: String,
}

/// Recording process runner with scripted results.
///
/// Commands without a matching response succeed with empty output. When
/// `-m venv <dir>` is run, the venv's interpreter file is created on disk
/// (relative to the command's working directory) so later steps see a
/// ready environment.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: Vec<Response>,
    calls: Vec<CommandSpec>,
    skip_venv_files: bool,
}

impl MockRunner {
    /// Create a runner where every command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for commands whose display contains `pattern`.
    ///
    /// The first matching response wins.
    pub fn respond(&mut self, pattern: &str, exit_code: i32, stdout: &str) {
        self.responses.push(Response {
            pattern: pattern.to_string(),
            exit_code,
            stdout: stdout.to_string(),
        });
    }

    /// Do not materialize venv files when `-m venv` runs.
    pub fn without_venv_files(mut self) -> Self {
        self.skip_venv_files = true;
        self
    }

    /// All commands run so far, in order.
    pub fn calls(&self) -> &[CommandSpec] {
        &self.calls
    }

    /// Display strings of all commands run so far.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.iter().map(|c| c.display()).collect()
    }

    /// Whether any command line contains `needle`.
    pub fn ran(&self, needle: &str) -> bool {
        self.calls.iter().any(|c| c.display().contains(needle))
    }

    fn materialize_venv(&self, spec: &CommandSpec) -> std::io::Result<()> {
        if self.skip_venv_files {
            return Ok(());
        }
        if spec.arg_str(0) != Some("-m") || spec.arg_str(1) != Some("venv") {
            return Ok(());
        }
        let Some(dir) = spec.args.get(2) else {
            return Ok(());
        };
        let cwd = spec.cwd.clone().unwrap_or_else(|| PathBuf::from("."));
        let layout = VenvLayout::new(&cwd, Path::new(dir));
        std::fs::create_dir_all(layout.bin_dir())?;
        std::fs::write(layout.python(), "")
    }
}

impl ProcessRunner for MockRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<CommandResult> {
        self.calls.push(spec.clone());
        let line = spec.display();

        let response = self
            .responses
            .iter()
            .find(|r| line.contains(&r.pattern))
            .cloned();

        let (exit_code, stdout) = match response {
            Some(r) => (r.exit_code, r.stdout),
            None => (0, String::new()),
        };

        if exit_code == 0 {
            self.materialize_venv(spec)?;
            Ok(CommandResult::success(stdout, String::new(), Duration::ZERO))
        } else {
            Ok(CommandResult::failure(
                Some(exit_code),
                stdout,
                String::new(),
                Duration::ZERO,
            ))
        }
    }
}
