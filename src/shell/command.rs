//! Child process execution.
//!
//! Every external tool venvstrap drives (the interpreter, pip, the test
//! runner, the application) is started as a program plus an argument
//! vector. Nothing goes through a shell, so paths with spaces or quotes in
//! them need no escaping.

use crate::error::{Result, SetupError};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// How the child's stdout/stderr are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdioMode {
    /// Share the parent's terminal.
    #[default]
    Inherit,
    /// Capture into the [`CommandResult`].
    Capture,
}

/// A fully described child process invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// Executable to run.
    pub program: PathBuf,

    /// Arguments, excluding the program itself.
    pub args: Vec<OsString>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables set on top of the inherited environment.
    pub env: BTreeMap<String, OsString>,

    /// Environment variables removed from the inherited environment.
    pub env_remove: Vec<String>,

    /// Stdio wiring.
    pub stdio: StdioMode,
}

impl CommandSpec {
    /// Start a spec for `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Remove an environment variable.
    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    /// Capture output instead of inheriting the terminal.
    pub fn capture(mut self) -> Self {
        self.stdio = StdioMode::Capture;
        self
    }

    /// Human-readable command line, for messages and logs.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(char::is_whitespace) {
                parts.push(format!("\"{}\"", arg));
            } else {
                parts.push(arg.into_owned());
            }
        }
        parts.join(" ")
    }

    /// Argument at `index` as UTF-8, if present.
    pub fn arg_str(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(|a| a.to_str())
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        for key in &self.env_remove {
            cmd.env_remove(key);
        }

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> SetupError {
        SetupError::Spawn {
            program: self.program.to_string_lossy().into_owned(),
            source,
        }
    }
}

/// Result of executing a child process.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output (empty unless captured).
    pub stdout: String,

    /// Standard error (empty unless captured).
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the process exited with code 0.
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    fn from_status(
        status: std::process::ExitStatus,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        if status.success() {
            Self::success(stdout, stderr, duration)
        } else {
            Self::failure(status.code(), stdout, stderr, duration)
        }
    }

    /// Stdout followed by stderr, for version probes and error blocks.
    pub fn combined_output(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }

    /// Last `n` non-empty lines of the combined output.
    pub fn tail(&self, n: usize) -> String {
        let combined = self.combined_output();
        let lines: Vec<&str> = combined.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(n);
        lines[start..].join("\n")
    }
}

/// Output line from command execution.
#[derive(Debug, Clone)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Callback for streaming output.
pub type OutputCallback = Box<dyn Fn(OutputLine) + Send>;

/// Something that can run child processes.
///
/// The setup workflow only talks to processes through this trait, which
/// keeps it testable without a real Python on the machine.
pub trait ProcessRunner {
    /// Run a command to completion.
    ///
    /// A non-zero exit is reported in the [`CommandResult`]; only failing to
    /// start the process at all is an error.
    fn run(&mut self, spec: &CommandSpec) -> Result<CommandResult>;

    /// Run a command, feeding each output line to `callback` as it arrives.
    ///
    /// Output is captured regardless of `spec.stdio`. The default
    /// implementation runs captured and replays the lines afterwards.
    fn run_streaming(
        &mut self,
        spec: &CommandSpec,
        callback: OutputCallback,
    ) -> Result<CommandResult> {
        let captured = spec.clone().capture();
        let result = self.run(&captured)?;
        for line in result.stdout.lines() {
            callback(OutputLine::Stdout(line.to_string()));
        }
        for line in result.stderr.lines() {
            callback(OutputLine::Stderr(line.to_string()));
        }
        Ok(result)
    }
}

/// Runs commands on the real operating system.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<CommandResult> {
        tracing::debug!("Running: {}", spec.display());
        let start = Instant::now();
        let mut cmd = spec.to_command();

        match spec.stdio {
            StdioMode::Capture => {
                let output = cmd
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .map_err(|e| spec.spawn_error(e))?;

                Ok(CommandResult::from_status(
                    output.status,
                    String::from_utf8_lossy(&output.stdout).to_string(),
                    String::from_utf8_lossy(&output.stderr).to_string(),
                    start.elapsed(),
                ))
            }
            StdioMode::Inherit => {
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(|e| spec.spawn_error(e))?;

                Ok(CommandResult::from_status(
                    status,
                    String::new(),
                    String::new(),
                    start.elapsed(),
                ))
            }
        }
    }

    fn run_streaming(
        &mut self,
        spec: &CommandSpec,
        callback: OutputCallback,
    ) -> Result<CommandResult> {
        tracing::debug!("Running (streaming): {}", spec.display());
        let start = Instant::now();
        let mut cmd = spec.to_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| spec.spawn_error(e))?;

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(out), Some(err)) => (out, err),
            _ => {
                let _ = child.kill();
                return Err(anyhow::anyhow!("child process pipes unavailable").into());
            }
        };

        let (tx, rx) = mpsc::channel();
        let tx_stdout = tx.clone();
        let tx_stderr = tx;

        let stdout_handle = thread::spawn(move || {
            drain_lines(stdout, |line| {
                let _ = tx_stdout.send(OutputLine::Stdout(line));
            })
        });

        let stderr_handle = thread::spawn(move || {
            drain_lines(stderr, |line| {
                let _ = tx_stderr.send(OutputLine::Stderr(line));
            })
        });

        for line in rx {
            callback(line);
        }

        let stdout_output = stdout_handle.join().unwrap_or_default();
        let stderr_output = stderr_handle.join().unwrap_or_default();

        let status = child.wait().map_err(|e| spec.spawn_error(e))?;

        Ok(CommandResult::from_status(
            status,
            stdout_output,
            stderr_output,
            start.elapsed(),
        ))
    }
}

/// Read `source` to EOF, passing each line to `send` and returning all of it.
///
/// Undecodable bytes are replaced, never treated as the end of output: the
/// pipe must stay open until the child closes it.
fn drain_lines<R: Read>(source: R, send: impl Fn(String)) -> String {
    let mut reader = BufReader::new(source);
    let mut output = String::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let decoded = String::from_utf8_lossy(&buf);
                let line = decoded.trim_end_matches(['\n', '\r']);
                output.push_str(line);
                output.push('\n');
                send(line.to_string());
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!("Stopped reading child output: {}", e);
                break;
            }
        }
    }
    output
}

/// Build a spec that runs `program` inside `cwd` with captured output.
pub fn captured(program: &Path, cwd: &Path) -> CommandSpec {
    CommandSpec::new(program).current_dir(cwd).capture()
}
