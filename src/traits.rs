//! Core traits for testability and abstraction.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// A command string interpreted by `sh -c`.
    Shell(String),
    /// A program and its arguments, executed without a shell.
    Args {
        /// The program to run.
        program: String,
        /// The arguments to pass.
        args: Vec<String>,
    },
}

impl CommandLine {
    /// A command string to be run through the shell.
    #[must_use]
    pub fn shell(command: impl Into<String>) -> Self {
        Self::Shell(command.into())
    }

    /// A program with arguments, run without a shell.
    #[must_use]
    pub fn args(program: &str, args: &[&str]) -> Self {
        Self::Args {
            program: program.to_string(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shell(command) => f.write_str(command),
            Self::Args { program, args } => {
                f.write_str(program)?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
        }
    }
}

/// Working directory for a command.
///
/// Structured paths are canonicalized before the command is spawned; plain
/// strings are handed to the process unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkingDir {
    /// A path resolved to its absolute canonical form.
    Path(PathBuf),
    /// A string passed through as-is.
    Verbatim(String),
}

impl WorkingDir {
    /// The directory to hand to the child process.
    ///
    /// # Errors
    ///
    /// Returns an error if a structured path cannot be canonicalized.
    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            Self::Path(path) => Ok(path.canonicalize()?),
            Self::Verbatim(dir) => Ok(PathBuf::from(dir)),
        }
    }
}

impl From<PathBuf> for WorkingDir {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for WorkingDir {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<String> for WorkingDir {
    fn from(dir: String) -> Self {
        Self::Verbatim(dir)
    }
}

impl From<&str> for WorkingDir {
    fn from(dir: &str) -> Self {
        Self::Verbatim(dir.to_string())
    }
}

/// Everything needed to run one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// The command line.
    pub command: CommandLine,
    /// Working directory, or the current directory if `None`.
    pub cwd: Option<WorkingDir>,
    /// Variables overlaid on the inherited environment.
    pub extra_env: BTreeMap<String, String>,
    /// Whether stdout and stderr are captured. Uncaptured streams are inherited.
    pub capture: bool,
    /// Whether captured output is decoded as text rather than kept as bytes.
    pub text: bool,
    /// Kill the command if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl CommandRequest {
    /// A request with no capture, text mode, no timeout and no overrides.
    #[must_use]
    pub fn new(command: CommandLine) -> Self {
        Self {
            command,
            cwd: None,
            extra_env: BTreeMap::new(),
            capture: false,
            text: true,
            timeout: None,
        }
    }

    /// Run in the given working directory.
    #[must_use]
    pub fn in_dir(mut self, cwd: impl Into<WorkingDir>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set an extra environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.insert(key.into(), value.into());
        self
    }

    /// Capture stdout and stderr.
    #[must_use]
    pub fn capture_output(mut self) -> Self {
        self.capture = true;
        self
    }

    /// Keep captured output as raw bytes.
    #[must_use]
    pub fn bytes(mut self) -> Self {
        self.text = false;
        self
    }

    /// Set (or clear) the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Raw output from a command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// The exit code of the command, -1 if killed by a signal.
    pub exit_code: i32,
    /// The stdout output, empty when not captured.
    pub stdout: Vec<u8>,
    /// The stderr output, empty when not captured.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Build an output from text streams.
    #[must_use]
    pub fn text(exit_code: i32, stdout: &str, stderr: &str) -> Self {
        Self { exit_code, stdout: stdout.as_bytes().to_vec(), stderr: stderr.as_bytes().to_vec() }
    }

    /// Check if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout decoded as UTF-8, lossily.
    #[must_use]
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Stderr decoded as UTF-8, lossily.
    #[must_use]
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// One captured output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stream {
    /// Output decoded as text.
    Text(String),
    /// Output kept as bytes.
    Bytes(Vec<u8>),
}

impl Stream {
    fn trimmed(raw: Vec<u8>, text: bool) -> Self {
        if text {
            Self::Text(String::from_utf8_lossy(&raw).trim_end().to_string())
        } else {
            let end = raw.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(0, |i| i + 1);
            let mut raw = raw;
            raw.truncate(end);
            Self::Bytes(raw)
        }
    }

    /// The stream as text, decoding bytes lossily.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// Output of a successful, captured command, trimmed of trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    /// The trimmed stdout.
    pub stdout: Stream,
    /// The trimmed stderr.
    pub stderr: Stream,
}

impl CapturedOutput {
    /// Trim the raw output and decode it according to `text`.
    #[must_use]
    pub fn from_raw(output: CommandOutput, text: bool) -> Self {
        Self {
            stdout: Stream::trimmed(output.stdout, text),
            stderr: Stream::trimmed(output.stderr, text),
        }
    }
}

/// Trait for running external commands.
///
/// This trait abstracts command execution for testability.
pub trait CommandRunner {
    /// Run a command and wait for it to finish.
    ///
    /// A non-zero exit status is reported through [`CommandOutput::exit_code`],
    /// not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned, or
    /// [`Error::CommandTimeout`] if it outlives the request's timeout.
    fn run(&self, request: &CommandRequest) -> Result<CommandOutput>;

    /// Run a command, failing on a non-zero exit status.
    ///
    /// Returns the trimmed output if capture was requested, `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandFailed`] on a non-zero exit status, plus
    /// anything [`CommandRunner::run`] returns.
    fn run_checked(&self, request: &CommandRequest) -> Result<Option<CapturedOutput>> {
        let output = self.run(request)?;
        if !output.success() {
            return Err(Error::CommandFailed {
                command: request.command.to_string(),
                exit_code: output.exit_code,
                stdout: output.stdout_text(),
                stderr: output.stderr_text(),
            });
        }
        if request.capture {
            Ok(Some(CapturedOutput::from_raw(output, request.text)))
        } else {
            Ok(None)
        }
    }
}

/// Trait for the version-control queries the hook needs.
pub trait VersionControl {
    /// The symbolic reference HEAD points at, e.g. `refs/heads/main`.
    ///
    /// Returns `None` when HEAD is not on a branch (detached HEAD, or not a
    /// repository at all).
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be run or times out.
    fn current_branch_ref(&self) -> Result<Option<String>>;

    /// The unified diff of staged changes against HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool fails, cannot be run, or times out.
    fn staged_diff(&self) -> Result<String>;
}
