//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit tests.

#![allow(dead_code)]
#![allow(clippy::needless_pass_by_ref_mut)] // &mut self for ergonomics with RefCell

use crate::error::{Error, Result};
use crate::traits::{CommandLine, CommandOutput, CommandRequest, CommandRunner, VersionControl};
use std::cell::{Cell, RefCell};

/// A mock command runner for testing.
///
/// Records expected commands and their outputs, then verifies they were called.
/// Shell commands are matched as `sh -c <line>`.
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    expectations: RefCell<Vec<(String, Vec<String>, CommandOutput)>>,
    requests: RefCell<Vec<CommandRequest>>,
    call_index: RefCell<usize>,
}

impl MockCommandRunner {
    /// Create a new mock command runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expected command and its output.
    pub fn expect(&mut self, program: &str, args: &[&str], output: CommandOutput) {
        self.expectations.borrow_mut().push((
            program.to_string(),
            args.iter().map(|s| (*s).to_string()).collect(),
            output,
        ));
    }

    /// The requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<CommandRequest> {
        self.requests.borrow().clone()
    }

    /// Verify all expected commands were called.
    ///
    /// # Panics
    ///
    /// Panics if not all expected commands were called.
    pub fn verify(&self) {
        let index = *self.call_index.borrow();
        let expected = self.expectations.borrow().len();
        assert_eq!(
            index, expected,
            "Expected {expected} command calls, but only {index} were made"
        );
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, request: &CommandRequest) -> Result<CommandOutput> {
        let (program, args) = match &request.command {
            CommandLine::Shell(line) => ("sh".to_string(), vec!["-c".to_string(), line.clone()]),
            CommandLine::Args { program, args } => (program.clone(), args.clone()),
        };

        let mut index = self.call_index.borrow_mut();
        let expectations = self.expectations.borrow();

        assert!(
            *index < expectations.len(),
            "Unexpected command call: {program} {args:?} (no more expectations)"
        );

        let (exp_program, exp_args, output) = &expectations[*index];

        assert!(
            !(&program != exp_program || &args != exp_args),
            "Command mismatch at index {}:\n  Expected: {} {:?}\n  Got: {} {:?}",
            *index,
            exp_program,
            exp_args,
            program,
            args
        );

        *index += 1;
        self.requests.borrow_mut().push(request.clone());
        Ok(output.clone())
    }
}

/// A command runner that always fails to spawn, for testing error paths.
#[derive(Debug, Default)]
pub struct FailingCommandRunner {
    error_message: String,
}

impl FailingCommandRunner {
    /// Create a new failing command runner with the specified error message.
    #[must_use]
    pub fn new(error_message: impl Into<String>) -> Self {
        Self { error_message: error_message.into() }
    }
}

impl CommandRunner for FailingCommandRunner {
    fn run(&self, _request: &CommandRequest) -> Result<CommandOutput> {
        Err(std::io::Error::other(self.error_message.clone()).into())
    }
}

/// What a [`FakeVersionControl`] returns for the staged diff.
#[derive(Debug, Clone)]
enum FakeDiff {
    Text(String),
    Fails,
    TimesOut,
}

/// A scripted [`VersionControl`] that counts how often each query is made.
#[derive(Debug)]
pub struct FakeVersionControl {
    branch_ref: Option<String>,
    branch_times_out: bool,
    diff: FakeDiff,
    branch_reads: Cell<usize>,
    diff_reads: Cell<usize>,
}

impl FakeVersionControl {
    /// HEAD on `refs/heads/<branch>` with the given staged diff.
    #[must_use]
    pub fn on_branch(branch: &str, diff: &str) -> Self {
        Self::with_ref(Some(format!("refs/heads/{branch}")), diff)
    }

    /// Detached HEAD with the given staged diff.
    #[must_use]
    pub fn detached(diff: &str) -> Self {
        Self::with_ref(None, diff)
    }

    fn with_ref(branch_ref: Option<String>, diff: &str) -> Self {
        Self {
            branch_ref,
            branch_times_out: false,
            diff: FakeDiff::Text(diff.to_string()),
            branch_reads: Cell::new(0),
            diff_reads: Cell::new(0),
        }
    }

    /// Make the branch lookup time out.
    #[must_use]
    pub fn branch_times_out(mut self) -> Self {
        self.branch_times_out = true;
        self
    }

    /// Make the diff read fail as if git exited non-zero.
    #[must_use]
    pub fn diff_fails(mut self) -> Self {
        self.diff = FakeDiff::Fails;
        self
    }

    /// Make the diff read time out.
    #[must_use]
    pub fn diff_times_out(mut self) -> Self {
        self.diff = FakeDiff::TimesOut;
        self
    }

    /// How many times the branch reference was read.
    #[must_use]
    pub fn branch_reads(&self) -> usize {
        self.branch_reads.get()
    }

    /// How many times the staged diff was read.
    #[must_use]
    pub fn diff_reads(&self) -> usize {
        self.diff_reads.get()
    }
}

impl VersionControl for FakeVersionControl {
    fn current_branch_ref(&self) -> Result<Option<String>> {
        self.branch_reads.set(self.branch_reads.get() + 1);
        if self.branch_times_out {
            return Err(Error::CommandTimeout {
                command: "git symbolic-ref HEAD".to_string(),
                timeout_secs: 1,
            });
        }
        Ok(self.branch_ref.clone())
    }

    fn staged_diff(&self) -> Result<String> {
        self.diff_reads.set(self.diff_reads.get() + 1);
        match &self.diff {
            FakeDiff::Text(diff) => Ok(diff.clone()),
            FakeDiff::Fails => Err(Error::CommandFailed {
                command: "git diff --cached".to_string(),
                exit_code: 128,
                stdout: String::new(),
                stderr: "fatal: bad revision".to_string(),
            }),
            FakeDiff::TimesOut => Err(Error::CommandTimeout {
                command: "git diff --cached".to_string(),
                timeout_secs: 1,
            }),
        }
    }
}
