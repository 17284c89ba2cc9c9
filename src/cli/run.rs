//! Hook execution for the CLI.
//!
//! This module runs the hook and turns its verdict, or its failure, into
//! output lines and an exit code.

use crate::cli::Cli;
use crate::command::RealCommandRunner;
use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::git::GitClient;
use crate::hook_logging;
use crate::hooks::{run_no_fixme_hook, NoFixmeConfig, Verdict};
use crate::marker::MarkerMatcher;
use crate::output::{self, Palette};
use crate::traits::CommandRunner;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// How a run ended, as seen by git.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookExit {
    /// The commit may proceed.
    Allowed,
    /// A marker was found on a protected branch.
    BlockedByMarker,
    /// Malformed arguments or configuration.
    ArgumentError,
    /// git could not be run or failed unexpectedly.
    ToolInvocationFailed,
    /// git did not answer in time.
    Timeout,
}

impl HookExit {
    /// The process exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Allowed => 0,
            Self::BlockedByMarker => 1,
            Self::ArgumentError => 2,
            Self::ToolInvocationFailed => 3,
            Self::Timeout => 4,
        }
    }

    /// Classify an error that stopped the hook.
    #[must_use]
    pub const fn from_error(error: &Error) -> Self {
        match error {
            Error::CommandTimeout { .. } => Self::Timeout,
            Error::Config(_) | Error::Yaml(_) | Error::Regex(_) => Self::ArgumentError,
            Error::Io(_) | Error::CommandFailed { .. } => Self::ToolInvocationFailed,
        }
    }
}

impl From<HookExit> for ExitCode {
    fn from(exit: HookExit) -> Self {
        Self::from(exit.code())
    }
}

/// Run the hook with the real git binary.
#[must_use]
pub fn run(cli: &Cli) -> CliOutput {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    run_with_runner(cli, &RealCommandRunner::new(), no_color_env)
}

/// Run the hook with the given command runner.
///
/// `no_color_env` reports whether `NO_COLOR` is set in the environment.
#[must_use]
pub fn run_with_runner(cli: &Cli, runner: &dyn CommandRunner, no_color_env: bool) -> CliOutput {
    let base_dir = cli.repo.clone().unwrap_or_else(|| PathBuf::from("."));

    let project_config = match load_config(cli, &base_dir) {
        Ok(config) => config,
        Err(e) => return failure(&format!("Error loading config: {e}"), &e),
    };

    let matcher = match MarkerMatcher::new(project_config.marker(cli.marker.as_deref())) {
        Ok(matcher) => matcher,
        Err(e) => return failure(&e.to_string(), &e),
    };

    let hook_config =
        NoFixmeConfig { protected: project_config.protected_branches(&cli.branches), matcher };

    let mut git = GitClient::new(runner).with_timeout(project_config.timeout(cli.timeout));
    if let Some(repo) = &cli.repo {
        git = git.in_dir(repo.as_path());
    }

    let outcome = run_no_fixme_hook(&git, &hook_config);
    if project_config.debug_logging {
        // Outside a repository there is nowhere to log to.
        if let Ok(git_dir) = git.git_dir() {
            hook_logging::log_hook_event_in(&git_dir, &project_config, &outcome);
        }
    }

    match outcome {
        Ok(result) => match result.verdict {
            Verdict::Allow => CliOutput {
                exit_code: HookExit::Allowed.into(),
                stdout: vec![],
                stderr: vec![],
            },
            Verdict::Blocked(lines) => {
                let color = project_config.color && !cli.no_color && !no_color_env;
                CliOutput {
                    exit_code: HookExit::BlockedByMarker.into(),
                    stdout: output::block_message(
                        hook_config.matcher.marker(),
                        &lines,
                        Palette::new(color),
                    ),
                    stderr: vec![],
                }
            }
        },
        Err(e) => failure(&format!("Error running pre-commit hook: {e}"), &e),
    }
}

fn load_config(cli: &Cli, base_dir: &Path) -> Result<ProjectConfig> {
    match &cli.config {
        Some(path) => ProjectConfig::load_file(path)?.ok_or_else(|| {
            Error::Config(format!("config file not found: {}", path.display()))
        }),
        None => Ok(ProjectConfig::load_from(base_dir)?.unwrap_or_default()),
    }
}

fn failure(message: &str, error: &Error) -> CliOutput {
    CliOutput {
        exit_code: HookExit::from_error(error).into(),
        stdout: vec![],
        stderr: vec![message.to_string()],
    }
}
