//! Command-line interface for the no-fixme hook.
//!
//! git runs the hook with no arguments; every flag here is optional and
//! only needed to override the project config.

mod run;


pub use run::{run, run_with_runner, CliOutput, HookExit};

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Block commits that add FIXME markers to protected branches.
///
/// Install as `.git/hooks/pre-commit`. Commits to branches outside the
/// protected set are never checked. To bypass the hook, commit with
/// `--no-verify`.
#[derive(Parser, Debug, Default, Clone, PartialEq, Eq)]
#[command(name = "no-fixme")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Branch to disallow markers on, may be specified multiple times.
    /// Replaces the default of `master` and `main`.
    #[arg(short, long = "branch", value_name = "BRANCH")]
    pub branches: Vec<String>,

    /// Marker text to block (case-insensitive).
    #[arg(short, long, value_name = "TEXT")]
    pub marker: Option<String>,

    /// Config file to use instead of `.no-fixme.yaml` in the repository.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print messages without ANSI colors.
    #[arg(long)]
    pub no_color: bool,

    /// Give up on any single git command after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Run as if started in this directory.
    #[arg(short = 'C', long = "repo", value_name = "DIR")]
    pub repo: Option<PathBuf>,
}

/// Parse command-line arguments, including the program name.
///
/// # Errors
///
/// Returns the clap error for malformed arguments, or for `--help` and
/// `--version`, which clap reports as errors that print to stdout.
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}
