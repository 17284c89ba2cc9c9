//! Git operations module.

mod diff;

pub use diff::{parse_diff, AddedLine};

use crate::error::{Error, Result};
use crate::traits::{CommandLine, CommandRequest, CommandRunner, VersionControl, WorkingDir};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for reading the staged diff.
///
/// Prefixes are pinned so `diff.noprefix` and `diff.mnemonicPrefix` in the
/// user's config cannot change the headers [`parse_diff`] sees.
pub const STAGED_DIFF_ARGS: &[&str] = &[
    "diff",
    "--cached",
    "--no-color",
    "--no-ext-diff",
    "--src-prefix=a/",
    "--dst-prefix=b/",
];

/// Arguments for locating the repository's git directory.
pub const GIT_DIR_ARGS: &[&str] = &["rev-parse", "--absolute-git-dir"];

/// Recover the branch name from a symbolic reference.
///
/// Everything after the leading `refs/heads/` is kept, so nested names like
/// `release/2024-01` survive intact.
#[must_use]
pub fn branch_name_from_ref(reference: &str) -> String {
    reference.trim().split('/').skip(2).collect::<Vec<_>>().join("/")
}

/// [`VersionControl`] backed by the `git` binary.
pub struct GitClient<'a> {
    runner: &'a dyn CommandRunner,
    repo_dir: Option<WorkingDir>,
    timeout: Option<Duration>,
}

impl<'a> GitClient<'a> {
    /// A client running git in the current directory.
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner, repo_dir: None, timeout: None }
    }

    /// Run git in the given directory.
    #[must_use]
    pub fn in_dir(mut self, repo_dir: impl Into<WorkingDir>) -> Self {
        self.repo_dir = Some(repo_dir.into());
        self
    }

    /// Apply a timeout to every git invocation.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn request(&self, args: &[&str]) -> CommandRequest {
        let mut request =
            CommandRequest::new(CommandLine::args("git", args)).capture_output().timeout(self.timeout);
        if let Some(dir) = &self.repo_dir {
            request = request.in_dir(dir.clone());
        }
        request
    }

    fn stdout(&self, args: &[&str]) -> Result<String> {
        let captured = self.runner.run_checked(&self.request(args))?;
        Ok(captured.map(|out| out.stdout.as_text()).unwrap_or_default())
    }

    /// The absolute path of the repository's `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be run or the directory is not a
    /// repository.
    pub fn git_dir(&self) -> Result<PathBuf> {
        self.stdout(GIT_DIR_ARGS).map(PathBuf::from)
    }
}

impl VersionControl for GitClient<'_> {
    fn current_branch_ref(&self) -> Result<Option<String>> {
        match self.stdout(&["symbolic-ref", "HEAD"]) {
            Ok(reference) => Ok(Some(reference)),
            // Detached HEAD or not a repository.
            Err(Error::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn staged_diff(&self) -> Result<String> {
        self.stdout(STAGED_DIFF_ARGS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingCommandRunner, MockCommandRunner};
    use crate::traits::CommandOutput;

    #[test]
    fn test_branch_name_from_ref() {
        assert_eq!(branch_name_from_ref("refs/heads/main"), "main");
        assert_eq!(branch_name_from_ref("refs/heads/release/2024-01"), "release/2024-01");
        assert_eq!(branch_name_from_ref("refs/heads/a/b/c\n"), "a/b/c");
        assert_eq!(branch_name_from_ref("HEAD"), "");
    }

    #[test]
    fn test_current_branch_ref() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["symbolic-ref", "HEAD"], CommandOutput::text(0, "refs/heads/main\n", ""));

        let git = GitClient::new(&runner);
        assert_eq!(git.current_branch_ref().unwrap().as_deref(), Some("refs/heads/main"));
        runner.verify();
    }

    #[test]
    fn test_current_branch_ref_detached() {
        let mut runner = MockCommandRunner::new();
        runner.expect(
            "git",
            &["symbolic-ref", "HEAD"],
            CommandOutput::text(128, "", "fatal: ref HEAD is not a symbolic ref"),
        );

        let git = GitClient::new(&runner);
        assert_eq!(git.current_branch_ref().unwrap(), None);
    }

    #[test]
    fn test_current_branch_ref_spawn_failure_propagates() {
        let runner = FailingCommandRunner::new("git not found");
        let git = GitClient::new(&runner);
        assert!(matches!(git.current_branch_ref(), Err(Error::Io(_))));
    }

    #[test]
    fn test_staged_diff() {
        let mut runner = MockCommandRunner::new();
        runner.expect(
            "git",
            STAGED_DIFF_ARGS,
            CommandOutput::text(0, "diff --git a/x b/x\n+new\n\n", ""),
        );

        let git = GitClient::new(&runner);
        assert_eq!(git.staged_diff().unwrap(), "diff --git a/x b/x\n+new");
    }

    #[test]
    fn test_staged_diff_failure_propagates() {
        let mut runner = MockCommandRunner::new();
        runner.expect(
            "git",
            STAGED_DIFF_ARGS,
            CommandOutput::text(129, "", "usage: git diff"),
        );

        let git = GitClient::new(&runner);
        assert!(matches!(git.staged_diff(), Err(Error::CommandFailed { exit_code: 129, .. })));
    }

    #[test]
    fn test_requests_carry_dir_and_timeout() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["symbolic-ref", "HEAD"], CommandOutput::text(0, "refs/heads/x", ""));

        let git = GitClient::new(&runner)
            .in_dir("some/repo")
            .with_timeout(Some(Duration::from_secs(9)));
        git.current_branch_ref().unwrap();

        let requests = runner.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].cwd, Some(WorkingDir::Verbatim("some/repo".to_string())));
        assert_eq!(requests[0].timeout, Some(Duration::from_secs(9)));
        assert!(requests[0].capture);
    }

    #[test]
    fn test_staged_diff_pins_prefixes() {
        assert!(STAGED_DIFF_ARGS.contains(&"--src-prefix=a/"));
        assert!(STAGED_DIFF_ARGS.contains(&"--dst-prefix=b/"));
    }

    #[test]
    fn test_git_dir() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", GIT_DIR_ARGS, CommandOutput::text(0, "/work/repo/.git\n", ""));

        let git = GitClient::new(&runner);
        assert_eq!(git.git_dir().unwrap(), PathBuf::from("/work/repo/.git"));
    }

    #[test]
    fn test_git_dir_outside_repository() {
        let mut runner = MockCommandRunner::new();
        runner.expect(
            "git",
            GIT_DIR_ARGS,
            CommandOutput::text(128, "", "fatal: not a git repository"),
        );

        let git = GitClient::new(&runner);
        assert!(matches!(git.git_dir(), Err(Error::CommandFailed { .. })));
    }
}
