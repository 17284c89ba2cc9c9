//! Pre-commit hook blocking marker comments on protected branches.
//!
//! The branch check always runs first. Only when HEAD is on a protected
//! branch is the staged diff read and scanned for the marker.

use crate::error::Result;
use crate::git::{self, AddedLine};
use crate::hooks::{ProtectedBranches, Verdict};
use crate::marker::MarkerMatcher;
use crate::traits::VersionControl;

/// Configuration for the no-fixme hook.
#[derive(Debug, Clone, Default)]
pub struct NoFixmeConfig {
    /// Branches the rule applies to.
    pub protected: ProtectedBranches,
    /// The marker to look for.
    pub matcher: MarkerMatcher,
}

/// Result of running the no-fixme hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoFixmeResult {
    /// The current branch, or `None` when HEAD is detached.
    pub branch: Option<String>,
    /// Whether the current branch is protected.
    pub on_protected_branch: bool,
    /// The decision.
    pub verdict: Verdict,
}

/// The current branch, and whether it is protected.
fn branch_status(
    vcs: &dyn VersionControl,
    protected: &ProtectedBranches,
) -> Result<(Option<String>, bool)> {
    let branch = vcs.current_branch_ref()?.map(|reference| git::branch_name_from_ref(&reference));
    let on_protected_branch = branch.as_deref().is_some_and(|b| protected.contains(b));
    Ok((branch, on_protected_branch))
}

/// Check whether HEAD is on one of the protected branches.
///
/// A detached HEAD, or a directory that is not a repository, counts as "not
/// protected".
///
/// # Errors
///
/// Returns an error if git cannot be run or times out.
pub fn is_on_protected_branch(
    vcs: &dyn VersionControl,
    protected: &ProtectedBranches,
) -> Result<bool> {
    branch_status(vcs, protected).map(|(_, on_protected_branch)| on_protected_branch)
}

/// The staged added lines that contain the marker.
///
/// # Errors
///
/// Returns an error if the staged diff cannot be read.
pub fn find_marker_lines(
    vcs: &dyn VersionControl,
    matcher: &MarkerMatcher,
) -> Result<Vec<AddedLine>> {
    let diff = vcs.staged_diff()?;
    Ok(matcher.scan(&git::parse_diff(&diff)))
}

/// Run the no-fixme hook.
///
/// # Errors
///
/// Returns an error if git cannot be run, times out, or fails while
/// producing the staged diff.
pub fn run_no_fixme_hook(vcs: &dyn VersionControl, config: &NoFixmeConfig) -> Result<NoFixmeResult> {
    let (branch, on_protected_branch) = branch_status(vcs, &config.protected)?;

    if !on_protected_branch {
        return Ok(NoFixmeResult { branch, on_protected_branch, verdict: Verdict::Allow });
    }

    let matches = find_marker_lines(vcs, &config.matcher)?;
    let verdict = if matches.is_empty() { Verdict::Allow } else { Verdict::Blocked(matches) };
    Ok(NoFixmeResult { branch, on_protected_branch, verdict })
}
