//! Hook implementations for git.

mod no_fixme;

pub use no_fixme::{
    find_marker_lines, is_on_protected_branch, run_no_fixme_hook, NoFixmeConfig, NoFixmeResult,
};

use crate::git::AddedLine;
use std::collections::BTreeSet;

/// Branches protected when none are configured.
pub const DEFAULT_PROTECTED_BRANCHES: [&str; 2] = ["master", "main"];

/// The set of branch names on which markers block a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedBranches(BTreeSet<String>);

impl ProtectedBranches {
    /// Protect exactly the given names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Protect the given names, or the defaults if there are none.
    pub fn or_default<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let branches = Self::new(names);
        if branches.0.is_empty() {
            Self::default()
        } else {
            branches
        }
    }

    /// Whether `branch` is protected. Names must match exactly.
    #[must_use]
    pub fn contains(&self, branch: &str) -> bool {
        self.0.contains(branch)
    }

    /// The protected names, sorted.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for ProtectedBranches {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_BRANCHES)
    }
}

/// Outcome of the hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Let the commit through.
    Allow,
    /// Stop the commit; these staged lines carry the marker.
    Blocked(Vec<AddedLine>),
}

impl Verdict {
    /// Check if this verdict blocks the commit.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    /// Exit code for git: 0 allows the commit, 1 blocks it.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Allow => 0,
            Self::Blocked(_) => 1,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Blocked(_) => "blocked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_protected_branches() {
        let branches = ProtectedBranches::default();
        assert_eq!(branches.iter().collect::<Vec<_>>(), vec!["main", "master"]);
    }

    #[test]
    fn test_or_default_with_no_names() {
        let none: [&str; 0] = [];
        assert_eq!(ProtectedBranches::or_default(none), ProtectedBranches::default());
    }

    #[test]
    fn test_or_default_replaces_defaults() {
        let branches = ProtectedBranches::or_default(["foo", "bar", "foo"]);
        assert_eq!(branches.iter().collect::<Vec<_>>(), vec!["bar", "foo"]);
        assert!(!branches.contains("main"));
        assert!(!branches.contains("master"));
    }

    #[test]
    fn test_contains_is_exact() {
        let branches = ProtectedBranches::new(["release/2024-01"]);
        assert!(branches.contains("release/2024-01"));
        assert!(!branches.contains("release"));
        assert!(!branches.contains("2024-01"));
        assert!(!branches.contains("Release/2024-01"));
    }

    #[test]
    fn test_verdict_exit_codes() {
        assert_eq!(Verdict::Allow.exit_code(), 0);
        assert_eq!(Verdict::Blocked(vec![]).exit_code(), 1);
        assert!(!Verdict::Allow.is_blocked());
        assert_eq!(Verdict::Blocked(vec![]).name(), "blocked");
    }
}
