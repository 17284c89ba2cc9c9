//! Marker detection in added lines.

use crate::error::{Error, Result};
use crate::git::AddedLine;
use regex::{Regex, RegexBuilder};

/// The marker blocked when none is configured.
pub const DEFAULT_MARKER: &str = "FIXME";

/// Case-insensitive substring matcher for a marker.
///
/// Matching is plain text over the line: a marker inside a string literal
/// counts the same as one inside a comment.
#[derive(Debug, Clone)]
pub struct MarkerMatcher {
    marker: String,
    pattern: Regex,
}

impl MarkerMatcher {
    /// Build a matcher for the literal `marker` text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the marker is empty or only whitespace.
    pub fn new(marker: &str) -> Result<Self> {
        let marker = marker.trim();
        if marker.is_empty() {
            return Err(Error::Config("marker must not be empty".to_string()));
        }
        let pattern = RegexBuilder::new(&regex::escape(marker)).case_insensitive(true).build()?;
        Ok(Self { marker: marker.to_string(), pattern })
    }

    /// The marker text as configured.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Check a single piece of text.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// The added lines containing the marker, in diff order.
    #[must_use]
    pub fn scan(&self, added_lines: &[AddedLine]) -> Vec<AddedLine> {
        added_lines.iter().filter(|line| self.is_match(&line.content)).cloned().collect()
    }
}

impl Default for MarkerMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER).expect("default marker is valid")
    }
}
