//! Terminal formatting for hook messages.

use crate::git::AddedLine;

/// ANSI red.
pub const RED: &str = "\x1b[0;31m";
/// ANSI reset.
pub const NC: &str = "\x1b[0m";

/// Escape sequences used when formatting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Prefix for error text.
    pub error: &'static str,
    /// Suffix restoring the default style.
    pub reset: &'static str,
}

impl Palette {
    /// Colored output.
    pub const ANSI: Self = Self { error: RED, reset: NC };
    /// Uncolored output, for pipes and test capture.
    pub const PLAIN: Self = Self { error: "", reset: "" };

    /// Pick a palette from a color switch.
    #[must_use]
    pub const fn new(color: bool) -> Self {
        if color {
            Self::ANSI
        } else {
            Self::PLAIN
        }
    }
}

/// The lines printed when a commit is blocked: a highlighted header, a blank
/// line, then each offending diff line exactly as it appeared.
#[must_use]
pub fn block_message(marker: &str, lines: &[AddedLine], palette: Palette) -> Vec<String> {
    let mut out = vec![
        format!(
            "{}Error: Found {marker} in attempted commit.\n\
             Please remove all occurrences of {marker} before committing.{}",
            palette.error, palette.reset
        ),
        String::new(),
    ];
    out.extend(lines.iter().map(AddedLine::raw));
    out
}
