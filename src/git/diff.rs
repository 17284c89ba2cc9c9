//! Git diff parsing.

use once_cell::sync::Lazy;
use regex::Regex;

/// A line that was added in a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedLine {
    /// The file path.
    pub file: String,
    /// The line number in the new file.
    pub line_number: u32,
    /// The content of the line (without the leading '+').
    pub content: String,
}

impl AddedLine {
    /// The line as it appeared in the diff, with its leading '+'.
    #[must_use]
    pub fn raw(&self) -> String {
        format!("+{}", self.content)
    }
}

static HUNK_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@@ -\d+(?:,\d+)? \+(\d+)").expect("valid regex"));

/// Parse a unified diff and extract added lines.
///
/// Only lines inside a hunk count, so a `+++ b/path` file header is never
/// mistaken for an addition while an added line whose own text starts with
/// `++` still is. Every `diff --git` line ends the current hunk, whatever
/// prefixes or quoting git used for its paths.
pub fn parse_diff(diff: &str) -> Vec<AddedLine> {
    let mut added_lines = Vec::new();
    let mut current_file = String::new();
    let mut current_line_num: u32 = 0;
    let mut in_hunk = false;

    for line in diff.lines() {
        if let Some(paths) = line.strip_prefix("diff --git ") {
            current_file = header_path(paths);
            in_hunk = false;
        } else if let Some(caps) = HUNK_HEADER.captures(line) {
            current_line_num = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(1);
            in_hunk = true;
        } else if !in_hunk {
            // File header lines: index, mode changes, ---/+++.
            if let Some(path) = line.strip_prefix("+++ ") {
                if path != "/dev/null" {
                    current_file = new_side_path(path);
                }
            }
        } else if let Some(content) = line.strip_prefix('+') {
            added_lines.push(AddedLine {
                file: current_file.clone(),
                line_number: current_line_num,
                content: content.to_string(),
            });
            current_line_num += 1;
        } else if line.starts_with(' ') || line.is_empty() {
            current_line_num += 1;
        }
        // Removed lines and "\ No newline at end of file" leave the count alone.
    }

    added_lines
}

/// The new-side path from the rest of a `diff --git` line.
///
/// Unquoted paths containing " b/" are ambiguous here; the `+++` line that
/// follows settles them.
fn header_path(paths: &str) -> String {
    if paths.ends_with('"') {
        if let Some(start) = paths.rfind(" \"") {
            return new_side_path(&paths[start + 1..]);
        }
    }
    paths.rfind(" b/").map(|start| paths[start + 3..].to_string()).unwrap_or_default()
}

/// Strip quoting, the `b/` prefix and git's trailing tab from a new-side path.
fn new_side_path(path: &str) -> String {
    let path = unquote(path.trim_end_matches('\t'));
    match path.strip_prefix("b/") {
        Some(stripped) => stripped.to_string(),
        None => path,
    }
}

/// Undo git's C-style quoting of a path, e.g. `"caf\303\251"`.
///
/// Unquoted input is returned as is.
fn unquote(path: &str) -> String {
    let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes().peekable();
    while let Some(byte) = iter.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        match iter.next() {
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0c),
            Some(b'n') => bytes.push(b'\n'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'v') => bytes.push(0x0b),
            Some(digit @ b'0'..=b'7') => {
                let mut value = u16::from(digit - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(&next @ b'0'..=b'7') => {
                            value = value * 8 + u16::from(next - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(u8::try_from(value).unwrap_or(b'?'));
            }
            Some(other) => bytes.push(other),
            None => {}
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_diff() {
        let diff = r"diff --git a/src/lib.rs b/src/lib.rs
index 1234567..abcdefg 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,4 @@
 //! Library.
+// Added comment

 fn main() {}
";
        let added = parse_diff(diff);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].file, "src/lib.rs");
        assert_eq!(added[0].line_number, 2);
        assert_eq!(added[0].content, "// Added comment");
        assert_eq!(added[0].raw(), "+// Added comment");
    }

    #[test]
    fn test_parse_diff_multiple_files() {
        let diff = r"diff --git a/src/a.rs b/src/a.rs
--- a/src/a.rs
+++ b/src/a.rs
@@ -1 +1,2 @@
 line1
+line2
diff --git a/src/b.rs b/src/b.rs
--- a/src/b.rs
+++ b/src/b.rs
@@ -5 +5,2 @@
 line5
+line6
";
        let added = parse_diff(diff);
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].file, "src/a.rs");
        assert_eq!(added[0].line_number, 2);
        assert_eq!(added[1].file, "src/b.rs");
        assert_eq!(added[1].line_number, 6);
        assert_eq!(added[1].content, "line6");
    }

    #[test]
    fn test_parse_diff_multiple_hunks() {
        let diff = r"diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1 +1,2 @@
 first
+second
@@ -10 +11,2 @@
 tenth
+eleventh
";
        let added = parse_diff(diff);
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].line_number, 2);
        assert_eq!(added[1].line_number, 12);
    }

    #[test]
    fn test_parse_empty_diff() {
        assert!(parse_diff("").is_empty());
    }

    #[test]
    fn test_parse_diff_with_deletions_only() {
        let diff = r"diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,2 @@
 first
-second // FIXME
 third
";
        assert!(parse_diff(diff).is_empty());
    }

    #[test]
    fn test_file_header_is_not_an_addition() {
        let diff = r"diff --git a/FIXME.md b/FIXME.md
new file mode 100644
index 0000000..e69de29
--- /dev/null
+++ b/FIXME.md
@@ -0,0 +1 @@
+hello
";
        let added = parse_diff(diff);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].file, "FIXME.md");
        assert_eq!(added[0].content, "hello");
        assert_eq!(added[0].line_number, 1);
    }

    #[test]
    fn test_added_line_starting_with_plus_plus() {
        let diff = r"diff --git a/a.c b/a.c
--- a/a.c
+++ b/a.c
@@ -1 +1,2 @@
 int i;
+++i;
";
        let added = parse_diff(diff);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].content, "++i;");
    }

    #[test]
    fn test_no_newline_marker_does_not_shift_lines() {
        let diff = r"diff --git a/a.txt b/a.txt
--- a/a.txt
+++ b/a.txt
@@ -1 +1,2 @@
 one
\ No newline at end of file
+two
";
        let added = parse_diff(diff);
        assert_eq!(added[0].line_number, 2);
    }

    #[test]
    fn test_quoted_path_header_ends_previous_hunk() {
        let diff = r#"diff --git a/a.txt b/a.txt
--- a/a.txt
+++ b/a.txt
@@ -1,2 +1,3 @@
 one
 two
+three
diff --git "a/fixme-\303\251.txt" "b/fixme-\303\251.txt"
new file mode 100644
index 0000000..3f2ad5c
--- /dev/null
+++ "b/fixme-\303\251.txt"
@@ -0,0 +1 @@
+clean
"#;
        let added = parse_diff(diff);
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].file, "a.txt");
        assert_eq!(added[0].content, "three");
        assert_eq!(added[1].file, "fixme-\u{e9}.txt");
        assert_eq!(added[1].content, "clean");
        assert_eq!(added[1].line_number, 1);
    }

    #[test]
    fn test_unusual_prefixes_end_previous_hunk() {
        let diff = r"diff --git c/a.txt i/a.txt
--- c/a.txt
+++ i/a.txt
@@ -1 +1,2 @@
 one
+two
diff --git c/fixme.txt i/fixme.txt
new file mode 100644
--- /dev/null
+++ i/fixme.txt
@@ -0,0 +1 @@
+clean
";
        let added = parse_diff(diff);
        let contents: Vec<&str> = added.iter().map(|l| l.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "clean"]);
        assert!(added[1].file.ends_with("fixme.txt"));
    }

    #[test]
    fn test_deleted_file_keeps_header_path() {
        let diff = r"diff --git a/old.txt b/old.txt
deleted file mode 100644
--- a/old.txt
+++ /dev/null
@@ -1 +0,0 @@
-FIXME
diff --git a/new.txt b/new.txt
--- a/new.txt
+++ b/new.txt
@@ -1 +1,2 @@
 x
+y
";
        let added = parse_diff(diff);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].file, "new.txt");
    }

    #[test]
    fn test_path_with_space_has_trailing_tab() {
        let diff = "diff --git a/my file.txt b/my file.txt\n--- a/my file.txt\t\n+++ b/my file.txt\t\n@@ -0,0 +1 @@\n+x\n";
        assert_eq!(parse_diff(diff)[0].file, "my file.txt");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("plain.txt"), "plain.txt");
        assert_eq!(unquote(r#""caf\303\251.txt""#), "caf\u{e9}.txt");
        assert_eq!(unquote(r#""say \"hi\".txt""#), "say \"hi\".txt");
        assert_eq!(unquote(r#""tab\there""#), "tab\there");
        assert_eq!(unquote(r#""back\\slash""#), "back\\slash");
    }
}
