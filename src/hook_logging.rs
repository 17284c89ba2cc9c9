//! Debug hook event logging.
//!
//! When `debug_logging` is enabled in the project config, every hook run is
//! appended as a JSONL line to `no-fixme/hook-events.jsonl` inside the
//! repository's git directory, where it never shows up as an untracked file.
//! This allows debugging hook behavior by inspecting exactly what was decided
//! and why.

use crate::config::ProjectConfig;
use crate::error::Result;
use crate::hooks::{NoFixmeResult, Verdict};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directory for hook data, relative to the git directory.
pub const DATA_DIR_NAME: &str = "no-fixme";

/// Log file name within the data directory.
const HOOK_EVENTS_FILE: &str = "hook-events.jsonl";

/// Hook type recorded in each entry.
const HOOK_TYPE: &str = "pre-commit";

/// The data directory for a repository whose git directory is `git_dir`.
#[must_use]
pub fn project_data_dir(git_dir: &Path) -> PathBuf {
    git_dir.join(DATA_DIR_NAME)
}

/// Log a hook run if debug logging is enabled.
///
/// Errors are silently ignored: logging never changes the hook's outcome.
pub fn log_hook_event_in(git_dir: &Path, config: &ProjectConfig, outcome: &Result<NoFixmeResult>) {
    if !config.debug_logging {
        return;
    }
    write_hook_event(git_dir, &event_entry(outcome));
}

/// Build the JSON entry for one run.
fn event_entry(outcome: &Result<NoFixmeResult>) -> serde_json::Value {
    let timestamp = chrono::Utc::now().to_rfc3339();

    match outcome {
        Ok(result) => {
            let matches: Vec<serde_json::Value> = match &result.verdict {
                Verdict::Allow => Vec::new(),
                Verdict::Blocked(lines) => lines
                    .iter()
                    .map(|line| {
                        serde_json::json!({
                            "file": line.file,
                            "line_number": line.line_number,
                            "content": line.content,
                        })
                    })
                    .collect(),
            };
            serde_json::json!({
                "timestamp": timestamp,
                "hook_type": HOOK_TYPE,
                "branch": result.branch,
                "on_protected_branch": result.on_protected_branch,
                "verdict": result.verdict.name(),
                "matches": matches,
            })
        }
        Err(e) => serde_json::json!({
            "timestamp": timestamp,
            "hook_type": HOOK_TYPE,
            "verdict": "error",
            "error": e.to_string(),
        }),
    }
}

/// Append the entry to the log file.
fn write_hook_event(git_dir: &Path, entry: &serde_json::Value) {
    let data_dir = project_data_dir(git_dir);

    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let log_path = data_dir.join(HOOK_EVENTS_FILE);

    let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let _ = writeln!(file, "{entry}");
}
