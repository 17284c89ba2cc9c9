//! Error types for `no_fixme_hook`.

/// Errors that can occur while running the hook.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred, including failure to spawn a command.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The project config file could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regex error occurred.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A command exited with a non-zero status.
    #[error("Command '{command}' failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        /// The command that was run.
        command: String,
        /// The exit code, or -1 if the process was killed by a signal.
        exit_code: i32,
        /// The captured stdout, empty when output was not captured.
        stdout: String,
        /// The captured stderr, empty when output was not captured.
        stderr: String,
    },

    /// A command did not finish within its timeout.
    #[error("Command '{command}' timed out after {timeout_secs} seconds")]
    CommandTimeout {
        /// The command that was run.
        command: String,
        /// The timeout in seconds.
        timeout_secs: u64,
    },

    /// The configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
