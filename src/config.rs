//! Configuration management for no-fixme-hook.
//!
//! This module handles the `.no-fixme.yaml` file which stores
//! project-specific settings for the hook. Every setting is optional; the
//! command line takes precedence over the file.

use crate::error::Result;
use crate::hooks::ProtectedBranches;
use crate::marker::DEFAULT_MARKER;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file path relative to the repository root.
pub const CONFIG_FILE_PATH: &str = ".no-fixme.yaml";

const fn default_color() -> bool {
    true
}

/// Project configuration for the hook.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Branches to protect. `None` means the built-in defaults.
    #[serde(default)]
    pub protected_branches: Option<Vec<String>>,

    /// The marker text to block. `None` means `FIXME`.
    #[serde(default)]
    pub marker: Option<String>,

    /// Whether the block message is colored.
    #[serde(default = "default_color")]
    pub color: bool,

    /// Timeout for each git invocation, in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Whether each run is appended to the hook event log.
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            protected_branches: None,
            marker: None,
            color: default_color(),
            timeout_secs: None,
            debug_logging: false,
        }
    }
}

impl ProjectConfig {
    /// Load config from a specific base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(base_dir: &Path) -> Result<Option<Self>> {
        Self::load_file(&Self::config_path(base_dir))
    }

    /// Load config from an explicit file path, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_file(config_path: &Path) -> Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path)?;
        // An empty file deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Some(Self::default()));
        }
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Get the config file path for a base directory.
    pub fn config_path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE_PATH)
    }

    /// The protected branches, with `cli_branches` taking precedence.
    ///
    /// Falls back to the file's list, then to the defaults. An empty list in
    /// either place counts as unset.
    #[must_use]
    pub fn protected_branches(&self, cli_branches: &[String]) -> ProtectedBranches {
        if !cli_branches.is_empty() {
            return ProtectedBranches::new(cli_branches.iter().cloned());
        }
        ProtectedBranches::or_default(self.protected_branches.iter().flatten().cloned())
    }

    /// The marker text, with `cli_marker` taking precedence.
    #[must_use]
    pub fn marker<'a>(&'a self, cli_marker: Option<&'a str>) -> &'a str {
        cli_marker.or(self.marker.as_deref()).unwrap_or(DEFAULT_MARKER)
    }

    /// The git timeout, with `cli_secs` taking precedence.
    #[must_use]
    pub fn timeout(&self, cli_secs: Option<u64>) -> Option<Duration> {
        cli_secs.or(self.timeout_secs).map(Duration::from_secs)
    }
}
