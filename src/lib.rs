//! # `no_fixme_hook`
//!
//! A git pre-commit hook that blocks commits adding FIXME markers to
//! protected branches.

#[cfg(feature = "cli")]
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod git;
pub mod hook_logging;
pub mod hooks;
pub mod marker;
pub mod output;
pub mod testing;
pub mod traits;

pub use command::RealCommandRunner;
pub use error::{Error, Result};
pub use traits::{CommandRunner, VersionControl};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
