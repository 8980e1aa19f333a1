//! # snekcheck - keep every filename snake_case
//!
//! snekcheck walks directory trees and checks that each file and directory
//! name is snake_case, or a SCREAMING_SNAKE_CASE name with a snake_case
//! extension (`README.md`, `LICENSE`). Anything Git ignores is skipped
//! without being visited. In fix mode invalid names are renamed.
//!
//! ## Quick Start
//!
//! ```bash
//! # Report invalid names below the current directory
//! snekcheck .
//!
//! # Rename them
//! snekcheck --fix .
//! ```
//!
//! ## Layout
//!
//! - [`naming`]: naming conventions and the filename rule
//! - [`files`]: file system access and the lazy tree walk
//! - [`git`]: Git ignore rules and exclude-file discovery
//! - [`lint`]: the linter tying them together
//! - [`config`] and [`cli`]: the command-line front end

pub mod cli;
pub mod config;
pub mod files;
pub mod git;
pub mod lint;
pub mod naming;

pub use config::SnekcheckConfig;
pub use lint::{LintSummary, Linter, Outcome};

/// Result type alias for snekcheck operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
