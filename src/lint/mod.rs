//! Filename linting
//!
//! The [`Linter`] walks every root in turn, growing one shared
//! [`IgnoreSet`] as directories are reached, and hands one [`Outcome`] per
//! visited path to a [`Reporter`]. In fix mode invalid names are renamed on
//! the spot; the first rename that fails ends the run.

use crate::files::{FileSystem, TreePath, TreeWalk};
use crate::git::{self, IgnoreSet};
use crate::naming::{fixed_name, is_acceptable};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;

#[cfg(test)]
mod tests;

/// What happened to one visited path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Valid(TreePath),
    Invalid(TreePath),
    Fixed { from: TreePath, to: TreePath },
}

impl Outcome {
    /// Where the entry lives once the outcome is applied.
    pub fn path(&self) -> &TreePath {
        match self {
            Outcome::Valid(path) | Outcome::Invalid(path) => path,
            Outcome::Fixed { to, .. } => to,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Valid(_) => "VALID",
            Outcome::Invalid(_) => "INVALID",
            Outcome::Fixed { .. } => "FIXED",
        }
    }
}

/// Receives outcomes as they are produced
pub trait Reporter {
    fn report(&mut self, outcome: &Outcome) -> Result<()>;

    /// Called once after every root was linted.
    fn finish(&mut self, _summary: &LintSummary) -> Result<()> {
        Ok(())
    }
}

/// Outcome counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LintSummary {
    pub valid: usize,
    pub invalid: usize,
    pub fixed: usize,
}

impl LintSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Valid(_) => self.valid += 1,
            Outcome::Invalid(_) => self.invalid += 1,
            Outcome::Fixed { .. } => self.fixed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.fixed
    }

    /// Process exit status: 1 if any name was left invalid.
    pub fn exit_code(&self) -> u8 {
        if self.invalid > 0 { 1 } else { 0 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LintOptions {
    /// Rename invalid names
    pub fix: bool,
    /// Load the ignore files between a root's Git work tree and the root
    pub parent_rules: bool,
}

pub struct Linter<'fs, F: FileSystem + ?Sized> {
    fs: &'fs F,
    ignores: IgnoreSet,
    options: LintOptions,
}

impl<'fs, F: FileSystem + ?Sized> Linter<'fs, F> {
    pub fn new(fs: &'fs F, ignores: IgnoreSet, options: LintOptions) -> Self {
        Self { fs, ignores, options }
    }

    pub fn ignores(&self) -> &IgnoreSet {
        &self.ignores
    }

    /// Lints every root in order.
    ///
    /// Returns the counts on completion, or the first rename failure. The
    /// reporter is finished either way.
    pub fn run(&mut self, roots: &[TreePath], reporter: &mut dyn Reporter) -> Result<LintSummary> {
        let mut summary = LintSummary::default();

        for root in roots {
            tracing::info!("Linting {}", root);
            if self.options.parent_rules {
                self.load_parent_rules(root);
            }
            if let Err(error) = self.lint_root(root.clone(), reporter, &mut summary) {
                // Renames already done must still reach the report.
                if let Err(finish_error) = reporter.finish(&summary) {
                    tracing::warn!("Failed to finish report: {:#}", finish_error);
                }
                return Err(error);
            }
        }

        tracing::debug!(
            "Linted {} paths with {} ignore rules",
            summary.total(),
            self.ignores.len()
        );
        reporter.finish(&summary)?;
        Ok(summary)
    }

    fn lint_root(&mut self, root: TreePath, reporter: &mut dyn Reporter, summary: &mut LintSummary) -> Result<()> {
        let mut walker = TreeWalk::new(self.fs, root);

        while let Some(entry) = walker.next_with(|path, is_dir| !self.ignores.is_ignored(path, is_dir)) {
            let outcome = self.classify(entry.path)?;

            if entry.stat.is_dir {
                if let Outcome::Fixed { from, to } = &outcome {
                    walker.relocate(from, to.clone());
                }
                self.ignores.extend_from_dir(self.fs, outcome.path());
            }

            summary.record(&outcome);
            reporter.report(&outcome)?;
        }
        Ok(())
    }

    fn classify(&self, path: TreePath) -> Result<Outcome> {
        if is_acceptable(&path.base().to_string_lossy()) {
            return Ok(Outcome::Valid(path));
        }
        if !self.options.fix {
            return Ok(Outcome::Invalid(path));
        }

        let to = self.fix(&path)?;
        Ok(Outcome::Fixed { from: path, to })
    }

    /// Renames `path` to its fixed name.
    fn fix(&self, path: &TreePath) -> Result<TreePath> {
        let base = path.base().to_string_lossy();
        let Some(name) = fixed_name(&base) else {
            bail!("Cannot fix {}: no usable name remains after conversion", path);
        };

        let target = path.with_base(&name);
        let (from, to) = (path.to_path_buf(), target.to_path_buf());

        if self.target_taken(&to, &base, &name)? {
            bail!("Refusing to rename {} to {}: target already exists", path, target);
        }

        self.fs
            .rename(&from, &to)
            .with_context(|| format!("Failed to rename {} to {}", path, target))?;
        tracing::debug!("Renamed {} to {}", path, target);
        Ok(target)
    }

    /// Whether renaming `base` to `name` would replace another entry.
    ///
    /// On case-insensitive file systems a case-only target resolves to the
    /// source itself, so for those the parent listing decides.
    fn target_taken(&self, to: &Path, base: &str, name: &str) -> Result<bool> {
        if self.fs.stat(to).is_err() {
            return Ok(false);
        }
        if !base.eq_ignore_ascii_case(name) {
            return Ok(true);
        }

        let parent = to.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let entries = self
            .fs
            .read_dir(parent)
            .with_context(|| format!("Failed to list {}", parent.display()))?;
        Ok(entries.iter().any(|entry| entry.as_os_str() == OsStr::new(name)))
    }

    /// Reads the ignore files of the directories above `root`, down from the
    /// enclosing work tree.
    fn load_parent_rules(&mut self, root: &TreePath) {
        let Some(work_tree) = git::work_tree(&root.to_path_buf()) else {
            return;
        };
        tracing::debug!("{} is inside the work tree {}", root, work_tree.display());

        for dir in root.ancestors() {
            if dir.to_path_buf().starts_with(&work_tree) {
                self.ignores.extend_from_dir(self.fs, &dir);
            }
        }
    }
}
