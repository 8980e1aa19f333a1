//! Output for the snekcheck CLI
//!
//! Text results go to stderr as one styled line per path; JSON results go to
//! stdout as a single document once the run is over. Diagnostics that are
//! not results go through [`Output`].

use crate::lint::{LintSummary, Outcome, Reporter};
use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use std::io::{self, Write};

/// Handler for messages that are not lint results
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        // Errors are always shown, even in quiet mode
        eprintln!("{} {}", style("✖").red().for_stderr(), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("⚠").yellow().for_stderr(), message);
        }
    }
}

/// Writes one line per outcome
pub struct TextReporter<W: Write> {
    out: W,
    show_valid: bool,
}

impl TextReporter<io::Stderr> {
    pub fn stderr(show_valid: bool) -> Self {
        Self::new(io::stderr(), show_valid)
    }
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W, show_valid: bool) -> Self {
        Self { out, show_valid }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report(&mut self, outcome: &Outcome) -> Result<()> {
        let line = match outcome {
            Outcome::Valid(_) if !self.show_valid => return Ok(()),
            Outcome::Valid(path) => format!("{} {}", style("VALID").green().bold().for_stderr(), path),
            Outcome::Invalid(path) => format!("{} {}", style("INVALID").red().bold().for_stderr(), path),
            Outcome::Fixed { from, to } => format!(
                "{} {} {} {}",
                style("FIXED").yellow().bold().for_stderr(),
                from,
                style("->").dim().for_stderr(),
                to
            ),
        };
        writeln!(self.out, "{line}").context("Failed to write report")
    }

    fn finish(&mut self, summary: &LintSummary) -> Result<()> {
        tracing::info!(
            "{} valid, {} invalid, {} fixed",
            summary.valid,
            summary.invalid,
            summary.fixed
        );
        self.out.flush().context("Failed to write report")
    }
}

#[derive(Debug, Serialize)]
struct JsonResult {
    status: &'static str,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summary: &'a LintSummary,
    results: &'a [JsonResult],
}

/// Collects outcomes and writes them as one JSON document
pub struct JsonReporter<W: Write> {
    out: W,
    show_valid: bool,
    results: Vec<JsonResult>,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout(show_valid: bool) -> Self {
        Self::new(io::stdout(), show_valid)
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W, show_valid: bool) -> Self {
        Self {
            out,
            show_valid,
            results: Vec::new(),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, outcome: &Outcome) -> Result<()> {
        if matches!(outcome, Outcome::Valid(_)) && !self.show_valid {
            return Ok(());
        }
        let from = match outcome {
            Outcome::Fixed { from, .. } => Some(from.to_string()),
            _ => None,
        };
        self.results.push(JsonResult {
            status: outcome.label(),
            path: outcome.path().to_string(),
            from,
        });
        Ok(())
    }

    fn finish(&mut self, summary: &LintSummary) -> Result<()> {
        let report = JsonReport {
            summary,
            results: &self.results,
        };
        serde_json::to_writer_pretty(&mut self.out, &report).context("Failed to serialize report")?;
        writeln!(self.out).context("Failed to write report")?;
        self.out.flush().context("Failed to write report")
    }
}
