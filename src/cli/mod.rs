//! Command-line interface for snekcheck
//!
//! Parses arguments with clap, merges them into the configuration, seeds the
//! ignore rules and runs the [`Linter`] over the given paths.

use crate::config::{ConfigOverrides, IgnoreOverrides, LintOverrides, OutputFormat, OutputOverrides, SnekcheckConfig};
use crate::files::{FileSystem, OsFileSystem, TreePath};
use crate::git::{IgnoreSet, IgnoreSources};
use crate::lint::{LintOptions, LintSummary, Linter, Reporter};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

pub mod output;

pub use output::{JsonReporter, Output, TextReporter};

#[derive(Parser, Debug)]
#[command(
    name = "snekcheck",
    version = env!("CARGO_PKG_VERSION"),
    about = "Lint filenames to snake_case, respecting Git ignore rules",
    long_about = "snekcheck recursively checks that every file and directory name is snake_case \
                  (or a SCREAMING_SNAKE_CASE name with a snake_case extension, like README.md). \
                  Paths ignored by Git are skipped. With --fix, invalid names are renamed."
)]
pub struct Cli {
    /// Files or directories to lint
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Rename invalid names instead of reporting them
    #[arg(long)]
    pub fix: bool,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress logs and VALID lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Skip the system and user global Git exclude files
    #[arg(long)]
    pub no_global_ignore: bool,
}

impl Cli {
    /// Runs snekcheck and maps the result to the process exit status.
    pub fn run(self) -> ExitCode {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.quiet);

        match self.execute(&output) {
            Ok(summary) => ExitCode::from(summary.exit_code()),
            Err(e) => {
                output.error(&format!("{e:#}"));
                ExitCode::FAILURE
            }
        }
    }

    fn execute(&self, output: &Output) -> Result<LintSummary> {
        let config = SnekcheckConfig::load(self.config.as_deref(), Some(&self.overrides()))?;
        let fs = OsFileSystem;
        let roots = resolve_paths(&fs, &self.paths)?;

        let sources = IgnoreSources::discover(config.ignore.system, config.ignore.global);
        let (mut ignores, warning) = IgnoreSet::load(&fs, &sources);
        if let Some(warning) = warning {
            output.warning(&format!("{warning:#}"));
        }
        ignores.extend_with_lines(None, config.ignore.patterns.iter().map(String::as_str));
        tracing::debug!("Starting with {} ignore rules", ignores.len());

        let options = LintOptions {
            fix: config.lint.fix,
            parent_rules: config.ignore.parent_rules,
        };
        let mut reporter: Box<dyn Reporter> = match config.output.format {
            OutputFormat::Text => Box::new(TextReporter::stderr(config.output.show_valid)),
            OutputFormat::Json => Box::new(JsonReporter::stdout(config.output.show_valid)),
        };

        Linter::new(&fs, ignores, options).run(&roots, reporter.as_mut())
    }

    /// Flags that were actually given, as configuration overrides.
    fn overrides(&self) -> ConfigOverrides {
        let no_global = self.no_global_ignore.then_some(false);

        ConfigOverrides {
            lint: self.fix.then_some(LintOverrides { fix: Some(true) }),
            ignore: self.no_global_ignore.then_some(IgnoreOverrides {
                global: no_global,
                system: no_global,
            }),
            output: (self.format.is_some() || self.quiet).then_some(OutputOverrides {
                format: self.format,
                show_valid: self.quiet.then_some(false),
            }),
        }
    }
}

/// Makes every path absolute and checks that it exists.
///
/// Resolution is lexical: `..` drops the previous segment without following
/// symbolic links, so `link/..` names the directory holding `link`.
fn resolve_paths<F: FileSystem + ?Sized>(fs: &F, paths: &[PathBuf]) -> Result<Vec<TreePath>> {
    paths.iter().map(|path| resolve_path(fs, path)).collect()
}

fn resolve_path<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<TreePath> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let Some(tree_path) = TreePath::new(&absolute) else {
        bail!("Cannot lint {}: it has no file name", path.display());
    };

    fs.stat(&tree_path.to_path_buf())
        .with_context(|| format!("No such file or directory: {}", path.display()))?;
    Ok(tree_path)
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // Keep the ignore/globset crates quiet below -vvv
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info,ignore=warn,globset=warn"),
        2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn,globset=warn"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
