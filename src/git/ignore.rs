//! Git ignore rules
//!
//! An [`IgnoreSet`] holds every rule in increasing priority. Rules from one
//! source (a file or a configured list) are compiled together into a layer
//! with the `ignore` crate's [`Gitignore`] matcher; later layers beat earlier
//! ones and, inside a layer, later lines beat earlier ones.

use crate::files::{FileSystem, TreePath};
use anyhow::{Context, Result};
use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::BTreeSet;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use super::IgnoreSources;

/// Rule every set starts with
pub const BASE_PATTERN: &str = ".git/";

/// Per-directory rule files, lowest priority first
const LOCAL_IGNORE_FILES: [&str; 2] = [".gitignore", ".git/info/exclude"];

/// One rule parsed from one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnorePattern {
    /// The line as written, minus surrounding whitespace
    pub line: String,
    /// Directory the rule is relative to; `None` for global rules
    pub anchor: Option<PathBuf>,
    /// `!` lines re-include what earlier rules excluded
    pub negated: bool,
    /// Trailing `/` lines only match directories
    pub dir_only: bool,
}

impl IgnorePattern {
    fn parse(line: &str, anchor: Option<&Path>) -> Self {
        Self {
            line: line.to_string(),
            anchor: anchor.map(Path::to_path_buf),
            negated: line.starts_with('!'),
            dir_only: line.ends_with('/'),
        }
    }
}

struct IgnoreLayer {
    anchor: Option<PathBuf>,
    matcher: Gitignore,
    patterns: Vec<IgnorePattern>,
}

impl IgnoreLayer {
    /// Compiles the usable lines of one source. Returns `None` if nothing
    /// survives.
    fn compile<'a, I>(anchor: Option<&Path>, lines: I, source: &str) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut builder = GitignoreBuilder::new(anchor.unwrap_or(Path::new("/")));
        let mut patterns = Vec::new();

        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match builder.add_line(None, line) {
                Ok(_) => patterns.push(IgnorePattern::parse(line, anchor)),
                Err(e) => tracing::warn!("Skipping invalid ignore pattern {:?} in {}: {}", line, source, e),
            }
        }

        if patterns.is_empty() {
            return None;
        }

        match builder.build() {
            Ok(matcher) => Some(Self {
                anchor: anchor.map(Path::to_path_buf),
                matcher,
                patterns,
            }),
            Err(e) => {
                tracing::warn!("Failed to compile ignore rules from {}: {}", source, e);
                None
            }
        }
    }
}

/// Every ignore rule known to one run
pub struct IgnoreSet {
    layers: Vec<IgnoreLayer>,
    /// Directories whose local rule files were read
    scopes: BTreeSet<PathBuf>,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::new()
    }
}

impl IgnoreSet {
    /// A set holding only [`BASE_PATTERN`].
    pub fn new() -> Self {
        let mut set = Self {
            layers: Vec::new(),
            scopes: BTreeSet::new(),
        };
        set.push_layer(None, [BASE_PATTERN], "built-in rules");
        set
    }

    /// Seeds a set from the system and global exclude files.
    ///
    /// Missing files count as empty. Any other read failure leaves the set
    /// with only the base rule and hands the error back as a warning.
    pub fn load<F: FileSystem + ?Sized>(fs: &F, sources: &IgnoreSources) -> (Self, Option<anyhow::Error>) {
        let mut set = Self::new();

        let mut contents = Vec::new();
        for path in [&sources.system, &sources.global].into_iter().flatten() {
            match read_optional(fs, path) {
                Ok(Some(text)) => contents.push((path, text)),
                Ok(None) => tracing::debug!("No ignore file at {}", path.display()),
                Err(e) => return (set, Some(e.context("Failed to load Git ignore rules"))),
            }
        }

        for (path, text) in &contents {
            set.push_layer(None, text.lines(), &path.display().to_string());
        }
        (set, None)
    }

    /// Appends rules that did not come from a file, such as configured
    /// patterns. `anchor` of `None` makes them apply everywhere.
    pub fn extend_with_lines<'a, I>(&mut self, anchor: Option<&Path>, lines: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.push_layer(anchor, lines, "configuration");
    }

    /// Appends the rules of `dir/.gitignore` and `dir/.git/info/exclude`,
    /// anchored to `dir`. Unreadable files are skipped, and a directory is
    /// only read once.
    pub fn extend_from_dir<F: FileSystem + ?Sized>(&mut self, fs: &F, dir: &TreePath) {
        let dir = dir.to_path_buf();
        if self.scopes.contains(&dir) {
            return;
        }

        for name in LOCAL_IGNORE_FILES {
            let path = dir.join(name);
            match read_optional(fs, &path) {
                Ok(Some(text)) => {
                    tracing::debug!("Loading ignore rules from {}", path.display());
                    self.push_layer(Some(dir.as_path()), text.lines(), &path.display().to_string());
                }
                Ok(None) => {}
                Err(e) => tracing::debug!("Ignoring unreadable {}: {:#}", path.display(), e),
            }
        }

        self.scopes.insert(dir);
    }

    /// Determines if a path is excluded.
    ///
    /// The last matching rule decides, with `!` rules re-including. A path
    /// below an excluded directory of a scanned tree stays excluded whatever
    /// its own rules say.
    pub fn is_ignored(&self, path: &TreePath, is_dir: bool) -> bool {
        let excluded_ancestor = path
            .ancestors()
            .map(|ancestor| ancestor.to_path_buf())
            .filter(|ancestor| self.scope_of(ancestor).is_some())
            .any(|ancestor| self.matches(&ancestor, true));

        excluded_ancestor || self.matches(&path.to_path_buf(), is_dir)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.layers.iter().map(|layer| layer.patterns.len()).sum()
    }

    /// Whether the set holds no rules at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every rule, lowest priority first.
    pub fn patterns(&self) -> impl Iterator<Item = &IgnorePattern> {
        self.layers.iter().flat_map(|layer| layer.patterns.iter())
    }

    fn push_layer<'a, I>(&mut self, anchor: Option<&Path>, lines: I, source: &str)
    where
        I: IntoIterator<Item = &'a str>,
    {
        if let Some(layer) = IgnoreLayer::compile(anchor, lines, source) {
            tracing::trace!("Added {} ignore rules from {}", layer.patterns.len(), source);
            self.layers.push(layer);
        }
    }

    fn matches(&self, path: &Path, is_dir: bool) -> bool {
        for layer in self.layers.iter().rev() {
            let Some(relative) = self.relative_to(layer, path) else {
                continue;
            };
            match layer.matcher.matched(&relative, is_dir) {
                Match::Ignore(_) => return true,
                Match::Whitelist(_) => return false,
                Match::None => {}
            }
        }
        false
    }

    /// The path a layer's rules are matched against.
    ///
    /// Anchored rules only see paths strictly below their anchor. Global
    /// rules see paths relative to the outermost scanned tree, or the whole
    /// path outside of one.
    fn relative_to(&self, layer: &IgnoreLayer, path: &Path) -> Option<PathBuf> {
        let base = match &layer.anchor {
            Some(anchor) => anchor.as_path(),
            None => match self.scope_of(path) {
                Some(scope) => scope,
                None => return Some(normal_components(path)),
            },
        };

        path.strip_prefix(base)
            .ok()
            .filter(|relative| !relative.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    /// The outermost scope strictly containing `path`.
    fn scope_of<'p>(&self, path: &'p Path) -> Option<&'p Path> {
        path.ancestors()
            .skip(1)
            .filter(|ancestor| self.scopes.contains(*ancestor))
            .last()
    }
}

/// Reads a rule file. `Ok(None)` if it does not exist.
fn read_optional<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<Option<String>> {
    let mut reader = match fs.open(path) {
        Ok(reader) => reader,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to open {}", path.display())),
    };

    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

fn normal_components(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .collect()
}
