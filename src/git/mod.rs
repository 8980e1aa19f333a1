//! Git integration layer for snekcheck
//!
//! Finds the ignore files Git itself would read: `core.excludesFile` from the
//! system and user configuration (through git2), and the work tree enclosing
//! a path, whose directories contribute `.gitignore` rules above a root.

use git2::{Config, ErrorCode, Repository};
use std::path::{Path, PathBuf};

pub mod ignore;

pub use self::ignore::{IgnorePattern, IgnoreSet};

const EXCLUDES_FILE_KEY: &str = "core.excludesFile";

/// Locations of the exclude files that apply to every repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSources {
    pub system: Option<PathBuf>,
    pub global: Option<PathBuf>,
}

impl IgnoreSources {
    /// Looks up the enabled sources in the Git configuration.
    pub fn discover(system: bool, global: bool) -> Self {
        let sources = Self {
            system: system.then(system_excludes_file).flatten(),
            global: global.then(global_excludes_file).flatten(),
        };
        tracing::debug!("Git ignore sources: {:?}", sources);
        sources
    }
}

/// `core.excludesFile` as set in the system-wide configuration.
pub fn system_excludes_file() -> Option<PathBuf> {
    let path = Config::find_system().ok()?;
    let config = match Config::open(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::debug!("Could not open system Git config {}: {}", path.display(), e);
            return None;
        }
    };
    excludes_file(&config)
}

/// The user's global exclude file.
///
/// Taken from `core.excludesFile` in `~/.gitconfig` or the XDG config, and
/// otherwise Git's default `$XDG_CONFIG_HOME/git/ignore`.
pub fn global_excludes_file() -> Option<PathBuf> {
    let configured = [Config::find_global(), Config::find_xdg()]
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|path| Config::open(&path).ok())
        .find_map(|config| excludes_file(&config));

    configured.or_else(default_global_excludes_file)
}

fn default_global_excludes_file() -> Option<PathBuf> {
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
    Some(config_home.join("git").join("ignore"))
}

fn excludes_file(config: &Config) -> Option<PathBuf> {
    match config.get_path(EXCLUDES_FILE_KEY) {
        Ok(path) => Some(path),
        Err(e) if e.code() == ErrorCode::NotFound => None,
        Err(e) => {
            tracing::debug!("Could not read {}: {}", EXCLUDES_FILE_KEY, e);
            None
        }
    }
}

/// The working directory of the repository containing `path`, if any.
pub fn work_tree(path: &Path) -> Option<PathBuf> {
    let repo = Repository::discover(path).ok()?;
    let workdir = repo.workdir()?;
    // git2 reports work trees with a trailing separator.
    Some(workdir.components().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_work_tree_of_nested_path() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        Repository::init(&root)?;
        fs::create_dir_all(root.join("src/nested"))?;

        assert_eq!(work_tree(&root.join("src/nested")), Some(root.clone()));
        assert_eq!(work_tree(&root), Some(root));
        Ok(())
    }

    #[test]
    fn test_excludes_file_from_config() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("gitconfig");
        fs::write(&config_path, "[core]\n\texcludesFile = /opt/ignore\n")?;

        let config = Config::open(&config_path)?;
        assert_eq!(excludes_file(&config), Some(PathBuf::from("/opt/ignore")));

        fs::write(&config_path, "[user]\n\tname = someone\n")?;
        let config = Config::open(&config_path)?;
        assert_eq!(excludes_file(&config), None);
        Ok(())
    }

    #[test]
    fn test_disabled_sources_are_not_looked_up() {
        assert_eq!(IgnoreSources::discover(false, false), IgnoreSources::default());
    }
}
