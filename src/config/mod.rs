//! Configuration management for snekcheck
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. the embedded `default-config.toml`
//! 2. `~/.config/snekcheck/config.{toml,json,yaml,yml}`
//! 3. `snekcheck.{toml,json,yaml,yml}` in the working directory, or only
//!    the file passed with `--config`
//! 4. `SNEKCHECK_*` environment variables, `__` separating sections
//! 5. command-line flags

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};


// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

const ENV_PREFIX: &str = "SNEKCHECK_";
const CONFIG_EXTENSIONS: [&str; 4] = ["toml", "json", "yaml", "yml"];

/// Main configuration structure for snekcheck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SnekcheckConfig {
    /// Linting behaviour
    pub lint: LintConfig,

    /// Which ignore rules apply
    pub ignore: IgnoreConfig,

    /// Reporting
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LintConfig {
    /// Rename invalid names instead of reporting them
    pub fix: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Read the user's `core.excludesFile`
    pub global: bool,

    /// Read the system `core.excludesFile`
    pub system: bool,

    /// Apply ignore files of the directories above each path, up to the
    /// enclosing work tree
    pub parent_rules: bool,

    /// Extra gitignore lines that apply everywhere
    pub patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            global: true,
            system: true,
            parent_rules: true,
            patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Report names that are already valid
    pub show_valid: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            show_valid: true,
        }
    }
}

/// How results are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One colored line per path on stderr
    #[default]
    Text,
    /// One summary document on stdout
    Json,
}

/// Settings given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lint: Option<LintOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore: Option<IgnoreOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputOverrides>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LintOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IgnoreOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_valid: Option<bool>,
}

impl SnekcheckConfig {
    /// Loads the merged configuration.
    ///
    /// `custom_config` replaces the user and repository files. It must
    /// exist; the implicit files are optional.
    pub fn load(custom_config: Option<&Path>, overrides: Option<&ConfigOverrides>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let figment = Self::figment(custom_config, overrides)?;
        let config: Self = figment.extract().context("Invalid configuration")?;

        tracing::trace!("CONFIG LOAD: {:?}", config);
        Ok(config)
    }

    fn figment(custom_config: Option<&Path>, overrides: Option<&ConfigOverrides>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        if let Some(path) = custom_config {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            figment = merge_file(figment, path);
        } else {
            if let Some(base) = user_config_base_path() {
                figment = merge_any_format(figment, &base);
            }
            figment = merge_any_format(figment, Path::new("snekcheck"));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(overrides) = overrides {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            figment = figment.merge(Serialized::defaults(overrides));
        }

        Ok(figment)
    }
}

/// Merges `<base>.toml`, `<base>.json`, `<base>.yaml` and `<base>.yml`,
/// whichever exist.
fn merge_any_format(figment: Figment, base: &Path) -> Figment {
    CONFIG_EXTENSIONS
        .iter()
        .fold(figment, |figment, extension| merge_file(figment, &base.with_extension(extension)))
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("json") => figment.merge(Json::file(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}

fn user_config_base_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("snekcheck").join("config"))
}
