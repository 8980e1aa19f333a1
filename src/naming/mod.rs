//! Naming conventions for filenames
//!
//! This module classifies strings against the five supported naming
//! conventions and rewrites arbitrary strings into each of them.
//! Conversions are deterministic, idempotent, and leave already-valid
//! input untouched.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

mod filename;


pub use filename::{fixed_name, is_acceptable, split_extension};

/// Longest filename most file systems accept.
pub const MAX_FILENAME_LEN: usize = 255;

static SNAKE_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._]*$").expect("Failed to compile snake_case regex"));
static SCREAMING_SNAKE_CASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9._]*$").expect("Failed to compile SCREAMING_SNAKE_CASE regex")
});
static KEBAB_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9.\-]+$").expect("Failed to compile kebab-case regex"));
static SCREAMING_KEBAB_CASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9.\-]*$").expect("Failed to compile SCREAMING-KEBAB-CASE regex")
});
// The length cap comes from file systems rather than POSIX itself.
static POSIX_PORTABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._][A-Za-z0-9._\-]{0,254}$")
        .expect("Failed to compile portable filename regex")
});

static INVALID_SNAKE_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9._]+").expect("Failed to compile regex"));
static INVALID_SCREAMING_SNAKE_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Z0-9._]+").expect("Failed to compile regex"));
static INVALID_KEBAB_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9.\-]+").expect("Failed to compile regex"));
static INVALID_SCREAMING_KEBAB_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Z0-9.\-]+").expect("Failed to compile regex"));
static INVALID_POSIX_PORTABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._\-]+").expect("Failed to compile regex"));

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\- ]").expect("Failed to compile separator regex"));
static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("Failed to compile spaces regex"));
static LOWERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]+").expect("Failed to compile lowercase regex"));
static UPPERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+").expect("Failed to compile uppercase regex"));

/// The letter case a convention folds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Lower,
    Upper,
}

/// One of the supported naming conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingConvention {
    /// `snake_case`: lowercase letters, digits, `.` and `_`
    SnakeCase,
    /// `SCREAMING_SNAKE_CASE`: uppercase letters, digits, `.` and `_`
    ScreamingSnakeCase,
    /// `kebab-case`: lowercase letters, digits, `.` and `-`
    KebabCase,
    /// `SCREAMING-KEBAB-CASE`: uppercase letters, digits, `.` and `-`
    ScreamingKebabCase,
    /// The POSIX portable filename character set, capped at 255 characters
    PosixPortable,
}

impl NamingConvention {
    /// Every convention, in declaration order.
    pub const ALL: [NamingConvention; 5] = [
        NamingConvention::SnakeCase,
        NamingConvention::ScreamingSnakeCase,
        NamingConvention::KebabCase,
        NamingConvention::ScreamingKebabCase,
        NamingConvention::PosixPortable,
    ];

    /// Determines if `s` is valid in this convention.
    pub fn is_valid(self, s: &str) -> bool {
        self.pattern().is_match(s)
    }

    /// Rewrites `s` into this convention.
    ///
    /// The result always satisfies [`NamingConvention::is_valid`]. Valid
    /// input is returned unchanged, which makes the conversion idempotent.
    pub fn convert(self, s: &str) -> String {
        let separated = match self.separator() {
            Some(separator) => SEPARATOR.replace_all(s, separator).into_owned(),
            None => SPACES.replace_all(s, "_").into_owned(),
        };

        let folded = match self.case() {
            Some(Case::Lower) => UPPERS
                .replace_all(&separated, |caps: &Captures| caps[0].to_ascii_lowercase())
                .into_owned(),
            Some(Case::Upper) => LOWERS
                .replace_all(&separated, |caps: &Captures| caps[0].to_ascii_uppercase())
                .into_owned(),
            None => separated,
        };

        let stripped = self.invalid_characters().replace_all(&folded, "").into_owned();

        match self {
            NamingConvention::PosixPortable => {
                // Only ASCII survives the strip, so byte truncation is safe.
                let mut name = stripped.trim_start_matches('-').to_string();
                name.truncate(MAX_FILENAME_LEN);
                if name.is_empty() { "_".to_string() } else { name }
            }
            NamingConvention::KebabCase if stripped.is_empty() => "-".to_string(),
            _ => stripped,
        }
    }

    /// Human-readable name, spelled in the convention itself.
    pub fn name(self) -> &'static str {
        match self {
            NamingConvention::SnakeCase => "snake_case",
            NamingConvention::ScreamingSnakeCase => "SCREAMING_SNAKE_CASE",
            NamingConvention::KebabCase => "kebab-case",
            NamingConvention::ScreamingKebabCase => "SCREAMING-KEBAB-CASE",
            NamingConvention::PosixPortable => "posix-portable",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            NamingConvention::SnakeCase => &SNAKE_CASE,
            NamingConvention::ScreamingSnakeCase => &SCREAMING_SNAKE_CASE,
            NamingConvention::KebabCase => &KEBAB_CASE,
            NamingConvention::ScreamingKebabCase => &SCREAMING_KEBAB_CASE,
            NamingConvention::PosixPortable => &POSIX_PORTABLE,
        }
    }

    fn invalid_characters(self) -> &'static Regex {
        match self {
            NamingConvention::SnakeCase => &INVALID_SNAKE_CASE,
            NamingConvention::ScreamingSnakeCase => &INVALID_SCREAMING_SNAKE_CASE,
            NamingConvention::KebabCase => &INVALID_KEBAB_CASE,
            NamingConvention::ScreamingKebabCase => &INVALID_SCREAMING_KEBAB_CASE,
            NamingConvention::PosixPortable => &INVALID_POSIX_PORTABLE,
        }
    }

    fn separator(self) -> Option<&'static str> {
        match self {
            NamingConvention::SnakeCase | NamingConvention::ScreamingSnakeCase => Some("_"),
            NamingConvention::KebabCase | NamingConvention::ScreamingKebabCase => Some("-"),
            NamingConvention::PosixPortable => None,
        }
    }

    fn case(self) -> Option<Case> {
        match self {
            NamingConvention::SnakeCase | NamingConvention::KebabCase => Some(Case::Lower),
            NamingConvention::ScreamingSnakeCase | NamingConvention::ScreamingKebabCase => {
                Some(Case::Upper)
            }
            NamingConvention::PosixPortable => None,
        }
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
