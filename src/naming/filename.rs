use super::{MAX_FILENAME_LEN, NamingConvention};

/// Splits a filename into its stem and its extension.
///
/// The extension starts at the last `.` and keeps it, so `"README.md"`
/// splits into `("README", Some(".md"))` and `".gitignore"` into
/// `("", Some(".gitignore"))`.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(index) => (&name[..index], Some(&name[index..])),
        None => (name, None),
    }
}

/// Determines if a filename is acceptable.
///
/// A name is acceptable when it is a portable filename and either
/// snake_case as a whole, or a SCREAMING_SNAKE_CASE stem followed by a
/// snake_case extension (`LICENSE`, `README.md`).
pub fn is_acceptable(name: &str) -> bool {
    NamingConvention::PosixPortable.is_valid(name)
        && (NamingConvention::SnakeCase.is_valid(name) || is_screaming_with_snake_extension(name))
}

fn is_screaming_with_snake_extension(name: &str) -> bool {
    let (stem, extension) = split_extension(name);
    NamingConvention::ScreamingSnakeCase.is_valid(stem)
        && extension.is_none_or(|ext| NamingConvention::SnakeCase.is_valid(ext))
}

/// Computes the name an unacceptable filename is renamed to.
///
/// Returns `None` when nothing usable survives the conversion, e.g. for a
/// name made only of characters outside the snake_case charset.
pub fn fixed_name(name: &str) -> Option<String> {
    let mut fixed = NamingConvention::SnakeCase.convert(name);
    fixed.truncate(MAX_FILENAME_LEN);

    match fixed.as_str() {
        "" | "." | ".." => None,
        _ => Some(fixed),
    }
}
