use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A separated file path.
///
/// Holds the path's anchor (prefix and root directory, empty for relative
/// paths) and a non-empty list of normal segments. `.` segments are
/// dropped and `..` segments pop their parent, so the last segment is
/// always a real entry name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath {
    anchor: PathBuf,
    segments: Vec<OsString>,
}

impl TreePath {
    /// Splits a path into segments. Returns `None` if no entry name is left,
    /// as for `/` or `.`.
    ///
    /// `..` is applied to the text of the path, never through the file
    /// system, so a symbolic link followed by `..` yields the link's parent.
    pub fn new<P: AsRef<Path>>(path: P) -> Option<Self> {
        let mut anchor = PathBuf::new();
        let mut segments = Vec::new();

        for component in path.as_ref().components() {
            match component {
                Component::Prefix(_) | Component::RootDir => anchor.push(component.as_os_str()),
                Component::CurDir => {}
                Component::ParentDir => {
                    segments.pop();
                }
                Component::Normal(name) => segments.push(name.to_os_string()),
            }
        }

        if segments.is_empty() {
            None
        } else {
            Some(Self { anchor, segments })
        }
    }

    /// The last segment of the path.
    pub fn base(&self) -> &OsStr {
        // Never empty by construction.
        self.segments.last().map(OsString::as_os_str).unwrap_or_default()
    }

    /// Every segment except the last, or `None` for a single-segment path.
    pub fn parent(&self) -> Option<TreePath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            anchor: self.anchor.clone(),
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Appends one segment.
    pub fn join<S: Into<OsString>>(&self, name: S) -> TreePath {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self {
            anchor: self.anchor.clone(),
            segments,
        }
    }

    /// Replaces the last segment, producing a sibling path.
    pub fn with_base<S: Into<OsString>>(&self, name: S) -> TreePath {
        let mut segments = self.segments.clone();
        segments.pop();
        segments.push(name.into());
        Self {
            anchor: self.anchor.clone(),
            segments,
        }
    }

    /// Strict ancestors, outermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = TreePath> + '_ {
        (1..self.segments.len()).map(|len| Self {
            anchor: self.anchor.clone(),
            segments: self.segments[..len].to_vec(),
        })
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Joins the segments back into a platform path.
    pub fn to_path_buf(&self) -> PathBuf {
        let mut path = self.anchor.clone();
        path.extend(&self.segments);
        path
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_buf().display())
    }
}
