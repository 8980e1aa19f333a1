use super::{FileStat, FileSystem};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// An in-memory file system.
///
/// Counts `stat` and `read_dir` calls so callers can assert how much of a
/// tree was actually read, and can be switched read-only to make every
/// rename fail.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    stat_calls: Cell<usize>,
    read_dir_calls: Cell<usize>,
    read_only: Cell<bool>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory and all of its parents.
    pub fn create_dir_all<P: AsRef<Path>>(&self, path: P) {
        let key = normalize(path.as_ref());
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in key.ancestors().filter(|a| !a.as_os_str().is_empty()) {
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    /// Writes a file, creating its parent directories.
    pub fn write<P: AsRef<Path>, C: Into<Vec<u8>>>(&self, path: P, contents: C) {
        let key = normalize(path.as_ref());
        if let Some(parent) = key.parent() {
            self.create_dir_all(parent);
        }
        self.nodes.borrow_mut().insert(key, Node::File(contents.into()));
    }

    /// Whether an entry exists.
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.nodes.borrow().contains_key(&normalize(path.as_ref()))
    }

    /// Makes every subsequent rename fail with `PermissionDenied`.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn stat_calls(&self) -> usize {
        self.stat_calls.get()
    }

    pub fn read_dir_calls(&self) -> usize {
        self.read_dir_calls.get()
    }
}

impl FileSystem for MemoryFileSystem {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        self.stat_calls.set(self.stat_calls.get() + 1);
        match self.nodes.borrow().get(&normalize(path)) {
            Some(Node::Dir) => Ok(FileStat::dir()),
            Some(Node::File(contents)) => Ok(FileStat::file(contents.len() as u64)),
            None => Err(not_found(path)),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
        self.read_dir_calls.set(self.read_dir_calls.get() + 1);
        let key = normalize(path);
        let nodes = self.nodes.borrow();
        match nodes.get(&key) {
            Some(Node::Dir) => Ok(nodes
                .keys()
                .filter(|candidate| candidate.parent() == Some(key.as_path()))
                .filter_map(|candidate| candidate.file_name().map(|name| name.to_os_string()))
                .collect()),
            Some(Node::File(_)) => Err(io::Error::other(format!(
                "not a directory: {}",
                path.display()
            ))),
            None => Err(not_found(path)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.read_only.get() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("read-only file system: {}", from.display()),
            ));
        }

        let from = normalize(from);
        let to = normalize(to);
        let mut nodes = self.nodes.borrow_mut();
        if !nodes.contains_key(&from) {
            return Err(not_found(&from));
        }
        if from == to {
            return Ok(());
        }
        if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !matches!(nodes.get(parent), Some(Node::Dir)) {
                return Err(not_found(parent));
            }
        }

        nodes.retain(|key, _| !key.starts_with(&to));
        let moved: Vec<PathBuf> = nodes
            .keys()
            .filter(|key| key.starts_with(&from))
            .cloned()
            .collect();
        for key in moved {
            if let Some(node) = nodes.remove(&key) {
                let suffix = key.strip_prefix(&from).unwrap_or(Path::new(""));
                let target = if suffix.as_os_str().is_empty() {
                    to.clone()
                } else {
                    to.join(suffix)
                };
                nodes.insert(target, node);
            }
        }
        Ok(())
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        match self.nodes.borrow().get(&normalize(path)) {
            Some(Node::File(contents)) => Ok(Box::new(Cursor::new(contents.clone()))),
            Some(Node::Dir) => Err(io::Error::other(format!(
                "is a directory: {}",
                path.display()
            ))),
            None => Err(not_found(path)),
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents() {
        let fs = MemoryFileSystem::new();
        fs.write("/repo/src/main.rs", "fn main() {}");

        assert!(fs.stat(Path::new("/repo")).unwrap().is_dir);
        assert!(fs.stat(Path::new("/repo/src")).unwrap().is_dir);
        assert_eq!(fs.stat(Path::new("/repo/src/main.rs")).unwrap(), FileStat::file(12));
        assert_eq!(fs.stat_calls(), 3);
    }

    #[test]
    fn test_read_dir_lists_direct_children() {
        let fs = MemoryFileSystem::new();
        fs.write("root/a", "");
        fs.write("root/sub/b", "");

        let mut names = fs.read_dir(Path::new("root")).unwrap();
        names.sort();
        assert_eq!(names, vec![OsString::from("a"), OsString::from("sub")]);
        assert!(fs.read_dir(Path::new("root/a")).is_err());
        assert_eq!(fs.read_dir_calls(), 2);
    }

    #[test]
    fn test_rename_moves_subtree() {
        let fs = MemoryFileSystem::new();
        fs.write("/r/Old Dir/inner.txt", "x");

        fs.rename(Path::new("/r/Old Dir"), Path::new("/r/old_dir")).unwrap();
        assert!(!fs.exists("/r/Old Dir"));
        assert!(fs.exists("/r/old_dir/inner.txt"));

        fs.set_read_only(true);
        let err = fs.rename(Path::new("/r/old_dir"), Path::new("/r/x")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_open_reads_contents() {
        let fs = MemoryFileSystem::new();
        fs.write("/r/.gitignore", "target/\n");

        let mut contents = String::new();
        fs.open(Path::new("/r/.gitignore")).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "target/\n");
        let missing = fs.open(Path::new("/r/missing")).err().map(|e| e.kind());
        assert_eq!(missing, Some(io::ErrorKind::NotFound));
    }
}
