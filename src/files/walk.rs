//! Lazy depth-first traversal
//!
//! [`TreeWalk`] yields every entry below a root that passes a predicate,
//! parents strictly before their children. Nothing is read ahead: a
//! directory is only listed when the entry after it is requested, so a
//! consumer that stops pulling triggers no further `stat` or `read_dir`
//! calls, and a directory the predicate rejects is never listed at all.
//!
//! The predicate is supplied on every pull through [`TreeWalk::next_with`],
//! which lets the caller change the rules between pulls (the linter grows
//! its ignore set as directories are discovered). [`walk`] wraps a fixed
//! predicate into a plain [`Iterator`].

use super::{FileStat, FileSystem, TreePath};
use std::ffi::OsString;

/// One entry produced by a traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalEntry {
    pub path: TreePath,
    pub stat: FileStat,
}

impl TraversalEntry {
    pub fn is_dir(&self) -> bool {
        self.stat.is_dir
    }
}

/// A directory being iterated, with the names not yet visited.
struct DirCursor {
    dir: TreePath,
    names: std::vec::IntoIter<OsString>,
}

/// Pull-based pre-order traversal state
pub struct TreeWalk<'fs, F: FileSystem + ?Sized> {
    fs: &'fs F,
    root: Option<TreePath>,
    /// Last yielded directory, listed on the next pull.
    pending_dir: Option<TreePath>,
    stack: Vec<DirCursor>,
}

impl<'fs, F: FileSystem + ?Sized> TreeWalk<'fs, F> {
    pub fn new(fs: &'fs F, root: TreePath) -> Self {
        Self {
            fs,
            root: Some(root),
            pending_dir: None,
            stack: Vec::new(),
        }
    }

    /// Produces the next entry accepted by `predicate`.
    ///
    /// `predicate` receives each candidate path and whether it is a
    /// directory. Rejected directories are pruned with everything below them.
    pub fn next_with<P>(&mut self, mut predicate: P) -> Option<TraversalEntry>
    where
        P: FnMut(&TreePath, bool) -> bool,
    {
        if let Some(root) = self.root.take() {
            return self.visit(root, &mut predicate);
        }

        loop {
            if let Some(dir) = self.pending_dir.take() {
                let names = self.list(&dir);
                self.stack.push(DirCursor {
                    dir,
                    names: names.into_iter(),
                });
            }

            let cursor = self.stack.last_mut()?;
            let Some(name) = cursor.names.next() else {
                self.stack.pop();
                continue;
            };
            let candidate = cursor.dir.join(name);

            if let Some(entry) = self.visit(candidate, &mut predicate) {
                return Some(entry);
            }
        }
    }

    /// Follows a rename of the directory yielded last, so that its
    /// entries are listed from the new location.
    pub fn relocate(&mut self, from: &TreePath, to: TreePath) {
        if self.pending_dir.as_ref() == Some(from) {
            self.pending_dir = Some(to);
        }
    }

    fn visit<P>(&mut self, path: TreePath, predicate: &mut P) -> Option<TraversalEntry>
    where
        P: FnMut(&TreePath, bool) -> bool,
    {
        let stat = match self.fs.stat(&path.to_path_buf()) {
            Ok(stat) => stat,
            Err(e) => {
                tracing::trace!("Skipping unreadable path {}: {}", path, e);
                return None;
            }
        };

        if !predicate(&path, stat.is_dir) {
            tracing::trace!("Pruned {}", path);
            return None;
        }

        if stat.is_dir {
            self.pending_dir = Some(path.clone());
        }
        Some(TraversalEntry { path, stat })
    }

    fn list(&self, dir: &TreePath) -> Vec<OsString> {
        match self.fs.read_dir(&dir.to_path_buf()) {
            Ok(mut names) => {
                names.sort();
                names
            }
            Err(e) => {
                tracing::debug!("Could not list {}: {}", dir, e);
                Vec::new()
            }
        }
    }
}

/// A traversal bound to a fixed predicate
pub struct Walk<'fs, F: FileSystem + ?Sized, P> {
    inner: TreeWalk<'fs, F>,
    predicate: P,
}

impl<F, P> Iterator for Walk<'_, F, P>
where
    F: FileSystem + ?Sized,
    P: FnMut(&TreePath, bool) -> bool,
{
    type Item = TraversalEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_with(&mut self.predicate)
    }
}

/// Walks the tree below `root`, yielding every entry `predicate` accepts.
pub fn walk<F, P>(fs: &F, predicate: P, root: TreePath) -> Walk<'_, F, P>
where
    F: FileSystem + ?Sized,
    P: FnMut(&TreePath, bool) -> bool,
{
    Walk {
        inner: TreeWalk::new(fs, root),
        predicate,
    }
}
