//! Filesystem access used by the tree walks.
//!
//! The walks never touch `std::fs` directly; they go through a [`FileStore`]
//! so they can run against the real disk ([`OsFileStore`]), an in-memory tree
//! ([`MemoryFileStore`]), or a recorder that plans changes without applying
//! them ([`RecordingStore`]).

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Access to directories and files under the target root.
///
/// Listings return immediate children only, sorted by path. Symbolic links
/// are neither listed as directories nor as files.
pub trait FileStore {
    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn exists(&self, path: &Path) -> bool;

    /// Creates or overwrites `path`.
    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Moves a directory. Fails with `AlreadyExists` if `to` exists.
    fn rename_dir(&mut self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&mut self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileStore;

impl OsFileStore {
    fn list(dir: &Path, want_dirs: bool) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if (want_dirs && file_type.is_dir()) || (!want_dirs && file_type.is_file()) {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl FileStore for OsFileStore {
    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        Self::list(dir, true)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        Self::list(dir, false)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn rename_dir(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        // fs::rename silently replaces an empty directory on Unix.
        if to.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "destination already exists",
            ));
        }
        fs::rename(from, to)
    }

    fn remove_file(&mut self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// An in-memory directory tree.
///
/// # Examples
///
/// ```
/// use renametree::file_store::{FileStore, MemoryFileStore};
/// use std::path::Path;
///
/// let mut store = MemoryFileStore::new();
/// store.add_file("/proj/src/App.cs", "class App {}");
/// assert_eq!(store.list_dirs(Path::new("/proj")).unwrap().len(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryFileStore {
    nodes: BTreeMap<PathBuf, Node>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory and any missing ancestors.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Dir);
        }
    }

    /// Adds a file, creating any missing parent directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.nodes
            .insert(path.to_path_buf(), Node::File(contents.as_ref().to_vec()));
    }

    /// Returns the contents of a file, if it exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<&[u8]> {
        match self.nodes.get(path.as_ref()) {
            Some(Node::File(data)) => Some(data),
            _ => None,
        }
    }

    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        matches!(self.nodes.get(path.as_ref()), Some(Node::Dir))
    }

    fn children(&self, dir: &Path, want_dirs: bool) -> io::Result<Vec<PathBuf>> {
        if !self.is_dir(dir) {
            return Err(not_found(dir));
        }
        Ok(self
            .nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .filter(|(_, node)| matches!(node, Node::Dir) == want_dirs)
            .map(|(path, _)| path.clone())
            .collect())
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    )
}

impl FileStore for MemoryFileStore {
    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.children(dir, true)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.children(dir, false)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.contents(path)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| not_found(path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes.contains_key(path)
    }

    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent = path.parent().ok_or_else(|| not_found(path))?;
        if !self.is_dir(parent) {
            return Err(not_found(parent));
        }
        if self.is_dir(path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            ));
        }
        self.nodes
            .insert(path.to_path_buf(), Node::File(contents.to_vec()));
        Ok(())
    }

    fn rename_dir(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        if !self.is_dir(from) {
            return Err(not_found(from));
        }
        if self.exists(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "destination already exists",
            ));
        }
        let moved: Vec<PathBuf> = self
            .nodes
            .keys()
            .filter(|path| path.starts_with(from))
            .cloned()
            .collect();
        for path in moved {
            let Ok(rel) = path.strip_prefix(from) else {
                continue;
            };
            let target = if rel.as_os_str().is_empty() {
                to.to_path_buf()
            } else {
                to.join(rel)
            };
            if let Some(node) = self.nodes.remove(&path) {
                self.nodes.insert(target, node);
            }
        }
        Ok(())
    }

    fn remove_file(&mut self, path: &Path) -> io::Result<()> {
        match self.nodes.get(path) {
            Some(Node::File(_)) => {
                self.nodes.remove(path);
                Ok(())
            }
            _ => Err(not_found(path)),
        }
    }
}

/// A change a dry run would have made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedChange {
    RenameDir { from: PathBuf, to: PathBuf },
    WriteFile { path: PathBuf, bytes: usize },
    RemoveFile { path: PathBuf },
}

impl std::fmt::Display for PlannedChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RenameDir { from, to } => {
                write!(f, "rename {} -> {}", from.display(), to.display())
            }
            Self::WriteFile { path, bytes } => {
                write!(f, "write {} ({} bytes)", path.display(), bytes)
            }
            Self::RemoveFile { path } => write!(f, "remove {}", path.display()),
        }
    }
}

/// Reads through to another store and records mutations instead of applying them.
///
/// Planned directory renames are applied to every path the recorder hands
/// out, so later walks see the tree as it would look after those renames.
pub struct RecordingStore<'a, S: FileStore> {
    inner: &'a S,
    changes: Vec<PlannedChange>,
    /// `(from, to)` directory renames, in the order they were planned.
    renamed_dirs: Vec<(PathBuf, PathBuf)>,
}

impl<'a, S: FileStore> RecordingStore<'a, S> {
    pub fn new(inner: &'a S) -> Self {
        Self {
            inner,
            changes: Vec::new(),
            renamed_dirs: Vec::new(),
        }
    }

    pub fn changes(&self) -> &[PlannedChange] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<PlannedChange> {
        self.changes
    }

    /// Maps a path in the inner store to where it would be after the planned renames.
    fn planned_path(&self, real: &Path) -> PathBuf {
        self.renamed_dirs
            .iter()
            .fold(real.to_path_buf(), |path, (from, to)| {
                replace_prefix(&path, from, to).unwrap_or(path)
            })
    }

    /// Maps a planned path back to the inner store.
    fn real_path(&self, planned: &Path) -> PathBuf {
        self.renamed_dirs
            .iter()
            .rev()
            .fold(planned.to_path_buf(), |path, (from, to)| {
                replace_prefix(&path, to, from).unwrap_or(path)
            })
    }

    fn list_planned(&self, listing: io::Result<Vec<PathBuf>>) -> io::Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = listing?
            .iter()
            .map(|path| self.planned_path(path))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

/// `path` with its leading `prefix` replaced by `replacement`, if it starts with `prefix`.
fn replace_prefix(path: &Path, prefix: &Path, replacement: &Path) -> Option<PathBuf> {
    let rel = path.strip_prefix(prefix).ok()?;
    Some(if rel.as_os_str().is_empty() {
        replacement.to_path_buf()
    } else {
        replacement.join(rel)
    })
}

impl<S: FileStore> FileStore for RecordingStore<'_, S> {
    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.list_planned(self.inner.list_dirs(&self.real_path(dir)))
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.list_planned(self.inner.list_files(&self.real_path(dir)))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.inner.read(&self.real_path(path))
    }

    /// A path exists if its inner counterpart exists and has not been planned
    /// away under another name.
    fn exists(&self, path: &Path) -> bool {
        let real = self.real_path(path);
        self.inner.exists(&real) && self.planned_path(&real) == path
    }

    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.changes.push(PlannedChange::WriteFile {
            path: path.to_path_buf(),
            bytes: contents.len(),
        });
        Ok(())
    }

    fn rename_dir(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        if self.exists(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "destination already exists",
            ));
        }
        self.changes.push(PlannedChange::RenameDir {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        self.renamed_dirs.push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }

    fn remove_file(&mut self, path: &Path) -> io::Result<()> {
        self.changes.push(PlannedChange::RemoveFile {
            path: path.to_path_buf(),
        });
        Ok(())
    }
}
