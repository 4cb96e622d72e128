//! Errors raised while renaming a tree.
//!
//! Every variant names the path that failed. Nothing is rolled back: an error
//! part way through leaves the tree partially renamed.

use std::path::PathBuf;

/// Errors that can occur while copying, renaming, or rewriting.
#[derive(Debug)]
pub enum RenameError {
    /// Failed to list the entries of a directory.
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a directory to its new name.
    DirRename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read a file.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// File content is not valid UTF-8.
    Decode {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    /// Failed to write a file.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to delete a file after writing its renamed copy.
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to copy a file or create a directory during the tree copy.
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    /// The VCS clean command could not be run or exited unsuccessfully.
    VcsClean { dir: PathBuf, reason: String },
}

impl std::fmt::Display for RenameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListDir { path, source } => {
                write!(f, "Failed to list directory {}: {}", path.display(), source)
            }
            Self::DirRename { from, to, source } => write!(
                f,
                "Failed to rename directory {} to {}: {}",
                from.display(),
                to.display(),
                source
            ),
            Self::Read { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            Self::Decode { path, source } => {
                write!(f, "{} is not valid UTF-8: {}", path.display(), source)
            }
            Self::Write { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
            Self::Remove { path, source } => {
                write!(f, "Failed to remove {}: {}", path.display(), source)
            }
            Self::Copy { from, to, source } => write!(
                f,
                "Failed to copy {} to {}: {}",
                from.display(),
                to.display(),
                source
            ),
            Self::VcsClean { dir, reason } => {
                write!(f, "VCS clean failed in {}: {}", dir.display(), reason)
            }
        }
    }
}

impl std::error::Error for RenameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ListDir { source, .. }
            | Self::DirRename { source, .. }
            | Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Remove { source, .. }
            | Self::Copy { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::VcsClean { .. } => None,
        }
    }
}

/// Result type for tree renaming operations.
pub type RenameResult<T> = Result<T, RenameError>;
