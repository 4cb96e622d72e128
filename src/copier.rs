//! Preparing the working tree: VCS clean and verbatim copy.

use crate::error::{RenameError, RenameResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Recursively copies `source` into `target`, overwriting existing files.
///
/// `on_file` is called with each destination path after it is written.
/// Returns the number of files copied.
///
/// # Errors
///
/// Fails on the first directory that cannot be created or listed, or file
/// that cannot be copied.
pub fn copy_tree(
    source: &Path,
    target: &Path,
    mut on_file: impl FnMut(&Path),
) -> RenameResult<usize> {
    let mut copied = 0;
    let mut stack: Vec<(PathBuf, PathBuf)> = vec![(source.to_path_buf(), target.to_path_buf())];

    while let Some((from_dir, to_dir)) = stack.pop() {
        fs::create_dir_all(&to_dir).map_err(|e| RenameError::Copy {
            from: from_dir.clone(),
            to: to_dir.clone(),
            source: e,
        })?;

        let entries = fs::read_dir(&from_dir).map_err(|e| RenameError::ListDir {
            path: from_dir.clone(),
            source: e,
        })?;

        let mut subdirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RenameError::ListDir {
                path: from_dir.clone(),
                source: e,
            })?;
            let from = entry.path();
            let to = to_dir.join(entry.file_name());

            if from.is_dir() {
                subdirs.push((from, to));
            } else {
                fs::copy(&from, &to).map_err(|e| RenameError::Copy {
                    from: from.clone(),
                    to: to.clone(),
                    source: e,
                })?;
                copied += 1;
                on_file(&to);
            }
        }
        stack.extend(subdirs);
    }

    Ok(copied)
}

/// Runs `git clean -Xdf` in `dir`, removing ignored build output before copying.
pub fn git_clean(dir: &Path) -> RenameResult<()> {
    let status = Command::new("git")
        .args(["clean", "-Xdf"])
        .current_dir(dir)
        .status()
        .map_err(|e| RenameError::VcsClean {
            dir: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !status.success() {
        return Err(RenameError::VcsClean {
            dir: dir.to_path_buf(),
            reason: format!("git exited with {}", status),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_tree_copies_nested_files() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let target = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir_all(source.path().join("a/b")).unwrap();
        fs::write(source.path().join("root.txt"), "root").unwrap();
        fs::write(source.path().join("a/b/deep.txt"), "deep").unwrap();

        let dest = target.path().join("copy");
        let mut seen = Vec::new();
        let copied = copy_tree(source.path(), &dest, |p| seen.push(p.to_path_buf())).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(seen.len(), 2);
        assert_eq!(fs::read_to_string(dest.join("root.txt")).unwrap(), "root");
        assert_eq!(fs::read_to_string(dest.join("a/b/deep.txt")).unwrap(), "deep");
    }

    #[test]
    fn test_copy_tree_overwrites_existing_files() {
        let source = TempDir::new().expect("Failed to create temp directory");
        let target = TempDir::new().expect("Failed to create temp directory");
        fs::write(source.path().join("f.txt"), "new").unwrap();
        fs::write(target.path().join("f.txt"), "old").unwrap();

        copy_tree(source.path(), target.path(), |_| {}).unwrap();

        assert_eq!(fs::read_to_string(target.path().join("f.txt")).unwrap(), "new");
    }

    #[test]
    fn test_copy_tree_missing_source() {
        let target = TempDir::new().expect("Failed to create temp directory");
        let result = copy_tree(Path::new("/nonexistent/source"), target.path(), |_| {});
        assert!(matches!(result, Err(RenameError::ListDir { .. })));
    }
}
