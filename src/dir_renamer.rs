//! Bottom-up renaming of directories whose names contain an old token.
//!
//! Ignore decisions are made against the original path before descending, and
//! a directory is only renamed after all of its descendants have been
//! processed, so no rename ever invalidates a path that is still pending.

use crate::error::{RenameError, RenameResult};
use crate::file_store::FileStore;
use crate::pattern::IgnoreRules;
use crate::rename_spec::RenameSpec;
use std::path::{Path, PathBuf};

/// Outcome of a directory rename pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirRenameSummary {
    /// `(old, new)` pairs in the order they were renamed.
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Directories skipped because an ignore rule matched.
    pub ignored: usize,
}

enum Visit {
    Enter(PathBuf),
    Rename(PathBuf),
}

/// Renames every directory below `root` whose name contains an old token.
///
/// `root` itself is never renamed. The walk uses an explicit stack, so
/// depth is not limited by the call stack.
///
/// `on_rename` is called with `(old, new)` as soon as each directory has been
/// moved, so renames done before a failure are still reported.
///
/// # Errors
///
/// Fails on the first directory that cannot be listed or renamed, including
/// when the new name already exists. Renames done before the failure stay.
///
/// # Examples
///
/// ```
/// use renametree::dir_renamer::rename_dirs;
/// use renametree::file_store::MemoryFileStore;
/// use renametree::pattern::IgnoreRules;
/// use renametree::rename_spec::RenameSpec;
/// use std::path::Path;
///
/// let mut store = MemoryFileStore::new();
/// store.add_dir("/proj/Acme.Web/Acme.Core");
///
/// let spec = RenameSpec::new("Acme", "Widget", "Globex", "Gadget");
/// let ignores = IgnoreRules::default();
/// rename_dirs(&mut store, Path::new("/proj"), &spec, &ignores, |_, _| {}).unwrap();
///
/// assert!(store.is_dir("/proj/Globex.Web/Globex.Core"));
/// ```
pub fn rename_dirs<S: FileStore>(
    store: &mut S,
    root: &Path,
    spec: &RenameSpec,
    ignores: &IgnoreRules,
    mut on_rename: impl FnMut(&Path, &Path),
) -> RenameResult<DirRenameSummary> {
    let mut summary = DirRenameSummary::default();
    let mut stack = vec![Visit::Enter(root.to_path_buf())];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(dir) => {
                let subdirs = store.list_dirs(&dir).map_err(|e| RenameError::ListDir {
                    path: dir.clone(),
                    source: e,
                })?;

                // Reversed so siblings are processed in listing order.
                for subdir in subdirs.into_iter().rev() {
                    if ignores.is_path_ignored(&subdir) {
                        summary.ignored += 1;
                        continue;
                    }
                    stack.push(Visit::Rename(subdir.clone()));
                    stack.push(Visit::Enter(subdir));
                }
            }
            Visit::Rename(dir) => {
                if let Some(renamed) = rename_one(store, &dir, spec)? {
                    on_rename(&dir, &renamed);
                    summary.renamed.push((dir, renamed));
                }
            }
        }
    }

    Ok(summary)
}

/// Renames a single directory in place if its name carries a token.
fn rename_one<S: FileStore>(
    store: &mut S,
    dir: &Path,
    spec: &RenameSpec,
) -> RenameResult<Option<PathBuf>> {
    let (Some(name), Some(parent)) = (dir.file_name(), dir.parent()) else {
        return Ok(None);
    };
    let Some(new_name) = spec.rename(&name.to_string_lossy()) else {
        return Ok(None);
    };

    let new_path = parent.join(new_name);
    if new_path == dir {
        return Ok(None);
    }

    store
        .rename_dir(dir, &new_path)
        .map_err(|e| RenameError::DirRename {
            from: dir.to_path_buf(),
            to: new_path.clone(),
            source: e,
        })?;

    Ok(Some(new_path))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::file_store::MemoryFileStore;

    fn spec() -> RenameSpec {
        RenameSpec::new("OldCo", "OldProj", "NewCo", "NewProj")
    }

    fn ignores(patterns: &[&str]) -> IgnoreRules {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        IgnoreRules::compile(Path::new("/r"), &patterns).unwrap()
    }

    #[test]
    fn test_nested_directories_renamed_innermost_first() {
        let mut store = MemoryFileStore::new();
        store.add_dir("/r/A/OldCo-B/OldCo-C");

        let summary =
            rename_dirs(&mut store, Path::new("/r"), &spec(), &ignores(&[]), |_, _| {}).unwrap();

        assert!(store.is_dir("/r/A/NewCo-B/NewCo-C"));
        assert!(!store.exists(Path::new("/r/A/OldCo-B")));
        assert_eq!(
            summary.renamed,
            vec![
                (
                    PathBuf::from("/r/A/OldCo-B/OldCo-C"),
                    PathBuf::from("/r/A/OldCo-B/NewCo-C")
                ),
                (PathBuf::from("/r/A/OldCo-B"), PathBuf::from("/r/A/NewCo-B")),
            ]
        );
    }

    #[test]
    fn test_both_tokens_substituted_in_one_name() {
        let mut store = MemoryFileStore::new();
        store.add_dir("/r/OldCo.OldProj.Web");

        rename_dirs(&mut store, Path::new("/r"), &spec(), &ignores(&[]), |_, _| {}).unwrap();

        assert!(store.is_dir("/r/NewCo.NewProj.Web"));
    }

    #[test]
    fn test_ignored_directory_is_neither_entered_nor_renamed() {
        let mut store = MemoryFileStore::new();
        store.add_dir("/r/OldCo-bin/OldCo-inner");
        store.add_dir("/r/OldCo-src");

        let summary = rename_dirs(
            &mut store,
            Path::new("/r"),
            &spec(),
            &ignores(&["OldCo-bin/"]),
            |_, _| {},
        )
        .unwrap();

        assert!(store.is_dir("/r/OldCo-bin/OldCo-inner"));
        assert!(store.is_dir("/r/NewCo-src"));
        assert_eq!(summary.ignored, 1);
    }

    #[test]
    fn test_root_is_never_renamed() {
        let mut store = MemoryFileStore::new();
        store.add_dir("/OldCo/child");

        let summary = rename_dirs(
            &mut store,
            Path::new("/OldCo"),
            &spec(),
            &ignores(&[]),
            |_, _| {},
        )
        .unwrap();

        assert!(store.is_dir("/OldCo/child"));
        assert!(summary.renamed.is_empty());
    }

    #[test]
    fn test_empty_old_company_only_renames_project() {
        let mut store = MemoryFileStore::new();
        store.add_dir("/r/OldCo.OldProj");
        store.add_dir("/r/OldCo.Only");
        let spec = RenameSpec::new("", "OldProj", "NewCo", "NewProj");

        rename_dirs(&mut store, Path::new("/r"), &spec, &ignores(&[]), |_, _| {}).unwrap();

        assert!(store.is_dir("/r/OldCo.NewProj"));
        assert!(store.is_dir("/r/OldCo.Only"));
    }

    #[test]
    fn test_collision_with_existing_directory_is_fatal() {
        let mut store = MemoryFileStore::new();
        store.add_dir("/r/OldCo.App");
        store.add_dir("/r/NewCo.App");

        let result = rename_dirs(&mut store, Path::new("/r"), &spec(), &ignores(&[]), |_, _| {});

        assert!(matches!(result, Err(RenameError::DirRename { .. })));
        assert!(store.is_dir("/r/OldCo.App"));
    }

    #[test]
    fn test_renames_before_a_collision_are_reported() {
        let mut store = MemoryFileStore::new();
        store.add_dir("/r/OldCo.A");
        store.add_dir("/r/OldCo.B");
        store.add_dir("/r/NewCo.B");
        let mut reported = Vec::new();

        let result = rename_dirs(
            &mut store,
            Path::new("/r"),
            &spec(),
            &ignores(&[]),
            |from, to| reported.push((from.to_path_buf(), to.to_path_buf())),
        );

        assert!(matches!(result, Err(RenameError::DirRename { .. })));
        assert_eq!(
            reported,
            vec![(PathBuf::from("/r/OldCo.A"), PathBuf::from("/r/NewCo.A"))]
        );
        assert!(store.is_dir("/r/NewCo.A"));
    }

    #[test]
    fn test_missing_root_is_reported() {
        let mut store = MemoryFileStore::new();
        let result = rename_dirs(
            &mut store,
            Path::new("/absent"),
            &spec(),
            &ignores(&[]),
            |_, _| {},
        );
        assert!(matches!(result, Err(RenameError::ListDir { .. })));
    }
}
