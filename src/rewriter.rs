//! Rewriting of file contents and file names.
//!
//! Walks the tree top-down. In each directory that is not ignored, every file
//! whose extension is allowed and which is not itself ignored is read as UTF-8,
//! has its tokens substituted, and is written back (under a new name if its
//! name carried a token). Subdirectories are then visited in order.

use crate::config::ExtensionFilter;
use crate::error::{RenameError, RenameResult};
use crate::file_store::FileStore;
use crate::pattern::IgnoreRules;
use crate::rename_spec::RenameSpec;
use std::path::{Path, PathBuf};

const UTF8_BOM: char = '\u{feff}';

/// Outcome of a rewrite pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Files read and written back.
    pub processed: usize,
    /// Files whose text changed.
    pub content_changed: usize,
    /// `(old, new)` pairs for files written under a new name.
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Files and directories skipped by an ignore rule.
    pub ignored: usize,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub renamed_to: Option<PathBuf>,
    pub content_changed: bool,
}

/// Rewrites contents and names of eligible files under `root`.
///
/// `on_file` is called after each file is written; the CLI uses it to report
/// progress.
///
/// # Errors
///
/// Any unreadable, undecodable, or unwritable file aborts the walk. A renamed
/// file that lands on an existing sibling overwrites it.
pub fn rewrite_tree<S: FileStore>(
    store: &mut S,
    root: &Path,
    spec: &RenameSpec,
    ignores: &IgnoreRules,
    extensions: &ExtensionFilter,
    mut on_file: impl FnMut(&FileOutcome),
) -> RenameResult<RewriteSummary> {
    let mut summary = RewriteSummary::default();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        if ignores.is_path_ignored(&dir) {
            summary.ignored += 1;
            continue;
        }

        let files = store.list_files(&dir).map_err(|e| RenameError::ListDir {
            path: dir.clone(),
            source: e,
        })?;

        for file in files.iter().filter(|f| extensions.allows(f)) {
            if ignores.is_file_ignored(file) {
                summary.ignored += 1;
                continue;
            }

            let outcome = rewrite_file(store, file, spec)?;
            summary.processed += 1;
            if outcome.content_changed {
                summary.content_changed += 1;
            }
            if let Some(new_path) = &outcome.renamed_to {
                summary.renamed.push((file.clone(), new_path.clone()));
            }
            on_file(&outcome);
        }

        let subdirs = store.list_dirs(&dir).map_err(|e| RenameError::ListDir {
            path: dir.clone(),
            source: e,
        })?;
        stack.extend(subdirs.into_iter().rev());
    }

    Ok(summary)
}

/// Reads `path` as UTF-8, dropping a leading byte-order mark.
pub fn read_text<S: FileStore>(store: &S, path: &Path) -> RenameResult<String> {
    let bytes = store.read(path).map_err(|e| RenameError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let text = String::from_utf8(bytes).map_err(|e| RenameError::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn rewrite_file<S: FileStore>(
    store: &mut S,
    path: &Path,
    spec: &RenameSpec,
) -> RenameResult<FileOutcome> {
    let original = read_text(store, path)?;
    let rewritten = spec.substitute(&original);
    let content_changed = rewritten != original;

    let new_path = path
        .file_name()
        .and_then(|name| spec.rename(&name.to_string_lossy()))
        .and_then(|new_name| path.parent().map(|parent| parent.join(new_name)))
        .filter(|new_path| new_path != path);

    let destination = new_path.as_deref().unwrap_or(path);
    store
        .write(destination, rewritten.as_bytes())
        .map_err(|e| RenameError::Write {
            path: destination.to_path_buf(),
            source: e,
        })?;

    if new_path.is_some() {
        store.remove_file(path).map_err(|e| RenameError::Remove {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    Ok(FileOutcome {
        path: path.to_path_buf(),
        renamed_to: new_path,
        content_changed,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::file_store::MemoryFileStore;

    fn spec() -> RenameSpec {
        RenameSpec::new("Acme", "Widget", "Globex", "Gadget")
    }

    fn ignores(patterns: &[&str]) -> IgnoreRules {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        IgnoreRules::compile(Path::new("/proj"), &patterns).unwrap()
    }

    fn cs_only() -> ExtensionFilter {
        ExtensionFilter::parse(".cs").unwrap()
    }

    fn run(store: &mut MemoryFileStore, patterns: &[&str]) -> RenameResult<RewriteSummary> {
        rewrite_tree(
            store,
            Path::new("/proj"),
            &spec(),
            &ignores(patterns),
            &cs_only(),
            |_| {},
        )
    }

    #[test]
    fn test_content_and_name_rewritten() {
        let mut store = MemoryFileStore::new();
        store.add_file("/proj/src/AcmeWidget.cs", "class AcmeWidget {}");

        let summary = run(&mut store, &[]).unwrap();

        assert_eq!(
            store.contents("/proj/src/GlobexGadget.cs"),
            Some(&b"class GlobexGadget {}"[..])
        );
        assert!(!store.exists(Path::new("/proj/src/AcmeWidget.cs")));
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.content_changed, 1);
        assert_eq!(summary.renamed.len(), 1);
    }

    #[test]
    fn test_content_rewritten_in_place_when_name_has_no_token() {
        let mut store = MemoryFileStore::new();
        store.add_file("/proj/Program.cs", "using Acme.Widget;");

        run(&mut store, &[]).unwrap();

        assert_eq!(
            store.contents("/proj/Program.cs"),
            Some(&b"using Globex.Gadget;"[..])
        );
    }

    #[test]
    fn test_extension_not_in_filter_is_untouched() {
        let mut store = MemoryFileStore::new();
        store.add_file("/proj/AcmeWidget.txt", "Acme");

        let summary = run(&mut store, &[]).unwrap();

        assert_eq!(store.contents("/proj/AcmeWidget.txt"), Some(&b"Acme"[..]));
        assert_eq!(summary.processed, 0);
    }

    #[test]
    fn test_ignored_directory_is_not_entered() {
        let mut store = MemoryFileStore::new();
        store.add_file("/proj/bin/Acme.cs", "Acme");
        store.add_file("/proj/bin/deep/Acme.cs", "Acme");

        run(&mut store, &["bin/"]).unwrap();

        assert_eq!(store.contents("/proj/bin/Acme.cs"), Some(&b"Acme"[..]));
        assert_eq!(store.contents("/proj/bin/deep/Acme.cs"), Some(&b"Acme"[..]));
    }

    #[test]
    fn test_ignored_file_is_untouched() {
        let mut store = MemoryFileStore::new();
        store.add_file("/proj/Generated.cs", "Acme");
        store.add_file("/proj/Other.cs", "Acme");

        let summary = run(&mut store, &["Generated.cs"]).unwrap();

        assert_eq!(store.contents("/proj/Generated.cs"), Some(&b"Acme"[..]));
        assert_eq!(store.contents("/proj/Other.cs"), Some(&b"Globex"[..]));
        assert_eq!(summary.ignored, 1);
    }

    #[test]
    fn test_byte_order_mark_is_dropped() {
        let mut store = MemoryFileStore::new();
        store.add_file("/proj/App.cs", "\u{feff}namespace Acme;");

        run(&mut store, &[]).unwrap();

        assert_eq!(
            store.contents("/proj/App.cs"),
            Some(&b"namespace Globex;"[..])
        );
    }

    #[test]
    fn test_invalid_utf8_aborts() {
        let mut store = MemoryFileStore::new();
        store.add_file("/proj/Bad.cs", [0xff, 0xfe, 0x00, 0x41]);

        let result = run(&mut store, &[]);

        match result {
            Err(RenameError::Decode { path, .. }) => {
                assert_eq!(path, PathBuf::from("/proj/Bad.cs"))
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_rename_onto_existing_sibling_overwrites_it() {
        let mut store = MemoryFileStore::new();
        store.add_file("/proj/Acme.cs", "from acme");
        store.add_file("/proj/Globex.cs", "existing");

        run(&mut store, &[]).unwrap();

        assert!(!store.exists(Path::new("/proj/Acme.cs")));
        // The sibling's original content is lost.
        assert_eq!(store.contents("/proj/Globex.cs"), Some(&b"from acme"[..]));
    }

    #[test]
    fn test_callback_sees_every_processed_file() {
        let mut store = MemoryFileStore::new();
        store.add_file("/proj/a/One.cs", "x");
        store.add_file("/proj/b/Two.cs", "y");
        let mut seen = Vec::new();

        rewrite_tree(
            &mut store,
            Path::new("/proj"),
            &spec(),
            &ignores(&[]),
            &cs_only(),
            |outcome| seen.push(outcome.path.clone()),
        )
        .unwrap();

        assert_eq!(
            seen,
            vec![
                PathBuf::from("/proj/a/One.cs"),
                PathBuf::from("/proj/b/Two.cs")
            ]
        );
    }
}
