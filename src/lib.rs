//! renametree - rename a templated solution
//!
//! This library renames company and project tokens across a directory tree:
//! it compiles ignore globs into path and file matchers, renames directories
//! bottom-up, then rewrites file contents and file names top-down, all through
//! an abstract file store so the walks can run against the disk, memory, or a
//! dry-run recorder.

pub mod cli;
pub mod config;
pub mod copier;
pub mod dir_renamer;
pub mod error;
pub mod file_store;
pub mod output;
pub mod pattern;
pub mod rename_spec;
pub mod rewriter;

pub use config::{CompiledConfig, ConfigError, ExtensionFilter, RenameConfig};
pub use dir_renamer::{DirRenameSummary, rename_dirs};
pub use error::{RenameError, RenameResult};
pub use file_store::{FileStore, MemoryFileStore, OsFileStore, RecordingStore};
pub use pattern::{FileMatcher, IgnoreRules, PathMatcher};
pub use rename_spec::RenameSpec;
pub use rewriter::{RewriteSummary, rewrite_tree};

pub use cli::{Prompter, RunArgs, RunOptions, RunReport, execute, run_cli};
