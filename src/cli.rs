//! Command-line interface module for renametree.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Interactive prompts for names and the target folder
//! - Optional VCS clean and copy of the source tree
//! - Running the directory and file passes, live or as a dry run
//! - Reporting

use crate::config::{CompiledConfig, RenameConfig};
use crate::copier::{copy_tree, git_clean};
use crate::dir_renamer::{DirRenameSummary, rename_dirs};
use crate::error::RenameError;
use crate::file_store::{FileStore, OsFileStore, PlannedChange, RecordingStore};
use crate::output::OutputFormatter;
use crate::rename_spec::{
    DEFAULT_NEW_PROJECT_NAME, DEFAULT_OLD_COMPANY_NAME, DEFAULT_OLD_PROJECT_NAME, RenameSpec,
};
use crate::rewriter::{RewriteSummary, rewrite_tree};
use chrono::{DateTime, Local};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::time::{Duration, Instant};

/// Command-line arguments. Anything not given here is prompted for.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "renametree")]
#[command(version, about = "Rename company and project tokens across a directory tree")]
pub struct RunArgs {
    /// Path to configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Company name to replace (empty disables company substitution)
    #[arg(long)]
    pub old_company: Option<String>,

    /// Project name to replace
    #[arg(long)]
    pub old_project: Option<String>,

    /// New company name
    #[arg(long)]
    pub new_company: Option<String>,

    /// New project name
    #[arg(long)]
    pub new_project: Option<String>,

    /// Folder to rename in (the output folder when --source is given)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Copy the configured subtrees from this folder into the target first
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Run `git clean -Xdf` in the source folder before copying
    #[arg(long)]
    pub git_clean: bool,

    /// Show what would change without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Never prompt; use flags and defaults
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Console prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asks a question and returns the trimmed answer, or `default` if the
    /// answer is empty. End of input counts as an empty answer.
    ///
    /// # Arguments
    ///
    /// * `question` - The prompt text; the default is shown in parentheses
    /// * `default` - The value used when the answer is empty
    ///
    /// # Returns
    ///
    /// The answer, or an I/O error from reading or writing the console.
    pub fn ask(&mut self, question: &str, default: Option<&str>) -> io::Result<String> {
        match default {
            Some(default) => writeln!(self.output, "{}({}):", question, default)?,
            None => writeln!(self.output, "{}:", question)?,
        }
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let answer = line.trim();

        Ok(match default {
            Some(default) if answer.is_empty() => default.to_string(),
            _ => answer.to_string(),
        })
    }
}

/// Everything a run needs, resolved from flags, config, and prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub spec: RenameSpec,
    pub target: PathBuf,
    pub source: Option<PathBuf>,
    pub git_clean: bool,
    pub dry_run: bool,
}

/// What a run did (or, for a dry run, would do).
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub root: PathBuf,
    pub copied_files: usize,
    pub dirs: DirRenameSummary,
    pub files: RewriteSummary,
    pub dir_phase: Duration,
    pub file_phase: Duration,
    /// Planned changes; empty unless this was a dry run.
    pub planned: Vec<PlannedChange>,
}

/// Trims quotes, makes the path absolute, and drops trailing separators.
///
/// # Arguments
///
/// * `raw` - The folder as typed, possibly quoted or relative
///
/// # Returns
///
/// The absolute folder path. A bare root such as `/` is kept as is.
pub fn normalize_target(raw: &str) -> io::Result<PathBuf> {
    let trimmed = raw.trim().trim_matches('"');
    let absolute = std::path::absolute(trimmed)?;
    let stripped = absolute
        .to_string_lossy()
        .trim_end_matches(MAIN_SEPARATOR)
        .to_string();
    if stripped.is_empty() {
        return Ok(absolute);
    }
    Ok(PathBuf::from(stripped))
}

/// Resolves names and the target from flags, falling back to prompts.
///
/// With `--yes`, defaults are used instead of prompting and a target flag is
/// required.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments
/// * `config` - Loaded configuration, which may override the old-name defaults
/// * `prompter` - Console used for anything the flags leave open
///
/// # Returns
///
/// The resolved options, or an error message if input fails or no target is
/// given.
pub fn resolve_options<R: BufRead, W: Write>(
    args: &RunArgs,
    config: &RenameConfig,
    prompter: &mut Prompter<R, W>,
) -> Result<RunOptions, String> {
    let prompt_err = |e: io::Error| format!("Error reading input: {}", e);

    let default_old_company = config
        .old_company_name
        .as_deref()
        .unwrap_or(DEFAULT_OLD_COMPANY_NAME);
    let default_old_project = config
        .old_project_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_OLD_PROJECT_NAME);

    let mut ask = |value: &Option<String>, question: &str, default: Option<&str>| {
        match value {
            Some(value) => Ok(value.clone()),
            None if args.yes => Ok(default.unwrap_or_default().to_string()),
            None => prompter.ask(question, default).map_err(prompt_err),
        }
    };

    let old_company = ask(
        &args.old_company,
        "Input your old company name",
        Some(default_old_company),
    )?;
    let mut old_project = ask(
        &args.old_project,
        "Input your old project name",
        Some(default_old_project),
    )?;
    if old_project.is_empty() {
        old_project = default_old_project.to_string();
    }
    let new_company = ask(&args.new_company, "Input your new company name", None)?;
    let new_project = ask(
        &args.new_project,
        "Input your new project name",
        Some(DEFAULT_NEW_PROJECT_NAME),
    )?;

    let raw_target = match &args.target {
        Some(target) => target.clone(),
        None if args.yes => return Err("--target is required with --yes".to_string()),
        None => ask(&None, "Output folder", None)?,
    };
    if raw_target.trim().trim_matches('"').is_empty() {
        return Err("No output folder given".to_string());
    }
    let target = normalize_target(&raw_target)
        .map_err(|e| format!("Invalid output folder {}: {}", raw_target, e))?;

    Ok(RunOptions {
        spec: RenameSpec::new(old_company, old_project, new_company, new_project),
        target,
        source: args.source.clone(),
        git_clean: args.git_clean,
        dry_run: args.dry_run,
    })
}

/// Runs the CLI application: loads configuration, resolves options, executes,
/// and prints the report.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments
/// * `prompter` - Console used for interactive prompts
///
/// # Returns
///
/// The run report, or an error message suitable for printing.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use renametree::cli::{Prompter, RunArgs, run_cli};
///
/// let args = RunArgs::parse_from(["renametree", "--target", "./out", "--yes"]);
/// let stdin = std::io::stdin();
/// let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
/// match run_cli(&args, &mut prompter) {
///     Ok(report) => println!("Rewrote {} files", report.files.processed),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli<R: BufRead, W: Write>(
    args: &RunArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<RunReport, String> {
    let config = RenameConfig::load(args.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let options = resolve_options(args, &config, prompter)?;
    let report = execute(&options, &config)?;
    print_report(&report);
    Ok(report)
}

/// Executes a fully resolved run against the real filesystem.
///
/// This function:
/// 1. Optionally cleans the source with git and copies it into the target
/// 2. Compiles the ignore rules against the root being renamed
/// 3. Renames directories bottom-up
/// 4. Rewrites file contents and names top-down
///
/// A dry run skips step 1, renames in the source (if given) or the target, and
/// records changes instead of applying them.
///
/// # Arguments
///
/// * `options` - Resolved names, folders, and run mode
/// * `config` - Configuration providing ignores, extensions, and subtrees
///
/// # Returns
///
/// A report of what was done, or would be done for a dry run.
pub fn execute(options: &RunOptions, config: &RenameConfig) -> Result<RunReport, String> {
    let started_at = Local::now();
    let mut copied_files = 0;

    let root = if options.dry_run {
        OutputFormatter::dry_run_notice("No files will be modified.");
        options.source.clone().unwrap_or_else(|| options.target.clone())
    } else {
        if let Some(source) = &options.source {
            copied_files = prepare_target(source, &options.target, options.git_clean, config)
                .map_err(|e| format!("Error preparing {}: {}", options.target.display(), e))?;
        }
        options.target.clone()
    };

    if !root.is_dir() {
        return Err(format!("Error: {} is not a directory", root.display()));
    }

    let compiled = config
        .compile(&root)
        .map_err(|e| format!("Error compiling configuration: {}", e))?;

    OutputFormatter::info(&format!("Renaming in: {}", root.display()));

    let (phases, planned) = if options.dry_run {
        let mut recorder = RecordingStore::new(&OsFileStore);
        let phases = run_phases(&mut recorder, &root, &options.spec, &compiled);
        (phases, recorder.into_changes())
    } else {
        let mut store = OsFileStore;
        (
            run_phases(&mut store, &root, &options.spec, &compiled),
            Vec::new(),
        )
    };
    let phases = phases.map_err(|e| format!("Error: {}", e))?;

    Ok(RunReport {
        started_at,
        root,
        copied_files,
        dirs: phases.dirs,
        files: phases.files,
        dir_phase: phases.dir_phase,
        file_phase: phases.file_phase,
        planned,
    })
}

fn prepare_target(
    source: &Path,
    target: &Path,
    clean: bool,
    config: &RenameConfig,
) -> Result<usize, RenameError> {
    if clean {
        OutputFormatter::info("Git cleaning...");
        git_clean(source)?;
    }

    OutputFormatter::info("Copying files...");
    let log_copy = |path: &Path| OutputFormatter::plain(&format!("Copying {}", path.display()));

    if config.copy_subtrees.is_empty() {
        return copy_tree(source, target, log_copy);
    }

    let mut copied = 0;
    for subtree in &config.copy_subtrees {
        let from = source.join(subtree);
        if !from.is_dir() {
            OutputFormatter::warning(&format!("Skipping missing subtree {}", from.display()));
            continue;
        }
        copied += copy_tree(&from, &target.join(subtree), log_copy)?;
    }
    Ok(copied)
}

struct PhaseResults {
    dirs: DirRenameSummary,
    files: RewriteSummary,
    dir_phase: Duration,
    file_phase: Duration,
}

/// Runs the directory pass to completion, then the file pass.
///
/// Each rename and each processed file is printed as it happens, so work done
/// before a failure is still visible.
fn run_phases<S: FileStore>(
    store: &mut S,
    root: &Path,
    spec: &RenameSpec,
    compiled: &CompiledConfig,
) -> Result<PhaseResults, RenameError> {
    let timer = Instant::now();
    let dirs = rename_dirs(store, root, spec, &compiled.ignores, OutputFormatter::rename)?;
    let dir_phase = timer.elapsed();
    OutputFormatter::success(&format!(
        "Directory rename complete! spend: {}ms",
        dir_phase.as_millis()
    ));

    let spinner = OutputFormatter::create_spinner();
    let timer = Instant::now();
    let files = rewrite_tree(
        store,
        root,
        spec,
        &compiled.ignores,
        &compiled.extensions,
        |outcome| {
            spinner.inc(1);
            let name = outcome
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if let Some(renamed_to) = &outcome.renamed_to {
                spinner.println(OutputFormatter::rename_line(&outcome.path, renamed_to));
            }
            spinner.println(format!("{} process complete!", name));
            spinner.set_message(name);
        },
    );
    let file_phase = timer.elapsed();
    spinner.finish_and_clear();
    let files = files?;

    OutputFormatter::success(&format!(
        "Filename and content rename complete! spend: {}ms",
        file_phase.as_millis()
    ));

    Ok(PhaseResults {
        dirs,
        files,
        dir_phase,
        file_phase,
    })
}

/// Prints the final report, and planned changes for a dry run.
///
/// # Arguments
///
/// * `report` - The report returned by [`execute`]
pub fn print_report(report: &RunReport) {
    if !report.planned.is_empty() {
        OutputFormatter::header("PLANNED CHANGES");
        for change in &report.planned {
            OutputFormatter::plain(&format!("  {}", change));
        }
    }

    OutputFormatter::summary_table(&[
        ("Files copied", report.copied_files),
        ("Directories renamed", report.dirs.renamed.len()),
        ("Files processed", report.files.processed),
        ("Files with changed content", report.files.content_changed),
        ("Files renamed", report.files.renamed.len()),
        ("Ignored paths", report.dirs.ignored + report.files.ignored),
    ]);
    OutputFormatter::plain(&format!(
        "Started {}; processing spend time, directories: {}ms, files: {}ms",
        report.started_at.format("%Y-%m-%d %H:%M:%S"),
        report.dir_phase.as_millis(),
        report.file_phase.as_millis()
    ));

    if report.planned.is_empty() {
        OutputFormatter::success(&format!("Renamed {}", report.root.display()));
    } else {
        OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");
    }
}
