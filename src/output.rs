//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status lines,
//! the rewrite progress spinner, and the final report table.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - A spinner for the rewrite pass
/// - Summary tables with statistics
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use renametree::output::OutputFormatter;
    /// OutputFormatter::success("Directory rename complete");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Arguments
    ///
    /// * `message` - The error message to display on stderr
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The warning message to display
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints an `old -> new` rename.
    ///
    /// # Arguments
    ///
    /// * `from` - The path before the rename
    /// * `to` - The path after the rename
    pub fn rename(from: &Path, to: &Path) {
        println!("{}", Self::rename_line(from, to));
    }

    /// Formats an `old -> new` rename without printing it, for output that
    /// has to go through a progress bar.
    ///
    /// # Returns
    ///
    /// The styled line, indented like [`OutputFormatter::rename`].
    pub fn rename_line(from: &Path, to: &Path) -> String {
        format!(
            "  {} {} {}",
            from.display().to_string().dimmed(),
            "->".cyan(),
            to.display()
        )
    }

    /// Creates a spinner for the file rewrite pass, whose total is not known
    /// up front.
    ///
    /// # Returns
    ///
    /// A ticking `ProgressBar`; print through it with `println` while it runs.
    pub fn create_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.cyan} {pos} files {msg}")
        {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Prints a two-column summary table.
    ///
    /// # Arguments
    ///
    /// * `rows` - `(label, count)` pairs, printed in order
    ///
    /// # Example
    ///
    /// ```no_run
    /// use renametree::output::OutputFormatter;
    ///
    /// OutputFormatter::summary_table(&[("Directories renamed", 4), ("Files rewritten", 120)]);
    /// ```
    pub fn summary_table(rows: &[(&str, usize)]) {
        Self::header("REPORT");

        let max_label_len = rows
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(0)
            .max(4);

        println!("{}", "-".repeat(max_label_len + 10));
        for (label, count) in rows {
            println!(
                "{:<width$} | {}",
                label,
                count.to_string().green(),
                width = max_label_len
            );
        }
        println!("{}", "-".repeat(max_label_len + 10));
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
