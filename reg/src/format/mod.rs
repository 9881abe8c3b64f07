//! User-facing messages on stderr.
//!
//! Standard output carries only command results, so everything here (errors,
//! warnings, debug lines, progress) goes to stderr.

use crate::context::{AppContext, VerbosityLevel};
use indicatif::{ProgressBar, ProgressStyle};
use libreg::config::ColorChoice;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Trait for output formatting that can be TTY-aware or plain text
pub trait OutputFormatter: Send + Sync {
    /// Print an error message
    fn error(&self, message: &str);

    /// Print a warning message
    fn warning(&self, message: &str);

    /// Print a diagnostic message
    fn debug(&self, message: &str);

    /// Create a progress bar for determinate progress
    fn progress_bar(&self, len: u64, message: &str) -> ProgressBar;

    /// Remove a finished progress bar
    fn finish_progress(&self, pb: ProgressBar);
}

/// TTY-aware formatter with colors and progress indicators
pub struct TtyFormatter;

impl OutputFormatter for TtyFormatter {
    fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    fn warning(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow().bold(), message);
    }

    fn debug(&self, message: &str) {
        eprintln!("{}", message.dimmed());
    }

    fn progress_bar(&self, len: u64, message: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("█▓▒░ "));
        }
        pb.set_message(message.to_string());
        pb
    }

    fn finish_progress(&self, pb: ProgressBar) {
        pb.finish_and_clear();
    }
}

/// Plain text formatter for non-TTY output (piped, scripted)
pub struct PlainFormatter;

impl OutputFormatter for PlainFormatter {
    fn error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("⚠ {}", message);
    }

    fn debug(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn progress_bar(&self, _len: u64, _message: &str) -> ProgressBar {
        ProgressBar::hidden()
    }

    fn finish_progress(&self, pb: ProgressBar) {
        pb.finish();
    }
}

/// Whether the TTY formatter should be used for this color choice.
pub fn use_tty(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        }
    }
}

/// Create the appropriate formatter for the configured color choice
pub fn create_formatter(color: ColorChoice) -> Box<dyn OutputFormatter> {
    if use_tty(color) {
        Box::new(TtyFormatter)
    } else {
        Box::new(PlainFormatter)
    }
}

fn formatter(ctx: &AppContext) -> Box<dyn OutputFormatter> {
    create_formatter(ctx.config.output.color)
}

/// Print an error message
pub fn error(ctx: &AppContext, message: &str) {
    formatter(ctx).error(message);
}

/// Print a warning message
pub fn warning(ctx: &AppContext, message: &str) {
    formatter(ctx).warning(message);
}

/// Print a diagnostic message if the context's verbosity reaches `level`.
///
/// `Normal` messages are never printed through here; results go to stdout
/// and problems through [`error`] or [`warning`].
pub fn print(ctx: &AppContext, level: VerbosityLevel, message: &str) {
    if should_print(ctx.verbosity, level) {
        formatter(ctx).debug(message);
    }
}

fn should_print(current: VerbosityLevel, level: VerbosityLevel) -> bool {
    level > VerbosityLevel::Normal && current >= level
}

/// Create a progress bar; hidden unless the TTY formatter is in use.
pub fn progress_bar(ctx: &AppContext, len: u64, message: &str) -> ProgressBar {
    formatter(ctx).progress_bar(len, message)
}

/// Finish and clear a progress bar
pub fn finish_progress(ctx: &AppContext, pb: ProgressBar) {
    formatter(ctx).finish_progress(pb);
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
