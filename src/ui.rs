// UI module for consistent terminal output with progress bars and styling
//
// Every user-facing line goes through here; the rest of the crate is denied
// direct printing by clippy.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use console::{Term, style};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Check if stderr is a TTY (for interactive output)
fn is_tty() -> bool {
    Term::stderr().is_term()
}

/// Create a styled spinner for portal round-trips
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if !is_tty() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars(SPINNER_CHARS)
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());

    if is_tty() {
        pb.enable_steady_tick(Duration::from_millis(80));
    }

    pb
}

/// Progress bar for a download of known size
pub fn download_bar(total_size: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.cyan} {msg} [{bar:25.cyan/dim}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            )
            .unwrap()
            .tick_chars(SPINNER_CHARS)
            .progress_chars("━━╺"),
    );
    pb
}

/// Progress bar when the server does not announce a size
pub fn download_bar_indeterminate() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars(SPINNER_CHARS)
            .template("{spinner:.cyan} {msg} {bytes} ({bytes_per_sec})")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Multi-progress manager for parallel downloads
pub fn multi_progress() -> MultiProgress {
    if is_tty() {
        MultiProgress::new()
    } else {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }
}

/// Print a success message with checkmark
pub fn success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print an info/action message with arrow
pub fn action(message: &str) {
    println!("{} {}", style("→").cyan(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red(), message);
}

/// Print a hint under an error
pub fn hint(message: &str) {
    eprintln!("  {}", style(message).dim());
}

/// Print a header/section message
pub fn header(message: &str) {
    println!("{}", style(message).bold());
}

/// Print a dimmed/secondary message
pub fn dim(message: &str) {
    println!("{}", style(message).dim());
}

/// Print a status message (for dry-run, etc.)
pub fn status(prefix: &str, message: &str) {
    println!("{} {}", style(prefix).cyan().bold(), message);
}

/// Print a key/value row, key padded to `width`
pub fn row(key: &str, width: usize, value: &str) {
    println!("  {:<width$}  {}", style(key).cyan(), value, width = width);
}

/// Print unstyled text (plain and JSON output formats)
pub fn raw(text: &str) {
    println!("{}", text);
}

/// Finish a spinner with success
pub fn finish_spinner_success(pb: &ProgressBar, message: &str) {
    let msg = format!("{} {}", style("✓").green(), message);
    if is_tty() {
        pb.set_style(ProgressStyle::default_spinner().template("{msg}").unwrap());
        pb.finish_with_message(msg);
    } else {
        pb.finish_and_clear();
    }
}

/// Finish a spinner with error
pub fn finish_spinner_error(pb: &ProgressBar, message: &str) {
    let msg = format!("{} {}", style("✗").red(), message);
    if is_tty() {
        pb.set_style(ProgressStyle::default_spinner().template("{msg}").unwrap());
        pb.finish_with_message(msg);
    } else {
        pb.finish_and_clear();
    }
}

/// Finish a download bar with success
pub fn finish_download_success(pb: &ProgressBar, name: &str) {
    let msg = format!(
        "{} {} {}",
        style("✓").green(),
        name,
        style("downloaded").dim()
    );
    if is_tty() {
        pb.set_style(ProgressStyle::default_spinner().template("{msg}").unwrap());
        pb.finish_with_message(msg);
    } else {
        pb.finish_and_clear();
        println!("{}", msg);
    }
}

/// Clear a progress bar without leaving a message
pub fn clear_bar(pb: &ProgressBar) {
    pb.finish_and_clear();
}
