//! Stderr reporting for the statement parser
//!
//! Kept apart from the scanner so the library never writes to the terminal.

use colored::Colorize;
use std::path::Path;

use crate::statement::{Checkpoint, CheckpointReason};

/// Render a section's totals the way they are printed on stderr
pub fn format_checkpoint(path: &Path, checkpoint: &Checkpoint) -> String {
    let heading = match checkpoint.reason {
        CheckpointReason::LongTermHeader => format!(
            "Short-term totals for {} (up to line {})",
            path.display(),
            checkpoint.line
        ),
        CheckpointReason::EndOfFile => format!("Section totals at end of {}", path.display()),
    };

    let mut out = String::new();
    out.push_str(&"********".dimmed().to_string());
    out.push('\n');
    out.push_str(&heading.bold().to_string());
    out.push('\n');
    for line in checkpoint.totals.report_lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn print_checkpoint(path: &Path, checkpoint: &Checkpoint) {
    eprintln!("{}", format_checkpoint(path, checkpoint));
}
