// Statement parser - Schwab 1099-B text export to transaction records
//
// Files are scanned one at a time; records are grouped by holding period
// and handed out short-term first.

pub mod scanner;
pub mod totals;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::error::StatementError;
use crate::models::Transaction;

pub use scanner::{ScanOutput, StatementScanner, MIN_BLOCK_LINES};
pub use totals::{Checkpoint, CheckpointReason, RunningTotals};

/// Collects records across several statement files
pub struct StatementParser {
    config: Config,
    short_term: Vec<Transaction>,
    long_term: Vec<Transaction>,
}

impl StatementParser {
    pub fn new(config: Config) -> Self {
        StatementParser {
            config,
            short_term: Vec::new(),
            long_term: Vec::new(),
        }
    }

    /// Scan one statement held in memory.
    ///
    /// Records are added only when the whole text parses; the returned
    /// checkpoints carry the section totals in file order.
    pub fn parse_text(&mut self, text: &str) -> Result<Vec<Checkpoint>, StatementError> {
        let output = StatementScanner::new(&self.config, text).run()?;
        self.short_term.extend(output.short_term);
        self.long_term.extend(output.long_term);
        Ok(output.checkpoints)
    }

    /// Read and scan one statement file
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<Checkpoint>> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        info!(
            "Read a total of {} lines from {}",
            text.lines().count(),
            path.display()
        );

        self.parse_text(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn short_term_count(&self) -> usize {
        self.short_term.len()
    }

    pub fn long_term_count(&self) -> usize {
        self.long_term.len()
    }

    /// All records, short-term before long-term
    pub fn into_transactions(self) -> Vec<Transaction> {
        let mut all = self.short_term;
        all.extend(self.long_term);
        all
    }
}

/// Parse every file in order and return the combined records.
///
/// `on_checkpoint` sees each section's totals as soon as its file is done.
pub fn parse_files<P, F>(config: Config, paths: &[P], mut on_checkpoint: F) -> Result<Vec<Transaction>>
where
    P: AsRef<Path>,
    F: FnMut(&Path, &Checkpoint),
{
    let mut parser = StatementParser::new(config);
    for path in paths {
        let path = path.as_ref();
        for checkpoint in parser.parse_file(path)? {
            on_checkpoint(path, &checkpoint);
        }
    }

    info!(
        "{} short term transaction(s) processed",
        parser.short_term_count()
    );
    info!(
        "{} long term transaction(s) processed",
        parser.long_term_count()
    );
    Ok(parser.into_transactions())
}
