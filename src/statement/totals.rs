use rust_decimal::Decimal;

use crate::models::Transaction;
use crate::utils::format_usd;

/// Running sums over the records of one statement section.
///
/// Only used for cross-checking against the summary page printed on the
/// statement; never part of the structured output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningTotals {
    pub records: usize,
    pub shares: u64,
    pub proceeds: Decimal,
    pub basis: Decimal,
    pub wash: Decimal,
}

impl RunningTotals {
    /// Sums with `tx` included, or `None` if any of them would overflow
    pub fn checked_add(&self, tx: &Transaction) -> Option<RunningTotals> {
        Some(RunningTotals {
            records: self.records.checked_add(1)?,
            shares: self.shares.checked_add(tx.quantity())?,
            proceeds: self.proceeds.checked_add(tx.proceeds())?,
            basis: self.basis.checked_add(tx.basis())?,
            wash: match tx.wash() {
                Some(wash) => self.wash.checked_add(wash)?,
                None => self.wash,
            },
        })
    }

    /// Return the current sums and start over from zero
    pub fn take(&mut self) -> RunningTotals {
        std::mem::take(self)
    }

    /// Human-readable report, one entry per line
    pub fn report_lines(&self) -> Vec<String> {
        vec![
            format!("Total # records read: {}", self.records),
            format!("Total shares: {}", self.shares),
            "Verify these totals with the summary on the last page of the Schwab statement"
                .to_string(),
            format!("Total Proceeds: {}", format_usd(self.proceeds)),
            format!("Total Basis: {}", format_usd(self.basis)),
            format!("Total Wash: {}", format_usd(self.wash)),
        ]
    }
}

/// What closed a totals section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointReason {
    /// A long-term section header was found
    LongTermHeader,
    /// The file ran out
    EndOfFile,
}

/// Totals of a finished section together with where it ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// 1-based line at which the section closed (the header line, or the
    /// last line of the file)
    pub line: usize,
    pub reason: CheckpointReason,
    pub totals: RunningTotals,
}
