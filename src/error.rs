//! Error handling for schwab1099b
//!
//! Grammar failures inside a statement are typed with `StatementError` so
//! callers can inspect the offending line; everything at file/IO/CLI
//! boundaries flows through anyhow for context chaining.

use thiserror::Error;

/// Fatal problems found while scanning a statement export.
///
/// Line numbers are 1-based and relative to the file being scanned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatementError {
    /// The line does not have the shape the block grammar requires here.
    #[error("line {line}: expected {expected}, found {content:?}")]
    Format {
        line: usize,
        content: String,
        expected: &'static str,
    },

    /// The line has the right shape but a token carries an unusable value.
    #[error("line {line}: {reason}: {content:?}")]
    Value {
        line: usize,
        content: String,
        reason: String,
    },

    /// Input ended in the middle of a transaction block.
    #[error("line {line}: transaction block is cut off by the end of input")]
    Truncated { line: usize },
}

impl StatementError {
    /// 1-based line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            StatementError::Format { line, .. }
            | StatementError::Value { line, .. }
            | StatementError::Truncated { line } => *line,
        }
    }
}

/// Result type alias used at file and CLI boundaries
pub type Result<T> = anyhow::Result<T>;
