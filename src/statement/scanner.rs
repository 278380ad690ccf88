// Block scanner for Schwab 1099-B text exports
//
// A transaction block looks like:
//
//   02079K305                      <CUSIP>
//   2 SHARES OF GOOG               <n> SHARES OF <symbol>
//   09/19/2012 1,352.17 1,565.62   <acquired> <net proceeds> <cost basis>
//   W                              optional, wash sale loss disallowed
//   X                              non-covered security
//   11/28/2012 GROSS 92.56         <sold> GROSS [<wash amount>]
//
// Lines between blocks are skipped, except the long-term section header.

use rust_decimal::Decimal;
use tracing::debug;

use super::totals::{Checkpoint, CheckpointReason, RunningTotals};
use crate::config::Config;
use crate::error::StatementError;
use crate::models::{parse_shares_line, HoldingCategory, SharesLineError, Transaction};
use crate::utils::parse_amount;

/// Fewest lines a block can span (CUSIP, shares, amounts, X); the GROSS
/// line is not counted, so a block may still be cut off after this check.
pub const MIN_BLOCK_LINES: usize = 4;

const WASH_MARKER: &str = "W";
const NON_COVERED_MARKER: &str = "X";
const GROSS_TOKEN: &str = "GROSS";

/// Records and section totals found in one file
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanOutput {
    pub short_term: Vec<Transaction>,
    pub long_term: Vec<Transaction>,
    pub checkpoints: Vec<Checkpoint>,
}

/// Single-pass scanner over the trimmed lines of one file.
pub struct StatementScanner<'a> {
    config: &'a Config,
    lines: Vec<&'a str>,
    cursor: usize,
    section: HoldingCategory,
    totals: RunningTotals,
    output: ScanOutput,
}

impl<'a> StatementScanner<'a> {
    pub fn new(config: &'a Config, text: &'a str) -> Self {
        StatementScanner {
            config,
            lines: text.lines().map(str::trim).collect(),
            cursor: 0,
            section: HoldingCategory::ShortTerm,
            totals: RunningTotals::default(),
            output: ScanOutput::default(),
        }
    }

    /// Scan to the end of input.
    ///
    /// Stops quietly once fewer than [`MIN_BLOCK_LINES`] lines remain;
    /// anything left over is trailing summary text.
    pub fn run(mut self) -> Result<ScanOutput, StatementError> {
        while self.cursor + MIN_BLOCK_LINES <= self.lines.len() {
            let line = self.lines[self.cursor];

            if !self.config.is_cusip_line(line) {
                if self.config.is_long_term_header(line) {
                    debug!("Long-term section starts at line {}", self.cursor + 1);
                    self.checkpoint(self.cursor + 1, CheckpointReason::LongTermHeader);
                    self.section = HoldingCategory::LongTerm;
                }
                self.cursor += 1;
                continue;
            }

            debug!("Read CUSIP: {}", line);
            self.cursor += 1;
            let record_line = self.cursor + 1;
            let tx = self.read_block()?;
            self.totals = self
                .totals
                .checked_add(&tx)
                .ok_or_else(|| value_error(record_line, tx.desc(), "running totals overflow"))?;
            match tx.category() {
                HoldingCategory::ShortTerm => self.output.short_term.push(tx),
                HoldingCategory::LongTerm => self.output.long_term.push(tx),
            }
        }

        if self.cursor < self.lines.len() {
            debug!(
                "Ignoring {} trailing line(s)",
                self.lines.len() - self.cursor
            );
        }

        self.checkpoint(self.lines.len(), CheckpointReason::EndOfFile);
        Ok(self.output)
    }

    fn checkpoint(&mut self, line: usize, reason: CheckpointReason) {
        let totals = self.totals.take();
        self.output.checkpoints.push(Checkpoint {
            line,
            reason,
            totals,
        });
    }

    /// Consume the next line, returning its 1-based number and text
    fn next_line(&mut self) -> Result<(usize, &'a str), StatementError> {
        let line = self
            .lines
            .get(self.cursor)
            .copied()
            .ok_or(StatementError::Truncated {
                line: self.cursor + 1,
            })?;
        self.cursor += 1;
        debug!("Next line: {}", line);
        Ok((self.cursor, line))
    }

    /// Consume the next line only if it is exactly `marker`
    fn take_marker(&mut self, marker: &str) -> bool {
        if self.lines.get(self.cursor).copied() == Some(marker) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Parse the lines following a CUSIP line
    fn read_block(&mut self) -> Result<Transaction, StatementError> {
        let (line_no, shares_line) = self.next_line()?;
        let (quantity, symbol) = match parse_shares_line(shares_line) {
            Ok(parsed) => parsed,
            Err(SharesLineError::Shape) => {
                return Err(format_error(line_no, shares_line, "`<n> SHARES OF <symbol>`"))
            }
            Err(SharesLineError::Quantity) => {
                return Err(value_error(line_no, shares_line, "share count must be a positive number"))
            }
        };
        if !self.config.is_allowed_symbol(symbol) {
            return Err(value_error(
                line_no,
                shares_line,
                &format!("symbol {} is not in the allow-list", symbol),
            ));
        }

        let (line_no, amounts_line) = self.next_line()?;
        let tokens: Vec<&str> = amounts_line.split_whitespace().collect();
        let [acquired, proceeds, basis] = tokens.as_slice() else {
            return Err(format_error(
                line_no,
                amounts_line,
                "`<acquired date> <proceeds> <basis>`",
            ));
        };
        let proceeds = amount(line_no, amounts_line, proceeds, "proceeds", Sign::NonNegative)?;
        let basis = amount(line_no, amounts_line, basis, "basis", Sign::NonNegative)?;

        let has_wash = self.take_marker(WASH_MARKER);
        if !self.take_marker(NON_COVERED_MARKER) {
            let line_no = self.cursor + 1;
            return match self.lines.get(self.cursor) {
                Some(found) => Err(format_error(
                    line_no,
                    found,
                    "non-covered security marker `X`",
                )),
                None => Err(StatementError::Truncated { line: line_no }),
            };
        }

        let (line_no, gross_line) = self.next_line()?;
        let tokens: Vec<&str> = gross_line.split_whitespace().collect();
        let (sold, gross, wash_token) = match (tokens.as_slice(), has_wash) {
            ([sold, gross], false) => (*sold, *gross, None),
            ([sold, gross, wash], true) => (*sold, *gross, Some(*wash)),
            _ => {
                let expected = if has_wash {
                    "`<sale date> GROSS <wash amount>`"
                } else {
                    "`<sale date> GROSS`"
                };
                return Err(format_error(line_no, gross_line, expected));
            }
        };
        if gross != GROSS_TOKEN {
            return Err(format_error(line_no, gross_line, "`GROSS`"));
        }
        let wash = wash_token
            .map(|token| amount(line_no, gross_line, token, "wash amount", Sign::Positive))
            .transpose()?;

        let tx = Transaction {
            desc: shares_line.to_string(),
            quantity,
            symbol: symbol.to_string(),
            acquired: acquired.to_string(),
            sold: sold.to_string(),
            proceeds,
            basis,
            wash,
            category: self.section,
        };

        debug!(
            "Read record: symbol={} acquired={} sold={} quantity={} proceeds=${:.2} basis=${:.2} wash={}",
            tx.symbol(),
            tx.acquired(),
            tx.sold(),
            tx.quantity(),
            tx.proceeds(),
            tx.basis(),
            tx.wash()
                .map(|w| format!("${:.2}", w))
                .unwrap_or_else(|| "-".to_string())
        );

        Ok(tx)
    }
}

fn format_error(line: usize, content: &str, expected: &'static str) -> StatementError {
    StatementError::Format {
        line,
        content: content.to_string(),
        expected,
    }
}

fn value_error(line: usize, content: &str, reason: &str) -> StatementError {
    StatementError::Value {
        line,
        content: content.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    NonNegative,
    Positive,
}

fn amount(
    line: usize,
    content: &str,
    token: &str,
    field: &str,
    sign: Sign,
) -> Result<Decimal, StatementError> {
    let value = parse_amount(token)
        .map_err(|_| value_error(line, content, &format!("{} {:?} is not a number", field, token)))?;
    match sign {
        Sign::NonNegative if value < Decimal::ZERO => Err(value_error(
            line,
            content,
            &format!("{} must not be negative", field),
        )),
        Sign::Positive if value <= Decimal::ZERO => Err(value_error(
            line,
            content,
            &format!("{} must be positive", field),
        )),
        _ => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const WASH_BLOCK: &str = "02079K305
2 SHARES OF GOOG
09/19/2012 1,352.17 1,565.62
W
X
11/28/2012 GROSS 92.56
";

    fn scan(text: &str) -> Result<ScanOutput, StatementError> {
        let config = Config::default();
        StatementScanner::new(&config, text).run()
    }

    #[test]
    fn test_wash_block_yields_one_record() {
        let out = scan(WASH_BLOCK).unwrap();
        assert_eq!(out.short_term.len(), 1);
        assert!(out.long_term.is_empty());

        let tx = &out.short_term[0];
        assert_eq!(tx.desc(), "2 SHARES OF GOOG");
        assert_eq!(tx.quantity(), 2);
        assert_eq!(tx.symbol(), "GOOG");
        assert_eq!(tx.acquired(), "09/19/2012");
        assert_eq!(tx.sold(), "11/28/2012");
        assert_eq!(tx.proceeds(), dec!(1352.17));
        assert_eq!(tx.basis(), dec!(1565.62));
        assert_eq!(tx.wash(), Some(dec!(92.56)));
        assert_eq!(tx.category(), HoldingCategory::ShortTerm);
    }

    #[test]
    fn test_block_without_wash() {
        let text = "38259P508\n10 SHARES OF GOOGL\n01/02/2013 7,100.00 6,250.50\nX\n02/03/2014 GROSS\n";
        let out = scan(text).unwrap();
        let tx = &out.short_term[0];
        assert_eq!(tx.wash(), None);
        assert_eq!(tx.quantity(), 10);
        assert_eq!(tx.proceeds().to_string(), "7100.00");
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let text = "  02079K305  \n 2 SHARES OF GOOG\n09/19/2012 1,352.17 1,565.62 \n W\nX\n11/28/2012 GROSS 92.56\n";
        let out = scan(text).unwrap();
        assert_eq!(out.short_term[0].desc(), "2 SHARES OF GOOG");
    }

    #[test]
    fn test_noise_between_blocks_is_skipped() {
        let text = format!(
            "Form 1099-B\nPage 1 of 3\n{}Subtotal\n{}",
            WASH_BLOCK, WASH_BLOCK
        );
        let out = scan(&text).unwrap();
        assert_eq!(out.short_term.len(), 2);
    }

    #[test]
    fn test_long_term_header_switches_category_and_checkpoints() {
        let text = format!(
            "{}Long-term transactions for noncovered securities\n{}{}",
            WASH_BLOCK, WASH_BLOCK, WASH_BLOCK
        );
        let out = scan(&text).unwrap();
        assert_eq!(out.short_term.len(), 1);
        assert_eq!(out.long_term.len(), 2);
        assert!(out
            .long_term
            .iter()
            .all(|tx| tx.category() == HoldingCategory::LongTerm));

        assert_eq!(out.checkpoints.len(), 2);
        let header = &out.checkpoints[0];
        assert_eq!(header.reason, CheckpointReason::LongTermHeader);
        assert_eq!(header.line, 7);
        assert_eq!(header.totals.records, 1);
        assert_eq!(header.totals.shares, 2);

        let end = &out.checkpoints[1];
        assert_eq!(end.reason, CheckpointReason::EndOfFile);
        assert_eq!(end.totals.records, 2);
        assert_eq!(end.totals.shares, 4);
        assert_eq!(end.totals.proceeds, dec!(2704.34));
        assert_eq!(end.totals.basis, dec!(3131.24));
        assert_eq!(end.totals.wash, dec!(185.12));
    }

    #[test]
    fn test_symbol_outside_allow_list_fails_with_line() {
        let text = "02079K305\n2 SHARES OF AAPL\n09/19/2012 1,352.17 1,565.62\nX\n11/28/2012 GROSS\n";
        let err = scan(text).unwrap_err();
        assert_eq!(err.line(), 2);
        match err {
            StatementError::Value { content, .. } => assert_eq!(content, "2 SHARES OF AAPL"),
            other => panic!("expected value error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_quantity_fails() {
        let text = "02079K305\n0 SHARES OF GOOG\n09/19/2012 1,352.17 1,565.62\nX\n11/28/2012 GROSS\n";
        assert!(matches!(
            scan(text),
            Err(StatementError::Value { line: 2, .. })
        ));
    }

    #[test]
    fn test_bad_shares_shape_fails() {
        let text = "02079K305\n2 UNITS OF GOOG\n09/19/2012 1,352.17 1,565.62\nX\n11/28/2012 GROSS\n";
        assert!(matches!(
            scan(text),
            Err(StatementError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn test_amount_line_token_count_fails() {
        let text = "02079K305\n2 SHARES OF GOOG\n09/19/2012 1,352.17\nX\n11/28/2012 GROSS\n";
        assert!(matches!(
            scan(text),
            Err(StatementError::Format { line: 3, .. })
        ));
    }

    #[test]
    fn test_non_numeric_amount_fails() {
        let text = "02079K305\n2 SHARES OF GOOG\n09/19/2012 abc 1,565.62\nX\n11/28/2012 GROSS\n";
        assert!(matches!(
            scan(text),
            Err(StatementError::Value { line: 3, .. })
        ));
    }

    #[test]
    fn test_missing_non_covered_marker_fails_at_expected_line() {
        let text = "02079K305\n2 SHARES OF GOOG\n09/19/2012 1,352.17 1,565.62\nW\n11/28/2012 GROSS 92.56\n";
        let err = scan(text).unwrap_err();
        assert_eq!(
            err,
            StatementError::Format {
                line: 5,
                content: "11/28/2012 GROSS 92.56".to_string(),
                expected: "non-covered security marker `X`",
            }
        );
    }

    #[test]
    fn test_gross_token_is_case_sensitive() {
        let text = "02079K305\n2 SHARES OF GOOG\n09/19/2012 1,352.17 1,565.62\nX\n11/28/2012 Gross\n";
        assert!(matches!(
            scan(text),
            Err(StatementError::Format { line: 5, expected: "`GROSS`", .. })
        ));
    }

    #[test]
    fn test_wash_amount_requires_wash_marker() {
        let text = "02079K305\n2 SHARES OF GOOG\n09/19/2012 1,352.17 1,565.62\nX\n11/28/2012 GROSS 92.56\n";
        assert!(matches!(
            scan(text),
            Err(StatementError::Format { line: 5, .. })
        ));
    }

    #[test]
    fn test_wash_marker_requires_wash_amount() {
        let text = "02079K305\n2 SHARES OF GOOG\n09/19/2012 1,352.17 1,565.62\nW\nX\n11/28/2012 GROSS\n";
        assert!(matches!(
            scan(text),
            Err(StatementError::Format {
                line: 6,
                expected: "`<sale date> GROSS <wash amount>`",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_amounts_are_rejected() {
        let text = "02079K305\n2 SHARES OF GOOG\n09/19/2012 -1,352.17 -5\nW\nX\n11/28/2012 GROSS -92.56\n";
        match scan(text) {
            Err(StatementError::Value { line, reason, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(reason, "proceeds must not be negative");
            }
            other => panic!("expected value error, got {:?}", other),
        }

        let text = "02079K305\n2 SHARES OF GOOG\n09/19/2012 1,352.17 -5\nX\n11/28/2012 GROSS\n";
        assert!(matches!(
            scan(text),
            Err(StatementError::Value { line: 3, .. })
        ));
    }

    #[test]
    fn test_zero_amounts_are_accepted() {
        let text = "02079K305\n2 SHARES OF GOOG\n09/19/2012 0.00 0\nX\n11/28/2012 GROSS\n";
        let out = scan(text).unwrap();
        assert!(out.short_term[0].proceeds().is_zero());
        assert!(out.short_term[0].basis().is_zero());
    }

    #[test]
    fn test_wash_amount_must_be_positive() {
        for wash in ["-92.56", "0", "0.00"] {
            let text = format!(
                "02079K305\n2 SHARES OF GOOG\n09/19/2012 1,352.17 1,565.62\nW\nX\n11/28/2012 GROSS {}\n",
                wash
            );
            match scan(&text) {
                Err(StatementError::Value { line, reason, .. }) => {
                    assert_eq!(line, 6);
                    assert_eq!(reason, "wash amount must be positive");
                }
                other => panic!("expected value error for {}, got {:?}", wash, other),
            }
        }
    }

    #[test]
    fn test_share_total_overflow_is_a_value_error() {
        let block = "02079K305\n18446744073709551615 SHARES OF GOOG\n09/19/2012 1 1\nX\n11/28/2012 GROSS\n";
        let text = format!("{}{}", block, block);
        match scan(&text) {
            Err(StatementError::Value { line, content, reason }) => {
                assert_eq!(line, 7);
                assert_eq!(content, "18446744073709551615 SHARES OF GOOG");
                assert_eq!(reason, "running totals overflow");
            }
            other => panic!("expected value error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_tail_is_ignored() {
        let text = format!("{}Total\n02079K305\n2 SHARES OF GOOG\n", WASH_BLOCK);
        let out = scan(&text).unwrap();
        assert_eq!(out.short_term.len(), 1);
        assert_eq!(out.checkpoints.last().unwrap().totals.records, 1);
    }

    #[test]
    fn test_header_in_short_tail_is_ignored() {
        let text = format!("{}Long-term transactions\nend\n", WASH_BLOCK);
        let out = scan(&text).unwrap();
        assert_eq!(out.checkpoints.len(), 1);
        assert_eq!(out.checkpoints[0].reason, CheckpointReason::EndOfFile);
    }

    #[test]
    fn test_block_cut_off_before_gross_line() {
        let text = "02079K305\n2 SHARES OF GOOG\n09/19/2012 1,352.17 1,565.62\nX\n";
        assert_eq!(scan(text), Err(StatementError::Truncated { line: 5 }));
    }

    #[test]
    fn test_empty_input_yields_empty_checkpoint() {
        let out = scan("").unwrap();
        assert!(out.short_term.is_empty());
        assert_eq!(out.checkpoints.len(), 1);
        assert_eq!(out.checkpoints[0].totals, RunningTotals::default());
    }
}
