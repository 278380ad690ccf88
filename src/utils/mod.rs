//! Utility functions for amounts as they appear on US brokerage statements
//!
//! Statements print money with comma thousands separators ("1,352.17").
//! Parsing strips those; formatting puts them back for the totals report.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a statement amount, dropping thousands separators.
///
/// The scale of the token is kept, so `1,565.00` parses to `1565.00`.
///
/// # Examples
/// ```
/// use schwab1099b::utils::parse_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_amount("1,352.17").unwrap(), dec!(1352.17));
/// assert_eq!(parse_amount("92.56").unwrap(), dec!(92.56));
/// assert!(parse_amount("n/a").is_err());
/// ```
pub fn parse_amount(token: &str) -> Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(&token.replace(',', ""))
}

/// Format as US dollars with two decimals: "$1,234.56"
///
/// # Examples
/// ```
/// use schwab1099b::utils::format_usd;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_usd(dec!(1234.56)), "$1,234.56");
/// assert_eq!(format_usd(dec!(-500)), "-$500.00");
/// ```
pub fn format_usd(value: Decimal) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    format!("{}${}.{}", sign, with_separators, decimal_part)
}
