use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Holding period of a sale, decided by the statement section it appears in.
///
/// Serialized as the Form 8949 box code of the non-covered variant:
/// `"2"` (Box B, short-term) and `"5"` (Box E, long-term).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum HoldingCategory {
    #[default]
    #[serde(rename = "2")]
    ShortTerm,
    #[serde(rename = "5")]
    LongTerm,
}

impl HoldingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldingCategory::ShortTerm => "SHORT_TERM",
            HoldingCategory::LongTerm => "LONG_TERM",
        }
    }

    /// Form 8949 checkbox for sales whose basis was not reported to the IRS
    pub fn form_8949_box(&self) -> char {
        match self {
            HoldingCategory::ShortTerm => 'B',
            HoldingCategory::LongTerm => 'E',
        }
    }

    /// TXF reference number of the 8949 Copy B gain/loss record
    pub fn txf_refnum(&self) -> u16 {
        match self {
            HoldingCategory::ShortTerm => 711,
            HoldingCategory::LongTerm => 713,
        }
    }
}

impl fmt::Display for HoldingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a `<n> SHARES OF <symbol>` line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SharesLineError {
    /// Wrong token count or missing `SHARES`/`OF`
    Shape,
    /// Share count is not a number or not positive
    Quantity,
}

/// Split a security description line into share count and symbol.
///
/// A fractional count is truncated toward zero.
pub(crate) fn parse_shares_line(line: &str) -> Result<(u64, &str), SharesLineError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [count, shares, of, symbol] = parts.as_slice() else {
        return Err(SharesLineError::Shape);
    };
    if *shares != "SHARES" || *of != "OF" {
        return Err(SharesLineError::Shape);
    }

    let quantity = Decimal::from_str(count)
        .ok()
        .and_then(|q| q.trunc().to_u64())
        .filter(|q| *q > 0)
        .ok_or(SharesLineError::Quantity)?;

    Ok((quantity, symbol))
}

/// One sale of non-covered shares taken from a 1099-B statement.
///
/// Records are built by the statement scanner and never modified afterwards,
/// so fields are only reachable through accessors outside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TransactionDoc", try_from = "TransactionDoc")]
pub struct Transaction {
    pub(crate) desc: String,
    pub(crate) quantity: u64,
    pub(crate) symbol: String,
    pub(crate) acquired: String,
    pub(crate) sold: String,
    pub(crate) proceeds: Decimal,
    pub(crate) basis: Decimal,
    pub(crate) wash: Option<Decimal>,
    pub(crate) category: HoldingCategory,
}

impl Transaction {
    /// Security line as printed on the statement, e.g. `2 SHARES OF GOOG`
    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Acquisition date, MM/DD/YYYY as printed
    pub fn acquired(&self) -> &str {
        &self.acquired
    }

    /// Sale date, MM/DD/YYYY as printed
    pub fn sold(&self) -> &str {
        &self.sold
    }

    pub fn proceeds(&self) -> Decimal {
        self.proceeds
    }

    pub fn basis(&self) -> Decimal {
        self.basis
    }

    /// Disallowed wash sale loss, if the sale was marked with `W`
    pub fn wash(&self) -> Option<Decimal> {
        self.wash
    }

    pub fn category(&self) -> HoldingCategory {
        self.category
    }
}

/// Intermediate JSON shape shared with the TXF emitter.
#[derive(Serialize, Deserialize)]
struct TransactionDoc {
    desc: String,
    acq: String,
    #[serde(with = "rust_decimal::serde::float")]
    proceeds: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    basis: Decimal,
    sale: String,
    #[serde(with = "wash_amount")]
    wash: Option<Decimal>,
    category: HoldingCategory,
}

impl From<Transaction> for TransactionDoc {
    fn from(tx: Transaction) -> Self {
        TransactionDoc {
            desc: tx.desc,
            acq: tx.acquired,
            proceeds: tx.proceeds,
            basis: tx.basis,
            sale: tx.sold,
            wash: tx.wash,
            category: tx.category,
        }
    }
}

impl TryFrom<TransactionDoc> for Transaction {
    type Error = String;

    fn try_from(doc: TransactionDoc) -> Result<Self, Self::Error> {
        let (quantity, symbol) = match parse_shares_line(&doc.desc) {
            Ok((quantity, symbol)) => (quantity, symbol.to_string()),
            Err(SharesLineError::Shape) => {
                return Err(format!(
                    "desc {:?} is not of the form `<n> SHARES OF <symbol>`",
                    doc.desc
                ))
            }
            Err(SharesLineError::Quantity) => {
                return Err(format!("desc {:?} has no positive share count", doc.desc))
            }
        };

        Ok(Transaction {
            desc: doc.desc,
            quantity,
            symbol,
            acquired: doc.acq,
            sold: doc.sale,
            proceeds: doc.proceeds,
            basis: doc.basis,
            wash: doc.wash,
            category: doc.category,
        })
    }
}

/// `wash` is either `false` or a number in the JSON document.
mod wash_amount {
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WashRepr {
        Flag(bool),
        Amount(Decimal),
    }

    pub fn serialize<S: Serializer>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(amount) => rust_decimal::serde::float::serialize(amount, serializer),
            None => serializer.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
        match Option::<WashRepr>::deserialize(deserializer)? {
            None | Some(WashRepr::Flag(false)) => Ok(None),
            Some(WashRepr::Flag(true)) => Err(D::Error::custom("wash is `true` but carries no amount")),
            Some(WashRepr::Amount(amount)) => Ok(Some(amount)),
        }
    }
}
