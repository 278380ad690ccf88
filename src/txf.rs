//! TXF (Tax Exchange Format) output
//!
//! Writes version 042 files: a header record followed by one detail record
//! per sale, each record terminated by a `^` line. Sales use record format 5
//! (security, acquired, sold, basis, proceeds, wash), which is also valid
//! when no wash sale occurred as long as the amount is left blank.
//!
//! The 8949 Copy B reference numbers (`N711`/`N713`) tell the tax software
//! that basis was *not* reported to the IRS, so it checks Box B or Box E.

use chrono::NaiveDate;
use std::io::{self, Write};

use crate::models::Transaction;

pub const TXF_VERSION: &str = "V042";
pub const RECORD_DELIMITER: &str = "^";
const DETAIL_RECORD: &str = "TD";

pub struct TxfWriter<W: Write> {
    out: W,
}

impl<W: Write> TxfWriter<W> {
    pub fn new(out: W) -> Self {
        TxfWriter { out }
    }

    /// Version, accounting program and export date
    pub fn write_header(&mut self, program_id: &str, exported: NaiveDate) -> io::Result<()> {
        writeln!(self.out, "{}", TXF_VERSION)?;
        writeln!(self.out, "A{}", program_id)?;
        writeln!(self.out, "D{}", exported.format("%m/%d/%Y"))?;
        writeln!(self.out, "{}", RECORD_DELIMITER)
    }

    pub fn write_transaction(&mut self, tx: &Transaction) -> io::Result<()> {
        writeln!(self.out, "{}", DETAIL_RECORD)?;
        writeln!(self.out, "N{}", tx.category().txf_refnum())?;
        writeln!(self.out, "P{}", tx.desc())?;
        writeln!(self.out, "D{}", tx.acquired())?;
        writeln!(self.out, "D{}", tx.sold())?;
        writeln!(self.out, "${}", tx.basis())?;
        writeln!(self.out, "${}", tx.proceeds())?;
        match tx.wash().filter(|w| !w.is_zero()) {
            Some(wash) => writeln!(self.out, "${}", wash)?,
            None => writeln!(self.out, "$")?,
        }
        writeln!(self.out, "{}", RECORD_DELIMITER)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Write a complete TXF document
pub fn write_txf<W: Write>(
    out: W,
    program_id: &str,
    exported: NaiveDate,
    transactions: &[Transaction],
) -> io::Result<W> {
    let mut writer = TxfWriter::new(out);
    writer.write_header(program_id, exported)?;
    for tx in transactions {
        writer.write_transaction(tx)?;
    }
    Ok(writer.into_inner())
}
