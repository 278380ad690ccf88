use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::io::{self, BufWriter, Read, Write};
use tracing::info;

use schwab1099b::cli::TxfCli;
use schwab1099b::{txf, Config, Transaction};

fn main() -> Result<()> {
    let cli = TxfCli::parse();
    cli.common.init();

    let config = Config::load(cli.common.config.as_deref())?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read JSON from stdin")?;
    let transactions: Vec<Transaction> =
        serde_json::from_str(&input).context("Failed to parse JSON records from stdin")?;
    info!("Writing {} transaction(s) as TXF", transactions.len());

    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());
    let mut out = txf::write_txf(
        out,
        &config.program_id,
        Local::now().date_naive(),
        &transactions,
    )?;
    out.flush()?;
    Ok(())
}
