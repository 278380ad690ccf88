use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};

use schwab1099b::cli::{formatters, JsonCli};
use schwab1099b::statement;
use schwab1099b::Config;

fn main() -> Result<()> {
    let cli = JsonCli::parse();
    cli.common.init();

    let config = Config::load(cli.common.config.as_deref())?;
    let transactions = statement::parse_files(config, cli.files.as_slice(), formatters::print_checkpoint)?;

    // Serialize fully before touching stdout so a failure leaves it empty
    let json = serde_json::to_string(&transactions).context("Failed to serialize records")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.js_assignment {
        write!(out, "entries = ")?;
    }
    writeln!(out, "{}", json)?;
    out.flush()?;
    Ok(())
}
