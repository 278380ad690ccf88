use clap::{Args, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub mod formatters;

/// Options shared by both binaries
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Log every consumed line and parsed record to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Configuration file (defaults to $SCHWAB1099B_CONFIG, then the user config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(name = "schwab1099b-json")]
#[command(version, about = "Convert Schwab 1099-B text exports to JSON records")]
#[command(
    long_about = "Reads one or more plain-text exports of a Schwab equity-award 1099-B statement and \
                  prints the sales as a JSON array on stdout. Section totals are printed on stderr \
                  for checking against the statement's summary page."
)]
pub struct JsonCli {
    /// Statement text files, scanned in order
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Prefix the output with `entries = ` for pasting into a browser console
    #[arg(long)]
    pub js_assignment: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser, Debug)]
#[command(name = "schwab1099b-txf")]
#[command(version, about = "Convert JSON records from schwab1099b-json to TXF")]
#[command(
    long_about = "Reads the JSON array produced by schwab1099b-json on stdin and writes a TXF v042 \
                  document on stdout."
)]
pub struct TxfCli {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommonArgs {
    /// Set up logging and color handling. Logs always go to stderr so
    /// stdout carries only the converted document.
    pub fn init(&self) {
        let color = !self.no_color && std::env::var_os("NO_COLOR").is_none();
        if !color {
            colored::control::set_override(false);
        }

        let default_filter = if self.verbose {
            "schwab1099b=debug"
        } else {
            "schwab1099b=info"
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(color)
            .with_target(false)
            .without_time()
            .init();
    }
}
