//! Optional TOML configuration
//!
//! Every key has a built-in default matching the Schwab equity-award
//! statements for Alphabet shares, so most runs need no file at all.
//!
//! ```toml
//! symbols = ["GOOG", "GOOGL"]
//! cusip_prefixes = ["3825", "0207"]
//! long_term_marker = "Long-term transaction"
//! program_id = "schwab1099b"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming a config file when `--config` is absent
pub const CONFIG_ENV: &str = "SCHWAB1099B_CONFIG";

const CONFIG_DIR: &str = "schwab1099b";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Ticker symbols accepted on `<n> SHARES OF <symbol>` lines
    pub symbols: Vec<String>,
    /// Identifier prefixes that open a transaction block
    pub cusip_prefixes: Vec<String>,
    /// Start of the header line introducing long-term sales
    pub long_term_marker: String,
    /// Accounting program name written to the TXF `A` record
    pub program_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            // GOOGL: 38259P508 / 02079K305, GOOG: 38259P706 / 02079K107
            symbols: vec!["GOOG".to_string(), "GOOGL".to_string()],
            cusip_prefixes: vec!["3825".to_string(), "0207".to_string()],
            long_term_marker: "Long-term transaction".to_string(),
            program_id: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl Config {
    /// Resolve and load the configuration.
    ///
    /// Lookup order: `explicit` path, then `$SCHWAB1099B_CONFIG`, then
    /// `<config home>/schwab1099b/config.toml` if present, else defaults.
    /// An explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        if let Some(path) = named {
            return Self::from_file(&path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading config from {:?}", path);
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            bail!("`symbols` must list at least one ticker");
        }
        if self.cusip_prefixes.is_empty() || self.cusip_prefixes.iter().any(|p| p.is_empty()) {
            bail!("`cusip_prefixes` must list at least one non-empty prefix");
        }
        if self.long_term_marker.trim().is_empty() {
            bail!("`long_term_marker` must not be empty");
        }
        if self.program_id.contains('\n') {
            bail!("`program_id` must be a single line");
        }
        Ok(())
    }

    pub fn is_allowed_symbol(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn is_cusip_line(&self, line: &str) -> bool {
        self.cusip_prefixes.iter().any(|p| line.starts_with(p.as_str()))
    }

    pub fn is_long_term_header(&self, line: &str) -> bool {
        line.starts_with(self.long_term_marker.as_str())
    }
}

fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
}
