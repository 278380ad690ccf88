//! schwab1099b - Schwab 1099-B statements to TXF
//!
//! This library parses the plain-text export of Schwab equity-award 1099-B
//! statements into transaction records, and writes those records as TXF for
//! import into tax-preparation software.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod statement;
pub mod txf;
pub mod utils;

pub use config::Config;
pub use error::StatementError;
pub use models::{HoldingCategory, Transaction};
