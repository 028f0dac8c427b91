//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation.

use crate::models::TieBreak;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Spendrank - rank customers by total spend
///
/// Joins a customers export with an orders export on customer_id,
/// sums sales and counts orders per customer, and lists customers
/// from the highest total spend down. Inputs are JSON arrays or NDJSON.
///
/// Examples:
///   spendrank --customers customers.json --orders orders.ndjson
///   spendrank -C customers.json -O orders.json --limit 10 --format markdown
///   spendrank -C customers.json -O orders.json --format json -o report.json
///   spendrank --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Customers file (JSON array or NDJSON)
    ///
    /// Can also be set via SPENDRANK_CUSTOMERS or [input] customers in .spendrank.toml.
    #[arg(short = 'C', long, value_name = "FILE", env = "SPENDRANK_CUSTOMERS")]
    pub customers: Option<PathBuf>,

    /// Orders file (JSON array or NDJSON)
    ///
    /// Can also be set via SPENDRANK_ORDERS or [input] orders in .spendrank.toml.
    #[arg(short = 'O', long, value_name = "FILE", env = "SPENDRANK_ORDERS")]
    pub orders: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// If not specified, the report is printed to stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (table, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Report only the top N customers
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Ordering among customers with equal total spend
    #[arg(long, value_name = "POLICY")]
    pub tie_break: Option<TieBreak>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .spendrank.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .spendrank.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain-text table (default)
    #[default]
    Table,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.limit == Some(0) {
            return Err("Limit must be at least 1".to_string());
        }

        for (label, path) in [("Customers", &self.customers), ("Orders", &self.orders)] {
            if let Some(path) = path {
                if !path.exists() {
                    return Err(format!("{} file does not exist: {}", label, path.display()));
                }
                if !path.is_file() {
                    return Err(format!("{} path is not a file: {}", label, path.display()));
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
