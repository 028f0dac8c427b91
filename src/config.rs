//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.spendrank.toml` files.

use crate::cli::OutputFormat;
use crate::models::TieBreak;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".spendrank.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Input file settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// Customers file (JSON array or NDJSON).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customers: Option<PathBuf>,

    /// Orders file (JSON array or NDJSON).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<PathBuf>,

    /// Field names inside the records.
    #[serde(default)]
    pub columns: ColumnsConfig,
}

/// Record field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_customer_id")]
    pub customer_id: String,

    #[serde(default = "default_customer_name")]
    pub customer_name: String,

    #[serde(default = "default_order_id")]
    pub order_id: String,

    /// Customer reference inside order records.
    #[serde(default = "default_customer_id")]
    pub order_customer_id: String,

    #[serde(default = "default_sales")]
    pub sales: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            customer_id: default_customer_id(),
            customer_name: default_customer_name(),
            order_id: default_order_id(),
            order_customer_id: default_customer_id(),
            sales: default_sales(),
        }
    }
}

fn default_customer_id() -> String {
    "customer_id".to_string()
}

fn default_customer_name() -> String {
    "customer_name".to_string()
}

fn default_order_id() -> String {
    "order_id".to_string()
}

fn default_sales() -> String {
    "sales".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Ordering among customers with equal totals.
    #[serde(default)]
    pub tie_break: TieBreak,

    /// Maximum rows to report (0 = all).
    #[serde(default)]
    pub limit: usize,

    /// Report file. Written to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl ReportConfig {
    /// Returns the row limit, if one is set.
    pub fn row_limit(&self) -> Option<usize> {
        (self.limit > 0).then_some(self.limit)
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings
    /// whenever they are given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref customers) = args.customers {
            self.input.customers = Some(customers.clone());
        }
        if let Some(ref orders) = args.orders {
            self.input.orders = Some(orders.clone());
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(tie_break) = args.tie_break {
            self.report.tie_break = tie_break;
        }
        if let Some(limit) = args.limit {
            self.report.limit = limit;
        }
        if let Some(ref output) = args.output {
            self.report.output = Some(output.clone());
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.columns.customer_id, "customer_id");
        assert_eq!(config.input.columns.order_customer_id, "customer_id");
        assert_eq!(config.report.format, OutputFormat::Table);
        assert_eq!(config.report.tie_break, TieBreak::CustomerId);
        assert_eq!(config.report.row_limit(), None);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[input]
customers = "data/customers.json"
orders = "data/orders.ndjson"

[input.columns]
customer_id = "id"
sales = "amount"

[report]
format = "markdown"
tie_break = "input-order"
limit = 10
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(
            config.input.customers,
            Some(PathBuf::from("data/customers.json"))
        );
        assert_eq!(config.input.columns.customer_id, "id");
        assert_eq!(config.input.columns.sales, "amount");
        assert_eq!(config.input.columns.order_id, "order_id");
        assert_eq!(config.report.format, OutputFormat::Markdown);
        assert_eq!(config.report.tie_break, TieBreak::InputOrder);
        assert_eq!(config.report.row_limit(), Some(10));
    }

    #[test]
    fn test_merge_with_args() {
        let mut config: Config = toml::from_str(
            r#"
[input]
customers = "from-config.json"
orders = "orders-config.json"

[report]
limit = 5
"#,
        )
        .unwrap();

        let args = Args {
            customers: Some(PathBuf::from("cli.json")),
            orders: None,
            output: None,
            format: Some(OutputFormat::Json),
            limit: None,
            tie_break: Some(TieBreak::InputOrder),
            config: None,
            verbose: true,
            quiet: false,
            init_config: false,
        };
        config.merge_with_args(&args);

        assert_eq!(config.input.customers, Some(PathBuf::from("cli.json")));
        assert_eq!(
            config.input.orders,
            Some(PathBuf::from("orders-config.json"))
        );
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.report.tie_break, TieBreak::InputOrder);
        assert_eq!(config.report.row_limit(), Some(5));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[report]\nformat = \"json\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.report.format, OutputFormat::Json);

        std::fs::write(&path, "[report\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[input.columns]"));
        assert!(toml_str.contains("[report]"));
        assert!(!toml_str.contains("[general]"));
        assert!(!toml_str.contains("verbose"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.report.tie_break, TieBreak::CustomerId);
    }
}
