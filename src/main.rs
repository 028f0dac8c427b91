//! Spendrank - customer spend ranking CLI
//!
//! Loads a customers export and an orders export, joins them on
//! customer_id, and prints customers ranked by total spend.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (arguments, config, unreadable or malformed input, aggregation)

use anyhow::{Context, Result};
use chrono::Utc;
use spendrank::analysis;
use spendrank::cli::{Args, OutputFormat};
use spendrank::config::{Config, CONFIG_FILE_NAME};
use spendrank::loader::{ColumnMapping, Dataset};
use spendrank::models::ReportMetadata;
use spendrank::report;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Spendrank v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Ranking failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .spendrank.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    println!("Edit it to set input files, column names, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so a report printed to stdout stays clean.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load inputs, aggregate, and write the report.
async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let customers_path = config.input.customers.clone().with_context(|| {
        format!(
            "No customers file given. Use --customers or set [input] customers in {}",
            CONFIG_FILE_NAME
        )
    })?;
    let orders_path = config.input.orders.clone().with_context(|| {
        format!(
            "No orders file given. Use --orders or set [input] orders in {}",
            CONFIG_FILE_NAME
        )
    })?;

    let columns = ColumnMapping::from(&config.input.columns);
    let dataset = Dataset::load(&customers_path, &orders_path, &columns).await?;

    let aggregation = analysis::aggregate(
        &dataset.customers,
        &dataset.orders,
        config.report.tie_break,
    )?;

    if aggregation.stats.orders_unmatched > 0 {
        warn!(
            "{} orders reference unknown customers and were excluded",
            aggregation.stats.orders_unmatched
        );
    }
    info!(
        "Ranked {} customers ({} without orders)",
        aggregation.rows.len(),
        aggregation.stats.customers_without_orders
    );

    let metadata = ReportMetadata {
        customers_source: customers_path.display().to_string(),
        orders_source: orders_path.display().to_string(),
        generated_at: Utc::now(),
        tie_break: config.report.tie_break,
        limit: config.report.row_limit(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = report::build_report(aggregation, metadata)?;

    let output = match config.report.format {
        OutputFormat::Table => report::generate_table_report(&report),
        OutputFormat::Markdown => report::generate_markdown_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    match config.report.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
