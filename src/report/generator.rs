//! Report generation.
//!
//! This module renders a spend ranking as a plain-text table,
//! a Markdown document, or JSON.

use crate::analysis::top_customers;
use crate::models::{Aggregation, CustomerSpend, JoinStats, Report, ReportMetadata, SpendSummary};
use crate::error;
use anyhow::Result;

/// Assemble a report from an aggregation.
///
/// The summary covers every ranked customer; `metadata.limit` only
/// trims the rows that are listed.
pub fn build_report(
    aggregation: Aggregation,
    metadata: ReportMetadata,
) -> error::Result<Report> {
    let summary = SpendSummary::from_rows(&aggregation.rows)?;
    let rows = match metadata.limit {
        Some(limit) => top_customers(&aggregation.rows, limit),
        None => aggregation.rows,
    };

    Ok(Report {
        metadata,
        summary,
        stats: aggregation.stats,
        rows,
    })
}

/// Generate an aligned plain-text table for the terminal.
pub fn generate_table_report(report: &Report) -> String {
    let headers = ["#", "customer_id", "customer_name", "total_spent", "total_orders"];

    let cells: Vec<[String; 5]> = report
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            [
                (i + 1).to_string(),
                row.customer_id.to_string(),
                row.customer_name.clone(),
                row.total_spent.to_string(),
                row.total_orders.to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();

    output.push_str(&format_table_line(&headers.map(String::from), &widths));
    output.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    output.push('\n');

    for row in &cells {
        output.push_str(&format_table_line(row, &widths));
    }

    if cells.is_empty() {
        output.push_str("(no customers with orders)\n");
    }

    output.push('\n');
    output.push_str(&format!(
        "{} customers, {} orders, {} total spent",
        report.summary.customers_ranked, report.summary.total_orders, report.summary.grand_total
    ));
    if report.stats.orders_unmatched > 0 {
        output.push_str(&format!(
            " ({} orders without a matching customer excluded)",
            report.stats.orders_unmatched
        ));
    }
    output.push('\n');

    output
}

/// Format one table line. Text columns are left aligned, numbers right aligned.
fn format_table_line(cells: &[String; 5], widths: &[usize; 5]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(col, (cell, width))| {
            if col == 2 {
                format!("{:<width$}", cell, width = *width)
            } else {
                format!("{:>width$}", cell, width = *width)
            }
        })
        .collect::<Vec<_>>()
        .join("  ");

    format!("{}\n", line.trim_end())
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Customer Spend Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summary, &report.stats));
    output.push_str(&generate_ranking_section(&report.rows));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Customers:** `{}`\n", metadata.customers_source));
    section.push_str(&format!("- **Orders:** `{}`\n", metadata.orders_source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Tie-break:** {}\n", metadata.tie_break));
    if let Some(limit) = metadata.limit {
        section.push_str(&format!("- **Limit:** top {}\n", limit));
    }
    section.push_str(&format!(
        "- **Duration:** {:.3}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &SpendSummary, stats: &JoinStats) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Customers Ranked | Orders | Total Spent | Avg Order |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        summary.customers_ranked,
        summary.total_orders,
        summary.grand_total,
        summary
            .average_order_value
            .map(|avg| avg.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));

    section.push_str("### Join Statistics\n\n");
    section.push_str("| Input | Read | Matched | Excluded |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| Customers | {} | {} | {} |\n",
        stats.customers_seen,
        stats.customers_seen - stats.customers_without_orders,
        stats.customers_without_orders
    ));
    section.push_str(&format!(
        "| Orders | {} | {} | {} |\n\n",
        stats.orders_seen, stats.orders_matched, stats.orders_unmatched
    ));

    section
}

/// Generate the ranking table.
fn generate_ranking_section(rows: &[CustomerSpend]) -> String {
    let mut section = String::new();

    section.push_str("## Ranking\n\n");

    if rows.is_empty() {
        section.push_str("No customers with matching orders.\n\n");
        return section;
    }

    section.push_str("| # | Customer ID | Customer | Total Spent | Orders |\n");
    section.push_str("|---:|---:|:---|---:|---:|\n");

    for (i, row) in rows.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            i + 1,
            row.customer_id,
            escape_markdown_cell(&row.customer_name),
            row.total_spent,
            row.total_orders
        ));
    }
    section.push('\n');

    section
}

fn escape_markdown_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by spendrank*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
