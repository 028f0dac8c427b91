//! Data models for customer spend ranking.
//!
//! This module contains the input records, the derived result rows,
//! and the report structures built around them.

use crate::error::{AggregateError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A customer record. Identity is `customer_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer identifier.
    pub customer_id: i64,
    /// Display name.
    pub customer_name: String,
}

impl Customer {
    pub fn new(customer_id: i64, customer_name: impl Into<String>) -> Self {
        Self {
            customer_id,
            customer_name: customer_name.into(),
        }
    }
}

/// An order record referencing a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub order_id: i64,
    /// Customer this order belongs to.
    pub customer_id: i64,
    /// Sale amount. Zero and negative amounts are allowed.
    pub sales: Decimal,
}

impl Order {
    pub fn new(order_id: i64, customer_id: i64, sales: Decimal) -> Self {
        Self {
            order_id,
            customer_id,
            sales,
        }
    }
}

/// One row of the ranking: a customer with their aggregated orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSpend {
    pub customer_id: i64,
    pub customer_name: String,
    /// Sum of `sales` over the customer's orders.
    pub total_spent: Decimal,
    /// Number of orders for the customer.
    pub total_orders: u64,
}

/// Ordering applied among rows with equal `total_spent`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Ascending `customer_id` (default)
    #[default]
    CustomerId,
    /// Position of the customer in the customers input
    InputOrder,
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::CustomerId => write!(f, "customer-id"),
            TieBreak::InputOrder => write!(f, "input-order"),
        }
    }
}

/// Counters describing how the two relations joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStats {
    /// Number of customer records read.
    pub customers_seen: usize,
    /// Number of order records read.
    pub orders_seen: usize,
    /// Orders that matched a customer.
    pub orders_matched: usize,
    /// Orders referencing an unknown customer (excluded).
    pub orders_unmatched: usize,
    /// Customers with no orders (excluded).
    pub customers_without_orders: usize,
}

/// Output of the aggregator: ranked rows plus join counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub rows: Vec<CustomerSpend>,
    pub stats: JoinStats,
}

/// Summary statistics over a ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendSummary {
    /// Number of ranked customers.
    pub customers_ranked: usize,
    /// Orders across all ranked customers.
    pub total_orders: u64,
    /// Spend across all ranked customers.
    pub grand_total: Decimal,
    /// `grand_total / total_orders`, rounded to two places.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_order_value: Option<Decimal>,
}

impl SpendSummary {
    /// Creates a summary from ranked rows.
    ///
    /// Fails if the combined spend does not fit in a `Decimal`.
    pub fn from_rows(rows: &[CustomerSpend]) -> Result<Self> {
        let mut summary = Self {
            customers_ranked: rows.len(),
            ..Self::default()
        };

        for row in rows {
            summary.total_orders += row.total_orders;
            summary.grand_total = summary
                .grand_total
                .checked_add(row.total_spent)
                .ok_or(AggregateError::GrandTotalOverflow)?;
        }

        if summary.total_orders > 0 {
            summary.average_order_value = summary
                .grand_total
                .checked_div(Decimal::from(summary.total_orders))
                .map(|avg| avg.round_dp(2));
        }

        Ok(summary)
    }
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the customers input.
    pub customers_source: String,
    /// Path of the orders input.
    pub orders_source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Tie-break policy used for equal totals.
    pub tie_break: TieBreak,
    /// Row limit applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Time spent loading and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// The complete spend report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Summary over all ranked customers, before any limit.
    pub summary: SpendSummary,
    /// How the inputs joined.
    pub stats: JoinStats,
    /// Ranked rows, after any limit.
    pub rows: Vec<CustomerSpend>,
}
