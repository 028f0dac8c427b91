//! Spendrank - rank customers by total spend.
//!
//! Joins customer records with order records on `customer_id`,
//! aggregates sales and order counts per customer, and ranks the
//! customers by total spend, highest first.
//!
//! ```no_run
//! use rust_decimal::Decimal;
//! use spendrank::analysis::rank_customers;
//! use spendrank::models::{Customer, Order};
//!
//! let customers = vec![Customer::new(1, "Alice"), Customer::new(2, "Bob")];
//! let orders = vec![
//!     Order::new(101, 1, Decimal::new(500, 1)),
//!     Order::new(102, 1, Decimal::new(300, 1)),
//!     Order::new(103, 2, Decimal::new(100, 1)),
//! ];
//!
//! let rows = rank_customers(&customers, &orders)?;
//! assert_eq!(rows[0].customer_name, "Alice");
//! # Ok::<(), spendrank::error::AggregateError>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod report;
