//! Analysis modules.
//!
//! The aggregator joins customers to orders and ranks them by spend.

pub mod aggregator;

pub use aggregator::*;
