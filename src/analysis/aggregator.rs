//! Customer spend aggregation.
//!
//! Inner-joins orders to customers on `customer_id`, sums `sales` and
//! counts orders per customer, and ranks customers by total spend.

use crate::error::{AggregateError, Result};
use crate::models::{Aggregation, Customer, CustomerSpend, JoinStats, Order, TieBreak};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Running totals for one customer.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    total_spent: Decimal,
    total_orders: u64,
}

/// Join, group and rank customers by total spend.
///
/// Customers without orders and orders without a customer are dropped.
/// Rows come back sorted by `total_spent` descending, with `tie_break`
/// deciding the order among equal totals.
pub fn aggregate(customers: &[Customer], orders: &[Order], tie_break: TieBreak) -> Result<Aggregation> {
    let mut positions: HashMap<i64, usize> = HashMap::with_capacity(customers.len());
    for (position, customer) in customers.iter().enumerate() {
        if positions.insert(customer.customer_id, position).is_some() {
            return Err(AggregateError::DuplicateCustomer(customer.customer_id));
        }
    }

    let mut stats = JoinStats {
        customers_seen: customers.len(),
        orders_seen: orders.len(),
        ..JoinStats::default()
    };

    // Indexed by customer position so input order is available for tie-breaks
    let mut totals: Vec<Option<Accumulator>> = vec![None; customers.len()];
    let mut seen_orders: HashSet<i64> = HashSet::with_capacity(orders.len());

    for order in orders {
        if !seen_orders.insert(order.order_id) {
            return Err(AggregateError::DuplicateOrder(order.order_id));
        }

        let Some(&position) = positions.get(&order.customer_id) else {
            debug!(
                "Excluding order {}: no customer {}",
                order.order_id, order.customer_id
            );
            stats.orders_unmatched += 1;
            continue;
        };

        let acc = totals[position].get_or_insert_with(Accumulator::default);
        acc.total_spent = acc
            .total_spent
            .checked_add(order.sales)
            .ok_or(AggregateError::Overflow(order.customer_id))?;
        acc.total_orders += 1;
        stats.orders_matched += 1;
    }

    let mut ranked: Vec<(usize, CustomerSpend)> = customers
        .iter()
        .zip(totals)
        .enumerate()
        .filter_map(|(position, (customer, acc))| {
            acc.map(|acc| {
                (
                    position,
                    CustomerSpend {
                        customer_id: customer.customer_id,
                        customer_name: customer.customer_name.clone(),
                        total_spent: acc.total_spent,
                        total_orders: acc.total_orders,
                    },
                )
            })
        })
        .collect();

    stats.customers_without_orders = customers.len() - ranked.len();

    ranked.sort_by(|(pos_a, a), (pos_b, b)| {
        b.total_spent
            .cmp(&a.total_spent)
            .then_with(|| match tie_break {
                TieBreak::CustomerId => a.customer_id.cmp(&b.customer_id),
                TieBreak::InputOrder => pos_a.cmp(pos_b),
            })
    });

    debug!(
        "Aggregated {} of {} orders into {} customers ({} unmatched orders)",
        stats.orders_matched,
        stats.orders_seen,
        ranked.len(),
        stats.orders_unmatched
    );

    Ok(Aggregation {
        rows: ranked.into_iter().map(|(_, row)| row).collect(),
        stats,
    })
}

/// Rank customers by total spend using the default tie-break.
pub fn rank_customers(customers: &[Customer], orders: &[Order]) -> Result<Vec<CustomerSpend>> {
    aggregate(customers, orders, TieBreak::default()).map(|aggregation| aggregation.rows)
}

/// Get the first `n` rows of a ranking.
pub fn top_customers(rows: &[CustomerSpend], n: usize) -> Vec<CustomerSpend> {
    rows.iter().take(n).cloned().collect()
}
