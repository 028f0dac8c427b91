//! Error types for loading and aggregating customer/order data.

/// Result type for loader and aggregation operations.
pub type Result<T> = std::result::Result<T, AggregateError>;

/// Which input relation a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Customers,
    Orders,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Customers => write!(f, "customers"),
            Relation::Orders => write!(f, "orders"),
        }
    }
}

/// Errors that can occur while loading or aggregating records.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("{relation} record {index}: missing field '{field}'")]
    MissingField {
        relation: Relation,
        index: usize,
        field: String,
    },

    #[error("{relation} record {index}: invalid field '{field}': {reason}")]
    InvalidField {
        relation: Relation,
        index: usize,
        field: String,
        reason: String,
    },

    #[error("{relation} record {index} is not a JSON object")]
    NotAnObject { relation: Relation, index: usize },

    #[error("{relation} line {line}: malformed JSON: {source}")]
    Json {
        relation: Relation,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate customer_id {0} in customers")]
    DuplicateCustomer(i64),

    #[error("duplicate order_id {0} in orders")]
    DuplicateOrder(i64),

    #[error("total_spent overflowed for customer {0}")]
    Overflow(i64),

    #[error("combined spend across customers overflowed")]
    GrandTotalOverflow,
}
