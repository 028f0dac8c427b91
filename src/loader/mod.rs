//! Input loading for customer and order exports.
//!
//! Each input file holds either a JSON array of records or
//! newline-delimited JSON (one object per line). Records are mapped
//! to typed values through a configurable column mapping.

use crate::error::{AggregateError, Relation, Result};
use crate::models::{Customer, Order};
use anyhow::Context;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Field names used to read records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Customer identifier in customer records.
    pub customer_id: String,
    /// Customer display name in customer records.
    pub customer_name: String,
    /// Order identifier in order records.
    pub order_id: String,
    /// Customer reference in order records.
    pub order_customer_id: String,
    /// Sale amount in order records.
    pub sales: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            customer_id: "customer_id".to_string(),
            customer_name: "customer_name".to_string(),
            order_id: "order_id".to_string(),
            order_customer_id: "customer_id".to_string(),
            sales: "sales".to_string(),
        }
    }
}

impl From<&crate::config::ColumnsConfig> for ColumnMapping {
    fn from(config: &crate::config::ColumnsConfig) -> Self {
        Self {
            customer_id: config.customer_id.clone(),
            customer_name: config.customer_name.clone(),
            order_id: config.order_id.clone(),
            order_customer_id: config.order_customer_id.clone(),
            sales: config.sales.clone(),
        }
    }
}

/// Both relations, loaded together.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
}

impl Dataset {
    /// Read both input files concurrently and convert them to typed records.
    pub async fn load(
        customers_path: &Path,
        orders_path: &Path,
        columns: &ColumnMapping,
    ) -> anyhow::Result<Self> {
        let (customers_text, orders_text) =
            tokio::try_join!(read_input(customers_path), read_input(orders_path))?;

        let dataset = Self::from_text(&customers_text, &orders_text, columns)?;

        info!(
            "Loaded {} customers from {} and {} orders from {}",
            dataset.customers.len(),
            customers_path.display(),
            dataset.orders.len(),
            orders_path.display()
        );

        Ok(dataset)
    }

    /// Parse both relations from already-read text.
    pub fn from_text(customers_text: &str, orders_text: &str, columns: &ColumnMapping) -> Result<Self> {
        let customer_records = load_records(customers_text, Relation::Customers)?;
        let order_records = load_records(orders_text, Relation::Orders)?;

        Ok(Self {
            customers: customers_from_records(&customer_records, columns)?,
            orders: orders_from_records(&order_records, columns)?,
        })
    }
}

async fn read_input(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read input file: {}", path.display()))
}

/// Parse a JSON array or NDJSON document into raw records.
pub fn load_records(text: &str, relation: Relation) -> Result<Vec<Value>> {
    let trimmed = text.trim_start();

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        debug!("Parsing {} as a JSON array", relation);
        return serde_json::from_str(text).map_err(|source| AggregateError::Json {
            relation,
            line: source.line(),
            source,
        });
    }

    debug!("Parsing {} as NDJSON", relation);
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| AggregateError::Json {
            relation,
            line: i + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Convert raw records into customers.
pub fn customers_from_records(records: &[Value], columns: &ColumnMapping) -> Result<Vec<Customer>> {
    records
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let record = RecordView::new(value, Relation::Customers, i + 1)?;
            Ok(Customer {
                customer_id: record.id(&columns.customer_id)?,
                customer_name: record.text(&columns.customer_name)?,
            })
        })
        .collect()
}

/// Convert raw records into orders.
pub fn orders_from_records(records: &[Value], columns: &ColumnMapping) -> Result<Vec<Order>> {
    records
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let record = RecordView::new(value, Relation::Orders, i + 1)?;
            Ok(Order {
                order_id: record.id(&columns.order_id)?,
                customer_id: record.id(&columns.order_customer_id)?,
                sales: record.decimal(&columns.sales)?,
            })
        })
        .collect()
}

/// A single JSON object plus its position, for error reporting.
struct RecordView<'a> {
    fields: &'a Map<String, Value>,
    relation: Relation,
    /// 1-based position within the relation.
    index: usize,
}

impl<'a> RecordView<'a> {
    fn new(value: &'a Value, relation: Relation, index: usize) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                relation,
                index,
            }),
            _ => Err(AggregateError::NotAnObject { relation, index }),
        }
    }

    fn get(&self, field: &str) -> Result<&'a Value> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(AggregateError::MissingField {
                relation: self.relation,
                index: self.index,
                field: field.to_string(),
            }),
            Some(value) => Ok(value),
        }
    }

    fn invalid(&self, field: &str, reason: impl Into<String>) -> AggregateError {
        AggregateError::InvalidField {
            relation: self.relation,
            index: self.index,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    fn id(&self, field: &str) -> Result<i64> {
        match self.get(field)? {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| self.invalid(field, format!("expected an integer, got {}", n))),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| self.invalid(field, format!("'{}': {}", s, e))),
            other => Err(self.invalid(field, format!("expected an integer, got {}", other))),
        }
    }

    fn text(&self, field: &str) -> Result<String> {
        match self.get(field)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(self.invalid(field, format!("expected a string, got {}", other))),
        }
    }

    fn decimal(&self, field: &str) -> Result<Decimal> {
        let raw = match self.get(field)? {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_string(),
            other => return Err(self.invalid(field, format!("expected a number, got {}", other))),
        };

        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|e| self.invalid(field, format!("'{}': {}", raw, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_json_array() {
        let text = r#"[{"customer_id": 1, "customer_name": "Alice"}, {"customer_id": 2, "customer_name": "Bob"}]"#;
        let records = load_records(text, Relation::Customers).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let text = "{\"order_id\": 1}\n\n   \n{\"order_id\": 2}\n";
        let records = load_records(text, Relation::Orders).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(load_records("", Relation::Orders).unwrap().is_empty());
        assert!(load_records("  \n ", Relation::Orders).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_ndjson_reports_line() {
        let text = "{\"order_id\": 1}\n{\"order_id\": \n";
        let err = load_records(text, Relation::Orders).unwrap_err();
        match err {
            AggregateError::Json { relation, line, .. } => {
                assert_eq!(relation, Relation::Orders);
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_orders_from_records() {
        let records = load_records(
            r#"
{"order_id": 101, "customer_id": 1, "sales": 50.0}
{"order_id": "102", "customer_id": "1", "sales": "19.99"}
"#,
            Relation::Orders,
        )
        .unwrap();

        let orders = orders_from_records(&records, &ColumnMapping::default()).unwrap();

        assert_eq!(
            orders,
            vec![
                Order::new(101, 1, dec("50.0")),
                Order::new(102, 1, dec("19.99")),
            ]
        );
    }

    #[test]
    fn test_missing_join_key_in_orders() {
        let records = load_records(r#"[{"order_id": 1, "sales": 3}]"#, Relation::Orders).unwrap();
        let err = orders_from_records(&records, &ColumnMapping::default()).unwrap_err();

        match err {
            AggregateError::MissingField {
                relation,
                index,
                field,
            } => {
                assert_eq!(relation, Relation::Orders);
                assert_eq!(index, 1);
                assert_eq!(field, "customer_id");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_null_join_key_in_customers() {
        let records = load_records(
            r#"[{"customer_id": 1, "customer_name": "A"}, {"customer_id": null, "customer_name": "B"}]"#,
            Relation::Customers,
        )
        .unwrap();
        let err = customers_from_records(&records, &ColumnMapping::default()).unwrap_err();

        assert!(matches!(
            err,
            AggregateError::MissingField {
                relation: Relation::Customers,
                index: 2,
                ..
            }
        ));
        assert!(err.to_string().contains("customer_id"));
    }

    #[test]
    fn test_numeric_and_string_sales_parse_identically() {
        let records = load_records(
            r#"
{"order_id": 1, "customer_id": 1, "sales": 12345678901234567.89}
{"order_id": 2, "customer_id": 1, "sales": "12345678901234567.89"}
{"order_id": 3, "customer_id": 1, "sales": 0.1}
"#,
            Relation::Orders,
        )
        .unwrap();

        let orders = orders_from_records(&records, &ColumnMapping::default()).unwrap();

        assert_eq!(orders[0].sales, dec("12345678901234567.89"));
        assert_eq!(orders[0].sales, orders[1].sales);
        assert_eq!(orders[2].sales.to_string(), "0.1");
    }

    #[test]
    fn test_array_mode_requires_an_array() {
        let err = load_records("[1, 2] {}", Relation::Customers).unwrap_err();
        assert!(matches!(err, AggregateError::Json { line: 1, .. }));
    }

    #[test]
    fn test_invalid_fields() {
        let records = load_records(
            r#"[{"order_id": 1.5, "customer_id": 1, "sales": 1}]"#,
            Relation::Orders,
        )
        .unwrap();
        let err = orders_from_records(&records, &ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, AggregateError::InvalidField { ref field, .. } if field == "order_id"));

        let records = load_records(
            r#"[{"order_id": 1, "customer_id": 1, "sales": "lots"}]"#,
            Relation::Orders,
        )
        .unwrap();
        let err = orders_from_records(&records, &ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, AggregateError::InvalidField { ref field, .. } if field == "sales"));
    }

    #[test]
    fn test_non_object_record() {
        let records = load_records("[1, 2]", Relation::Customers).unwrap();
        let err = customers_from_records(&records, &ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, AggregateError::NotAnObject { index: 1, .. }));
    }

    #[test]
    fn test_custom_column_mapping() {
        let columns = ColumnMapping {
            customer_id: "id".to_string(),
            customer_name: "name".to_string(),
            order_id: "id".to_string(),
            order_customer_id: "cust".to_string(),
            sales: "amount".to_string(),
        };

        let dataset = Dataset::from_text(
            r#"[{"id": 7, "name": "Grace"}]"#,
            r#"{"id": 1, "cust": 7, "amount": "12.30"}"#,
            &columns,
        )
        .unwrap();

        assert_eq!(dataset.customers, vec![Customer::new(7, "Grace")]);
        assert_eq!(dataset.orders, vec![Order::new(1, 7, dec("12.30"))]);
    }

    #[test]
    fn test_load_fixtures() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let dataset = tokio_test::block_on(Dataset::load(
            &root.join("customers.json"),
            &root.join("orders.ndjson"),
            &ColumnMapping::default(),
        ))
        .unwrap();

        assert_eq!(dataset.customers.len(), 3);
        assert_eq!(dataset.orders.len(), 4);
        assert_eq!(dataset.orders[3].sales, dec("12.50"));

        let rows = crate::analysis::rank_customers(&dataset.customers, &dataset.orders).unwrap();
        let ranked: Vec<(i64, &str, Decimal, u64)> = rows
            .iter()
            .map(|r| (r.customer_id, r.customer_name.as_str(), r.total_spent, r.total_orders))
            .collect();
        assert_eq!(
            ranked,
            vec![(1, "Alice", dec("80.0"), 2), (2, "Bob", dec("10.0"), 1)]
        );
    }

    #[tokio::test]
    async fn test_load_from_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let customers_path = dir.path().join("customers.ndjson");
        let orders_path = dir.path().join("orders.json");

        let mut file = std::fs::File::create(&customers_path).unwrap();
        writeln!(file, r#"{{"customer_id": 1, "customer_name": "Alice"}}"#).unwrap();
        std::fs::write(&orders_path, "[]").unwrap();

        let dataset = Dataset::load(&customers_path, &orders_path, &ColumnMapping::default())
            .await
            .unwrap();

        assert_eq!(dataset.customers.len(), 1);
        assert!(dataset.orders.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Dataset::load(
            &dir.path().join("nope.json"),
            &dir.path().join("nope.ndjson"),
            &ColumnMapping::default(),
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }
}
