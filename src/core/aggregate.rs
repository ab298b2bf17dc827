use crate::core::table::Table;
use crate::domain::model::{AggregateResult, CustomerDayStats, Order, RawOrder};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;

pub const REQUIRED_COLUMNS: [&str; 4] = ["orderId", "customerId", "createdAt", "amount"];

/// Timestamp shapes seen in the export. RFC 3339 is tried first, then
/// these, then a bare date.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

struct ColumnIndexes {
    order_id: usize,
    customer_id: usize,
    created_at: usize,
    amount: usize,
}

/// Group a normalized orders table by `(customerId, date)` and compute
/// sum, mean and median of `amount` per group.
///
/// A missing required column rejects the whole record set; a value that
/// fails coercion aborts the whole run. An input with zero data rows is
/// valid and produces an empty result.
pub fn aggregate(table: &Table) -> Result<AggregateResult> {
    let orders = extract_orders(table)?;
    let source_records = orders.len();

    let mut groups: BTreeMap<(String, NaiveDate), Vec<i64>> = BTreeMap::new();
    for order in orders {
        let date = order.date();
        groups
            .entry((order.customer_id, date))
            .or_default()
            .push(order.amount);
    }

    let stats = groups
        .into_iter()
        .map(|((customer_id, date), mut amounts)| {
            amounts.sort_unstable();
            let total: i64 = amounts.iter().sum();
            CustomerDayStats {
                customer_id,
                date,
                total_amount: total,
                avg_amount: total as f64 / amounts.len() as f64,
                median_amount: median(&amounts),
            }
        })
        .collect();

    Ok(AggregateResult {
        stats,
        source_records,
    })
}

/// Check the column set and project each row into a [`RawOrder`], then
/// coerce the typed fields.
fn extract_orders(table: &Table) -> Result<Vec<Order>> {
    let indexes = required_columns(table)?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let raw = RawOrder {
                order_id: row[indexes.order_id].clone(),
                customer_id: row[indexes.customer_id].clone(),
                created_at: row[indexes.created_at].clone(),
                amount: row[indexes.amount].clone(),
            };
            coerce_order(raw, i + 1)
        })
        .collect()
}

fn required_columns(table: &Table) -> Result<ColumnIndexes> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| table.column_index(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(EtlError::SchemaValidationError { missing });
    }

    // Presence was checked just above.
    Ok(ColumnIndexes {
        order_id: table.column_index("orderId").unwrap_or(0),
        customer_id: table.column_index("customerId").unwrap_or(0),
        created_at: table.column_index("createdAt").unwrap_or(0),
        amount: table.column_index("amount").unwrap_or(0),
    })
}

fn coerce_order(raw: RawOrder, record: usize) -> Result<Order> {
    let created_at =
        parse_timestamp(&raw.created_at).ok_or_else(|| EtlError::TypeCoercionError {
            column: "createdAt".to_string(),
            value: raw.created_at.clone(),
            record,
        })?;

    let amount: i64 = raw
        .amount
        .parse()
        .map_err(|_| EtlError::TypeCoercionError {
            column: "amount".to_string(),
            value: raw.amount.clone(),
            record,
        })?;

    Ok(Order {
        order_id: raw.order_id,
        customer_id: raw.customer_id,
        created_at,
        amount,
    })
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_utc());
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Median with midpoint-average for even counts. `amounts` is sorted.
fn median(amounts: &[i64]) -> f64 {
    let n = amounts.len();
    if n % 2 == 1 {
        amounts[n / 2] as f64
    } else {
        (amounts[n / 2 - 1] + amounts[n / 2]) as f64 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::{InputShape, TableReader};

    fn table_from(content: &str) -> Table {
        TableReader::new(InputShape::Transposed)
            .read(content.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_one_group_per_distinct_customer_day_pair() {
        let table = table_from(
            "orderId,o1,o2,o3,o4\n\
             customerId,C1,C1,C2,C1\n\
             createdAt,2023-10-01T10:00,2023-10-01T15:00,2023-10-01T11:00,2023-10-02T08:00\n\
             amount,100,300,50,70\n",
        );
        let result = aggregate(&table).unwrap();

        assert_eq!(result.source_records, 4);
        assert_eq!(result.stats.len(), 3); // (C1,10-01), (C1,10-02), (C2,10-01)
    }

    #[test]
    fn test_two_orders_same_customer_same_day() {
        let table = table_from(
            "orderId,o1,o2\n\
             customerId,C1,C1\n\
             createdAt,2023-10-01T10:00,2023-10-01T15:00\n\
             amount,100,300\n",
        );
        let result = aggregate(&table).unwrap();

        assert_eq!(result.stats.len(), 1);
        let stats = &result.stats[0];
        assert_eq!(stats.customer_id, "C1");
        assert_eq!(stats.date, NaiveDate::from_ymd_opt(2023, 10, 1).unwrap());
        assert_eq!(stats.total_amount, 400);
        assert_eq!(stats.avg_amount, 200.0);
        assert_eq!(stats.median_amount, 200.0);
    }

    #[test]
    fn test_group_of_one_total_avg_median_all_equal_amount() {
        let table = table_from(
            "orderId,o1\n\
             customerId,C9\n\
             createdAt,2023-10-01T23:59\n\
             amount,150\n",
        );
        let result = aggregate(&table).unwrap();

        let stats = &result.stats[0];
        assert_eq!(stats.total_amount, 150);
        assert_eq!(stats.avg_amount, 150.0);
        assert_eq!(stats.median_amount, 150.0);
    }

    #[test]
    fn test_median_odd_group_size() {
        let table = table_from(
            "orderId,o1,o2,o3\n\
             customerId,C1,C1,C1\n\
             createdAt,2023-10-01T08:00,2023-10-01T09:00,2023-10-01T10:00\n\
             amount,300,100,900\n",
        );
        let result = aggregate(&table).unwrap();

        let stats = &result.stats[0];
        assert_eq!(stats.total_amount, 1300);
        assert_eq!(stats.median_amount, 300.0);
    }

    #[test]
    fn test_missing_required_column_rejects_whole_set() {
        // amount row absent
        let table = table_from(
            "orderId,o1\n\
             customerId,C1\n\
             createdAt,2023-10-01T10:00\n",
        );
        let err = aggregate(&table).unwrap_err();

        match err {
            EtlError::SchemaValidationError { missing } => {
                assert_eq!(missing, vec!["amount".to_string()]);
            }
            other => panic!("expected schema validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_amount_fails_whole_run() {
        let table = table_from(
            "orderId,o1,o2\n\
             customerId,C1,C1\n\
             createdAt,2023-10-01T10:00,2023-10-01T11:00\n\
             amount,100,lots\n",
        );
        let err = aggregate(&table).unwrap_err();

        match err {
            EtlError::TypeCoercionError {
                column,
                value,
                record,
            } => {
                assert_eq!(column, "amount");
                assert_eq!(value, "lots");
                assert_eq!(record, 2);
            }
            other => panic!("expected type coercion failure, got {:?}", other),
        }
    }

    #[test]
    fn test_fractional_amount_is_a_coercion_error() {
        let table = table_from(
            "orderId,o1\n\
             customerId,C1\n\
             createdAt,2023-10-01T10:00\n\
             amount,100.5\n",
        );
        assert!(matches!(
            aggregate(&table),
            Err(EtlError::TypeCoercionError { .. })
        ));
    }

    #[test]
    fn test_unparseable_timestamp_is_a_coercion_error() {
        let table = table_from(
            "orderId,o1\n\
             customerId,C1\n\
             createdAt,yesterday\n\
             amount,100\n",
        );
        let err = aggregate(&table).unwrap_err();
        match err {
            EtlError::TypeCoercionError { column, .. } => assert_eq!(column, "createdAt"),
            other => panic!("expected type coercion failure, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_data_rows_yield_empty_result() {
        let table = table_from("orderId\ncustomerId\ncreatedAt\namount\n");
        let result = aggregate(&table).unwrap();

        assert_eq!(result.source_records, 0);
        assert!(result.stats.is_empty());
    }

    #[test]
    fn test_timestamp_formats_accepted() {
        for ts in [
            "2023-10-01T10:00",
            "2023-10-01T10:00:30",
            "2023-10-01T10:00:30.250",
            "2023-10-01 10:00:30",
            "2023-10-01T10:00:30Z",
            "2023-10-01T10:00:30+02:00",
            "2023-10-01",
        ] {
            let parsed = parse_timestamp(ts);
            assert!(parsed.is_some(), "failed to parse {}", ts);
            assert_eq!(
                parsed.map(|t| t.date()),
                NaiveDate::from_ymd_opt(2023, 10, 1),
                "wrong date for {}",
                ts
            );
        }
    }

    #[test]
    fn test_negative_amounts_are_valid() {
        // refunds come through as negative amounts
        let table = table_from(
            "orderId,o1,o2\n\
             customerId,C1,C1\n\
             createdAt,2023-10-01T10:00,2023-10-01T11:00\n\
             amount,-50,150\n",
        );
        let result = aggregate(&table).unwrap();
        let stats = &result.stats[0];
        assert_eq!(stats.total_amount, 100);
        assert_eq!(stats.avg_amount, 50.0);
        assert_eq!(stats.median_amount, 50.0);
    }
}
