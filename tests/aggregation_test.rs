use chrono::NaiveDate;
use orders_etl::core::aggregate::aggregate;
use orders_etl::core::table::{InputShape, TableReader};

fn aggregate_export(content: &str) -> orders_etl::core::AggregateResult {
    let table = TableReader::new(InputShape::Transposed)
        .read(content.as_bytes())
        .unwrap();
    aggregate(&table).unwrap()
}

#[test]
fn test_row_count_equals_distinct_customer_day_pairs() {
    // 6 orders over 4 distinct (customer, day) pairs
    let result = aggregate_export(
        "orderId,o1,o2,o3,o4,o5,o6\n\
         customerId,C1,C1,C2,C2,C1,C3\n\
         createdAt,2023-10-01T08:00,2023-10-01T20:00,2023-10-01T12:00,2023-10-01T13:00,2023-10-02T09:00,2023-10-01T17:45\n\
         amount,100,300,40,60,500,25\n",
    );

    assert_eq!(result.source_records, 6);
    assert_eq!(result.stats.len(), 4);

    let keys: Vec<(String, NaiveDate)> = result
        .stats
        .iter()
        .map(|s| (s.customer_id.clone(), s.date))
        .collect();
    let mut deduped = keys.clone();
    deduped.dedup();
    assert_eq!(keys, deduped, "grouping key must be unique in one run");
}

#[test]
fn test_reference_scenario_two_orders_one_group() {
    let result = aggregate_export(
        "orderId,o1,o2\n\
         customerId,C1,C1\n\
         createdAt,2023-10-01T10:00,2023-10-01T15:00\n\
         amount,100,300\n",
    );

    assert_eq!(result.stats.len(), 1);
    let stats = &result.stats[0];
    assert_eq!(stats.customer_id, "C1");
    assert_eq!(stats.date, NaiveDate::from_ymd_opt(2023, 10, 1).unwrap());
    assert_eq!(stats.total_amount, 400);
    assert_eq!(stats.avg_amount, 200.0);
    assert_eq!(stats.median_amount, 200.0);
}

#[test]
fn test_even_group_size_median_is_midpoint_average() {
    let result = aggregate_export(
        "orderId,o1,o2,o3,o4\n\
         customerId,C1,C1,C1,C1\n\
         createdAt,2023-10-01T08:00,2023-10-01T09:00,2023-10-01T10:00,2023-10-01T11:00\n\
         amount,10,20,40,90\n",
    );

    let stats = &result.stats[0];
    assert_eq!(stats.total_amount, 160);
    assert_eq!(stats.avg_amount, 40.0);
    assert_eq!(stats.median_amount, 30.0); // (20 + 40) / 2
}

#[test]
fn test_group_of_one_collapses_all_three_statistics() {
    let result = aggregate_export(
        "orderId,o1\n\
         customerId,C7\n\
         createdAt,2023-10-03T06:15\n\
         amount,420\n",
    );

    let stats = &result.stats[0];
    assert_eq!(stats.total_amount, 420);
    assert_eq!(stats.avg_amount, 420.0);
    assert_eq!(stats.median_amount, 420.0);
}

#[test]
fn test_same_customer_different_days_stay_separate() {
    let result = aggregate_export(
        "orderId,o1,o2\n\
         customerId,C1,C1\n\
         createdAt,2023-10-01T23:59,2023-10-02T00:01\n\
         amount,100,100\n",
    );

    assert_eq!(result.stats.len(), 2);
    assert_eq!(
        result.stats[0].date,
        NaiveDate::from_ymd_opt(2023, 10, 1).unwrap()
    );
    assert_eq!(
        result.stats[1].date,
        NaiveDate::from_ymd_opt(2023, 10, 2).unwrap()
    );
}
