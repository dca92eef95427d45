use std::io::Write;
use std::path::Path;

use serde_json::{Value as Json, json};
use tempfile::NamedTempFile;

use freelance_analyzer::analysis::Report;
use freelance_analyzer::dispatch::{Dispatcher, Request};
use freelance_analyzer::processor::columnar_processor::ColumnarProcessor;

const HEADER: &str = "Freelancer_ID,Job_Category,Platform,Experience_Level,Client_Region,Payment_Method,Job_Completed,Earnings_USD,Hourly_Rate,Job_Success_Rate,Client_Rating,Job_Duration_Days,Project_Type,Rehire_Rate,Marketing_Spend";

const LEVELS: [&str; 3] = ["Beginner", "Intermediate", "Expert"];
const PAYMENTS: [&str; 4] = ["Crypto", "Bank Transfer", "PayPal", "Mobile Banking"];
const REGIONS: [&str; 3] = ["Asia", "Europe", "Middle East"];

struct Row {
    level: &'static str,
    payment: &'static str,
    jobs: i64,
    earnings: i64,
}

/// Deterministic rows; Crypto earns a fixed bonus so its mean is higher
fn rows() -> Vec<Row> {
    (0..48)
        .map(|i: i64| {
            let payment = PAYMENTS[(i % 4) as usize];
            let bonus = if payment == "Crypto" { 2500 } else { 0 };
            Row {
                level: LEVELS[(i % 3) as usize],
                payment,
                jobs: (i * 37) % 190,
                earnings: 1000 + (i * 131) % 4000 + bonus,
            }
        })
        .collect()
}

fn write_dataset(rows: &[Row]) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(tmp, "{HEADER}").unwrap();
    for (i, r) in rows.iter().enumerate() {
        writeln!(
            tmp,
            "{},Writing,Upwork,{},{},{},{},{},{:.1},80.0,4.5,10,Hourly,25.0,100",
            i + 1,
            r.level,
            REGIONS[i % 3],
            r.payment,
            r.jobs,
            r.earnings,
            10.0 + i as f64,
        )
        .unwrap();
    }
    tmp.flush().unwrap();
    tmp
}

fn dispatcher_for(rows: &[Row]) -> (Dispatcher, NamedTempFile) {
    let tmp = write_dataset(rows);
    let table = ColumnarProcessor::load_or_empty(tmp.path());
    assert_eq!(table.row_count(), rows.len());
    (Dispatcher::new(table), tmp)
}

fn mean(values: impl Iterator<Item = i64>) -> f64 {
    let v: Vec<i64> = values.collect();
    v.iter().sum::<i64>() as f64 / v.len() as f64
}

#[test]
fn test_unknown_operations_never_raise() {
    let (d, _tmp) = dispatcher_for(&rows());
    for op in ["pivot_table", "delete", "compare-average", "42"] {
        let text = d.execute_json(&json!({"operation_type": op, "parameters": {}}));
        assert_eq!(text, format!("Unknown operation type: {op}"));
    }
    for (tag, shown) in [(json!(7), "7"), (json!(null), "null"), (json!(true), "true")] {
        let text = d.execute_json(&json!({"operation_type": tag, "parameters": {}}));
        assert_eq!(text, format!("Unknown operation type: {shown}"));
    }
    let text = d.execute_json(&json!({"parameters": {}}));
    assert!(text.starts_with("Request could not be processed:"), "{text}");
}

#[test]
fn test_compare_average_on_empty_table_reports_no_data() {
    let d = Dispatcher::new(ColumnarProcessor::load_or_empty(Path::new(
        "/definitely/not/here.csv",
    )));
    for (measure, category, target) in [
        ("Earnings_USD", "Payment_Method", json!("Crypto")),
        ("nope", "nothing", json!(3)),
    ] {
        let text = d.execute_json(&json!({"operation_type": "compare_average", "parameters": {
            "measure_column": measure, "category_column": category, "target_value": target}}));
        assert_eq!(text, "No data loaded.");
    }
}

#[test]
fn test_compare_average_matches_direct_computation() {
    let data = rows();
    let (d, _tmp) = dispatcher_for(&data);

    let target = mean(data.iter().filter(|r| r.payment == "Crypto").map(|r| r.earnings));
    let other = mean(data.iter().filter(|r| r.payment != "Crypto").map(|r| r.earnings));
    assert!(target > other);

    let request = Request::from_json(&json!({"operation_type": "compare_average", "parameters": {
        "measure_column": "Earnings_USD", "category_column": "Payment_Method",
        "target_category_value": "Crypto"}}))
    .unwrap();

    let Ok(Report::CompareAverage(report)) = d.run(&request) else {
        panic!("expected a compare_average report");
    };
    assert!((report.target_mean - target).abs() < 1e-9);
    assert!((report.other_mean - other).abs() < 1e-9);

    let expected = 100.0 * (target - other) / other;
    let pct = report.percentage_difference().unwrap();
    assert!((pct - expected).abs() < 1e-9);

    let text = d.execute(&request);
    assert!(text.contains(&format!("(+{pct:.2}%)")), "{text}");
    assert!(text.contains("'Crypto' is higher on average"));
}

#[test]
fn test_percentage_with_empty_base_group() {
    let (d, _tmp) = dispatcher_for(&rows());
    let text = d.execute_json(&json!({"operation_type": "filter_and_calculate_percentage",
        "parameters": {"base_filter_column": "Experience_Level", "base_filter_value": "Guru",
        "condition_column": "Job_Completed", "condition_operator": "<",
        "condition_value": 100, "value_is_numeric": true}}));
    assert_eq!(text, "No data for base filter: 'Experience_Level' = 'Guru'.");
}

#[test]
fn test_percentage_reproducible_from_row_counts() {
    let data = rows();
    let (d, _tmp) = dispatcher_for(&data);

    let experts: Vec<&Row> = data.iter().filter(|r| r.level == "Expert").collect();
    let below = experts.iter().filter(|r| r.jobs < 100).count();

    // String literal coerced by the numeric heuristic gives the same answer
    for condition_value in [json!(100), json!("100")] {
        let request = Request::from_json(&json!({"operation_type": "filter_and_calculate_percentage",
            "parameters": {"base_filter_column": "Experience_Level", "base_filter_value": "Expert",
            "condition_column": "Job_Completed", "condition_operator": "<",
            "condition_value": condition_value, "value_is_numeric": true}}))
        .unwrap();

        let Ok(Report::Percentage(report)) = d.run(&request) else {
            panic!("expected a percentage report");
        };
        assert_eq!(report.total, experts.len());
        assert_eq!(report.matched, below);
        assert_eq!(
            report.percentage(),
            100.0 * below as f64 / experts.len() as f64
        );
    }
}

#[test]
fn test_group_by_drops_unknown_aggregations() {
    let (d, _tmp) = dispatcher_for(&rows());

    let text = d.execute_json(&json!({"operation_type": "group_by_aggregate", "parameters": {
        "group_by_column": "Client_Region", "aggregate_column": "Earnings_USD",
        "aggregations": ["mean", "bogus"]}}));
    let header = text.lines().nth(1).unwrap();
    assert_eq!(header.split_whitespace().collect::<Vec<_>>(), ["Client_Region", "mean"]);
    assert_eq!(text.lines().count(), 1 + 1 + REGIONS.len());

    let text = d.execute_json(&json!({"operation_type": "group_by_aggregate", "parameters": {
        "group_by_column": "Client_Region", "aggregate_column": "Earnings_USD",
        "aggregations": ["bogus"]}}));
    assert!(text.contains("no valid aggregation requested"), "{text}");
}

#[test]
fn test_descriptive_stats_rejects_categorical_column() {
    let (d, _tmp) = dispatcher_for(&rows());
    let text = d.execute_json(&json!({"operation_type": "get_descriptive_stats",
        "parameters": {"column_name": "Payment_Method"}}));
    assert_eq!(text, "Error: column 'Payment_Method' is not numeric.");
}

#[test]
fn test_every_operation_is_idempotent() {
    let (d, _tmp) = dispatcher_for(&rows());
    let requests: [Json; 4] = [
        json!({"operation_type": "compare_average", "parameters": {
            "measure_column": "Hourly_Rate", "category_column": "Experience_Level",
            "target_value": "Expert"}}),
        json!({"operation_type": "group_by_aggregate", "parameters": {
            "group_by_column": "Payment_Method", "aggregate_column": "Hourly_Rate",
            "aggregations": ["mean", "median", "std", "min", "max", "sum", "count"]}}),
        json!({"operation_type": "filter_and_calculate_percentage", "parameters": {
            "base_filter_column": "Client_Region", "base_filter_value": "Asia",
            "condition_column": "Payment_Method", "condition_operator": "==",
            "condition_value": "Crypto"}}),
        json!({"operation_type": "get_descriptive_stats", "parameters": {
            "column_name": "Earnings_USD", "group_by_column": "Experience_Level"}}),
    ];

    for raw in &requests {
        let request = Request::from_json(raw).unwrap();
        assert!(d.run(&request).is_ok(), "{}", d.execute(&request));
        assert_eq!(d.execute(&request), d.execute(&request));
        assert_eq!(d.execute_json(raw), d.execute_json(raw));
    }
}

#[test]
fn test_malformed_rows_empty_the_table_unless_loaded_leniently() {
    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(tmp, "{HEADER}").unwrap();
    writeln!(tmp, "1,Writing,Upwork,Expert,Asia,Crypto,10,500,20.0,80.0,4.5,10,Hourly,25.0,100").unwrap();
    writeln!(tmp, "2,Writing,Upwork,Expert,Asia,Crypto,ten,500,20.0,80.0,4.5,10,Hourly,25.0,100").unwrap();
    writeln!(tmp, "3,Writing,Upwork,Expert,Asia,Crypto").unwrap();
    write!(tmp, "4,\"Writing, Editing\",Upwork,Expert,Asia,PayPal,30,1500,20.0,80.0,4.5,10,Hourly,25.0,100").unwrap();
    tmp.flush().unwrap();

    let strict = Dispatcher::new(ColumnarProcessor::load_or_empty(tmp.path()));
    assert!(strict.table().is_empty());
    let text = strict.execute_json(&json!({"operation_type": "get_descriptive_stats",
        "parameters": {"column_name": "Earnings_USD"}}));
    assert_eq!(text, "No data loaded.");

    let mut table = ColumnarProcessor::new();
    let summary = table.load_csv(tmp.path()).unwrap();
    assert_eq!(summary.rows_processed, 2);
    let lines: Vec<usize> = summary.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![3, 4]);

    let d = Dispatcher::new(table);
    let text = d.execute_json(&json!({"operation_type": "group_by_aggregate", "parameters": {
        "group_by_column": "Job_Category", "aggregate_column": "Earnings_USD",
        "aggregations": ["sum"]}}));
    assert!(text.contains("Writing, Editing"), "{text}");
}
