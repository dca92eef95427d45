use log::debug;

use crate::analysis::report::{GroupAggregateReport, Report};
use crate::analysis::{AnalysisError, ensure_loaded, require_columns};
use crate::processor::{AggregateOp, columnar_processor::ColumnarProcessor};

/// Aggregations applied when a request names none
pub const DEFAULT_AGGREGATIONS: [AggregateOp; 4] = [
    AggregateOp::Mean,
    AggregateOp::Median,
    AggregateOp::Count,
    AggregateOp::Sum,
];

/// Keeps the supported names in request order, without duplicates
pub fn parse_aggregations<S: AsRef<str>>(names: &[S]) -> Vec<AggregateOp> {
    let mut ops = Vec::with_capacity(names.len());
    for name in names {
        match name.as_ref().trim().parse::<AggregateOp>() {
            Ok(op) if !ops.contains(&op) => ops.push(op),
            Ok(_) => {}
            Err(unknown) => debug!("dropping unsupported aggregation '{unknown}'"),
        }
    }
    ops
}

/// Groups rows by `group_by_column` and applies each requested aggregation
/// to `aggregate_column`.
pub fn group_by_aggregate<S: AsRef<str>>(
    table: &ColumnarProcessor,
    group_by_column: &str,
    aggregate_column: &str,
    aggregations: &[S],
) -> Result<Report, AnalysisError> {
    ensure_loaded(table)?;
    require_columns(table, &[group_by_column, aggregate_column])?;

    let ops = parse_aggregations(aggregations);
    if ops.is_empty() {
        return Err(AnalysisError::NoValidAggregation);
    }

    let rows = table.group_by_multi_agg(group_by_column, aggregate_column, &ops)?;

    Ok(Report::GroupAggregate(GroupAggregateReport {
        group_by_column: group_by_column.to_string(),
        aggregate_column: aggregate_column.to_string(),
        aggregations: ops,
        rows,
    }))
}
