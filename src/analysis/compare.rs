use crate::analysis::report::{CompareAverageReport, Report};
use crate::analysis::{AnalysisError, ensure_loaded, require_columns};
use crate::processor::{
    AggregateOp, FilterPredicate, Value, columnar_processor::ColumnarProcessor,
};

/// Mean of `measure_column` for rows where `category_column` equals
/// `target_value`, against the mean over every other row.
pub fn compare_average(
    table: &ColumnarProcessor,
    measure_column: &str,
    category_column: &str,
    target_value: &Value,
) -> Result<Report, AnalysisError> {
    ensure_loaded(table)?;
    require_columns(table, &[measure_column, category_column])?;

    if !table.contains_value(category_column, target_value)? {
        return Err(AnalysisError::ValueNotFound {
            column: category_column.to_string(),
            value: target_value.clone(),
        });
    }

    let target_rows = table.filter(
        category_column,
        &FilterPredicate::Equals(target_value.clone()),
    )?;
    let other_rows = table.filter(
        category_column,
        &FilterPredicate::NotEquals(target_value.clone()),
    )?;

    let target_mean = table
        .take(&target_rows)
        .aggregate(measure_column, AggregateOp::Mean)?;
    let other_mean = table
        .take(&other_rows)
        .aggregate(measure_column, AggregateOp::Mean)?;

    let (Some(target_mean), Some(other_mean)) = (target_mean, other_mean) else {
        return Err(AnalysisError::InsufficientData);
    };

    Ok(Report::CompareAverage(CompareAverageReport {
        measure_column: measure_column.to_string(),
        category_column: category_column.to_string(),
        target_value: target_value.clone(),
        target_mean: target_mean.as_f64(),
        other_mean: other_mean.as_f64(),
    }))
}
