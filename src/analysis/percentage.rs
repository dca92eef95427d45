use crate::analysis::report::{PercentageReport, Report};
use crate::analysis::{AnalysisError, ensure_loaded, require_columns};
use crate::processor::{
    CompareOp, FilterPredicate, Value, columnar_processor::ColumnarProcessor,
};

/// Coerces a condition literal to a number. Numbers pass through; a string
/// containing `.`, `e` or `E` is parsed as a float, anything else as an
/// integer.
pub fn coerce_numeric(value: &Value) -> Result<Value, AnalysisError> {
    let Value::Str(literal) = value else {
        return Ok(value.clone());
    };

    let trimmed = literal.trim();
    let parsed = if trimmed.contains(['.', 'e', 'E']) {
        trimmed.parse::<f64>().ok().map(Value::Float)
    } else {
        trimmed.parse::<i64>().ok().map(Value::Int)
    };
    parsed.ok_or_else(|| AnalysisError::NotANumber(literal.clone()))
}

/// Share of the rows where `base_filter_column == base_filter_value` that
/// also satisfy `condition_column <op> condition_value`.
pub fn filter_and_calculate_percentage(
    table: &ColumnarProcessor,
    base_filter_column: &str,
    base_filter_value: &Value,
    condition_column: &str,
    condition_operator: &str,
    condition_value: &Value,
    value_is_numeric: bool,
) -> Result<Report, AnalysisError> {
    ensure_loaded(table)?;
    require_columns(table, &[base_filter_column, condition_column])?;

    // Denominator: exact equality, no coercion of the base value
    let base_rows = table.filter(
        base_filter_column,
        &FilterPredicate::Equals(base_filter_value.clone()),
    )?;
    if base_rows.is_empty() {
        return Err(AnalysisError::NoBaseFilterData {
            column: base_filter_column.to_string(),
            value: base_filter_value.clone(),
        });
    }

    let condition_value = if value_is_numeric {
        coerce_numeric(condition_value)?
    } else {
        condition_value.clone()
    };

    let operator = condition_operator
        .parse::<CompareOp>()
        .map_err(AnalysisError::UnknownOperator)?;

    let matched = table
        .filter_rows(
            &base_rows,
            condition_column,
            &operator.predicate(condition_value.clone()),
        )?
        .len();

    Ok(Report::Percentage(PercentageReport {
        base_filter_column: base_filter_column.to_string(),
        base_filter_value: base_filter_value.clone(),
        condition_column: condition_column.to_string(),
        condition_operator: operator,
        condition_value,
        matched,
        total: base_rows.len(),
    }))
}
