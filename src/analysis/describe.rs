use crate::analysis::report::{DescriptiveStats, DescriptiveStatsReport, Report};
use crate::analysis::{AnalysisError, ensure_loaded, require_columns};
use crate::processor::columnar_processor::ColumnarProcessor;

/// Count, mean, std, min, quartiles and max of a numeric column, over the
/// whole table or per distinct value of `group_by_column`. An empty group
/// column name means no grouping.
pub fn get_descriptive_stats(
    table: &ColumnarProcessor,
    column_name: &str,
    group_by_column: Option<&str>,
) -> Result<Report, AnalysisError> {
    ensure_loaded(table)?;
    require_columns(table, &[column_name])?;

    if !table.column_type(column_name).is_some_and(|t| t.is_numeric()) {
        return Err(AnalysisError::NotNumeric(column_name.to_string()));
    }

    let stats = match group_by_column.filter(|g| !g.is_empty()) {
        Some(group_col) => {
            require_columns(table, &[group_col])?;
            DescriptiveStats::Grouped {
                group_by_column: group_col.to_string(),
                groups: table.describe_by(column_name, group_col)?,
            }
        }
        None => DescriptiveStats::Overall(table.describe(column_name)?),
    };

    Ok(Report::DescriptiveStats(DescriptiveStatsReport {
        column: column_name.to_string(),
        stats,
    }))
}
