use std::fmt;

use crate::analysis::format::render_table;
use crate::analysis::report::{STAT_NAMES, stat_cells};
use crate::analysis::{AnalysisError, ensure_loaded};
use crate::processor::{Describe, Value, column::ColumnType, columnar_processor::ColumnarProcessor};

const RULE: &str = "==================================================";

/// First rows, column types, numeric summaries and categorical value
/// counts of the loaded table
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewReport {
    pub row_count: usize,
    pub headers: Vec<String>,
    pub head: Vec<Vec<Value>>,
    pub column_types: Vec<(String, ColumnType)>,
    /// One entry per numeric column, in header order
    pub numeric: Vec<(String, Describe)>,
    /// Per categorical column: values by descending count, ties by value
    pub value_counts: Vec<(String, Vec<(Value, usize)>)>,
}

pub fn dataset_overview(
    table: &ColumnarProcessor,
    head_rows: usize,
) -> Result<OverviewReport, AnalysisError> {
    ensure_loaded(table)?;

    let headers = table.headers().to_vec();
    let head = (0..head_rows.min(table.row_count()))
        .map(|row| {
            headers
                .iter()
                .map(|h| table.value(h, row).unwrap_or(Value::Str(String::new())))
                .collect()
        })
        .collect();

    let mut column_types = Vec::with_capacity(headers.len());
    let mut numeric = Vec::new();
    let mut value_counts = Vec::new();

    for name in &headers {
        let Some(col_type) = table.column_type(name) else { continue };
        column_types.push((name.clone(), col_type));

        if col_type.is_numeric() {
            numeric.push((name.clone(), table.describe(name)?));
        } else {
            let mut counts: Vec<(Value, usize)> = table
                .group_rows(name)?
                .into_iter()
                .map(|(value, rows)| (value, rows.len()))
                .collect();
            // group_rows is sorted by value, so the stable sort keeps ties in value order
            counts.sort_by(|a, b| b.1.cmp(&a.1));
            value_counts.push((name.clone(), counts));
        }
    }

    Ok(OverviewReport {
        row_count: table.row_count(),
        headers,
        head,
        column_types,
        numeric,
        value_counts,
    })
}

impl fmt::Display for OverviewReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "First {} rows:", self.head.len())?;
        let head: Vec<Vec<String>> = self
            .head
            .iter()
            .map(|row| row.iter().map(Value::to_string).collect())
            .collect();
        writeln!(f, "{}", render_table(&self.headers, &head))?;
        writeln!(f, "\n{RULE}\n")?;

        writeln!(f, "{} rows, {} columns:", self.row_count, self.column_types.len())?;
        let types: Vec<Vec<String>> = self
            .column_types
            .iter()
            .map(|(name, t)| vec![name.clone(), self.row_count.to_string(), t.name().to_string()])
            .collect();
        let header = ["column", "non-null", "type"].map(String::from);
        writeln!(f, "{}", render_table(&header, &types))?;
        writeln!(f, "\n{RULE}\n")?;

        writeln!(f, "Summary statistics:")?;
        let header: Vec<String> = std::iter::once(String::new())
            .chain(self.numeric.iter().map(|(name, _)| name.clone()))
            .collect();
        let cells: Vec<Vec<String>> = self.numeric.iter().map(|(_, d)| stat_cells(d)).collect();
        let rows: Vec<Vec<String>> = STAT_NAMES
            .iter()
            .enumerate()
            .map(|(i, stat)| {
                std::iter::once(stat.to_string())
                    .chain(cells.iter().map(|c| c[i].clone()))
                    .collect()
            })
            .collect();
        writeln!(f, "{}", render_table(&header, &rows))?;

        for (name, counts) in &self.value_counts {
            writeln!(f, "\n{RULE}\n")?;
            writeln!(f, "Value counts for '{name}':")?;
            let rows: Vec<Vec<String>> = counts
                .iter()
                .map(|(value, n)| vec![value.to_string(), n.to_string()])
                .collect();
            write!(f, "{}", render_table(&[name.clone(), "count".to_string()], &rows))?;
            if !counts.is_empty() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::sample_table;

    #[test]
    fn test_overview_sections() {
        let table = sample_table();
        let report = dataset_overview(&table, 5).unwrap();

        assert_eq!(report.head.len(), 5);
        assert_eq!(report.head[0][0], Value::Int(1));
        assert_eq!(report.column_types.len(), 15);
        assert_eq!(report.numeric.len(), 9);
        assert_eq!(report.value_counts.len(), 6);

        let (name, earnings) = &report.numeric[2];
        assert_eq!(name, "Earnings_USD");
        assert_eq!(earnings.count, 6);
        assert_eq!(earnings.max, Some(6000.0));

        let (name, payments) = &report.value_counts[4];
        assert_eq!(name, "Payment_Method");
        assert_eq!(
            payments,
            &vec![
                (Value::Str("Bank Transfer".into()), 2),
                (Value::Str("Crypto".into()), 2),
                (Value::Str("PayPal".into()), 2),
            ]
        );

        let text = report.to_string();
        assert!(text.starts_with("First 5 rows:"));
        assert!(text.contains("6 rows, 15 columns:"));
        assert!(text.contains("Value counts for 'Experience_Level':"));
        let expert = text
            .lines()
            .find(|l| l.starts_with("Expert"))
            .unwrap();
        assert_eq!(expert.split_whitespace().collect::<Vec<_>>(), ["Expert", "3"]);
    }

    #[test]
    fn test_head_is_capped_by_row_count() {
        let report = dataset_overview(&sample_table(), 50).unwrap();
        assert_eq!(report.head.len(), 6);
    }

    #[test]
    fn test_empty_table() {
        let err = dataset_overview(&ColumnarProcessor::new(), 5).unwrap_err();
        assert!(matches!(err, AnalysisError::NoData));
    }
}
