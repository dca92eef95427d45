use std::fmt;

use crate::analysis::format::{aggregate_cell, float_cell, render_table, with_thousands};
use crate::processor::{AggregateOp, AggregateResult, CompareOp, Describe, Value};

/// Structured result of one operation; `Display` gives the user-facing text
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    CompareAverage(CompareAverageReport),
    GroupAggregate(GroupAggregateReport),
    Percentage(PercentageReport),
    DescriptiveStats(DescriptiveStatsReport),
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::CompareAverage(r) => fmt::Display::fmt(r, f),
            Report::GroupAggregate(r) => fmt::Display::fmt(r, f),
            Report::Percentage(r) => fmt::Display::fmt(r, f),
            Report::DescriptiveStats(r) => fmt::Display::fmt(r, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareAverageReport {
    pub measure_column: String,
    pub category_column: String,
    pub target_value: Value,
    pub target_mean: f64,
    pub other_mean: f64,
}

impl CompareAverageReport {
    /// Target mean minus the mean of every other row
    pub fn difference(&self) -> f64 {
        self.target_mean - self.other_mean
    }

    /// Difference relative to the other mean, in percent. Only defined when
    /// the other mean is strictly positive.
    pub fn percentage_difference(&self) -> Option<f64> {
        (self.other_mean > 0.0).then(|| self.difference() / self.other_mean * 100.0)
    }
}

impl fmt::Display for CompareAverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Mean of '{}' where '{}' = '{}': {}",
            self.measure_column,
            self.category_column,
            self.target_value,
            with_thousands(self.target_mean)
        )?;
        writeln!(
            f,
            "Mean of '{}' for all other values of '{}': {}",
            self.measure_column,
            self.category_column,
            with_thousands(self.other_mean)
        )?;

        let Some(pct) = self.percentage_difference() else {
            return write!(
                f,
                "Percentage difference cannot be computed: the mean for other values is zero or negative."
            );
        };

        let diff = self.difference();
        let sign = if diff > 0.0 { "+" } else { "" };
        let verdict = if diff > 0.0 {
            format!("'{}' is higher on average", self.target_value)
        } else if diff < 0.0 {
            format!("'{}' is lower on average", self.target_value)
        } else {
            "the averages are equal".to_string()
        };
        write!(
            f,
            "Difference: {sign}{} ({sign}{pct:.2}%), {verdict}.",
            with_thousands(diff)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregateReport {
    pub group_by_column: String,
    pub aggregate_column: String,
    pub aggregations: Vec<AggregateOp>,
    /// One row per distinct group value; results follow `aggregations`
    pub rows: Vec<(Value, Vec<Option<AggregateResult>>)>,
}

impl fmt::Display for GroupAggregateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = std::iter::once(self.group_by_column.clone())
            .chain(self.aggregations.iter().map(|op| op.to_string()))
            .collect();
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|(key, results)| {
                std::iter::once(key.to_string())
                    .chain(results.iter().map(|r| aggregate_cell(*r)))
                    .collect()
            })
            .collect();

        writeln!(
            f,
            "Aggregated '{}' by groups of '{}':",
            self.aggregate_column, self.group_by_column
        )?;
        f.write_str(&render_table(&header, &rows))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PercentageReport {
    pub base_filter_column: String,
    pub base_filter_value: Value,
    pub condition_column: String,
    pub condition_operator: CompareOp,
    pub condition_value: Value,
    /// Rows of the base group satisfying the condition
    pub matched: usize,
    /// Rows of the base group; never zero
    pub total: usize,
}

impl PercentageReport {
    pub fn percentage(&self) -> f64 {
        100.0 * self.matched as f64 / self.total as f64
    }
}

impl fmt::Display for PercentageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Out of {} records where '{}' = '{}', {} satisfy the condition '{} {} {}'. That is {:.2}%.",
            self.total,
            self.base_filter_column,
            self.base_filter_value,
            self.matched,
            self.condition_column,
            self.condition_operator.symbol(),
            self.condition_value,
            self.percentage()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DescriptiveStats {
    Overall(Describe),
    Grouped {
        group_by_column: String,
        groups: Vec<(Value, Describe)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStatsReport {
    pub column: String,
    pub stats: DescriptiveStats,
}

pub(crate) const STAT_NAMES: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

pub(crate) fn stat_cells(d: &Describe) -> Vec<String> {
    std::iter::once(d.count.to_string())
        .chain(
            [d.mean, d.std, d.min, d.p25, d.p50, d.p75, d.max]
                .into_iter()
                .map(float_cell),
        )
        .collect()
}

impl fmt::Display for DescriptiveStatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stats {
            DescriptiveStats::Overall(d) => {
                writeln!(f, "Descriptive statistics for '{}':", self.column)?;
                let rows: Vec<Vec<String>> = STAT_NAMES
                    .iter()
                    .zip(stat_cells(d))
                    .map(|(name, cell)| vec![name.to_string(), cell])
                    .collect();
                f.write_str(&render_table(&["".to_string(), self.column.clone()], &rows))
            }
            DescriptiveStats::Grouped {
                group_by_column,
                groups,
            } => {
                writeln!(
                    f,
                    "Descriptive statistics for '{}' grouped by '{}':",
                    self.column, group_by_column
                )?;
                let header: Vec<String> = std::iter::once(group_by_column.clone())
                    .chain(STAT_NAMES.iter().map(|s| s.to_string()))
                    .collect();
                let rows: Vec<Vec<String>> = groups
                    .iter()
                    .map(|(key, d)| std::iter::once(key.to_string()).chain(stat_cells(d)).collect())
                    .collect();
                f.write_str(&render_table(&header, &rows))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compare(target_mean: f64, other_mean: f64) -> CompareAverageReport {
        CompareAverageReport {
            measure_column: "Earnings_USD".into(),
            category_column: "Payment_Method".into(),
            target_value: Value::Str("Crypto".into()),
            target_mean,
            other_mean,
        }
    }

    #[test]
    fn test_compare_text_higher() {
        let text = compare(5000.0, 2250.0).to_string();
        assert!(text.contains("= 'Crypto': 5,000.00"));
        assert!(text.contains("Difference: +2,750.00 (+122.22%)"));
        assert!(text.contains("higher on average"));
    }

    #[test]
    fn test_compare_text_lower_and_zero_other() {
        let lower = compare(1000.0, 2000.0).to_string();
        assert!(lower.contains("Difference: -1,000.00 (-50.00%)"));

        let zero = compare(10.0, 0.0);
        assert_eq!(zero.percentage_difference(), None);
        assert!(zero.to_string().contains("cannot be computed"));
    }

    #[test]
    fn test_percentage_text() {
        let report = PercentageReport {
            base_filter_column: "Experience_Level".into(),
            base_filter_value: Value::Str("Expert".into()),
            condition_column: "Job_Completed".into(),
            condition_operator: CompareOp::Lt,
            condition_value: Value::Int(100),
            matched: 1,
            total: 3,
        };
        assert_eq!(
            report.to_string(),
            "Out of 3 records where 'Experience_Level' = 'Expert', 1 satisfy the condition 'Job_Completed < 100'. That is 33.33%."
        );
    }
}
