//! Number and table layout shared by the report types.

use num_format::{Locale, ToFormattedString};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Modify, Padding, Style,
        object::{Columns, Segment},
    },
};

use crate::processor::AggregateResult;

/// `1234567.891` -> `1,234,567.89`
pub fn with_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    let grouped = match int_part.parse::<u64>() {
        Ok(n) => n.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };

    let negative = value < 0.0 && fixed.bytes().any(|b| b != b'0' && b != b'.');
    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

pub fn float_cell(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"))
}

pub fn aggregate_cell(value: Option<AggregateResult>) -> String {
    match value {
        Some(AggregateResult::Int(v)) => v.to_string(),
        Some(AggregateResult::Float(v)) => format!("{v:.2}"),
        None => "NaN".to_string(),
    }
}

/// Borderless text table: first column left-aligned, the rest right-aligned
/// and separated by two spaces.
pub fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(header.iter().cloned());
    for row in rows {
        builder.push_record(row.iter().cloned());
    }

    let mut table = builder.build();
    table
        .with(Style::empty())
        .with(Modify::new(Segment::all()).with(Padding::new(0, 0, 0, 0)))
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .with(
            Modify::new(Columns::new(1..))
                .with(Alignment::right())
                .with(Padding::new(2, 0, 0, 0)),
        );

    table
        .to_string()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(1234567.891), "1,234,567.89");
        assert_eq!(with_thousands(999.0), "999.00");
        assert_eq!(with_thousands(999.999), "1,000.00");
        assert_eq!(with_thousands(-1500.5), "-1,500.50");
        assert_eq!(with_thousands(-0.001), "0.00");
    }

    #[test]
    fn test_cells() {
        assert_eq!(float_cell(None), "NaN");
        assert_eq!(aggregate_cell(Some(AggregateResult::Int(42))), "42");
        assert_eq!(aggregate_cell(Some(AggregateResult::Float(2.5))), "2.50");
    }

    #[test]
    fn test_render_table_alignment() {
        let header = vec!["Region".to_string(), "mean".to_string()];
        let rows = vec![
            vec!["Asia".to_string(), "10.00".to_string()],
            vec!["Middle East".to_string(), "5.50".to_string()],
        ];
        let table = render_table(&header, &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Region") && lines[0].ends_with("mean"));
        assert!(lines[1].starts_with("Asia") && lines[1].ends_with("10.00"));
        assert!(lines[2].starts_with("Middle East") && lines[2].ends_with(" 5.50"));
        // right-aligned value column: every line has the same width
        assert!(lines.iter().all(|l| l.chars().count() == lines[1].chars().count()));
    }
}
