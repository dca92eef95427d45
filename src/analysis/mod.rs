//! The four analytic operations over a loaded [`ColumnarProcessor`].
//!
//! Every operation validates its column names and values against the live
//! table before computing and returns either a structured [`Report`] or an
//! [`AnalysisError`] whose `Display` text is meant for the end user. None of
//! them panics on bad input.

use thiserror::Error;

use crate::processor::{ProcessorError, Value, columnar_processor::ColumnarProcessor};

pub mod compare;
pub mod describe;
pub mod format;
pub mod group;
pub mod overview;
pub mod percentage;
pub mod report;

pub use compare::compare_average;
pub use describe::get_descriptive_stats;
pub use group::group_by_aggregate;
pub use overview::{OverviewReport, dataset_overview};
pub use percentage::filter_and_calculate_percentage;
pub use report::Report;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No data loaded.")]
    NoData,

    #[error("Error: column '{0}' not found in the data.")]
    ColumnNotFound(String),

    #[error("Error: value '{value}' not found in column '{column}'.")]
    ValueNotFound { column: String, value: Value },

    #[error("Insufficient data to compare one of the groups.")]
    InsufficientData,

    #[error(
        "Error: no valid aggregation requested (allowed: mean, median, sum, count, min, max, std)."
    )]
    NoValidAggregation,

    #[error("No data for base filter: '{column}' = '{value}'.")]
    NoBaseFilterData { column: String, value: Value },

    #[error("Error: cannot convert value '{0}' to a number.")]
    NotANumber(String),

    #[error("Error: unknown operator '{0}'.")]
    UnknownOperator(String),

    #[error("Error: column '{0}' is not numeric.")]
    NotNumeric(String),

    #[error("Error: {0}")]
    Processor(ProcessorError),
}

impl From<ProcessorError> for AnalysisError {
    fn from(err: ProcessorError) -> Self {
        match err {
            ProcessorError::MissingColumn(column) => AnalysisError::ColumnNotFound(column),
            ProcessorError::NotNumeric(column) => AnalysisError::NotNumeric(column),
            other => AnalysisError::Processor(other),
        }
    }
}

fn ensure_loaded(table: &ColumnarProcessor) -> Result<(), AnalysisError> {
    if table.is_empty() {
        return Err(AnalysisError::NoData);
    }
    Ok(())
}

/// Fails on the first name missing from the table
fn require_columns(table: &ColumnarProcessor, columns: &[&str]) -> Result<(), AnalysisError> {
    match columns.iter().find(|c| !table.column_exists(c)) {
        Some(missing) => Err(AnalysisError::ColumnNotFound(missing.to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::processor::columnar_processor::ColumnarProcessor;

    pub const HEADER: &str = "Freelancer_ID,Job_Category,Platform,Experience_Level,Client_Region,Payment_Method,Job_Completed,Earnings_USD,Hourly_Rate,Job_Success_Rate,Client_Rating,Job_Duration_Days,Project_Type,Rehire_Rate,Marketing_Spend";

    pub const ROWS: [&str; 6] = [
        "1,Web Development,Upwork,Expert,USA,Crypto,120,6000,50.5,90.0,4.5,10,Fixed-Price,40.0,100",
        "2,Writing,Fiverr,Beginner,Asia,PayPal,20,1000,15.0,70.0,3.9,5,Hourly,10.0,0",
        "3,SEO,Upwork,Expert,Europe,Crypto,80,4000,45.0,85.5,4.8,12,Hourly,35.5,250",
        "4,Data Entry,Toptal,Intermediate,UK,Bank Transfer,60,3000,25.0,80.0,4.1,7,Fixed-Price,20.0,50",
        "5,Writing,Fiverr,Expert,USA,PayPal,150,2000,30.0,95.0,4.9,9,Hourly,50.0,300",
        "6,SEO,Guru,Beginner,Asia,Bank Transfer,10,3000,12.5,60.0,3.5,3,Fixed-Price,5.0,10",
    ];

    pub fn sample_table() -> ColumnarProcessor {
        table_from_rows(&ROWS)
    }

    pub fn table_from_rows(rows: &[&str]) -> ColumnarProcessor {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "{HEADER}").unwrap();
        for row in rows {
            writeln!(tmp, "{row}").unwrap();
        }
        let mut processor = ColumnarProcessor::new();
        processor.load_csv(tmp.path()).unwrap();
        processor
    }
}
