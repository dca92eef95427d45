//! The fixed column layout of the freelancer earnings dataset.

use crate::processor::column::ColumnType;

pub const FREELANCER_SCHEMA: [(&str, ColumnType); 15] = [
    ("Freelancer_ID", ColumnType::Int64),
    ("Job_Category", ColumnType::Str),
    ("Platform", ColumnType::Str),
    ("Experience_Level", ColumnType::Str),
    ("Client_Region", ColumnType::Str),
    ("Payment_Method", ColumnType::Str),
    ("Job_Completed", ColumnType::Int64),
    ("Earnings_USD", ColumnType::Int64),
    ("Hourly_Rate", ColumnType::Float64),
    ("Job_Success_Rate", ColumnType::Float64),
    ("Client_Rating", ColumnType::Float64),
    ("Job_Duration_Days", ColumnType::Int64),
    ("Project_Type", ColumnType::Str),
    ("Rehire_Rate", ColumnType::Float64),
    ("Marketing_Spend", ColumnType::Int64),
];

/// Type of a header column. Anything outside the fixed schema is loaded as
/// categorical.
pub fn column_type_for(header: &str) -> ColumnType {
    FREELANCER_SCHEMA
        .iter()
        .find(|(name, _)| *name == header)
        .map(|(_, col_type)| *col_type)
        .unwrap_or(ColumnType::Str)
}
