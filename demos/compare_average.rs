use crate::utils::sample_dataset;
use freelance_analyzer::analysis::compare_average;
use freelance_analyzer::processor::{Value, columnar_processor::ColumnarProcessor};
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data = sample_dataset(10_000)?;

    let mut processor = ColumnarProcessor::new();
    let summary = processor.load_csv(data.path())?;
    println!("Loaded {} rows\n", summary.rows_processed);

    // Crypto earners against everyone else
    let report = compare_average(
        &processor,
        "Earnings_USD",
        "Payment_Method",
        &Value::Str("Crypto".into()),
    )?;
    println!("{report}");

    Ok(())
}
