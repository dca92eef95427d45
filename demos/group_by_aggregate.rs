use crate::utils::sample_dataset;
use freelance_analyzer::dispatch::Dispatcher;
use freelance_analyzer::processor::columnar_processor::ColumnarProcessor;
use serde_json::json;
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data = sample_dataset(10_000)?;
    let dispatcher = Dispatcher::new(ColumnarProcessor::load_or_empty(data.path()));

    // Same request shape the language model produces
    let request = json!({
        "operation_type": "group_by_aggregate",
        "parameters": {
            "group_by_column": "Client_Region",
            "aggregate_column": "Hourly_Rate",
            "aggregations": ["mean", "median", "std", "count"]
        }
    });
    println!("{}", dispatcher.execute_json(&request));

    Ok(())
}
