use std::panic::{self, AssertUnwindSafe};

use log::{debug, warn};
use serde_json::Value as Json;
use thiserror::Error;

use crate::analysis::{
    AnalysisError, Report, compare_average, filter_and_calculate_percentage,
    get_descriptive_stats, group_by_aggregate,
};
use crate::dispatch::request::{Request, RequestError};
use crate::processor::{Value, columnar_processor::ColumnarProcessor};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(
        "The language model could not process the request: {}",
        .0.as_deref().unwrap_or("no details")
    )]
    Upstream(Option<String>),

    #[error("Unknown operation type: {0}")]
    UnknownOperation(String),

    #[error("Request could not be processed: {0}")]
    Malformed(RequestError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl From<RequestError> for DispatchError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::UnknownOperation(op) => DispatchError::UnknownOperation(op),
            other => DispatchError::Malformed(other),
        }
    }
}

/// Executes requests against one immutable table
///
/// The dispatcher owns the table for its whole lifetime; requests never
/// mutate it, so executing the same request twice yields the same report.
#[derive(Debug, Default)]
pub struct Dispatcher {
    table: ColumnarProcessor,
}

impl Dispatcher {
    pub fn new(table: ColumnarProcessor) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ColumnarProcessor {
        &self.table
    }

    /// Structured result of a typed request
    pub fn run(&self, request: &Request) -> Result<Report, DispatchError> {
        debug!("dispatching {}", request.operation_type());

        let table = &self.table;
        let report = match request {
            Request::CompareAverage(p) => compare_average(
                table,
                &p.measure_column,
                &p.category_column,
                &Value::from(&p.target_value),
            ),
            Request::GroupByAggregate(p) => group_by_aggregate(
                table,
                &p.group_by_column,
                &p.aggregate_column,
                &p.aggregation_names(),
            ),
            Request::FilterAndCalculatePercentage(p) => filter_and_calculate_percentage(
                table,
                &p.base_filter_column,
                &Value::from(&p.base_filter_value),
                &p.condition_column,
                &p.condition_operator,
                &Value::from(&p.condition_value),
                p.value_is_numeric,
            ),
            Request::GetDescriptiveStats(p) => {
                get_descriptive_stats(table, &p.column_name, p.group_by_column.as_deref())
            }
            Request::Error { message } => return Err(DispatchError::Upstream(message.clone())),
        };

        report.map_err(DispatchError::from)
    }

    /// Report text of a typed request; failures become their message
    pub fn execute(&self, request: &Request) -> String {
        match self.run(request) {
            Ok(report) => report.to_string(),
            Err(err) => err.to_string(),
        }
    }

    /// Report text of a raw JSON request
    ///
    /// This is the one place where every failure is turned into text:
    /// decoding errors, unknown operations, and even a panic further down
    /// come back as a message instead of unwinding into the caller.
    pub fn execute_json(&self, raw: &Json) -> String {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            Request::from_json(raw)
                .map_err(DispatchError::from)
                .and_then(|request| self.run(&request))
        }));

        match outcome {
            Ok(Ok(report)) => report.to_string(),
            Ok(Err(err)) => {
                if matches!(err, DispatchError::Malformed(_) | DispatchError::UnknownOperation(_)) {
                    warn!("rejected request: {err}");
                }
                err.to_string()
            }
            Err(_) => {
                warn!("request handling panicked");
                "Request could not be processed: internal error".to_string()
            }
        }
    }
}

impl From<ColumnarProcessor> for Dispatcher {
    fn from(table: ColumnarProcessor) -> Self {
        Self::new(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::sample_table;
    use serde_json::json;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(sample_table())
    }

    #[test]
    fn test_unknown_operation_never_raises() {
        let d = dispatcher();
        for op in ["pivot", "", "COMPARE_AVERAGE", "drop_table"] {
            let text = d.execute_json(&json!({"operation_type": op, "parameters": {}}));
            assert_eq!(text, format!("Unknown operation type: {op}"));
        }
    }

    #[test]
    fn test_malformed_shapes() {
        let d = dispatcher();
        let text = d.execute_json(&json!({"operation_type": "get_descriptive_stats"}));
        assert!(text.starts_with("Request could not be processed:"));

        let text = d.execute_json(&json!("just a string"));
        assert!(text.starts_with("Request could not be processed:"));
    }

    #[test]
    fn test_upstream_error_is_forwarded() {
        let d = dispatcher();
        let text = d.execute_json(&json!({"operation_type": "error", "message": "Cannot process"}));
        assert_eq!(
            text,
            "The language model could not process the request: Cannot process"
        );

        let text = d.execute_json(&json!({"operation_type": "error"}));
        assert!(text.ends_with("no details"));
    }

    #[test]
    fn test_execute_is_idempotent() {
        let d = dispatcher();
        let requests = [
            json!({"operation_type": "compare_average", "parameters": {
                "measure_column": "Earnings_USD", "category_column": "Payment_Method",
                "target_category_value": "Crypto"}}),
            json!({"operation_type": "group_by_aggregate", "parameters": {
                "group_by_column": "Client_Region", "aggregate_column": "Earnings_USD"}}),
            json!({"operation_type": "filter_and_calculate_percentage", "parameters": {
                "base_filter_column": "Experience_Level", "base_filter_value": "Expert",
                "condition_column": "Job_Completed", "condition_operator": "<",
                "condition_value": 100, "value_is_numeric": true}}),
            json!({"operation_type": "get_descriptive_stats", "parameters": {
                "column_name": "Earnings_USD", "group_by_column": "Job_Category"}}),
        ];

        for raw in &requests {
            let request = Request::from_json(raw).unwrap();
            let first = d.execute(&request);
            assert_eq!(first, d.execute(&request));
            assert_eq!(first, d.execute_json(raw));
            assert!(d.run(&request).is_ok(), "{first}");
        }
    }

    #[test]
    fn test_empty_table_reports_no_data() {
        let d = Dispatcher::default();
        let text = d.execute_json(&json!({"operation_type": "compare_average", "parameters": {
            "measure_column": "Earnings_USD", "category_column": "Payment_Method",
            "target_value": "Crypto"}}));
        assert_eq!(text, "No data loaded.");
    }
}
