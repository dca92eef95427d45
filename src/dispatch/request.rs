use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use thiserror::Error;

use crate::analysis::group::DEFAULT_AGGREGATIONS;
use crate::processor::Value;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request is not a JSON object")]
    NotAnObject,

    #[error("request has no 'operation_type'")]
    MissingOperationType,

    #[error("unknown operation type: {0}")]
    UnknownOperation(String),

    #[error("'{0}' request has no 'parameters' object")]
    MissingParameters(String),

    #[error("invalid parameters for '{operation}': {source}")]
    InvalidParameters {
        operation: String,
        source: serde_json::Error,
    },
}

/// A scalar parameter as it arrives in JSON
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Int(v) => Value::Int(*v),
            Literal::Float(v) => Value::Float(*v),
            Literal::Bool(v) => Value::Int(i64::from(*v)),
            Literal::Str(v) => Value::Str(v.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompareAverageParams {
    pub measure_column: String,
    pub category_column: String,
    #[serde(alias = "target_category_value")]
    pub target_value: Literal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupByAggregateParams {
    pub group_by_column: String,
    pub aggregate_column: String,
    #[serde(default)]
    pub aggregations: Option<Vec<String>>,
}

impl GroupByAggregateParams {
    /// Requested aggregation names, or mean/median/count/sum when absent
    pub fn aggregation_names(&self) -> Vec<&str> {
        match &self.aggregations {
            Some(names) => names.iter().map(String::as_str).collect(),
            None => DEFAULT_AGGREGATIONS.iter().map(|op| op.name()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PercentageParams {
    pub base_filter_column: String,
    pub base_filter_value: Literal,
    pub condition_column: String,
    pub condition_operator: String,
    pub condition_value: Literal,
    #[serde(default)]
    pub value_is_numeric: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DescriptiveStatsParams {
    pub column_name: String,
    #[serde(default)]
    pub group_by_column: Option<String>,
}

/// One analytic request, as produced by the language model
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    CompareAverage(CompareAverageParams),
    GroupByAggregate(GroupByAggregateParams),
    FilterAndCalculatePercentage(PercentageParams),
    GetDescriptiveStats(DescriptiveStatsParams),
    /// The request source gave up; carries its explanation if any
    Error { message: Option<String> },
}

impl Request {
    pub fn operation_type(&self) -> &'static str {
        match self {
            Request::CompareAverage(_) => "compare_average",
            Request::GroupByAggregate(_) => "group_by_aggregate",
            Request::FilterAndCalculatePercentage(_) => "filter_and_calculate_percentage",
            Request::GetDescriptiveStats(_) => "get_descriptive_stats",
            Request::Error { .. } => "error",
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, RequestError> {
        let value: Json = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    /// Decodes `{"operation_type": ..., "parameters": {...}}`
    ///
    /// The `error` tag takes its message from a top-level `message` or from
    /// `parameters.message`.
    pub fn from_json(value: &Json) -> Result<Self, RequestError> {
        let obj = value.as_object().ok_or(RequestError::NotAnObject)?;
        let operation = match obj.get("operation_type") {
            Some(Json::String(tag)) => tag.as_str(),
            // a tag of any other JSON type can never name an operation
            Some(other) => return Err(RequestError::UnknownOperation(other.to_string())),
            None => return Err(RequestError::MissingOperationType),
        };
        let params = obj.get("parameters");

        match operation {
            "compare_average" => Ok(Request::CompareAverage(decode(operation, params)?)),
            "group_by_aggregate" => Ok(Request::GroupByAggregate(decode(operation, params)?)),
            "filter_and_calculate_percentage" => Ok(Request::FilterAndCalculatePercentage(
                decode(operation, params)?,
            )),
            "get_descriptive_stats" => Ok(Request::GetDescriptiveStats(decode(operation, params)?)),
            "error" => {
                let message = obj
                    .get("message")
                    .or_else(|| params.and_then(|p| p.get("message")))
                    .and_then(Json::as_str)
                    .map(str::to_string);
                Ok(Request::Error { message })
            }
            other => Err(RequestError::UnknownOperation(other.to_string())),
        }
    }
}

fn decode<T: DeserializeOwned>(operation: &str, params: Option<&Json>) -> Result<T, RequestError> {
    let params = params
        .filter(|p| p.is_object())
        .ok_or_else(|| RequestError::MissingParameters(operation.to_string()))?;

    T::deserialize(params).map_err(|source| RequestError::InvalidParameters {
        operation: operation.to_string(),
        source,
    })
}
