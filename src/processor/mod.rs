use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::str::FromStr;
use thiserror::Error;

pub mod column;
pub mod columnar_processor;
pub mod schema;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema/parse error: {0}")]
    Parse(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("Cannot compare column '{column}' with value '{value}'")]
    IncomparableTypes { column: String, value: Value },
}

#[derive(Debug, Default)]
pub struct ParseSummary {
    pub rows_processed: usize,
    pub errors: Vec<ParseError>,
}

/// A row that was skipped during loading
#[derive(Debug)]
pub struct ParseError {
    /// 1-based line number in the source file
    pub line: usize,
    pub column: String,
    pub value: String,
    pub error: Option<String>,
}

/// Per-chunk output of the parallel CSV parser
#[derive(Debug, Default)]
pub(crate) struct BatchResult {
    pub int64_batches: Vec<Vec<i64>>,
    pub float64_batches: Vec<Vec<f64>>,
    pub str_batches: Vec<Vec<String>>,
    pub row_count: usize,
    /// Number of lines consumed by the chunk, including skipped ones
    pub line_count: usize,
    pub errors: Vec<ParseError>,
}

/// Cell or literal value (owned for simplicity)
#[derive(Debug, Clone)]
pub enum Value {
    /// Integer column
    Int(i64),
    /// Float column
    Float(f64),
    /// Categorical column
    Str(String),
}

impl Value {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Str(_) => None,
        }
    }

    /// Ordering between two values; `None` when one side is a string and the
    /// other a number.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }

    /// Total order used to sort group keys
    pub(crate) fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Str(_), _) => Ordering::Greater,
            (_, Value::Str(_)) => Ordering::Less,
            _ => {
                let (a, b) = (self.as_f64().unwrap_or(f64::NAN), other.as_f64().unwrap_or(f64::NAN));
                a.total_cmp(&b)
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Int(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Str(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            // keeps the decimal point on integral floats: 45.0, not 45
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Str(v) => f.write_str(v),
        }
    }
}

/// Comparison operators accepted in requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Gt,
    Eq,
    Ne,
    Le,
    Ge,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
        }
    }

    pub fn predicate(self, value: Value) -> FilterPredicate {
        match self {
            CompareOp::Lt => FilterPredicate::LessThan(value),
            CompareOp::Gt => FilterPredicate::GreaterThan(value),
            CompareOp::Eq => FilterPredicate::Equals(value),
            CompareOp::Ne => FilterPredicate::NotEquals(value),
            CompareOp::Le => FilterPredicate::LessOrEqual(value),
            CompareOp::Ge => FilterPredicate::GreaterOrEqual(value),
        }
    }
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(CompareOp::Lt),
            ">" => Ok(CompareOp::Gt),
            "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            "<=" => Ok(CompareOp::Le),
            ">=" => Ok(CompareOp::Ge),
            other => Err(other.to_string()),
        }
    }
}

/// Filter predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterPredicate {
    Equals(Value),
    NotEquals(Value),
    GreaterThan(Value),
    GreaterOrEqual(Value),
    LessThan(Value),
    LessOrEqual(Value),
}

impl FilterPredicate {
    pub fn value(&self) -> &Value {
        match self {
            FilterPredicate::Equals(v)
            | FilterPredicate::NotEquals(v)
            | FilterPredicate::GreaterThan(v)
            | FilterPredicate::GreaterOrEqual(v)
            | FilterPredicate::LessThan(v)
            | FilterPredicate::LessOrEqual(v) => v,
        }
    }

    pub(crate) fn is_ordering(&self) -> bool {
        !matches!(
            self,
            FilterPredicate::Equals(_) | FilterPredicate::NotEquals(_)
        )
    }

    /// Evaluates the predicate against one cell. Equality across a string
    /// and a number is false; ordering across them never matches (callers
    /// reject that combination up front).
    pub fn matches(&self, cell: &Value) -> bool {
        let ord = cell.compare(self.value());
        match self {
            FilterPredicate::Equals(_) => ord == Some(Ordering::Equal),
            FilterPredicate::NotEquals(_) => ord != Some(Ordering::Equal),
            FilterPredicate::GreaterThan(_) => ord == Some(Ordering::Greater),
            FilterPredicate::GreaterOrEqual(_) => {
                matches!(ord, Some(Ordering::Greater | Ordering::Equal))
            }
            FilterPredicate::LessThan(_) => ord == Some(Ordering::Less),
            FilterPredicate::LessOrEqual(_) => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

/// Aggregate operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    /// Arithmetic mean
    Mean,
    /// Median (average of the two middle values for even counts)
    Median,
    /// Sum of all numeric values
    Sum,
    /// Count of all rows
    Count,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// Sample standard deviation
    Std,
}

impl AggregateOp {
    pub const ALL: [AggregateOp; 7] = [
        AggregateOp::Mean,
        AggregateOp::Median,
        AggregateOp::Sum,
        AggregateOp::Count,
        AggregateOp::Min,
        AggregateOp::Max,
        AggregateOp::Std,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AggregateOp::Mean => "mean",
            AggregateOp::Median => "median",
            AggregateOp::Sum => "sum",
            AggregateOp::Count => "count",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
            AggregateOp::Std => "std",
        }
    }
}

impl FromStr for AggregateOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregateOp::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of an aggregation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateResult {
    Int(i64),
    Float(f64),
}

impl AggregateResult {
    pub fn as_f64(&self) -> f64 {
        match self {
            AggregateResult::Int(v) => *v as f64,
            AggregateResult::Float(v) => *v,
        }
    }
}

/// Output of [`columnar_processor::ColumnarProcessor::describe`]. Every
/// statistic except `count` is `None` over zero rows; `std` also needs two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}
