//! # freelance_analyzer
//!
//! Answers natural-language questions about a freelancer earnings dataset.
//! A language model translates each question into a small JSON request,
//! and the request is executed by one of four fixed analytic operations
//! over an in-memory columnar table:
//!
//! - Memory-mapped CSV loading, parsed in parallel chunks with Rayon
//! - Fixed schema: integer, float and string columns
//! - Filtering, aggregation (mean, median, sum, count, min, max, std),
//!   group-by and describe-style summaries
//! - A dispatcher that never panics: every failure comes back as text
//!
//! # Example
//!
//! ```rust,no_run
//! use freelance_analyzer::dispatch::Dispatcher;
//! use freelance_analyzer::processor::columnar_processor::ColumnarProcessor;
//! use serde_json::json;
//! use std::path::Path;
//!
//! let table = ColumnarProcessor::load_or_empty(Path::new("data/freelancer_earnings.csv"));
//! let dispatcher = Dispatcher::new(table);
//!
//! let report = dispatcher.execute_json(&json!({
//!     "operation_type": "compare_average",
//!     "parameters": {
//!         "measure_column": "Earnings_USD",
//!         "category_column": "Payment_Method",
//!         "target_value": "Crypto"
//!     }
//! }));
//! println!("{report}");
//! ```

mod helpers;

pub mod analysis;
pub mod dispatch;
pub mod llm;
pub mod processor;
pub mod shell;
