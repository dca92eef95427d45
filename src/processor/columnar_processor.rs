use log::{error, info, warn};
use memchr::{memchr, memchr_iter};
use memmap2::Mmap;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use std::{borrow::Cow, collections::HashMap, fs::File, path::Path};

use crate::{
    helpers::stats,
    processor::{
        AggregateOp, AggregateResult, BatchResult, Describe, FilterPredicate, ParseError,
        ParseSummary, ProcessorError, Value,
        column::{Column, ColumnType},
        schema::column_type_for,
    },
};

/// Rows of one group: the distinct key and the row indices carrying it
pub type Group = (Value, Vec<usize>);

/// In-memory columnar table of the freelancer dataset
///
/// Loaded once from CSV and read-only afterwards. An unloaded processor is
/// an empty table: zero rows and no columns.
///
/// # Examples
///
/// ```rust,no_run
/// # use freelance_analyzer::processor::{AggregateOp, columnar_processor::ColumnarProcessor};
/// let processor = ColumnarProcessor::load_or_empty("data.csv".as_ref());
/// let mean = processor.aggregate("Earnings_USD", AggregateOp::Mean).unwrap();
/// println!("Mean: {:?}", mean);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ColumnarProcessor {
    columns: Vec<Column>, // one per header, same order
    row_count: usize,
    headers: Vec<String>,
}

impl ColumnarProcessor {
    /// Create an empty processor
    pub fn new() -> Self {
        ColumnarProcessor {
            columns: Vec::new(),
            row_count: 0,
            headers: Vec::new(),
        }
    }

    /// Loads `path`, falling back to an empty table on any I/O or parse
    /// failure. A single malformed row discards the whole file; use
    /// [`load_csv`](Self::load_csv) to keep the rows that did parse.
    pub fn load_or_empty(path: &Path) -> Self {
        let mut processor = Self::new();
        match processor.load_csv(path) {
            Ok(summary) if summary.errors.is_empty() => processor,
            Ok(summary) => {
                error!(
                    "failed to load {}: {} malformed rows, first at line {}",
                    path.display(),
                    summary.errors.len(),
                    summary.errors[0].line
                );
                Self::new()
            }
            Err(e) => {
                error!("failed to load {}: {e}", path.display());
                Self::new()
            }
        }
    }

    /// Loads a CSV file into memory using memory mapping
    ///
    /// Column types come from the fixed freelancer schema; header columns
    /// outside it are loaded as categorical. Rows are parsed in parallel
    /// chunks. A row with the wrong field count or an unparsable numeric
    /// field is skipped and reported in the returned [`ParseSummary`].
    ///
    /// # Errors
    /// Returns a [`ProcessorError`] if:
    /// - File cannot be opened or mapped
    /// - The file is empty or has no header line
    ///
    /// On error the processor is left unchanged.
    pub fn load_csv(&mut self, path: &Path) -> Result<ParseSummary, ProcessorError> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(ProcessorError::Parse("Empty file".into()));
        }
        let mmap = unsafe { Mmap::map(&file)? };
        let buf: &[u8] = &mmap[..];
        let buf = buf.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(buf);

        // Parse header
        let header_end = memchr(b'\n', buf).unwrap_or(buf.len());
        let header_line = trim_line_end(&buf[..header_end]);
        if header_line.trim_ascii().is_empty() {
            return Err(ProcessorError::Parse("Missing header line".into()));
        }
        let mut header_fields = Vec::new();
        split_fields(header_line, &mut header_fields);
        let headers: Vec<String> = header_fields
            .iter()
            .map(|f| String::from_utf8_lossy(f).trim().to_string())
            .collect();
        let schema: Vec<ColumnType> = headers.iter().map(|h| column_type_for(h)).collect();

        let data = buf.get(header_end + 1..).unwrap_or_default();

        let avg_line_len = memchr(b'\n', data).map_or(data.len(), |pos| pos + 1).max(1);
        let num_threads = rayon::current_num_threads();
        let chunks = Self::find_chunk_boundaries(data, num_threads);

        let batch_results: Vec<BatchResult> = chunks
            .par_iter()
            .map(|(start, end)| {
                Self::parse_chunk(&data[*start..*end], &schema, &headers, avg_line_len)
            })
            .collect();

        // Merge batch results into columns
        let mut columns: Vec<Column> = schema.iter().map(|t| Column::new(*t)).collect();
        let mut total_rows = 0;
        let mut all_errors = Vec::new();
        let mut line_base = 1; // header line

        for mut batch in batch_results {
            for mut err in std::mem::take(&mut batch.errors) {
                err.line += line_base;
                all_errors.push(err);
            }

            for (col_idx, column) in columns.iter_mut().enumerate() {
                column.append_batch(
                    &mut batch.int64_batches[col_idx],
                    &mut batch.float64_batches[col_idx],
                    &mut batch.str_batches[col_idx],
                );
            }

            total_rows += batch.row_count;
            line_base += batch.line_count;
        }

        for err in &all_errors {
            warn!(
                "line {}: column '{}' value '{}' skipped: {}",
                err.line,
                err.column,
                err.value,
                err.error.as_deref().unwrap_or("malformed row")
            );
        }
        info!(
            "loaded {} rows, {} columns from {}",
            total_rows,
            headers.len(),
            path.display()
        );

        self.columns = columns;
        self.headers = headers;
        self.row_count = total_rows;

        Ok(ParseSummary {
            rows_processed: total_rows,
            errors: all_errors,
        })
    }

    fn find_chunk_boundaries(data: &[u8], num_chunks: usize) -> Vec<(usize, usize)> {
        if data.is_empty() {
            return vec![];
        }

        let num_chunks = num_chunks.max(1);
        let chunk_size = data.len() / num_chunks;
        let mut boundaries = Vec::with_capacity(num_chunks);
        let mut start = 0;

        for i in 0..num_chunks - 1 {
            let mut end = ((i + 1) * chunk_size).max(start);

            // Find next newline
            while end < data.len() && data[end] != b'\n' {
                end += 1;
            }

            if end < data.len() {
                end += 1; // Include the newline
            }

            if start < end {
                boundaries.push((start, end));
            }
            start = end;
        }

        // Last chunk gets everything remaining
        if start < data.len() {
            boundaries.push((start, data.len()));
        }

        boundaries
    }

    /// Parses whole lines of one chunk. `ParseError::line` is relative to
    /// the chunk (1-based) and rebased by the caller.
    fn parse_chunk(
        chunk: &[u8],
        schema: &[ColumnType],
        headers: &[String],
        avg_line_len: usize,
    ) -> BatchResult {
        let num_cols = schema.len();
        let estimated_rows = chunk.len() / avg_line_len + 1;

        let with_capacity_for = |wanted: ColumnType, i: usize| {
            if schema[i] == wanted { estimated_rows } else { 0 }
        };
        let mut int64_cols: Vec<Vec<i64>> = (0..num_cols)
            .map(|i| Vec::with_capacity(with_capacity_for(ColumnType::Int64, i)))
            .collect();
        let mut float64_cols: Vec<Vec<f64>> = (0..num_cols)
            .map(|i| Vec::with_capacity(with_capacity_for(ColumnType::Float64, i)))
            .collect();
        let mut str_cols: Vec<Vec<String>> = (0..num_cols)
            .map(|i| Vec::with_capacity(with_capacity_for(ColumnType::Str, i)))
            .collect();

        let mut errors = Vec::new();
        let mut row_count = 0;
        let mut line_count = 0;
        let mut fields = Vec::with_capacity(num_cols);
        let mut row = Vec::with_capacity(num_cols);

        // Iterate lines, including a final line without a trailing newline
        let mut start = 0;
        let line_ends = memchr_iter(b'\n', chunk).chain(
            (!chunk.ends_with(b"\n"))
                .then_some(chunk.len())
                .into_iter(),
        );

        'lines: for line_end in line_ends {
            let line = trim_line_end(&chunk[start..line_end]);
            start = line_end + 1;
            line_count += 1;

            if line.trim_ascii().is_empty() {
                continue;
            }

            split_fields(line, &mut fields);

            if fields.len() != num_cols {
                errors.push(ParseError {
                    line: line_count,
                    column: "".to_string(),
                    value: format!("Expected {} fields, got {}", num_cols, fields.len()),
                    error: None,
                });
                continue;
            }

            // Parse the whole row before committing any of it
            row.clear();
            for (col_idx, field) in fields.iter().enumerate() {
                let parsed = match schema[col_idx] {
                    ColumnType::Int64 => atoi_simd::parse::<i64>(field.trim_ascii())
                        .map(Value::Int)
                        .map_err(|e| e.to_string()),
                    ColumnType::Float64 => fast_float::parse::<f64, _>(field.trim_ascii())
                        .map(Value::Float)
                        .map_err(|e| e.to_string()),
                    ColumnType::Str => Ok(Value::Str(String::from_utf8_lossy(field).into_owned())),
                };
                match parsed {
                    Ok(value) => row.push(value),
                    Err(e) => {
                        errors.push(ParseError {
                            line: line_count,
                            column: headers[col_idx].clone(),
                            value: String::from_utf8_lossy(field).to_string(),
                            error: Some(e),
                        });
                        continue 'lines;
                    }
                }
            }

            for (col_idx, value) in row.drain(..).enumerate() {
                match value {
                    Value::Int(v) => int64_cols[col_idx].push(v),
                    Value::Float(v) => float64_cols[col_idx].push(v),
                    Value::Str(v) => str_cols[col_idx].push(v),
                }
            }

            row_count += 1;
        }

        BatchResult {
            int64_batches: int64_cols,
            float64_batches: float64_cols,
            str_batches: str_cols,
            row_count,
            line_count,
            errors,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// True when no rows are loaded
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_exists(&self, col_name: &str) -> bool {
        self.headers.iter().any(|h| h == col_name)
    }

    pub fn column_type(&self, col_name: &str) -> Option<ColumnType> {
        self.get_col(col_name).ok().map(Column::column_type)
    }

    pub fn value(&self, col_name: &str, row: usize) -> Option<Value> {
        self.get_col(col_name).ok()?.get(row)
    }

    /// Row indices of the whole table matching `predicate` on `column`
    pub fn filter(
        &self,
        column: &str,
        predicate: &FilterPredicate,
    ) -> Result<Vec<usize>, ProcessorError> {
        let all_rows: Vec<usize> = (0..self.row_count).collect();
        self.filter_rows(&all_rows, column, predicate)
    }

    /// Subset of `rows` matching `predicate` on `column`
    ///
    /// Ordering predicates between a categorical column and a number, or a
    /// numeric column and a string, are rejected with
    /// [`ProcessorError::IncomparableTypes`].
    pub fn filter_rows(
        &self,
        rows: &[usize],
        column: &str,
        predicate: &FilterPredicate,
    ) -> Result<Vec<usize>, ProcessorError> {
        let col = self.get_col(column)?;
        let target = predicate.value();

        if predicate.is_ordering() && col.column_type().is_numeric() != target.is_numeric() {
            return Err(ProcessorError::IncomparableTypes {
                column: column.to_string(),
                value: target.clone(),
            });
        }

        let out = match (col, predicate) {
            (Column::Str(values), FilterPredicate::Equals(Value::Str(target))) => rows
                .iter()
                .copied()
                .filter(|&i| values[i] == *target)
                .collect(),

            (Column::Str(values), FilterPredicate::NotEquals(Value::Str(target))) => rows
                .iter()
                .copied()
                .filter(|&i| values[i] != *target)
                .collect(),

            (Column::Int64(values), _) => rows
                .iter()
                .copied()
                .filter(|&i| predicate.matches(&Value::Int(values[i])))
                .collect(),

            (Column::Float64(values), _) => rows
                .iter()
                .copied()
                .filter(|&i| predicate.matches(&Value::Float(values[i])))
                .collect(),

            (Column::Str(values), _) => rows
                .iter()
                .copied()
                .filter(|&i| predicate.matches(&Value::Str(values[i].clone())))
                .collect(),
        };

        Ok(out)
    }

    /// Whether `value` occurs in `column`
    pub fn contains_value(&self, column: &str, value: &Value) -> Result<bool, ProcessorError> {
        Ok(!self
            .filter(column, &FilterPredicate::Equals(value.clone()))?
            .is_empty())
    }

    /// New table holding only `rows`, column types preserved
    pub fn take(&self, rows: &[usize]) -> ColumnarProcessor {
        ColumnarProcessor {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            row_count: rows.len(),
            headers: self.headers.clone(),
        }
    }

    /// Aggregates a column over all rows
    ///
    /// `Ok(None)` means the aggregate is undefined: any operation except
    /// `Count` over zero rows, or `Std` over fewer than two.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use freelance_analyzer::processor::{AggregateOp, columnar_processor::ColumnarProcessor};
    /// # let processor = ColumnarProcessor::new();
    /// let result = processor.aggregate("Earnings_USD", AggregateOp::Sum).unwrap();
    /// ```
    pub fn aggregate(
        &self,
        column: &str,
        op: AggregateOp,
    ) -> Result<Option<AggregateResult>, ProcessorError> {
        let col = self.get_col(column)?;
        let rows: Vec<usize> = (0..self.row_count).collect();
        Self::aggregate_rows(column, col, &rows, op)
    }

    fn aggregate_rows(
        name: &str,
        col: &Column,
        rows: &[usize],
        op: AggregateOp,
    ) -> Result<Option<AggregateResult>, ProcessorError> {
        if op == AggregateOp::Count {
            return Ok(Some(AggregateResult::Int(rows.len() as i64)));
        }

        if let Column::Int64(values) = col {
            let ints = rows.iter().map(|&i| values[i]);
            match op {
                AggregateOp::Sum if rows.is_empty() => return Ok(None),
                AggregateOp::Sum => {
                    let total: i128 = ints.map(i128::from).sum();
                    return Ok(Some(
                        i64::try_from(total)
                            .map(AggregateResult::Int)
                            .unwrap_or(AggregateResult::Float(total as f64)),
                    ));
                }
                AggregateOp::Min => return Ok(ints.min().map(AggregateResult::Int)),
                AggregateOp::Max => return Ok(ints.max().map(AggregateResult::Int)),
                _ => {}
            }
        }

        let values = col
            .numeric_values(rows)
            .ok_or_else(|| ProcessorError::NotNumeric(name.to_string()))?;

        let result = match op {
            AggregateOp::Mean => stats::mean(&values),
            AggregateOp::Median => stats::median(&values),
            AggregateOp::Std => stats::sample_std(&values),
            AggregateOp::Min => stats::min(&values),
            AggregateOp::Max => stats::max(&values),
            AggregateOp::Sum => (!values.is_empty()).then(|| stats::sum(&values)),
            AggregateOp::Count => Some(values.len() as f64),
        };

        Ok(result.map(AggregateResult::Float))
    }

    /// Distinct values of `column` with the rows carrying each, sorted by
    /// value
    pub fn group_rows(&self, column: &str) -> Result<Vec<Group>, ProcessorError> {
        let col = self.get_col(column)?;

        let mut index: HashMap<Value, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();

        for row in 0..self.row_count {
            let Some(key) = col.get(row) else { continue };
            match index.get(&key) {
                Some(&g) => groups[g].1.push(row),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push((key, vec![row]));
                }
            }
        }

        groups.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(groups)
    }

    /// Group-by aggregation
    ///
    /// # Returns
    /// One entry per distinct value of `group_col`, in sorted key order
    pub fn group_by(
        &self,
        group_col: &str,
        agg_col: &str,
        op: AggregateOp,
    ) -> Result<Vec<(Value, Option<AggregateResult>)>, ProcessorError> {
        Ok(self
            .group_by_multi_agg(group_col, agg_col, &[op])?
            .into_iter()
            .map(|(key, mut results)| (key, results.pop().flatten()))
            .collect())
    }

    /// Group-by with several aggregations of the same column; each result
    /// vector follows the order of `ops`.
    pub fn group_by_multi_agg(
        &self,
        group_col: &str,
        agg_col: &str,
        ops: &[AggregateOp],
    ) -> Result<Vec<(Value, Vec<Option<AggregateResult>>)>, ProcessorError> {
        let acol = self.get_col(agg_col)?;

        self.group_rows(group_col)?
            .into_iter()
            .map(|(key, rows)| {
                let results = ops
                    .iter()
                    .map(|op| Self::aggregate_rows(agg_col, acol, &rows, *op))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((key, results))
            })
            .collect()
    }

    /// Count, mean, std, min, quartiles and max of a numeric column
    pub fn describe(&self, column: &str) -> Result<Describe, ProcessorError> {
        let col = self.get_col(column)?;
        let rows: Vec<usize> = (0..self.row_count).collect();
        Self::describe_rows(column, col, &rows)
    }

    /// [`Self::describe`] per distinct value of `group_col`
    pub fn describe_by(
        &self,
        column: &str,
        group_col: &str,
    ) -> Result<Vec<(Value, Describe)>, ProcessorError> {
        let col = self.get_col(column)?;

        self.group_rows(group_col)?
            .into_iter()
            .map(|(key, rows)| Ok((key, Self::describe_rows(column, col, &rows)?)))
            .collect()
    }

    fn describe_rows(name: &str, col: &Column, rows: &[usize]) -> Result<Describe, ProcessorError> {
        let values = col
            .numeric_values(rows)
            .ok_or_else(|| ProcessorError::NotNumeric(name.to_string()))?;
        let sorted = stats::sorted(&values);

        Ok(Describe {
            count: values.len(),
            mean: stats::mean(&values),
            std: stats::sample_std(&values),
            min: sorted.first().copied(),
            p25: stats::quantile_sorted(&sorted, 0.25),
            p50: stats::quantile_sorted(&sorted, 0.5),
            p75: stats::quantile_sorted(&sorted, 0.75),
            max: sorted.last().copied(),
        })
    }

    pub fn get_col(&self, col_name: &str) -> Result<&Column, ProcessorError> {
        let col_pos = self
            .headers
            .iter()
            .position(|cn| cn == col_name)
            .ok_or_else(|| ProcessorError::MissingColumn(col_name.to_string()))?;

        let col = self
            .columns
            .get(col_pos)
            .ok_or_else(|| ProcessorError::MissingColumn(col_name.to_string()))?;

        Ok(col)
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Splits one CSV line into fields. Double-quoted fields may contain commas
/// and `""` escapes; quoted newlines are not supported.
fn split_fields<'a>(line: &'a [u8], fields: &mut Vec<Cow<'a, [u8]>>) {
    fields.clear();

    if memchr(b'"', line).is_none() {
        let mut field_start = 0;
        for comma_pos in memchr_iter(b',', line) {
            fields.push(Cow::Borrowed(&line[field_start..comma_pos]));
            field_start = comma_pos + 1;
        }
        fields.push(Cow::Borrowed(&line[field_start..]));
        return;
    }

    let mut current = Vec::new();
    let mut in_quotes = false;
    let mut i = 0;
    while i < line.len() {
        match line[i] {
            b'"' if in_quotes && line.get(i + 1) == Some(&b'"') => {
                current.push(b'"');
                i += 1;
            }
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => fields.push(Cow::Owned(std::mem::take(&mut current))),
            b => current.push(b),
        }
        i += 1;
    }
    fields.push(Cow::Owned(current));
}
