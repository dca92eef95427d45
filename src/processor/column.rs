use crate::processor::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int64,
    Float64,
    Str,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Int64 | ColumnType::Float64)
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Str => "str",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Str(Vec<String>),
}

impl Column {
    pub fn new(col_type: ColumnType) -> Self {
        match col_type {
            ColumnType::Int64 => Column::Int64(Vec::new()),
            ColumnType::Float64 => Column::Float64(Vec::new()),
            ColumnType::Str => Column::Str(Vec::new()),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int64(_) => ColumnType::Int64,
            Column::Float64(_) => ColumnType::Float64,
            Column::Str(_) => ColumnType::Str,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Int64(values) => values.len(),
            Column::Float64(values) => values.len(),
            Column::Str(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Random access
    pub fn get(&self, idx: usize) -> Option<Value> {
        match self {
            Column::Int64(values) => values.get(idx).map(|v| Value::Int(*v)),
            Column::Float64(values) => values.get(idx).map(|v| Value::Float(*v)),
            Column::Str(values) => values.get(idx).map(|v| Value::Str(v.clone())),
        }
    }

    /// Numeric cells of the given rows widened to `f64`; `None` for a
    /// categorical column.
    pub fn numeric_values(&self, rows: &[usize]) -> Option<Vec<f64>> {
        match self {
            Column::Int64(values) => Some(rows.iter().map(|&i| values[i] as f64).collect()),
            Column::Float64(values) => Some(rows.iter().map(|&i| values[i]).collect()),
            Column::Str(_) => None,
        }
    }

    /// Copies the given rows into a new column of the same type
    pub fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Int64(values) => Column::Int64(rows.iter().map(|&i| values[i]).collect()),
            Column::Float64(values) => Column::Float64(rows.iter().map(|&i| values[i]).collect()),
            Column::Str(values) => Column::Str(rows.iter().map(|&i| values[i].clone()).collect()),
        }
    }

    /// Moves a parsed batch onto the end of the column. The batch vectors
    /// not matching this column's type are left untouched.
    pub(crate) fn append_batch(
        &mut self,
        ints: &mut Vec<i64>,
        floats: &mut Vec<f64>,
        strs: &mut Vec<String>,
    ) {
        match self {
            Column::Int64(values) => values.append(ints),
            Column::Float64(values) => values.append(floats),
            Column::Str(values) => values.append(strs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_preserves_type() {
        let col = Column::Float64(vec![1.5, 2.5, 3.5]);
        let taken = col.take(&[2, 0]);
        assert_eq!(taken, Column::Float64(vec![3.5, 1.5]));
        assert_eq!(taken.column_type(), ColumnType::Float64);
    }

    #[test]
    fn test_numeric_values() {
        let ints = Column::Int64(vec![10, 20, 30]);
        assert_eq!(ints.numeric_values(&[0, 2]), Some(vec![10.0, 30.0]));

        let strs = Column::Str(vec!["a".into()]);
        assert_eq!(strs.numeric_values(&[0]), None);
    }

    #[test]
    fn test_append_batch() {
        let mut col = Column::new(ColumnType::Int64);
        let mut ints = vec![1, 2];
        col.append_batch(&mut ints, &mut Vec::new(), &mut Vec::new());
        assert_eq!(col.len(), 2);
        assert!(ints.is_empty());
    }
}
