//! The in-memory table the engine operates on: column-major typed storage
//! with per-cell nulls and an optional named timestamp index.

use std::collections::BTreeSet;

use cadenza_types::DataType;
use chrono::{DateTime, Utc};

use crate::error::CadenzaError;

/// Typed storage for one column. Every cell is nullable.
///
/// Categorical columns are dictionary-encoded: `codes` index into
/// `categories`, and `ordered` distinguishes ordered from unordered
/// categoricals.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ColumnData {
    /// 64-bit floats.
    Float(Vec<Option<f64>>),
    /// 64-bit signed integers.
    Int(Vec<Option<i64>>),
    /// Booleans.
    Bool(Vec<Option<bool>>),
    /// UTC timestamps.
    DateTime(Vec<Option<DateTime<Utc>>>),
    /// Strings.
    Str(Vec<Option<String>>),
    /// Dictionary-encoded categorical values.
    Categorical {
        /// Per-row index into `categories`.
        codes: Vec<Option<u32>>,
        /// Distinct category labels; order is the categorical order when
        /// `ordered` is set.
        categories: Vec<String>,
        /// Whether category order is semantically meaningful.
        ordered: bool,
    },
}

impl ColumnData {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::DateTime(v) => v.len(),
            Self::Str(v) => v.len(),
            Self::Categorical { codes, .. } => codes.len(),
        }
    }

    /// True when the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The logical type of this storage.
    #[must_use]
    pub fn dtype(&self) -> DataType {
        match self {
            Self::Float(_) => DataType::Float,
            Self::Int(_) => DataType::Int,
            Self::Bool(_) => DataType::Bool,
            Self::DateTime(_) => DataType::DateTime,
            Self::Str(_) => DataType::Str,
            Self::Categorical { ordered: false, .. } => DataType::Categorical,
            Self::Categorical { ordered: true, .. } => DataType::CategoricalOrdered,
        }
    }

    /// True when the cell at `row` is null (out-of-range rows count as null).
    #[must_use]
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Self::Float(v) => v.get(row).is_none_or(Option::is_none),
            Self::Int(v) => v.get(row).is_none_or(Option::is_none),
            Self::Bool(v) => v.get(row).is_none_or(Option::is_none),
            Self::DateTime(v) => v.get(row).is_none_or(Option::is_none),
            Self::Str(v) => v.get(row).is_none_or(Option::is_none),
            Self::Categorical { codes, .. } => codes.get(row).is_none_or(Option::is_none),
        }
    }

    /// Render the cell at `row` for display and stringification; `None` for
    /// null cells.
    #[must_use]
    pub fn render(&self, row: usize) -> Option<String> {
        match self {
            Self::Float(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            Self::Int(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            Self::Bool(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            Self::DateTime(v) => v.get(row).copied().flatten().map(|x| x.to_rfc3339()),
            Self::Str(v) => v.get(row).cloned().flatten(),
            Self::Categorical { codes, categories, .. } => codes
                .get(row)
                .copied()
                .flatten()
                .and_then(|c| categories.get(c as usize).cloned()),
        }
    }

    /// Same variant (and categories) with no rows.
    pub(crate) fn empty_like(&self) -> Self {
        match self {
            Self::Float(_) => Self::Float(Vec::new()),
            Self::Int(_) => Self::Int(Vec::new()),
            Self::Bool(_) => Self::Bool(Vec::new()),
            Self::DateTime(_) => Self::DateTime(Vec::new()),
            Self::Str(_) => Self::Str(Vec::new()),
            Self::Categorical { categories, ordered, .. } => Self::Categorical {
                codes: Vec::new(),
                categories: categories.clone(),
                ordered: *ordered,
            },
        }
    }

    pub(crate) fn push_null(&mut self) {
        match self {
            Self::Float(v) => v.push(None),
            Self::Int(v) => v.push(None),
            Self::Bool(v) => v.push(None),
            Self::DateTime(v) => v.push(None),
            Self::Str(v) => v.push(None),
            Self::Categorical { codes, .. } => codes.push(None),
        }
    }

    /// Append the cell `src[row]`. `src` must be the column this storage was
    /// created from via [`ColumnData::empty_like`]; mismatched variants
    /// append null.
    pub(crate) fn push_from(&mut self, src: &Self, row: usize) {
        match (self, src) {
            (Self::Float(dst), Self::Float(s)) => dst.push(s.get(row).copied().flatten()),
            (Self::Int(dst), Self::Int(s)) => dst.push(s.get(row).copied().flatten()),
            (Self::Bool(dst), Self::Bool(s)) => dst.push(s.get(row).copied().flatten()),
            (Self::DateTime(dst), Self::DateTime(s)) => dst.push(s.get(row).copied().flatten()),
            (Self::Str(dst), Self::Str(s)) => dst.push(s.get(row).cloned().flatten()),
            (Self::Categorical { codes: dst, .. }, Self::Categorical { codes: s, .. }) => {
                dst.push(s.get(row).copied().flatten());
            }
            (dst, _) => dst.push_null(),
        }
    }

    /// Gather rows by the given picks; `None` picks produce null cells.
    pub(crate) fn take_rows(&self, picks: &[Option<usize>]) -> Self {
        let mut out = self.empty_like();
        for pick in picks {
            match pick {
                Some(row) => out.push_from(self, *row),
                None => out.push_null(),
            }
        }
        out
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Build a column from a name and typed storage.
    #[must_use]
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self { name: name.into(), data }
    }

    /// Float column shorthand.
    #[must_use]
    pub fn float(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Float(values))
    }

    /// Int column shorthand.
    #[must_use]
    pub fn int(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::new(name, ColumnData::Int(values))
    }

    /// Bool column shorthand.
    #[must_use]
    pub fn bool(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Self::new(name, ColumnData::Bool(values))
    }

    /// Timestamp column shorthand.
    #[must_use]
    pub fn datetime(name: impl Into<String>, values: Vec<Option<DateTime<Utc>>>) -> Self {
        Self::new(name, ColumnData::DateTime(values))
    }

    /// String column shorthand.
    #[must_use]
    pub fn str(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self::new(name, ColumnData::Str(values))
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Typed storage.
    #[must_use]
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub(crate) fn with_data(&self, data: ColumnData) -> Self {
        Self { name: self.name.clone(), data }
    }
}

/// An optionally named timestamp index.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeIndex {
    name: Option<String>,
    values: Vec<DateTime<Utc>>,
}

impl TimeIndex {
    /// Named index.
    #[must_use]
    pub fn named(name: impl Into<String>, values: Vec<DateTime<Utc>>) -> Self {
        Self { name: Some(name.into()), values }
    }

    /// Unnamed index.
    #[must_use]
    pub fn unnamed(values: Vec<DateTime<Utc>>) -> Self {
        Self { name: None, values }
    }

    /// Index name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Index timestamps, in row order.
    #[must_use]
    pub fn values(&self) -> &[DateTime<Utc>] {
        &self.values
    }
}

/// A table: columns of equal length plus an optional timestamp index.
///
/// Column names are unique within a table; constructors enforce this along
/// with consistent lengths. All engine operations return new frames and
/// leave their inputs unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: Option<TimeIndex>,
    columns: Vec<Column>,
}

impl Frame {
    /// Build a frame without an index.
    ///
    /// # Errors
    /// Returns `CadenzaError::Data` on duplicate column names or mismatched
    /// column lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self, CadenzaError> {
        Self::validate(None, &columns)?;
        Ok(Self { index: None, columns })
    }

    /// Build a frame with a timestamp index.
    ///
    /// # Errors
    /// Returns `CadenzaError::Data` on duplicate column names or when any
    /// column length differs from the index length.
    pub fn with_index(index: TimeIndex, columns: Vec<Column>) -> Result<Self, CadenzaError> {
        Self::validate(Some(index.values.len()), &columns)?;
        Ok(Self { index: Some(index), columns })
    }

    fn validate(index_len: Option<usize>, columns: &[Column]) -> Result<(), CadenzaError> {
        let mut seen = BTreeSet::new();
        for col in columns {
            if !seen.insert(col.name()) {
                return Err(CadenzaError::data(format!(
                    "duplicate column name: {}",
                    col.name()
                )));
            }
        }
        let expected = index_len.or_else(|| columns.first().map(|c| c.data.len()));
        if let Some(expected) = expected {
            for col in columns {
                if col.data.len() != expected {
                    return Err(CadenzaError::data(format!(
                        "column {} has {} rows, expected {expected}",
                        col.name(),
                        col.data.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index
            .as_ref()
            .map_or_else(|| self.columns.first().map_or(0, |c| c.data.len()), |i| i.values.len())
    }

    /// True when the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Columns in table order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// The timestamp index, if the frame has one.
    #[must_use]
    pub fn time_index(&self) -> Option<&TimeIndex> {
        self.index.as_ref()
    }

    pub(crate) fn replace_column_data(&mut self, position: usize, data: ColumnData) {
        if let Some(col) = self.columns.get_mut(position) {
            col.data = data;
        }
    }

    /// New frame keeping only rows where `keep` is true.
    pub(crate) fn retain_rows(&self, keep: &[bool]) -> Self {
        let picks: Vec<Option<usize>> = keep
            .iter()
            .enumerate()
            .filter(|&(_, k)| *k)
            .map(|(i, _)| Some(i))
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|c| c.with_data(c.data.take_rows(&picks)))
            .collect();
        let index = self.index.as_ref().map(|idx| TimeIndex {
            name: idx.name.clone(),
            values: picks
                .iter()
                .filter_map(|p| p.and_then(|i| idx.values.get(i)).copied())
                .collect(),
        });
        Self { index, columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(sec: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(sec, 0).unwrap()
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = Frame::new(vec![
            Column::float("a", vec![Some(1.0)]),
            Column::float("a", vec![Some(2.0)]),
        ]);
        assert!(matches!(err, Err(CadenzaError::Data(_))));
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let err = Frame::with_index(
            TimeIndex::named("calendardate", vec![ts(0), ts(86_400)]),
            vec![Column::float("a", vec![Some(1.0)])],
        );
        assert!(matches!(err, Err(CadenzaError::Data(_))));
    }

    #[test]
    fn take_rows_gathers_and_nulls() {
        let data = ColumnData::Int(vec![Some(10), Some(20), None]);
        let taken = data.take_rows(&[Some(2), None, Some(0)]);
        assert_eq!(taken, ColumnData::Int(vec![None, None, Some(10)]));
    }

    #[test]
    fn categorical_dtype_tracks_ordered_flag() {
        let unordered = ColumnData::Categorical {
            codes: vec![Some(0)],
            categories: vec!["a".into()],
            ordered: false,
        };
        assert_eq!(unordered.dtype(), DataType::Categorical);
        let ordered = ColumnData::Categorical {
            codes: vec![Some(0)],
            categories: vec!["a".into()],
            ordered: true,
        };
        assert_eq!(ordered.dtype(), DataType::CategoricalOrdered);
    }
}
