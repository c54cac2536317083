use serde::{Deserialize, Serialize};

use crate::{DataType, Frequency};

/// Fully resolved metadata for one table column.
///
/// Constructed once per column per classification call and immutable after
/// construction; never persisted. Classification recomputes specs from the
/// catalog and the table's column names on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name, unique within its table.
    pub name: String,
    /// Logical data type the column should be cast to.
    pub dtype: DataType,
    /// Native sampling frequency.
    pub freq: Frequency,
    /// SQL-facing type string, derived from `dtype` unless overridden.
    pub dtype_sql: String,
    /// True when the spec was produced by the fallback default rather than a
    /// catalog match.
    pub is_default: bool,
}

impl ColumnSpec {
    /// Build a spec, deriving the SQL type from `dtype` when no override is
    /// given.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        dtype: DataType,
        freq: Frequency,
        dtype_sql: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dtype,
            freq,
            dtype_sql: dtype_sql.unwrap_or_else(|| dtype.sql_type().to_owned()),
            is_default: false,
        }
    }

    /// The documented fallback: `{float, Day, is_default}` for names the
    /// catalog cannot resolve.
    #[must_use]
    pub fn fallback(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Float,
            freq: Frequency::Day,
            dtype_sql: DataType::Float.sql_type().to_owned(),
            is_default: true,
        }
    }
}

impl std::fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}, {}", self.name, self.dtype, self.freq)
    }
}
