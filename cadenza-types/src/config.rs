//! Configuration shapes: raw catalog entries as they arrive from external
//! configuration, plus the mode selectors for merge, sort, sparsify, and
//! aggregation.

use serde::{Deserialize, Serialize};

/// One catalog entry as externally supplied, before validation.
///
/// Shape: `{ dtype: string, freq?: string, dtype_sql?: string,
/// is_suffix?: bool }`. Unknown keys are rejected at deserialization time;
/// `dtype` is mandatory. On regex entries an empty `dtype` or `freq` string
/// means "unspecified, does not override a resolved base entry".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCatalogEntry {
    /// Logical type code (`float`, `int`, `bool`, `datetime`, `str`,
    /// `category`, `categoryO`). Empty means unspecified (regex entries
    /// only).
    pub dtype: String,
    /// Frequency code (`D|W|M|Q|Y`). Empty or absent means unspecified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq: Option<String>,
    /// Explicit SQL-facing type string overriding the derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtype_sql: Option<String>,
    /// Whether the regex pattern denotes a qualifying suffix (a trailing
    /// transform token) rather than a qualifying prefix. Only valid on
    /// regex entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_suffix: Option<bool>,
}

impl RawCatalogEntry {
    /// Shorthand for an entry carrying only a dtype code.
    #[must_use]
    pub fn dtype(code: impl Into<String>) -> Self {
        Self {
            dtype: code.into(),
            freq: None,
            dtype_sql: None,
            is_suffix: None,
        }
    }

    /// Shorthand for a dtype + frequency entry.
    #[must_use]
    pub fn dtype_freq(dtype: impl Into<String>, freq: impl Into<String>) -> Self {
        Self {
            dtype: dtype.into(),
            freq: Some(freq.into()),
            dtype_sql: None,
            is_suffix: None,
        }
    }

    /// Mark the entry as a suffix or prefix regex rule.
    #[must_use]
    pub fn suffix(mut self, is_suffix: bool) -> Self {
        self.is_suffix = Some(is_suffix);
        self
    }
}

/// Join mode for the frequency-aware merge.
///
/// Right-merge is deliberately absent: callers swap the arguments instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum MergeHow {
    /// Keep rows from both sides (union of keys).
    #[default]
    Outer,
    /// Keep only rows present on the left side.
    Left,
}

/// Ordering criterion applied to a list of tables before pairwise merging.
///
/// Tables are sorted by their *lowest* native frequency ordinal with a
/// stable tie-break preserving relative input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FreqSort {
    /// Finest-sampled tables first (descending ordinal).
    #[default]
    HighestFirst,
    /// Coarsest-sampled tables first (ascending ordinal).
    LowestFirst,
}

/// Which observation represents a period when a column is sparsified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SparseKind {
    /// Keep the first non-null observation of the period.
    #[default]
    First,
    /// Keep the last non-null observation of the period.
    Last,
}

/// Aggregation applied when collapsing a table to its lowest frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggObs {
    /// First non-null observation per period.
    #[default]
    First,
    /// Last non-null observation per period.
    Last,
    /// Arithmetic mean of the period (numeric columns).
    Mean,
    /// Median of the period (numeric columns).
    Median,
}
