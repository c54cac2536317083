//! Shared row-selection helpers for the grouping operations.

use chrono::{DateTime, Utc};

use crate::frame::ColumnData;

/// Stable argsort of timestamps: row numbers in ascending timestamp order,
/// equal timestamps keeping their original relative order.
pub(crate) fn sorted_row_order(values: &[DateTime<Utc>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by_key(|&i| values[i]);
    order
}

/// The first row in `rows` where `data` is non-null.
pub(crate) fn first_non_null(data: &ColumnData, rows: &[usize]) -> Option<usize> {
    rows.iter().copied().find(|&row| !data.is_null(row))
}

/// The last row in `rows` where `data` is non-null.
pub(crate) fn last_non_null(data: &ColumnData, rows: &[usize]) -> Option<usize> {
    rows.iter().rev().copied().find(|&row| !data.is_null(row))
}
