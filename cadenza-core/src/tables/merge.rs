//! Frequency-aware merging of timestamp-indexed tables.
//!
//! The join strategy depends on the relative ordering of the two inputs'
//! *highest* native frequencies: a finer left side is aligned to the right
//! via a transient period-truncated merge key, equal frequencies join on
//! the shared calendar period, and a coarser left side first collapses the
//! right table to one observation per period. The merged result is indexed
//! by `calendardate` and re-typed through the caster with the same catalog.

use std::collections::{BTreeMap, BTreeSet};

use cadenza_types::{FreqSort, Frequency, MergeHow};
use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::error::CadenzaError;
use crate::frame::{Column, Frame, TimeIndex};
use crate::period::period_start;
use crate::tables::cast::cast_frame;
use crate::tables::classify::frequency_summary;
use crate::tables::util::{last_non_null, sorted_row_order};

/// Index name carried by every merge result.
pub const CALENDAR_DATE: &str = "calendardate";

/// One output row of a pairwise merge: the join key, the timestamp the row
/// surfaces under, and the contributing row of each side.
struct JoinRow {
    key: DateTime<Utc>,
    cal: DateTime<Utc>,
    left: Option<usize>,
    right: Option<usize>,
}

/// Merge two timestamp-indexed tables whose sampling frequencies may
/// differ.
///
/// For a right-merge, swap the arguments: [`MergeHow`] deliberately has no
/// `Right` variant. The result is a new frame indexed by `calendardate`,
/// re-typed through the caster with the same catalog; both inputs are left
/// unmodified.
///
/// # Errors
/// - `CadenzaError::InvalidArg` when either input lacks a timestamp index.
/// - `CadenzaError::Data` when the two inputs share a column name.
pub fn merge_frames(
    left: &Frame,
    right: &Frame,
    how: MergeHow,
    catalog: &Catalog,
) -> Result<Frame, CadenzaError> {
    let left_index = left
        .time_index()
        .ok_or_else(|| CadenzaError::invalid_arg("left table does not have a timestamp index"))?;
    let right_index = right
        .time_index()
        .ok_or_else(|| CadenzaError::invalid_arg("right table does not have a timestamp index"))?;

    if let Some(dup) = left.column_names().find(|n| right.column(n).is_some()) {
        return Err(CadenzaError::data(format!(
            "column {dup} present in both tables; merged column names must be unique"
        )));
    }

    let left_summary = frequency_summary(left, catalog);
    let right_summary = frequency_summary(right, catalog);

    if left_summary.highest_ordinal() > right_summary.highest_ordinal() {
        // Left is finer: truncate the left index to the right's period to
        // form the merge key. Rows surface under the original left
        // timestamp where present, and under the key otherwise. Only this
        // branch reconciles that way; the asymmetry is deliberate.
        let keys: Vec<DateTime<Utc>> = left_index
            .values()
            .iter()
            .map(|&ts| period_start(ts, right_summary.highest))
            .collect();
        let right_rows = rows_by_timestamp(right_index.values());
        let rows = join_rows(&keys, Some(left_index.values()), &right_rows, how);
        finalize(left, right, &rows, catalog)
    } else if left_summary.highest_ordinal() == right_summary.highest_ordinal() {
        // Shared frequency: a pure calendar-period join. The output index
        // is the period-start timestamp for every row, left rows included.
        let freq = left_summary.highest;
        let keys: Vec<DateTime<Utc>> = left_index
            .values()
            .iter()
            .map(|&ts| period_start(ts, freq))
            .collect();
        let mut right_rows: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
        for (row, &ts) in right_index.values().iter().enumerate() {
            right_rows.entry(period_start(ts, freq)).or_insert(row);
        }
        let rows = join_rows(&keys, None, &right_rows, how);
        finalize(left, right, &rows, catalog)
    } else {
        // Left is coarser: collapse the right table to one observation per
        // left-period key, then join on the left index directly.
        let reduced = reduce_to_period(right, right_index, left_summary.highest)?;
        let reduced_rows =
            rows_by_timestamp(reduced.time_index().map_or(&[], TimeIndex::values));
        let rows = join_rows(left_index.values(), None, &reduced_rows, how);
        finalize(left, &reduced, &rows, catalog)
    }
}

/// Build join rows for one of the three strategies.
///
/// `left_cal` supplies the surfacing timestamp per left row; `None` means
/// rows surface under their key. Left mode preserves left row order; outer
/// mode appends right-only rows and sorts the result by key (stable, so
/// left rows sharing a key keep their relative order).
fn join_rows(
    left_keys: &[DateTime<Utc>],
    left_cal: Option<&[DateTime<Utc>]>,
    right_rows: &BTreeMap<DateTime<Utc>, usize>,
    how: MergeHow,
) -> Vec<JoinRow> {
    let cal_of = |i: usize, key: DateTime<Utc>| left_cal.map_or(key, |cal| cal[i]);
    let mut rows: Vec<JoinRow> = left_keys
        .iter()
        .enumerate()
        .map(|(i, &key)| JoinRow {
            key,
            cal: cal_of(i, key),
            left: Some(i),
            right: right_rows.get(&key).copied(),
        })
        .collect();

    if how == MergeHow::Outer {
        let key_set: BTreeSet<DateTime<Utc>> = left_keys.iter().copied().collect();
        for (&ts, &row) in right_rows {
            if !key_set.contains(&ts) {
                rows.push(JoinRow { key: ts, cal: ts, left: None, right: Some(row) });
            }
        }
        rows.sort_by_key(|r| r.key);
    }
    rows
}

/// First occurrence wins for duplicate timestamps.
fn rows_by_timestamp(values: &[DateTime<Utc>]) -> BTreeMap<DateTime<Utc>, usize> {
    let mut map = BTreeMap::new();
    for (row, &ts) in values.iter().enumerate() {
        map.entry(ts).or_insert(row);
    }
    map
}

/// Collapse `frame` to one row per `freq` period of its index: rows are
/// visited in timestamp order and each column keeps its last non-null value
/// within the period. Everything else in the period is silently discarded.
fn reduce_to_period(
    frame: &Frame,
    index: &TimeIndex,
    freq: Frequency,
) -> Result<Frame, CadenzaError> {
    let order = sorted_row_order(index.values());
    let mut groups: BTreeMap<DateTime<Utc>, Vec<usize>> = BTreeMap::new();
    for &row in &order {
        groups
            .entry(period_start(index.values()[row], freq))
            .or_default()
            .push(row);
    }

    let keys: Vec<DateTime<Utc>> = groups.keys().copied().collect();
    let columns: Vec<Column> = frame
        .columns()
        .iter()
        .map(|col| {
            let picks: Vec<Option<usize>> = groups
                .values()
                .map(|rows| last_non_null(col.data(), rows))
                .collect();
            col.with_data(col.data().take_rows(&picks))
        })
        .collect();

    Frame::with_index(TimeIndex::named("key", keys), columns)
}

/// Assemble join rows into a `calendardate`-indexed frame and re-type it
/// with the catalog. No merge-key or positional column survives into the
/// result.
fn finalize(
    left: &Frame,
    right: &Frame,
    rows: &[JoinRow],
    catalog: &Catalog,
) -> Result<Frame, CadenzaError> {
    let left_picks: Vec<Option<usize>> = rows.iter().map(|r| r.left).collect();
    let right_picks: Vec<Option<usize>> = rows.iter().map(|r| r.right).collect();
    let cal: Vec<DateTime<Utc>> = rows.iter().map(|r| r.cal).collect();

    let mut columns = Vec::with_capacity(left.columns().len() + right.columns().len());
    for col in left.columns() {
        columns.push(col.with_data(col.data().take_rows(&left_picks)));
    }
    for col in right.columns() {
        columns.push(col.with_data(col.data().take_rows(&right_picks)));
    }

    let merged = Frame::with_index(TimeIndex::named(CALENDAR_DATE, cal), columns)?;
    Ok(cast_frame(&merged, catalog, false))
}

/// Order tables by their lowest native frequency ordinal before reduction:
/// [`FreqSort::HighestFirst`] puts the finest-sampled table first,
/// [`FreqSort::LowestFirst`] the coarsest. The sort is stable, preserving
/// relative input order on ties.
#[must_use]
pub fn sort_by_frequency(frames: Vec<Frame>, order: FreqSort, catalog: &Catalog) -> Vec<Frame> {
    let mut keyed: Vec<(u8, Frame)> = frames
        .into_iter()
        .map(|f| (frequency_summary(&f, catalog).lowest_ordinal(), f))
        .collect();
    match order {
        FreqSort::HighestFirst => keyed.sort_by_key(|(ord, _)| std::cmp::Reverse(*ord)),
        FreqSort::LowestFirst => keyed.sort_by_key(|(ord, _)| *ord),
    }
    keyed.into_iter().map(|(_, f)| f).collect()
}

/// Merge a list of tables by folding [`merge_frames`] pairwise
/// left-to-right after sorting by `order`.
///
/// # Errors
/// - `CadenzaError::InvalidArg` for an empty list.
/// - Every error [`merge_frames`] can produce.
pub fn merge_all(
    frames: Vec<Frame>,
    how: MergeHow,
    order: FreqSort,
    catalog: &Catalog,
) -> Result<Frame, CadenzaError> {
    let mut sorted = sort_by_frequency(frames, order, catalog).into_iter();
    let Some(first) = sorted.next() else {
        return Err(CadenzaError::invalid_arg("cannot merge an empty list of tables"));
    };
    sorted.try_fold(first, |acc, next| merge_frames(&acc, &next, how, catalog))
}
