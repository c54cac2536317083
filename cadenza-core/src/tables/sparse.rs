//! Sparse re-expression of multi-frequency tables, and collapsing a table
//! to its lowest native frequency.

use std::collections::BTreeMap;

use cadenza_types::{AggObs, Frequency, SparseKind};
use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::error::CadenzaError;
use crate::frame::{Column, ColumnData, Frame, TimeIndex};
use crate::period::{period_grid, period_start};
use crate::tables::classify::{classify_frame, summarize};
use crate::tables::util::{first_non_null, last_non_null, sorted_row_order};

/// Re-express a table at its highest native frequency, leaving lower-
/// frequency columns populated only on their native sampling dates.
///
/// The index is re-gridded to regular steps of the table's highest
/// frequency between its first and last timestamp. For every column, each
/// native-frequency period keeps a single observation (the first or last
/// non-null one per `kind`) at that observation's own timestamp, null
/// elsewhere. Columns with no declared frequency stay dense. Rows left
/// entirely null are dropped.
///
/// # Errors
/// - `CadenzaError::InvalidArg` when the table lacks a timestamp index or
///   no column declares a frequency.
pub fn sparsify(frame: &Frame, kind: SparseKind, catalog: &Catalog) -> Result<Frame, CadenzaError> {
    let index = frame
        .time_index()
        .ok_or_else(|| CadenzaError::invalid_arg("sparsify requires a timestamp index"))?;
    let specs = classify_frame(frame, catalog);
    let summary = summarize(&specs);
    if summary.highest == Frequency::Unspecified {
        return Err(CadenzaError::invalid_arg(
            "sparsify requires at least one column with a declared frequency",
        ));
    }
    if frame.is_empty() {
        return Ok(frame.clone());
    }

    // Regular grid at the highest frequency; original rows land on it by
    // exact timestamp match, everything off-grid is dropped.
    let order = sorted_row_order(index.values());
    let first_ts = index.values()[order[0]];
    let last_ts = index.values()[order[order.len() - 1]];
    let grid = period_grid(first_ts, last_ts, summary.highest);
    let mut by_ts: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
    for &row in &order {
        by_ts.entry(index.values()[row]).or_insert(row);
    }
    let grid_picks: Vec<Option<usize>> = grid.iter().map(|ts| by_ts.get(ts).copied()).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(frame.columns().len());
    for (col, spec) in frame.columns().iter().zip(&specs) {
        let dense = col.data().take_rows(&grid_picks);
        if spec.freq == Frequency::Unspecified {
            columns.push(col.with_data(dense));
            continue;
        }

        let mut groups: BTreeMap<DateTime<Utc>, Vec<usize>> = BTreeMap::new();
        for (row, &ts) in grid.iter().enumerate() {
            groups.entry(period_start(ts, spec.freq)).or_default().push(row);
        }
        let mut sparse_picks: Vec<Option<usize>> = vec![None; grid.len()];
        for rows in groups.values() {
            let chosen = match kind {
                SparseKind::First => first_non_null(&dense, rows),
                SparseKind::Last => last_non_null(&dense, rows),
            };
            if let Some(row) = chosen {
                sparse_picks[row] = Some(row);
            }
        }
        columns.push(col.with_data(dense.take_rows(&sparse_picks)));
    }

    let name = index.name().map(str::to_owned);
    let regridded = Frame::with_index(
        match name {
            Some(name) => TimeIndex::named(name, grid),
            None => TimeIndex::unnamed(grid),
        },
        columns,
    )?;

    // Minimum one non-null value per row.
    let keep: Vec<bool> = (0..regridded.len())
        .map(|row| regridded.columns().iter().any(|c| !c.data().is_null(row)))
        .collect();
    Ok(regridded.retain_rows(&keep))
}

/// Collapse a timestamp-indexed table to its lowest native frequency: one
/// row per period, keyed by the period-start timestamp.
///
/// `First`/`Last` keep the first or last non-null observation per column;
/// `Mean`/`Median` aggregate numeric columns (float, int, bool) into float
/// columns, and fall back to the first non-null observation for
/// non-numeric columns with a warning.
///
/// # Errors
/// - `CadenzaError::InvalidArg` when the table lacks a timestamp index or
///   no column declares a frequency.
pub fn collapse_to_lowest(
    frame: &Frame,
    agg: AggObs,
    catalog: &Catalog,
) -> Result<Frame, CadenzaError> {
    let index = frame
        .time_index()
        .ok_or_else(|| CadenzaError::invalid_arg("frequency collapse requires a timestamp index"))?;
    let summary = summarize(&classify_frame(frame, catalog));
    if summary.lowest == Frequency::Unspecified {
        return Err(CadenzaError::invalid_arg(
            "frequency collapse requires at least one column with a declared frequency",
        ));
    }

    let order = sorted_row_order(index.values());
    let mut groups: BTreeMap<DateTime<Utc>, Vec<usize>> = BTreeMap::new();
    for &row in &order {
        groups
            .entry(period_start(index.values()[row], summary.lowest))
            .or_default()
            .push(row);
    }

    let keys: Vec<DateTime<Utc>> = groups.keys().copied().collect();
    let columns: Vec<Column> = frame
        .columns()
        .iter()
        .map(|col| aggregate_column(col, &groups, agg))
        .collect();

    let index = match index.name() {
        Some(name) => TimeIndex::named(name, keys),
        None => TimeIndex::unnamed(keys),
    };
    Frame::with_index(index, columns)
}

fn aggregate_column(
    col: &Column,
    groups: &BTreeMap<DateTime<Utc>, Vec<usize>>,
    agg: AggObs,
) -> Column {
    match agg {
        AggObs::First => pick_column(col, groups, first_non_null),
        AggObs::Last => pick_column(col, groups, last_non_null),
        AggObs::Mean | AggObs::Median => match numeric_values(col.data()) {
            Some(values) => {
                let cells = groups
                    .values()
                    .map(|rows| {
                        let mut present: Vec<f64> =
                            rows.iter().filter_map(|&r| values[r]).collect();
                        if agg == AggObs::Mean {
                            mean(&present)
                        } else {
                            present.sort_by(f64::total_cmp);
                            median(&present)
                        }
                    })
                    .collect();
                col.with_data(ColumnData::Float(cells))
            }
            None => {
                tracing::warn!(
                    column = %col.name(),
                    agg = ?agg,
                    "column is not numeric; keeping the first observation per period"
                );
                pick_column(col, groups, first_non_null)
            }
        },
    }
}

fn pick_column(
    col: &Column,
    groups: &BTreeMap<DateTime<Utc>, Vec<usize>>,
    pick: fn(&ColumnData, &[usize]) -> Option<usize>,
) -> Column {
    let picks: Vec<Option<usize>> =
        groups.values().map(|rows| pick(col.data(), rows)).collect();
    col.with_data(col.data().take_rows(&picks))
}

fn numeric_values(data: &ColumnData) -> Option<Vec<Option<f64>>> {
    match data {
        ColumnData::Float(v) => Some(v.clone()),
        ColumnData::Int(v) => Some(v.iter().map(|c| c.map(|x| x as f64)).collect()),
        ColumnData::Bool(v) => {
            Some(v.iter().map(|c| c.map(|b| f64::from(u8::from(b)))).collect())
        }
        _ => None,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median with linear interpolation between the two middle observations.
fn median(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}
