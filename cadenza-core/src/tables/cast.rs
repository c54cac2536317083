//! Apply inferred column types to a table, tolerating per-column failures.

use cadenza_types::DataType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::catalog::Catalog;
use crate::error::CadenzaError;
use crate::frame::{ColumnData, Frame};
use crate::tables::classify::classify_column;

/// Cast every column of `frame` to its catalog-inferred type.
///
/// Returns a new frame; the input is left unmodified. A failed cast on any
/// single column is caught and logged as a warning with the column name,
/// target type, and underlying error, and that column is left unchanged;
/// cast failures are never fatal to the whole operation.
///
/// With `cast_index` set, the index participates as if it were a column:
/// an unnamed (or absent) index is skipped with a warning; a named index
/// whose classified type is not `datetime` is also skipped with a warning,
/// since the index is strongly timestamp-typed.
#[must_use]
pub fn cast_frame(frame: &Frame, catalog: &Catalog, cast_index: bool) -> Frame {
    let mut out = frame.clone();

    if cast_index {
        match frame.time_index().and_then(|idx| idx.name()) {
            None => {
                tracing::warn!("index has no name and cannot be cast");
            }
            Some(name) => {
                let spec = classify_column(name, catalog);
                if spec.dtype != DataType::DateTime {
                    tracing::warn!(
                        index = %name,
                        dtype = %spec.dtype,
                        "index cast would change the timestamp index type; skipping"
                    );
                }
            }
        }
    }

    for (position, column) in frame.columns().iter().enumerate() {
        let spec = classify_column(column.name(), catalog);
        if column.data().dtype() == spec.dtype {
            continue;
        }
        match cast_column(column.data(), spec.dtype) {
            Ok(data) => out.replace_column_data(position, data),
            Err(err) => {
                tracing::warn!(
                    column = %column.name(),
                    dtype = %spec.dtype,
                    error = %err,
                    "cast failed; leaving column unchanged"
                );
            }
        }
    }
    out
}

/// A borrowed view of one cell, for cross-type conversion. Categorical
/// cells surface as their category label.
enum Cell<'a> {
    Float(f64),
    Int(i64),
    Bool(bool),
    Time(DateTime<Utc>),
    Text(&'a str),
}

fn cells(data: &ColumnData) -> Vec<Option<Cell<'_>>> {
    match data {
        ColumnData::Float(v) => v.iter().map(|c| c.map(Cell::Float)).collect(),
        ColumnData::Int(v) => v.iter().map(|c| c.map(Cell::Int)).collect(),
        ColumnData::Bool(v) => v.iter().map(|c| c.map(Cell::Bool)).collect(),
        ColumnData::DateTime(v) => v.iter().map(|c| c.map(Cell::Time)).collect(),
        ColumnData::Str(v) => v.iter().map(|c| c.as_deref().map(Cell::Text)).collect(),
        ColumnData::Categorical { codes, categories, .. } => codes
            .iter()
            .map(|c| {
                c.and_then(|code| categories.get(code as usize))
                    .map(|label| Cell::Text(label))
            })
            .collect(),
    }
}

/// Convert typed storage to the target type, cell by cell. Null cells stay
/// null except where the target cannot represent them (int).
pub(crate) fn cast_column(
    data: &ColumnData,
    target: DataType,
) -> Result<ColumnData, CadenzaError> {
    match target {
        DataType::Float => cast_to_float(data),
        DataType::Int => cast_to_int(data),
        DataType::Bool => cast_to_bool(data),
        DataType::DateTime => cast_to_datetime(data),
        DataType::Str => Ok(cast_to_str(data)),
        DataType::Categorical => cast_to_categorical(data),
        DataType::CategoricalOrdered => cast_to_ordered_categorical(data),
    }
}

fn cast_to_float(data: &ColumnData) -> Result<ColumnData, CadenzaError> {
    let values = cells(data)
        .iter()
        .map(|cell| match cell {
            None => Ok(None),
            Some(Cell::Float(v)) => Ok(Some(*v)),
            Some(Cell::Int(v)) => Ok(Some(*v as f64)),
            Some(Cell::Bool(b)) => Ok(Some(f64::from(u8::from(*b)))),
            Some(Cell::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| CadenzaError::data(format!("invalid float literal {s:?}"))),
            Some(Cell::Time(_)) => Err(CadenzaError::data("cannot cast datetime to float")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ColumnData::Float(values))
}

fn cast_to_int(data: &ColumnData) -> Result<ColumnData, CadenzaError> {
    let cells = cells(data);
    if cells.iter().any(Option::is_none) {
        return Err(CadenzaError::data("cannot cast null values to int"));
    }
    let values = cells
        .iter()
        .map(|cell| match cell {
            None => Ok(None),
            Some(Cell::Int(v)) => Ok(Some(*v)),
            Some(Cell::Float(v)) if v.is_finite() => Ok(Some(v.trunc() as i64)),
            Some(Cell::Float(v)) => {
                Err(CadenzaError::data(format!("cannot cast non-finite {v} to int")))
            }
            Some(Cell::Bool(b)) => Ok(Some(i64::from(*b))),
            Some(Cell::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| CadenzaError::data(format!("invalid int literal {s:?}"))),
            Some(Cell::Time(_)) => Err(CadenzaError::data("cannot cast datetime to int")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ColumnData::Int(values))
}

fn cast_to_bool(data: &ColumnData) -> Result<ColumnData, CadenzaError> {
    let values = cells(data)
        .iter()
        .map(|cell| match cell {
            None => Ok(None),
            Some(Cell::Bool(b)) => Ok(Some(*b)),
            Some(Cell::Int(v)) => Ok(Some(*v != 0)),
            Some(Cell::Float(v)) => Ok(Some(*v != 0.0)),
            Some(Cell::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Some(true)),
                "false" | "0" => Ok(Some(false)),
                _ => Err(CadenzaError::data(format!("invalid bool literal {s:?}"))),
            },
            Some(Cell::Time(_)) => Err(CadenzaError::data("cannot cast datetime to bool")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ColumnData::Bool(values))
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = s.parse::<DateTime<Utc>>() {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
    }
    None
}

fn cast_to_datetime(data: &ColumnData) -> Result<ColumnData, CadenzaError> {
    let values = cells(data)
        .iter()
        .map(|cell| match cell {
            None => Ok(None),
            Some(Cell::Time(ts)) => Ok(Some(*ts)),
            Some(Cell::Text(s)) => parse_datetime(s.trim())
                .map(Some)
                .ok_or_else(|| CadenzaError::data(format!("invalid datetime literal {s:?}"))),
            // Integers are taken as epoch seconds.
            Some(Cell::Int(v)) => DateTime::from_timestamp(*v, 0)
                .map(Some)
                .ok_or_else(|| CadenzaError::data(format!("epoch seconds {v} out of range"))),
            Some(Cell::Float(_)) => Err(CadenzaError::data("cannot cast float to datetime")),
            Some(Cell::Bool(_)) => Err(CadenzaError::data("cannot cast bool to datetime")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ColumnData::DateTime(values))
}

fn cast_to_str(data: &ColumnData) -> ColumnData {
    ColumnData::Str((0..data.len()).map(|row| data.render(row)).collect())
}

fn code_of(index: usize) -> Result<u32, CadenzaError> {
    u32::try_from(index).map_err(|_| CadenzaError::data("too many categories"))
}

/// Unordered categorical: coerce to string representation first, then
/// dictionary-encode against the lexically sorted label set.
fn cast_to_categorical(data: &ColumnData) -> Result<ColumnData, CadenzaError> {
    let rendered: Vec<Option<String>> = (0..data.len()).map(|row| data.render(row)).collect();
    let mut categories: Vec<String> = rendered.iter().flatten().cloned().collect();
    categories.sort();
    categories.dedup();
    let codes = rendered
        .iter()
        .map(|value| match value {
            None => Ok(None),
            Some(label) => match categories.binary_search(label) {
                Ok(idx) => code_of(idx).map(Some),
                Err(_) => Err(CadenzaError::data("category lookup failed")),
            },
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ColumnData::Categorical { codes, categories, ordered: false })
}

/// Ordered categorical: no stringification. Category order follows the
/// natural order of the underlying values, and an already-categorical
/// column keeps its category set with the ordered flag set.
fn cast_to_ordered_categorical(data: &ColumnData) -> Result<ColumnData, CadenzaError> {
    match data {
        ColumnData::Categorical { codes, categories, .. } => Ok(ColumnData::Categorical {
            codes: codes.clone(),
            categories: categories.clone(),
            ordered: true,
        }),
        ColumnData::Float(values) => {
            let mut uniq: Vec<f64> = values.iter().copied().flatten().collect();
            uniq.sort_by(f64::total_cmp);
            uniq.dedup();
            let codes = values
                .iter()
                .map(|value| match value {
                    None => Ok(None),
                    Some(v) => match uniq.binary_search_by(|probe| probe.total_cmp(v)) {
                        Ok(idx) => code_of(idx).map(Some),
                        Err(_) => Err(CadenzaError::data("category lookup failed")),
                    },
                })
                .collect::<Result<Vec<_>, _>>()?;
            let categories = uniq.iter().map(|v| v.to_string()).collect();
            Ok(ColumnData::Categorical { codes, categories, ordered: true })
        }
        ColumnData::Int(values) => ordered_from_sortable(values, |v| v.to_string()),
        ColumnData::Bool(values) => ordered_from_sortable(values, |b| b.to_string()),
        ColumnData::DateTime(values) => {
            ordered_from_sortable(values, |ts: &DateTime<Utc>| ts.to_rfc3339())
        }
        ColumnData::Str(values) => ordered_from_sortable(values, Clone::clone),
    }
}

fn ordered_from_sortable<T, F>(
    values: &[Option<T>],
    render: F,
) -> Result<ColumnData, CadenzaError>
where
    T: Ord + Clone,
    F: Fn(&T) -> String,
{
    let mut uniq: Vec<T> = values.iter().flatten().cloned().collect();
    uniq.sort();
    uniq.dedup();
    let codes = values
        .iter()
        .map(|value| match value {
            None => Ok(None),
            Some(v) => match uniq.binary_search(v) {
                Ok(idx) => code_of(idx).map(Some),
                Err(_) => Err(CadenzaError::data("category lookup failed")),
            },
        })
        .collect::<Result<Vec<_>, _>>()?;
    let categories = uniq.iter().map(render).collect();
    Ok(ColumnData::Categorical { codes, categories, ordered: true })
}
