//! `CREATE TABLE` statement generation from a classified table.

use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::frame::Frame;
use crate::tables::classify::classify_column;

/// Build a `CREATE TABLE IF NOT EXISTS` statement matching the table's
/// classified column types.
///
/// The timestamp index becomes the leading key column, typed through the
/// catalog. Tables without a named index get a synthetic auto-increment
/// `idx` key instead. Data columns that shadow the index name are dropped
/// from the column list with a warning.
#[must_use]
pub fn create_table_sql(
    db_name: &str,
    table_name: &str,
    frame: &Frame,
    catalog: &Catalog,
) -> String {
    let (key_name, key_sql) = match frame.time_index().and_then(|ix| ix.name()) {
        Some(name) => {
            let spec = classify_column(name, catalog);
            (name.to_owned(), spec.dtype_sql)
        }
        None => {
            tracing::warn!(
                table = %table_name,
                "table has no named index; using an auto-increment idx key"
            );
            ("idx".to_owned(), "int NOT NULL AUTO_INCREMENT".to_owned())
        }
    };

    let key_names: BTreeSet<&str> = [key_name.as_str()].into();
    let shadowed: Vec<&str> = frame
        .column_names()
        .filter(|name| key_names.contains(name))
        .collect();
    if !shadowed.is_empty() {
        tracing::warn!(
            table = %table_name,
            columns = ?shadowed,
            "following columns are both in index and columns"
        );
    }

    let mut lines = Vec::with_capacity(frame.columns().len() + 1);
    lines.push(format!(" {key_name} {key_sql}"));
    for name in frame.column_names() {
        if key_names.contains(name) {
            continue;
        }
        let spec = classify_column(name, catalog);
        lines.push(format!(" {name} {} default null", spec.dtype_sql));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {db_name}.{table_name} (\n{},\n KEY `Index_1` ( {key_name} ) USING BTREE\n)\nENGINE=MyISAM DEFAULT CHARSET=utf8mb4",
        lines.join(",\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Column, TimeIndex};
    use cadenza_types::RawCatalogEntry;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn catalog() -> Catalog {
        let exact = BTreeMap::from([
            (
                "calendardate".to_owned(),
                RawCatalogEntry::dtype("datetime"),
            ),
            ("close".to_owned(), RawCatalogEntry::dtype_freq("float", "D")),
        ]);
        Catalog::new(exact, BTreeMap::new()).unwrap()
    }

    #[test]
    fn named_index_leads_the_statement() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let frame = Frame::with_index(
            TimeIndex::named("calendardate", vec![ts]),
            vec![Column::float("close", vec![Some(1.0)])],
        )
        .unwrap();
        let sql = create_table_sql("quotes", "daily", &frame, &catalog());
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS quotes.daily (\n calendardate datetime,\n"));
        assert!(sql.contains(" close double default null"));
        assert!(sql.contains("KEY `Index_1` ( calendardate ) USING BTREE"));
        assert!(sql.ends_with("ENGINE=MyISAM DEFAULT CHARSET=utf8mb4"));
    }

    #[test]
    fn unnamed_index_falls_back_to_idx() {
        let frame = Frame::new(vec![Column::float("close", vec![Some(1.0)])]).unwrap();
        let sql = create_table_sql("quotes", "daily", &frame, &catalog());
        assert!(sql.contains(" idx int NOT NULL AUTO_INCREMENT,"));
        assert!(sql.contains("KEY `Index_1` ( idx ) USING BTREE"));
    }

    #[test]
    fn shadowing_column_is_deduplicated() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let frame = Frame::with_index(
            TimeIndex::named("calendardate", vec![ts]),
            vec![
                Column::datetime("calendardate", vec![Some(ts)]),
                Column::float("close", vec![Some(1.0)]),
            ],
        )
        .unwrap();
        let sql = create_table_sql("quotes", "daily", &frame, &catalog());
        assert_eq!(sql.matches("calendardate datetime").count(), 1);
    }
}
