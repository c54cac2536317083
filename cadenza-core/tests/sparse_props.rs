use cadenza_core::{Catalog, Column, ColumnData, Frame, SparseKind, TimeIndex, sparsify};
use chrono::{DateTime, Datelike, Utc};
use proptest::prelude::*;

fn catalog() -> Catalog {
    let exact = r#"{
        "close": { "dtype": "float", "freq": "D" },
        "mcap": { "dtype": "float", "freq": "M" }
    }"#;
    Catalog::from_json(exact, "{}").unwrap()
}

fn at(date: &str) -> DateTime<Utc> {
    format!("{date}T00:00:00Z").parse().unwrap()
}

fn floats(frame: &Frame, name: &str) -> Vec<Option<f64>> {
    match frame.column(name).expect("column present").data() {
        ColumnData::Float(v) => v.clone(),
        other => panic!("expected float column, got {other:?}"),
    }
}

fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut carried = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                carried = *v;
            }
            carried
        })
        .collect()
}

proptest! {
    #[test]
    fn sparsify_then_forward_fill_reconstructs_the_dense_table(
        close in proptest::collection::vec(-1.0e6f64..1.0e6, 1..150),
        month_vals in proptest::collection::vec(-1.0e6f64..1.0e6, 8),
    ) {
        // A dense daily table whose monthly column is the forward-filled
        // image of one observation per month.
        let start = at("2024-01-01");
        let dates: Vec<DateTime<Utc>> = (0..close.len() as i64)
            .map(|i| start + chrono::Duration::days(i))
            .collect();
        let mcap: Vec<Option<f64>> = dates
            .iter()
            .map(|ts| Some(month_vals[ts.month0() as usize]))
            .collect();
        let dense = Frame::with_index(
            TimeIndex::named("calendardate", dates.clone()),
            vec![
                Column::float("close", close.iter().copied().map(Some).collect()),
                Column::float("mcap", mcap.clone()),
            ],
        )
        .unwrap();

        let sparse = sparsify(&dense, SparseKind::First, &catalog()).unwrap();

        // The dense daily column keeps every row alive, so the index
        // survives unchanged and forward-filling the sparse monthly column
        // recovers the dense one exactly.
        prop_assert_eq!(sparse.time_index().unwrap().values(), &dates[..]);
        let expected_close: Vec<Option<f64>> = close.iter().copied().map(Some).collect();
        prop_assert_eq!(floats(&sparse, "close"), expected_close);
        prop_assert_eq!(forward_fill(&floats(&sparse, "mcap")), mcap);
    }
}
