use cadenza_core::{
    CALENDAR_DATE, CadenzaError, Catalog, Column, ColumnData, Frame, FreqSort, MergeHow,
    TimeIndex, merge_all, merge_frames, sort_by_frequency,
};
use chrono::{DateTime, Utc};

fn at(date: &str) -> DateTime<Utc> {
    format!("{date}T00:00:00Z").parse().unwrap()
}

fn catalog() -> Catalog {
    let exact = r#"{
        "calendardate": { "dtype": "datetime" },
        "close": { "dtype": "float", "freq": "D" },
        "fx_usd": { "dtype": "float", "freq": "D" },
        "revenue": { "dtype": "float", "freq": "Q" },
        "mcap": { "dtype": "float", "freq": "M" }
    }"#;
    Catalog::from_json(exact, "{}").unwrap()
}

fn daily_close(dates: &[&str], values: &[f64]) -> Frame {
    let index = TimeIndex::named(CALENDAR_DATE, dates.iter().map(|d| at(d)).collect());
    let close = Column::float("close", values.iter().copied().map(Some).collect());
    Frame::with_index(index, vec![close]).unwrap()
}

fn floats(frame: &Frame, name: &str) -> Vec<Option<f64>> {
    match frame.column(name).expect("column present").data() {
        ColumnData::Float(v) => v.clone(),
        other => panic!("expected float column, got {other:?}"),
    }
}

fn index_dates(frame: &Frame) -> Vec<DateTime<Utc>> {
    frame.time_index().expect("indexed").values().to_vec()
}

#[test]
fn finer_left_joins_on_period_key_and_keeps_native_dates() {
    let left = daily_close(&["2024-04-03", "2024-04-04"], &[1.0, 2.0]);
    let right = Frame::with_index(
        TimeIndex::named("date", vec![at("2024-04-01"), at("2024-07-01")]),
        vec![Column::float("revenue", vec![Some(10.0), Some(20.0)])],
    )
    .unwrap();

    let merged = merge_frames(&left, &right, MergeHow::Outer, &catalog()).unwrap();

    // Left rows surface under their own daily timestamps; the Q3 row on the
    // right has no left counterpart and surfaces under its period key.
    assert_eq!(merged.time_index().unwrap().name(), Some(CALENDAR_DATE));
    assert_eq!(
        index_dates(&merged),
        vec![at("2024-04-03"), at("2024-04-04"), at("2024-07-01")]
    );
    assert_eq!(floats(&merged, "close"), vec![Some(1.0), Some(2.0), None]);
    assert_eq!(floats(&merged, "revenue"), vec![Some(10.0), Some(10.0), Some(20.0)]);
    // Join keys are transient; only the named index carries the dates.
    assert!(merged.column("date").is_none());
}

#[test]
fn finer_left_left_mode_drops_right_only_rows() {
    let left = daily_close(&["2024-04-03", "2024-04-04"], &[1.0, 2.0]);
    let right = Frame::with_index(
        TimeIndex::named("date", vec![at("2024-04-01"), at("2024-07-01")]),
        vec![Column::float("revenue", vec![Some(10.0), Some(20.0)])],
    )
    .unwrap();

    let merged = merge_frames(&left, &right, MergeHow::Left, &catalog()).unwrap();
    assert_eq!(index_dates(&merged), vec![at("2024-04-03"), at("2024-04-04")]);
    assert_eq!(floats(&merged, "revenue"), vec![Some(10.0), Some(10.0)]);
}

#[test]
fn equal_frequency_outer_takes_the_key_union() {
    let left = daily_close(&["2024-01-02", "2024-01-03"], &[1.0, 2.0]);
    let right = Frame::with_index(
        TimeIndex::named("date", vec![at("2024-01-03"), at("2024-01-04")]),
        vec![Column::float("fx_usd", vec![Some(1.1), Some(1.2)])],
    )
    .unwrap();

    let merged = merge_frames(&left, &right, MergeHow::Outer, &catalog()).unwrap();
    assert_eq!(
        index_dates(&merged),
        vec![at("2024-01-02"), at("2024-01-03"), at("2024-01-04")]
    );
    assert_eq!(floats(&merged, "close"), vec![Some(1.0), Some(2.0), None]);
    assert_eq!(floats(&merged, "fx_usd"), vec![None, Some(1.1), Some(1.2)]);
}

#[test]
fn equal_frequency_first_right_row_wins_duplicate_timestamps() {
    let left = daily_close(&["2024-01-02"], &[1.0]);
    let right = Frame::with_index(
        TimeIndex::named("date", vec![at("2024-01-02"), at("2024-01-02")]),
        vec![Column::float("fx_usd", vec![Some(1.1), Some(9.9)])],
    )
    .unwrap();

    let merged = merge_frames(&left, &right, MergeHow::Outer, &catalog()).unwrap();
    assert_eq!(floats(&merged, "fx_usd"), vec![Some(1.1)]);
}

#[test]
fn coarser_left_collapses_right_to_last_observation_per_period() {
    let left = Frame::with_index(
        TimeIndex::named(CALENDAR_DATE, vec![at("2024-01-01"), at("2024-04-01")]),
        vec![Column::float("revenue", vec![Some(10.0), Some(20.0)])],
    )
    .unwrap();
    let right = Frame::with_index(
        TimeIndex::named("date", vec![at("2024-02-10"), at("2024-03-05"), at("2024-05-01")]),
        vec![Column::float("close", vec![Some(1.0), Some(2.0), Some(3.0)])],
    )
    .unwrap();

    let merged = merge_frames(&left, &right, MergeHow::Outer, &catalog()).unwrap();

    // One collapsed observation per quarter; the interior 2024-02-10 row
    // never surfaces on its own.
    assert_eq!(index_dates(&merged), vec![at("2024-01-01"), at("2024-04-01")]);
    assert_eq!(floats(&merged, "close"), vec![Some(2.0), Some(3.0)]);
    assert_eq!(floats(&merged, "revenue"), vec![Some(10.0), Some(20.0)]);
}

#[test]
fn coarser_left_skips_nulls_when_collapsing() {
    let left = Frame::with_index(
        TimeIndex::named(CALENDAR_DATE, vec![at("2024-01-01")]),
        vec![Column::float("revenue", vec![Some(10.0)])],
    )
    .unwrap();
    let right = Frame::with_index(
        TimeIndex::named("date", vec![at("2024-02-10"), at("2024-03-05")]),
        vec![Column::float("close", vec![Some(1.0), None])],
    )
    .unwrap();

    let merged = merge_frames(&left, &right, MergeHow::Outer, &catalog()).unwrap();
    assert_eq!(floats(&merged, "close"), vec![Some(1.0)]);
}

#[test]
fn merged_columns_are_recast_through_the_catalog() {
    // Revenue arrives as int storage; the catalog says float, and the merge
    // result passes back through the caster.
    let left = daily_close(&["2024-04-03"], &[1.0]);
    let right = Frame::with_index(
        TimeIndex::named("date", vec![at("2024-04-01")]),
        vec![Column::int("revenue", vec![Some(10)])],
    )
    .unwrap();

    let merged = merge_frames(&left, &right, MergeHow::Outer, &catalog()).unwrap();
    assert_eq!(floats(&merged, "revenue"), vec![Some(10.0)]);
}

#[test]
fn shared_column_name_is_rejected() {
    let left = daily_close(&["2024-01-02"], &[1.0]);
    let right = daily_close(&["2024-01-02"], &[2.0]);
    let err = merge_frames(&left, &right, MergeHow::Outer, &catalog());
    assert!(matches!(err, Err(CadenzaError::Data(_))));
}

#[test]
fn unindexed_input_is_rejected() {
    let left = daily_close(&["2024-01-02"], &[1.0]);
    let right = Frame::new(vec![Column::float("revenue", vec![Some(1.0)])]).unwrap();
    let err = merge_frames(&left, &right, MergeHow::Outer, &catalog());
    assert!(matches!(err, Err(CadenzaError::InvalidArg(_))));
}

#[test]
fn sort_by_frequency_orders_by_lowest_ordinal() {
    let quarterly = Frame::with_index(
        TimeIndex::named(CALENDAR_DATE, vec![at("2024-01-01")]),
        vec![Column::float("revenue", vec![Some(10.0)])],
    )
    .unwrap();
    let daily = daily_close(&["2024-01-02"], &[1.0]);

    let sorted = sort_by_frequency(
        vec![quarterly.clone(), daily.clone()],
        FreqSort::HighestFirst,
        &catalog(),
    );
    assert!(sorted[0].column("close").is_some());

    let sorted = sort_by_frequency(vec![daily, quarterly], FreqSort::LowestFirst, &catalog());
    assert!(sorted[0].column("revenue").is_some());
}

#[test]
fn merge_all_folds_pairwise_after_sorting() {
    let daily = daily_close(&["2024-04-03"], &[1.0]);
    let monthly = Frame::with_index(
        TimeIndex::named("date", vec![at("2024-04-01")]),
        vec![Column::float("mcap", vec![Some(5.0)])],
    )
    .unwrap();
    let quarterly = Frame::with_index(
        TimeIndex::named("qdate", vec![at("2024-04-01")]),
        vec![Column::float("revenue", vec![Some(10.0)])],
    )
    .unwrap();

    // HighestFirst puts the daily table on the far left, so every later
    // merge runs the finer-left strategy.
    let merged = merge_all(
        vec![quarterly, daily, monthly],
        MergeHow::Outer,
        FreqSort::HighestFirst,
        &catalog(),
    )
    .unwrap();
    assert_eq!(index_dates(&merged), vec![at("2024-04-03")]);
    assert_eq!(floats(&merged, "close"), vec![Some(1.0)]);
    assert_eq!(floats(&merged, "mcap"), vec![Some(5.0)]);
    assert_eq!(floats(&merged, "revenue"), vec![Some(10.0)]);
}

#[test]
fn merge_all_of_nothing_is_an_error() {
    let err = merge_all(vec![], MergeHow::Outer, FreqSort::HighestFirst, &catalog());
    assert!(matches!(err, Err(CadenzaError::InvalidArg(_))));
}
