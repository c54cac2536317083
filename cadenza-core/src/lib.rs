//! cadenza-core
//!
//! Core engine of the cadenza ecosystem: a column-name catalog, a typed
//! column-major table model, and the catalog-driven table operations built
//! on top of them.
//!
//! - `catalog`: compiled classification catalog (exact names + regex rules).
//! - `frame`: `Frame`, `Column`, `ColumnData`, and the timestamp index.
//! - `period`: calendar-period arithmetic shared by the table operations.
//! - `tables`: classification, casting, frequency-aware merging, sparse
//!   re-expression, and `CREATE TABLE` schema text.
//!
//! Columns are classified by name through a [`Catalog`], which assigns each
//! one a logical type and a native sampling frequency. Every table
//! operation leans on that classification rather than inspecting cell
//! values, so the catalog is the single source of truth for what a column
//! *is*.
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod frame;
pub mod period;
pub mod tables;

pub use catalog::Catalog;
pub use error::CadenzaError;
pub use frame::{Column, ColumnData, Frame, TimeIndex};
pub use tables::cast::cast_frame;
pub use tables::classify::{FreqSummary, classify_column, classify_frame, frequency_summary};
pub use tables::merge::{CALENDAR_DATE, merge_all, merge_frames, sort_by_frequency};
pub use tables::schema::create_table_sql;
pub use tables::sparse::{collapse_to_lowest, sparsify};

pub use cadenza_types::{
    AggObs, ColumnSpec, DataType, FreqSort, Frequency, MergeHow, ParseCodeError, RawCatalogEntry,
    SparseKind,
};
