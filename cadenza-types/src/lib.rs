//! Column-metadata primitives and catalog configuration shapes shared across
//! the cadenza workspace.
#![warn(missing_docs)]

mod config;
mod dtype;
mod error;
mod frequency;
mod spec;

pub use config::{AggObs, FreqSort, MergeHow, RawCatalogEntry, SparseKind};
pub use dtype::DataType;
pub use error::ParseCodeError;
pub use frequency::Frequency;
pub use spec::ColumnSpec;
