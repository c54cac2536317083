//! Catalog-driven table operations: column classification, type casting,
//! frequency-aware merging, sparse re-expression, and SQL schema text.

pub mod cast;
pub mod classify;
pub mod merge;
pub mod schema;
pub mod sparse;
pub(crate) mod util;
