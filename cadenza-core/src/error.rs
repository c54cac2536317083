//! Error type shared across the engine.

use cadenza_types::ParseCodeError;
use thiserror::Error;

/// Unified error type for the cadenza workspace.
///
/// Fatal conditions only: catalog configuration problems, caller
/// precondition violations, and unrecoverable data issues. Classification
/// ambiguity and per-column cast failures are recovered with logging and
/// never surface here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CadenzaError {
    /// The supplied catalog is malformed (bad entry shape, unknown codes,
    /// invalid or overlapping patterns).
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid input argument or violated caller precondition.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Issues with the supplied or produced data (duplicate column names,
    /// mismatched lengths, etc.).
    #[error("data issue: {0}")]
    Data(String),
}

impl CadenzaError {
    /// Helper: build a `Config` error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Helper: build an `InvalidArg` error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Helper: build a `Data` error.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }
}

impl From<ParseCodeError> for CadenzaError {
    fn from(err: ParseCodeError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<regex::Error> for CadenzaError {
    fn from(err: regex::Error) -> Self {
        Self::Config(format!("invalid catalog pattern: {err}"))
    }
}
