use thiserror::Error;

/// Failure to parse a catalog code into a typed value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseCodeError {
    /// The frequency code is not one of `D|W|M|Q|Y`.
    #[error("unknown frequency code: {code:?} (expected one of D, W, M, Q, Y)")]
    Frequency {
        /// The offending code.
        code: String,
    },

    /// The dtype code is not a recognized logical type.
    #[error("unknown dtype code: {code:?}")]
    DataType {
        /// The offending code.
        code: String,
    },
}

impl ParseCodeError {
    pub(crate) fn frequency(code: impl Into<String>) -> Self {
        Self::Frequency { code: code.into() }
    }

    pub(crate) fn dtype(code: impl Into<String>) -> Self {
        Self::DataType { code: code.into() }
    }
}
