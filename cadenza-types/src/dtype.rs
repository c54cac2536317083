use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseCodeError;

/// Logical data type a column can be cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit floating point.
    Float,
    /// 64-bit signed integer.
    Int,
    /// Boolean.
    Bool,
    /// UTC timestamp.
    DateTime,
    /// Free-form string.
    Str,
    /// Dictionary-encoded unordered categorical.
    Categorical,
    /// Dictionary-encoded ordered categorical.
    CategoricalOrdered,
}

impl DataType {
    /// SQL-facing type string used when no explicit override is configured.
    ///
    /// Anything without a dedicated SQL representation falls back to
    /// `varchar(25)`.
    #[must_use]
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::Float => "double",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::DateTime => "datetime",
            Self::Str | Self::Categorical | Self::CategoricalOrdered => "varchar(25)",
        }
    }

    /// Catalog code for this type.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::DateTime => "datetime",
            Self::Str => "str",
            Self::Categorical => "category",
            Self::CategoricalOrdered => "categoryO",
        }
    }
}

impl FromStr for DataType {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float" => Ok(Self::Float),
            "int" => Ok(Self::Int),
            "bool" => Ok(Self::Bool),
            // Accept the ns-precision spelling used by legacy catalogs.
            "datetime" | "datetime64[ns]" => Ok(Self::DateTime),
            "str" => Ok(Self::Str),
            "category" => Ok(Self::Categorical),
            "categoryO" => Ok(Self::CategoricalOrdered),
            other => Err(ParseCodeError::dtype(other)),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_fallback_is_varchar() {
        assert_eq!(DataType::Float.sql_type(), "double");
        assert_eq!(DataType::Str.sql_type(), "varchar(25)");
        assert_eq!(DataType::Categorical.sql_type(), "varchar(25)");
        assert_eq!(DataType::CategoricalOrdered.sql_type(), "varchar(25)");
    }

    #[test]
    fn legacy_datetime_spelling_parses() {
        assert_eq!(
            "datetime64[ns]".parse::<DataType>().unwrap(),
            DataType::DateTime
        );
        assert!("decimal".parse::<DataType>().is_err());
    }
}
