use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseCodeError;

/// Native sampling frequency of a column, as a fixed total order.
///
/// Ordering follows the ordinal lattice: `Day` is the finest resolution,
/// `Unspecified` the coarsest. Ordinal comparison is the only semantics the
/// lattice carries; no calendar arithmetic is implied by the ordinal itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// Daily sampling.
    Day,
    /// Weekly sampling.
    Week,
    /// Monthly sampling.
    Month,
    /// Quarterly sampling.
    Quarter,
    /// Yearly sampling.
    Year,
    /// No sampling frequency declared for the column.
    Unspecified,
}

impl Frequency {
    /// Comparable ordinal: `Day` = 8 down to `Unspecified` = 0.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Day => 8,
            Self::Week => 7,
            Self::Month => 6,
            Self::Quarter => 5,
            Self::Year => 4,
            Self::Unspecified => 0,
        }
    }

    /// Single-letter period code as it appears in catalog entries, or `None`
    /// for [`Frequency::Unspecified`].
    #[must_use]
    pub const fn code(self) -> Option<&'static str> {
        match self {
            Self::Day => Some("D"),
            Self::Week => Some("W"),
            Self::Month => Some("M"),
            Self::Quarter => Some("Q"),
            Self::Year => Some("Y"),
            Self::Unspecified => None,
        }
    }

    /// Parse an optional catalog code; empty and missing both mean
    /// [`Frequency::Unspecified`].
    ///
    /// # Errors
    /// Returns [`ParseCodeError`] for any code outside `D|W|M|Q|Y`.
    pub fn from_code(code: Option<&str>) -> Result<Self, ParseCodeError> {
        match code {
            None | Some("") => Ok(Self::Unspecified),
            Some(c) => c.parse(),
        }
    }
}

impl PartialOrd for Frequency {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frequency {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl FromStr for Frequency {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "D" => Ok(Self::Day),
            "W" => Ok(Self::Week),
            "M" => Ok(Self::Month),
            "Q" => Ok(Self::Quarter),
            "Y" => Ok(Self::Year),
            other => Err(ParseCodeError::frequency(other)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code().unwrap_or("unspecified"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_form_the_documented_lattice() {
        assert!(Frequency::Day > Frequency::Week);
        assert!(Frequency::Week > Frequency::Month);
        assert!(Frequency::Month > Frequency::Quarter);
        assert!(Frequency::Quarter > Frequency::Year);
        assert!(Frequency::Year > Frequency::Unspecified);
        assert_eq!(Frequency::Day.ordinal(), 8);
        assert_eq!(Frequency::Unspecified.ordinal(), 0);
    }

    #[test]
    fn codes_round_trip() {
        for f in [
            Frequency::Day,
            Frequency::Week,
            Frequency::Month,
            Frequency::Quarter,
            Frequency::Year,
        ] {
            assert_eq!(Frequency::from_code(f.code()).unwrap(), f);
        }
        assert_eq!(
            Frequency::from_code(None).unwrap(),
            Frequency::Unspecified
        );
        assert_eq!(
            Frequency::from_code(Some("")).unwrap(),
            Frequency::Unspecified
        );
        assert!(Frequency::from_code(Some("H")).is_err());
    }
}
