//! Column and table classification: resolve column names to [`ColumnSpec`]s
//! through the pattern catalog, and derive per-table frequency aggregates.

use cadenza_types::{ColumnSpec, Frequency};

use crate::catalog::{Catalog, ExactEntry, RegexRule};
use crate::frame::Frame;

struct RegexMatch<'a> {
    rule: &'a RegexRule,
    cleaned: String,
}

/// Resolve one column name to exactly one [`ColumnSpec`].
///
/// Exact matches always win over regex matching. Regex conflicts are
/// resolved by an ordered rule table: a unique non-suffix match is preferred
/// over suffix matches (logged at info); anything still ambiguous, an
/// unmatched name, or a suffix match whose cleaned base name is not
/// catalog-listed falls back to the `{float, Day}` default spec (logged at
/// warn, `is_default` set).
#[must_use]
pub fn classify_column(name: &str, catalog: &Catalog) -> ColumnSpec {
    if let Some(entry) = catalog.exact(name) {
        return spec_from_exact(name, entry);
    }

    let matches: Vec<RegexMatch<'_>> = catalog
        .regex_rules()
        .iter()
        .filter(|rule| rule.matches(name))
        .map(|rule| RegexMatch { rule, cleaned: rule.cleaned(name) })
        .collect();
    let non_suffix: Vec<&RegexMatch<'_>> =
        matches.iter().filter(|m| !m.rule.is_suffix).collect();

    // Ordered rule table; first matching rule wins.
    let selected = match (matches.len(), non_suffix.len()) {
        (0, _) => {
            tracing::warn!(column = %name, "no catalog match; defaulting to float, D");
            return ColumnSpec::fallback(name);
        }
        (1, _) => &matches[0],
        (_, 1) => {
            tracing::info!(
                column = %name,
                patterns = ?matches.iter().map(|m| m.rule.pattern()).collect::<Vec<_>>(),
                chosen = %non_suffix[0].rule.pattern(),
                "multiple patterns matched; using the single non-suffix pattern"
            );
            non_suffix[0]
        }
        _ => {
            tracing::warn!(
                column = %name,
                patterns = ?matches.iter().map(|m| m.rule.pattern()).collect::<Vec<_>>(),
                "ambiguous regex matches; defaulting to float, D"
            );
            return ColumnSpec::fallback(name);
        }
    };

    if let Some(base) = catalog.exact(&selected.cleaned) {
        return spec_overlay(name, base, selected.rule);
    }

    if selected.rule.is_suffix {
        // A suffix alone says "this is a transform of something" without
        // saying of what; unresolvable base names carry no information.
        tracing::warn!(
            column = %name,
            cleaned = %selected.cleaned,
            "suffix recognized but base name is not catalog-listed; defaulting to float, D"
        );
        return ColumnSpec::fallback(name);
    }

    spec_from_rule(name, selected.rule)
}

fn spec_from_exact(name: &str, entry: &ExactEntry) -> ColumnSpec {
    ColumnSpec::new(name, entry.dtype, entry.freq, entry.dtype_sql.clone())
}

/// Exact base entry overlaid with the fields the regex rule specifies.
/// Unspecified rule fields keep the base values.
fn spec_overlay(name: &str, base: &ExactEntry, rule: &RegexRule) -> ColumnSpec {
    ColumnSpec::new(
        name,
        rule.dtype.unwrap_or(base.dtype),
        rule.freq.unwrap_or(base.freq),
        rule.dtype_sql.clone().or_else(|| base.dtype_sql.clone()),
    )
}

fn spec_from_rule(name: &str, rule: &RegexRule) -> ColumnSpec {
    let Some(dtype) = rule.dtype else {
        // Degenerate catalog: a prefix rule that never resolves against a
        // base entry needs its own concrete dtype to be usable.
        tracing::warn!(
            column = %name,
            pattern = %rule.pattern(),
            "matched pattern specifies no dtype; defaulting to float, D"
        );
        return ColumnSpec::fallback(name);
    };
    ColumnSpec::new(
        name,
        dtype,
        rule.freq.unwrap_or(Frequency::Unspecified),
        rule.dtype_sql.clone(),
    )
}

/// Classify every column of a table, in table column order.
#[must_use]
pub fn classify_frame(frame: &Frame, catalog: &Catalog) -> Vec<ColumnSpec> {
    frame
        .column_names()
        .map(|name| classify_column(name, catalog))
        .collect()
}

/// The coarsest and finest sampling frequencies present in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreqSummary {
    /// Coarsest frequency among the table's columns.
    pub lowest: Frequency,
    /// Finest frequency among the table's columns.
    pub highest: Frequency,
}

impl FreqSummary {
    /// Ordinal of the coarsest frequency.
    #[must_use]
    pub const fn lowest_ordinal(&self) -> u8 {
        self.lowest.ordinal()
    }

    /// Ordinal of the finest frequency.
    #[must_use]
    pub const fn highest_ordinal(&self) -> u8 {
        self.highest.ordinal()
    }
}

/// Reduce a table's column frequencies to its lowest/highest pair by
/// ordinal comparison.
///
/// Equal-ordinal ties resolve to the first column encountered in table
/// order; this is implementation-defined, not a guarantee. A table without
/// columns reports `Unspecified` for both ends.
#[must_use]
pub fn frequency_summary(frame: &Frame, catalog: &Catalog) -> FreqSummary {
    summarize(&classify_frame(frame, catalog))
}

pub(crate) fn summarize(specs: &[ColumnSpec]) -> FreqSummary {
    let mut lowest = None;
    let mut highest = None;
    for spec in specs {
        let ord = spec.freq.ordinal();
        match lowest {
            Some((best, _)) if ord >= best => {}
            _ => lowest = Some((ord, spec.freq)),
        }
        match highest {
            Some((best, _)) if ord <= best => {}
            _ => highest = Some((ord, spec.freq)),
        }
    }
    FreqSummary {
        lowest: lowest.map_or(Frequency::Unspecified, |(_, f)| f),
        highest: highest.map_or(Frequency::Unspecified, |(_, f)| f),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_types::DataType;

    #[test]
    fn summary_of_mixed_specs() {
        let specs = vec![
            ColumnSpec::new("a", DataType::Float, Frequency::Month, None),
            ColumnSpec::new("b", DataType::Float, Frequency::Day, None),
            ColumnSpec::new("c", DataType::Float, Frequency::Quarter, None),
        ];
        let summary = summarize(&specs);
        assert_eq!(summary.lowest, Frequency::Quarter);
        assert_eq!(summary.highest, Frequency::Day);
        assert_eq!(summary.lowest_ordinal(), 5);
        assert_eq!(summary.highest_ordinal(), 8);
    }

    #[test]
    fn summary_of_empty_table_is_unspecified() {
        let summary = summarize(&[]);
        assert_eq!(summary.lowest, Frequency::Unspecified);
        assert_eq!(summary.highest, Frequency::Unspecified);
    }
}
