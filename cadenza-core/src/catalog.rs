//! The validated pattern catalog: an exact-name map plus ordered regex
//! rules, both resolving column names to metadata.
//!
//! Catalogs are explicit, passed-in configuration objects. They are
//! validated fully at construction so classification never has to handle a
//! malformed entry, and they are read-only afterwards, so sharing one catalog
//! across concurrent classifications is safe.

use std::collections::BTreeMap;
use std::str::FromStr;

use cadenza_types::{DataType, Frequency, RawCatalogEntry};
use regex::Regex;

use crate::error::CadenzaError;

/// A validated exact-match entry. Exact entries always carry a concrete
/// data type.
#[derive(Debug, Clone)]
pub struct ExactEntry {
    /// Logical type for the column.
    pub dtype: DataType,
    /// Declared sampling frequency.
    pub freq: Frequency,
    /// Explicit SQL type override, if any.
    pub dtype_sql: Option<String>,
}

/// A validated regex rule. Fields other than the pattern are optional: when
/// the rule resolves against an exact base entry, only its specified fields
/// override the base.
#[derive(Debug, Clone)]
pub struct RegexRule {
    pattern: Regex,
    /// Logical type, when the rule specifies one.
    pub dtype: Option<DataType>,
    /// Sampling frequency, when the rule specifies one.
    pub freq: Option<Frequency>,
    /// Explicit SQL type override, if any.
    pub dtype_sql: Option<String>,
    /// Whether the pattern denotes a qualifying suffix rather than a
    /// qualifying prefix.
    pub is_suffix: bool,
}

impl RegexRule {
    /// The source pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// True when the pattern occurs in `name`.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// `name` with every pattern occurrence removed, recovering the
    /// canonical base name (e.g. stripping a difference-transform suffix).
    #[must_use]
    pub fn cleaned(&self, name: &str) -> String {
        self.pattern.replace_all(name, "").into_owned()
    }
}

/// The pattern catalog: exact-name entries plus regex rules.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    exact: BTreeMap<String, ExactEntry>,
    regex: Vec<RegexRule>,
}

impl Catalog {
    /// Validate raw entries into a catalog.
    ///
    /// Regex rules are ordered by pattern text, which keeps classification
    /// deterministic for a given catalog.
    ///
    /// # Errors
    /// Returns `CadenzaError::Config` when:
    /// - an exact entry carries `is_suffix` or lacks a concrete dtype,
    /// - a dtype or frequency code is unknown,
    /// - a pattern fails to compile,
    /// - a regex pattern matches an exact-match key (the two tables must
    ///   not overlap).
    pub fn new(
        exact: BTreeMap<String, RawCatalogEntry>,
        regex: BTreeMap<String, RawCatalogEntry>,
    ) -> Result<Self, CadenzaError> {
        let mut exact_entries = BTreeMap::new();
        for (name, raw) in exact {
            if raw.is_suffix.is_some() {
                return Err(CadenzaError::config(format!(
                    "exact entry {name} must not carry is_suffix; the flag is only valid on regex entries"
                )));
            }
            let dtype = parse_dtype(&raw.dtype)?.ok_or_else(|| {
                CadenzaError::config(format!("exact entry {name} must specify a concrete dtype"))
            })?;
            let freq = Frequency::from_code(raw.freq.as_deref())?;
            exact_entries.insert(
                name,
                ExactEntry { dtype, freq, dtype_sql: none_if_empty(raw.dtype_sql) },
            );
        }

        let mut rules = Vec::new();
        for (pattern, raw) in regex {
            let pattern = Regex::new(&pattern)?;
            let freq = match raw.freq.as_deref() {
                None | Some("") => None,
                Some(code) => Some(Frequency::from_str(code)?),
            };
            rules.push(RegexRule {
                pattern,
                dtype: parse_dtype(&raw.dtype)?,
                freq,
                dtype_sql: none_if_empty(raw.dtype_sql),
                is_suffix: raw.is_suffix.unwrap_or(false),
            });
        }

        // The two tables must not overlap: an exact key matched by a regex
        // pattern would make classification order-dependent.
        for name in exact_entries.keys() {
            for rule in &rules {
                if rule.matches(name) {
                    return Err(CadenzaError::config(format!(
                        "exact column {name} matches regex pattern {}; regex patterns cannot overlap with exact keys",
                        rule.pattern()
                    )));
                }
            }
        }

        Ok(Self { exact: exact_entries, regex: rules })
    }

    /// Build a catalog from the two mappings as JSON objects, shaped
    /// `{ column_or_pattern: { dtype, freq?, dtype_sql?, is_suffix? } }`.
    ///
    /// # Errors
    /// Returns `CadenzaError::Config` on malformed JSON or entries, plus
    /// every validation failure of [`Catalog::new`].
    pub fn from_json(exact_json: &str, regex_json: &str) -> Result<Self, CadenzaError> {
        let exact: BTreeMap<String, RawCatalogEntry> = serde_json::from_str(exact_json)
            .map_err(|e| CadenzaError::config(format!("malformed exact catalog: {e}")))?;
        let regex: BTreeMap<String, RawCatalogEntry> = serde_json::from_str(regex_json)
            .map_err(|e| CadenzaError::config(format!("malformed regex catalog: {e}")))?;
        Self::new(exact, regex)
    }

    /// Look up an exact-match entry.
    #[must_use]
    pub fn exact(&self, name: &str) -> Option<&ExactEntry> {
        self.exact.get(name)
    }

    /// Regex rules in deterministic (pattern-sorted) order.
    #[must_use]
    pub fn regex_rules(&self) -> &[RegexRule] {
        &self.regex
    }
}

fn parse_dtype(code: &str) -> Result<Option<DataType>, CadenzaError> {
    if code.is_empty() {
        return Ok(None);
    }
    Ok(Some(DataType::from_str(code)?))
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
