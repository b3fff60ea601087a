//! Criteria — the current filter and sort selections of a view.
//!
//! `Criteria` is a plain value object: it is compared, cloned, serialized to
//! a URL or a state file, and fingerprinted. It holds no reference to the
//! records it is applied to.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::OwnedValue;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parse `asc`/`desc` (case-insensitive). Anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Selected sort field and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// One end of a range filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Number(f64),
    Date(NaiveDate),
}

impl Bound {
    /// Convert a coerced schema value into a bound. Text has no bound form.
    pub fn from_value(value: OwnedValue) -> Option<Self> {
        match value {
            OwnedValue::Number(n) => Some(Self::Number(n)),
            OwnedValue::Date(d) => Some(Self::Date(d)),
            OwnedValue::Text(_) => None,
        }
    }

    pub(crate) fn greater_than(&self, other: &Bound) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a > b,
            (Self::Date(a), Self::Date(b)) => a > b,
            _ => false,
        }
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Inclusive `[min, max]` range; a missing bound is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Range {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Bound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Bound>,
}

impl Range {
    /// Build a range, swapping reversed bounds.
    pub fn new(min: Option<Bound>, max: Option<Bound>) -> Self {
        match (min, max) {
            (Some(lo), Some(hi)) if lo.greater_than(&hi) => Self {
                min: Some(hi),
                max: Some(lo),
            },
            _ => Self { min, max },
        }
    }

    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// The current filter and sort selections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Criteria {
    /// Free-text search; empty matches everything.
    #[serde(default)]
    pub search: String,
    /// Categorical field -> selected value. At most one value per field.
    #[serde(default)]
    pub selectors: BTreeMap<String, String>,
    /// Range filters keyed by field.
    #[serde(default)]
    pub ranges: BTreeMap<String, Range>,
    #[serde(default)]
    pub sort: Option<SortKey>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_selector(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.selectors.insert(field.into(), value.into());
        self
    }

    pub fn with_range(mut self, field: impl Into<String>, range: Range) -> Self {
        if !range.is_open() {
            self.ranges.insert(field.into(), range);
        }
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Trimmed search text, `None` when it would match everything.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    /// Whether any predicate narrows the record set.
    pub fn has_active_filters(&self) -> bool {
        self.search_term().is_some()
            || !self.selectors.is_empty()
            || self.ranges.values().any(|r| !r.is_open())
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Stable content hash of these criteria (BLAKE3 over canonical JSON).
    ///
    /// Maps are `BTreeMap`s, so two equal criteria always serialize to the
    /// same bytes.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }

    /// Short form of [`fingerprint`](Self::fingerprint) used as a view id.
    pub fn view_id(&self) -> String {
        self.fingerprint()[..12].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let c = Criteria::default();
        assert!(c.is_default());
        assert!(!c.has_active_filters());
        assert!(c.sort.is_none());
    }

    #[test]
    fn whitespace_search_is_inactive() {
        let c = Criteria::new().with_search("   ");
        assert_eq!(c.search_term(), None);
        assert!(!c.has_active_filters());
        assert_eq!(Criteria::new().with_search(" eur ").search_term(), Some("eur"));
    }

    #[test]
    fn reversed_range_is_swapped() {
        let r = Range::new(Some(Bound::Number(5.0)), Some(Bound::Number(1.0)));
        assert_eq!(r.min, Some(Bound::Number(1.0)));
        assert_eq!(r.max, Some(Bound::Number(5.0)));
    }

    #[test]
    fn open_range_is_not_stored() {
        let c = Criteria::new().with_range("change", Range::default());
        assert!(c.ranges.is_empty());
    }

    #[test]
    fn direction_parse_and_flip() {
        assert_eq!(Direction::parse("DESC"), Some(Direction::Desc));
        assert_eq!(Direction::parse("up"), None);
        assert_eq!(Direction::Asc.flipped(), Direction::Desc);
    }

    #[test]
    fn fingerprint_is_deterministic_and_content_addressed() {
        let a = Criteria::new()
            .with_search("eur")
            .with_selector("movement", "gainers")
            .with_sort(SortKey::desc("change"));
        let b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.view_id().len(), 12);

        let c = a.clone().with_search("gbp");
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn criteria_json_defaults_missing_fields() {
        let c: Criteria = serde_json::from_str(r#"{"search":"x"}"#).unwrap();
        assert_eq!(c.search, "x");
        assert!(c.selectors.is_empty());
        assert!(c.sort.is_none());
    }
}
