//! Field schema — which fields a view exposes, their kinds, and which ones
//! text search looks at.
//!
//! The schema is the only place that knows how raw user input maps onto a
//! field. Coercion never fails loudly: input that does not parse for the
//! field's kind yields `None`, which callers treat as "no bound" or "absent".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::OwnedValue;

/// Value kind of a field. Drives comparator selection and input coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text, compared lexicographically.
    Text,
    /// A small closed set of values (status, category, movement).
    Category,
    Number,
    Date,
}

impl FieldKind {
    /// Whether values of this kind are text (search and selectors apply).
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Text | Self::Category)
    }

    /// Whether a range filter can apply to this kind.
    pub fn is_rangeable(self) -> bool {
        matches!(self, Self::Number | Self::Date)
    }
}

/// One field of a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    /// Included in case-insensitive text search.
    #[serde(default)]
    pub searchable: bool,
    /// Column heading; falls back to `name`.
    #[serde(default)]
    pub label: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            searchable: false,
            label: None,
        }
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Ordered set of field specs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.field(name).map(|f| f.kind)
    }

    pub fn searchable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.searchable)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Coerce raw input for `name` into a typed value.
    ///
    /// Returns `None` for unknown fields, empty input, and input that does
    /// not parse for the field's kind.
    pub fn coerce(&self, name: &str, raw: &str) -> Option<OwnedValue> {
        let kind = self.kind_of(name)?;
        coerce_kind(kind, raw)
    }
}

/// Coerce raw text into a value of the given kind.
pub fn coerce_kind(kind: FieldKind, raw: &str) -> Option<OwnedValue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match kind {
        FieldKind::Text | FieldKind::Category => Some(OwnedValue::Text(raw.to_string())),
        FieldKind::Number => parse_number(raw).map(OwnedValue::Number),
        FieldKind::Date => parse_date(raw).map(OwnedValue::Date),
    }
}

/// Lenient number parsing: accepts a leading `+`, thousands separators and a
/// trailing `%`. Non-finite results are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// ISO `YYYY-MM-DD`, with an RFC 3339 timestamp accepted by truncation.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("symbol", FieldKind::Text).searchable(),
            FieldSpec::new("movement", FieldKind::Category),
            FieldSpec::new("change", FieldKind::Number).labeled("Chg %"),
            FieldSpec::new("listed", FieldKind::Date),
        ])
    }

    #[test]
    fn lookup_and_kinds() {
        let s = schema();
        assert_eq!(s.kind_of("change"), Some(FieldKind::Number));
        assert_eq!(s.kind_of("nope"), None);
        assert_eq!(s.field("change").unwrap().display_label(), "Chg %");
        assert_eq!(s.field("symbol").unwrap().display_label(), "symbol");
        let searchable: Vec<&str> = s.searchable_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(searchable, vec!["symbol"]);
    }

    #[test]
    fn coerce_numbers_leniently() {
        let s = schema();
        assert_eq!(s.coerce("change", "+1.5"), Some(OwnedValue::Number(1.5)));
        assert_eq!(s.coerce("change", "1,200"), Some(OwnedValue::Number(1200.0)));
        assert_eq!(s.coerce("change", "2.5%"), Some(OwnedValue::Number(2.5)));
        assert_eq!(s.coerce("change", "abc"), None);
        assert_eq!(s.coerce("change", "NaN"), None);
        assert_eq!(s.coerce("change", "   "), None);
    }

    #[test]
    fn coerce_dates() {
        let s = schema();
        let d = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(s.coerce("listed", "2024-05-01"), Some(OwnedValue::Date(d)));
        assert_eq!(
            s.coerce("listed", "2024-05-01T10:00:00Z"),
            Some(OwnedValue::Date(d))
        );
        assert_eq!(s.coerce("listed", "05/01/2024"), None);
    }

    #[test]
    fn coerce_unknown_field_is_none() {
        assert_eq!(schema().coerce("ghost", "1"), None);
    }

    #[test]
    fn schema_from_toml_shape() {
        let json = r#"{"fields":[{"name":"status","kind":"category"}]}"#;
        let s: Schema = serde_json::from_str(json).unwrap();
        assert_eq!(s.fields[0].kind, FieldKind::Category);
        assert!(!s.fields[0].searchable);
    }
}
