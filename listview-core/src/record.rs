//! Records and typed field values.
//!
//! A record is an opaque item of domain data with a stable key and a fixed
//! set of named fields. The pipeline only ever reads records through the
//! [`Record`] trait, so typed structs (currency pairs, orders, tasks) and
//! file-loaded [`DynRecord`]s go through the same filter/sort path.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A borrowed field value as seen by the predicate evaluator and comparator.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    Date(NaiveDate),
}

impl<'a> FieldValue<'a> {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn into_owned(self) -> OwnedValue {
        match self {
            Self::Text(s) => OwnedValue::Text(s.into_owned()),
            Self::Number(n) => OwnedValue::Number(n),
            Self::Date(d) => OwnedValue::Date(d),
        }
    }
}

impl std::fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// An owned field value, stored by [`DynRecord`] and produced by schema coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnedValue {
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl OwnedValue {
    pub fn as_field(&self) -> FieldValue<'_> {
        match self {
            Self::Text(s) => FieldValue::Text(Cow::Borrowed(s)),
            Self::Number(n) => FieldValue::Number(*n),
            Self::Date(d) => FieldValue::Date(*d),
        }
    }
}

/// Read access to one item of the displayed collection.
///
/// `field` returns `None` when the record has no value for `name`. Derived
/// fields (for example a `movement` category computed from a price change)
/// return owned text through `Cow::Owned` or a static string.
pub trait Record {
    /// Stable identity (symbol, id, ...).
    fn key(&self) -> Cow<'_, str>;

    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl<R: Record + ?Sized> Record for &R {
    fn key(&self) -> Cow<'_, str> {
        (**self).key()
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        (**self).field(name)
    }
}

/// A schema-less record: key plus an ordered map of owned values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DynRecord {
    pub key: String,
    pub fields: BTreeMap<String, OwnedValue>,
}

impl DynRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: OwnedValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: OwnedValue) {
        self.fields.insert(name.into(), value);
    }
}

impl Record for DynRecord {
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.key)
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.fields.get(name).map(OwnedValue::as_field)
    }
}
