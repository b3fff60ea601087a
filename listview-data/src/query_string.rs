//! Criteria <-> URL query string.
//!
//! Key layout (all values percent-encoded, keys in this order):
//! - `q` — search text
//! - `f.<field>` — selected category value
//! - `min.<field>` / `max.<field>` — range bounds
//! - `sort` and `dir` (`asc` | `desc`)
//!
//! Default criteria encode to the empty string. Decoding is lenient: unknown
//! keys, fields missing from the schema and values that do not parse for the
//! field kind are skipped.

use std::cell::RefCell;
use std::rc::Rc;

use listview_core::{Bound, Criteria, CriteriaObserver, Direction, Range, Schema, SortKey};

const SEARCH: &str = "q";
const SELECT_PREFIX: &str = "f.";
const MIN_PREFIX: &str = "min.";
const MAX_PREFIX: &str = "max.";
const SORT: &str = "sort";
const DIR: &str = "dir";

pub fn encode(criteria: &Criteria) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut push = |key: &str, value: &str| {
        parts.push(format!(
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(value)
        ));
    };

    if let Some(term) = criteria.search_term() {
        push(SEARCH, term);
    }
    for (field, value) in &criteria.selectors {
        push(&format!("{SELECT_PREFIX}{field}"), value);
    }
    for (field, range) in &criteria.ranges {
        if let Some(min) = &range.min {
            push(&format!("{MIN_PREFIX}{field}"), &min.to_string());
        }
        if let Some(max) = &range.max {
            push(&format!("{MAX_PREFIX}{field}"), &max.to_string());
        }
    }
    if let Some(sort) = &criteria.sort {
        push(SORT, &sort.field);
        push(DIR, sort.direction.as_str());
    }
    parts.join("&")
}

/// Parse a query string (with or without a leading `?`) against `schema`.
pub fn decode(query: &str, schema: &Schema) -> Criteria {
    let mut criteria = Criteria::new();
    let mut mins: Vec<(String, Bound)> = Vec::new();
    let mut maxs: Vec<(String, Bound)> = Vec::new();
    let mut direction = Direction::Asc;

    for pair in query.trim().trim_start_matches('?').split('&') {
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let (Some(key), Some(value)) = (component(raw_key), component(raw_value)) else {
            tracing::warn!(pair, "skipping undecodable query pair");
            continue;
        };

        if key == SEARCH {
            criteria.search = value;
        } else if key == SORT {
            if schema.field(&value).is_some() {
                criteria.sort = Some(SortKey::asc(value));
            }
        } else if key == DIR {
            if let Some(d) = Direction::parse(&value) {
                direction = d;
            }
        } else if let Some(field) = key.strip_prefix(SELECT_PREFIX) {
            let selectable = schema.kind_of(field).is_some_and(|k| k.is_textual());
            if selectable && !value.is_empty() {
                criteria.selectors.insert(field.to_string(), value);
            }
        } else if let Some(field) = key.strip_prefix(MIN_PREFIX) {
            if let Some(b) = bound(schema, field, &value) {
                mins.push((field.to_string(), b));
            }
        } else if let Some(field) = key.strip_prefix(MAX_PREFIX) {
            if let Some(b) = bound(schema, field, &value) {
                maxs.push((field.to_string(), b));
            }
        } else {
            tracing::debug!(key = %key, "ignoring unknown query key");
        }
    }

    if let Some(sort) = criteria.sort.as_mut() {
        sort.direction = direction;
    }
    for (field, min) in mins {
        let max = maxs
            .iter()
            .rev()
            .find(|(f, _)| *f == field)
            .map(|(_, b)| *b);
        criteria = criteria.with_range(field, Range::new(Some(min), max));
    }
    for (field, max) in maxs {
        if !criteria.ranges.contains_key(&field) {
            criteria = criteria.with_range(field, Range::new(None, Some(max)));
        }
    }
    criteria
}

fn component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|s| s.into_owned())
}

fn bound(schema: &Schema, field: &str, raw: &str) -> Option<Bound> {
    let kind = schema.kind_of(field)?;
    if !kind.is_rangeable() {
        return None;
    }
    let b = schema.coerce(field, raw).and_then(Bound::from_value);
    if b.is_none() {
        tracing::warn!(field, value = raw, "ignoring malformed range bound");
    }
    b
}

/// Keeps the encoded form of the latest criteria, like a browser address
/// bar. Clones share the same slot, so keep one handle and subscribe another.
#[derive(Debug, Clone, Default)]
pub struct QueryStringSync {
    current: Rc<RefCell<String>>,
}

impl QueryStringSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with the criteria a view starts from.
    pub fn from_criteria(criteria: &Criteria) -> Self {
        let sync = Self::new();
        *sync.current.borrow_mut() = encode(criteria);
        sync
    }

    pub fn current(&self) -> String {
        self.current.borrow().clone()
    }

    /// `base` with the current query appended (no `?` when empty).
    pub fn url(&self, base: &str) -> String {
        let q = self.current.borrow();
        if q.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{q}")
        }
    }
}

impl CriteriaObserver for QueryStringSync {
    fn criteria_changed(&mut self, criteria: &Criteria) {
        *self.current.borrow_mut() = encode(criteria);
    }
}
