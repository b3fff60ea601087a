//! Filter predicate evaluator.
//!
//! Decides whether one record is included under the current criteria.
//! Every active predicate must hold (AND):
//! - text search: case-insensitive substring of any searchable field
//! - selectors: categorical field equals the selected value
//! - ranges: value lies in `[min, max]` inclusive, open ends unbounded
//!
//! There are no error conditions. Malformed input was already coerced away
//! when the criteria were built.

use crate::criteria::{Bound, Criteria, Range};
use crate::record::{FieldValue, Record};
use crate::schema::Schema;

/// Whether `record` satisfies every active predicate of `criteria`.
pub fn matches<R: Record + ?Sized>(record: &R, criteria: &Criteria, schema: &Schema) -> bool {
    if let Some(term) = criteria.search_term() {
        if !matches_search(record, &term.to_lowercase(), schema) {
            return false;
        }
    }

    for (field, selected) in &criteria.selectors {
        if !matches_selector(record, field, selected) {
            return false;
        }
    }

    for (field, range) in &criteria.ranges {
        if !matches_range(record, field, range) {
            return false;
        }
    }

    true
}

/// Case-insensitive substring match against the schema's searchable fields.
///
/// `needle` must already be lowercased. Non-text values are matched through
/// their display form, so searching `1.1` finds a change of `+1.1`.
pub fn matches_search<R: Record + ?Sized>(record: &R, needle: &str, schema: &Schema) -> bool {
    if needle.is_empty() {
        return true;
    }
    schema.searchable_fields().any(|spec| {
        record.field(&spec.name).is_some_and(|value| match value {
            FieldValue::Text(s) => s.to_lowercase().contains(needle),
            other => other.to_string().to_lowercase().contains(needle),
        })
    })
}

/// Exact match of a categorical field. A record without the field fails.
pub fn matches_selector<R: Record + ?Sized>(record: &R, field: &str, selected: &str) -> bool {
    match record.field(field) {
        Some(FieldValue::Text(value)) => value == selected,
        Some(other) => other.to_string() == selected,
        None => false,
    }
}

/// Inclusive range check. Missing fields, kind mismatches and NaN fail.
pub fn matches_range<R: Record + ?Sized>(record: &R, field: &str, range: &Range) -> bool {
    if range.is_open() {
        return true;
    }
    let Some(value) = record.field(field) else {
        return false;
    };
    let above_min = range.min.map_or(true, |b| bound_le(&b, &value));
    let below_max = range.max.map_or(true, |b| value_le(&value, &b));
    above_min && below_max
}

fn bound_le(bound: &Bound, value: &FieldValue<'_>) -> bool {
    match (bound, value) {
        (Bound::Number(b), FieldValue::Number(v)) => *b <= *v,
        (Bound::Date(b), FieldValue::Date(v)) => b <= v,
        _ => false,
    }
}

fn value_le(value: &FieldValue<'_>, bound: &Bound) -> bool {
    match (value, bound) {
        (FieldValue::Number(v), Bound::Number(b)) => *v <= *b,
        (FieldValue::Date(v), Bound::Date(b)) => v <= b,
        _ => false,
    }
}
