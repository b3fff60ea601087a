//! Sort comparator — field-specific ordering with a direction flag.
//!
//! Comparator selection is a lookup from the sort field's schema kind:
//! text and categories compare case-folded first then by raw bytes, numbers
//! use `f64::total_cmp`, dates compare chronologically. Records without the
//! field order before records that have it.
//!
//! Sorting is stable, and descending order is the comparator reversed, so
//! tied records keep their filter-stage relative order in both directions.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::criteria::{Direction, SortKey};
use crate::record::{FieldValue, Record};
use crate::schema::{FieldKind, Schema};

/// A field-specific comparison over two records.
#[derive(Debug, Clone)]
pub struct Comparator {
    field: String,
    kind: FieldKind,
    direction: Direction,
}

impl Comparator {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Compare two records under this comparator's field and direction.
    pub fn compare<R: Record + ?Sized>(&self, a: &R, b: &R) -> Ordering {
        let ord = compare_values(
            self.kind,
            a.field(&self.field).as_ref(),
            b.field(&self.field).as_ref(),
        );
        match self.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

/// Look up the comparator for a sort key. Unknown fields have none.
pub fn comparator_for(schema: &Schema, key: &SortKey) -> Option<Comparator> {
    let kind = schema.kind_of(&key.field)?;
    Some(Comparator {
        field: key.field.clone(),
        kind,
        direction: key.direction,
    })
}

/// Stable in-place sort of `items` by the comparator.
pub fn sort_records<R: Record>(items: &mut [R], comparator: &Comparator) {
    items.sort_by(|a, b| comparator.compare(a, b));
}

/// Ascending comparison of two optional field values of the given kind.
pub fn compare_values(
    kind: FieldKind,
    a: Option<&FieldValue<'_>>,
    b: Option<&FieldValue<'_>>,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match kind {
            FieldKind::Text | FieldKind::Category => compare_text(a, b),
            FieldKind::Number => compare_number(a, b),
            FieldKind::Date => compare_date(a, b),
        },
    }
}

fn compare_text(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    let (a, b) = (text_of(a), text_of(b));
    folded(&a).cmp(folded(&b)).then_with(|| a.cmp(&b))
}

/// Borrow text values; only a value of another kind is formatted.
fn text_of<'v>(value: &'v FieldValue<'_>) -> Cow<'v, str> {
    match value.as_text() {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(value.to_string()),
    }
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

fn compare_number(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        // Value of the wrong kind sorts with the missing ones.
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_date(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    match (a.as_date(), b.as_date()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
