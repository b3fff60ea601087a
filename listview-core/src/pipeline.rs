//! Derived view — filter, then stable sort, then window.
//!
//! The derived view is a pure function of `(records, criteria)`: it borrows
//! the records, never mutates them, and is rebuilt from scratch whenever the
//! criteria change. An empty result is a normal terminal state, not an error.

use crate::criteria::Criteria;
use crate::page::{PageWindow, Pagination};
use crate::predicate;
use crate::record::Record;
use crate::schema::Schema;
use crate::sort::comparator_for;

/// Indices of the records that pass `criteria`, in display order.
///
/// Filter stage keeps source order; the sort stage (if the sort field is
/// known to the schema) is a stable sort over that subset.
pub fn derive<R: Record>(records: &[R], criteria: &Criteria, schema: &Schema) -> Vec<usize> {
    let mut indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| predicate::matches(*r, criteria, schema))
        .map(|(i, _)| i)
        .collect();

    if let Some(key) = &criteria.sort {
        match comparator_for(schema, key) {
            Some(cmp) => indices.sort_by(|&a, &b| cmp.compare(&records[a], &records[b])),
            None => tracing::debug!(field = %key.field, "sort field not in schema, keeping order"),
        }
    }

    indices
}

/// Borrowed rows of a derived view plus its page window.
#[derive(Debug)]
pub struct DerivedView<'a, R> {
    rows: Vec<&'a R>,
    window: PageWindow,
}

impl<'a, R: Record> DerivedView<'a, R> {
    /// Run the full pipeline over `records`.
    pub fn build(
        records: &'a [R],
        criteria: &Criteria,
        schema: &Schema,
        pagination: Pagination,
    ) -> Self {
        let rows: Vec<&'a R> = derive(records, criteria, schema)
            .into_iter()
            .map(|i| &records[i])
            .collect();
        let window = PageWindow::resolve(pagination, rows.len());
        Self { rows, window }
    }

    /// Every matching row, sorted, ignoring the page window.
    pub fn rows(&self) -> &[&'a R] {
        &self.rows
    }

    /// Rows of the current page.
    pub fn page_rows(&self) -> &[&'a R] {
        &self.rows[self.window.start..self.window.end]
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    pub fn total_matches(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keys of all matching rows, in order.
    pub fn keys(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.key().into_owned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{Bound, Range, SortKey};
    use crate::record::{DynRecord, OwnedValue};
    use crate::schema::{FieldKind, FieldSpec};

    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("title", FieldKind::Text).searchable(),
            FieldSpec::new("points", FieldKind::Number),
        ])
    }

    fn records() -> Vec<DynRecord> {
        [("t1", "Fix login", 3.0), ("t2", "Write docs", 1.0), ("t3", "Fix logout", 5.0), ("t4", "Ship", 2.0)]
            .into_iter()
            .map(|(k, title, pts)| {
                DynRecord::new(k)
                    .with("title", OwnedValue::Text(title.into()))
                    .with("points", OwnedValue::Number(pts))
            })
            .collect()
    }

    #[test]
    fn default_criteria_is_identity() {
        let recs = records();
        assert_eq!(derive(&recs, &Criteria::default(), &schema()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn filter_then_sort() {
        let recs = records();
        let c = Criteria::new().with_search("fix").with_sort(SortKey::desc("points"));
        let view = DerivedView::build(&recs, &c, &schema(), Pagination::unbounded());
        assert_eq!(view.keys(), vec!["t3", "t1"]);
        assert_eq!(view.total_matches(), 2);
    }

    #[test]
    fn unknown_sort_field_keeps_filter_order() {
        let recs = records();
        let c = Criteria::new().with_sort(SortKey::asc("ghost"));
        assert_eq!(derive(&recs, &c, &schema()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn window_slices_sorted_rows() {
        let recs = records();
        let c = Criteria::new().with_sort(SortKey::asc("points"));
        let view = DerivedView::build(&recs, &c, &schema(), Pagination::new(1, 2));
        let page: Vec<&str> = view.page_rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(page, vec!["t1", "t3"]);
        assert_eq!(view.window().page_count, 2);
    }

    #[test]
    fn no_matches_is_empty_not_error() {
        let recs = records();
        let c = Criteria::new().with_range(
            "points",
            Range::new(Some(Bound::Number(100.0)), None),
        );
        let view = DerivedView::build(&recs, &c, &schema(), Pagination::new(0, 10));
        assert!(view.is_empty());
        assert!(view.page_rows().is_empty());
    }

    #[test]
    fn records_are_untouched() {
        let recs = records();
        let before = recs.clone();
        let c = Criteria::new().with_sort(SortKey::desc("points"));
        let _ = derive(&recs, &c, &schema());
        assert_eq!(recs, before);
    }
}
