//! Criteria state controller — owns the current criteria of one view and the
//! transitions that change them.
//!
//! Every transition that actually changes the criteria:
//! 1. resets the page to 0
//! 2. recomputes the derived view
//! 3. notifies registered [`CriteriaObserver`]s (URL sync, state file, ...)
//!
//! A transition that leaves the criteria as they were is a no-op and returns
//! `false`. Category selection is a select-or-clear toggle: choosing a value
//! replaces whatever was selected for that field, choosing it again clears it.

use std::time::Instant;

use crate::criteria::{Bound, Criteria, Range, SortKey};
use crate::debounce::Debouncer;
use crate::page::{PageWindow, Pagination};
use crate::pipeline;
use crate::record::Record;
use crate::schema::Schema;

/// Receives the criteria after every change. Serialization targets (URL
/// query string, local state file, server round-trip) implement this.
pub trait CriteriaObserver {
    fn criteria_changed(&mut self, criteria: &Criteria);
}

impl<F: FnMut(&Criteria)> CriteriaObserver for F {
    fn criteria_changed(&mut self, criteria: &Criteria) {
        self(criteria)
    }
}

/// A range update waiting for the slider to settle.
pub type StagedRange = (String, Option<Bound>, Option<Bound>);

/// One list view: records, schema, criteria, and the derived view.
pub struct ListView<R> {
    records: Vec<R>,
    schema: Schema,
    criteria: Criteria,
    defaults: Criteria,
    pagination: Pagination,
    derived: Vec<usize>,
    staged_range: Debouncer<StagedRange>,
    observers: Vec<Box<dyn CriteriaObserver>>,
}

impl<R: Record> ListView<R> {
    pub fn new(records: Vec<R>, schema: Schema) -> Self {
        let mut view = Self {
            records,
            schema,
            criteria: Criteria::default(),
            defaults: Criteria::default(),
            pagination: Pagination::unbounded(),
            derived: Vec::new(),
            staged_range: Debouncer::default(),
            observers: Vec::new(),
        };
        view.refresh();
        view
    }

    /// Set the criteria `reset()` returns to, and start from them.
    pub fn with_defaults(mut self, defaults: Criteria) -> Self {
        self.criteria = defaults.clone();
        self.defaults = defaults;
        self.refresh();
        self
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.pagination = Pagination::new(0, per_page);
        self
    }

    pub fn with_debounce(mut self, debouncer: Debouncer<StagedRange>) -> Self {
        self.staged_range = debouncer;
        self
    }

    pub fn subscribe(&mut self, observer: Box<dyn CriteriaObserver>) {
        self.observers.push(observer);
    }

    // ── Criteria transitions ─────────────────────────────────────────

    /// Set the free-text search. Surrounding whitespace is not part of the
    /// term, so padding alone never counts as a change.
    pub fn set_search(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        let mut next = self.criteria.clone();
        next.search = text.trim().to_string();
        self.apply(next)
    }

    /// Select `value` for `field`, or clear the selection if it is already
    /// selected. Selecting replaces any other value for the same field.
    /// Only text and category fields take a selection.
    pub fn toggle_category(&mut self, field: &str, value: &str) -> bool {
        if !self.schema.kind_of(field).is_some_and(|k| k.is_textual()) {
            tracing::warn!(field, "selection ignored on non-categorical field");
            return false;
        }
        let mut next = self.criteria.clone();
        if next.selectors.get(field).map(String::as_str) == Some(value) {
            next.selectors.remove(field);
        } else {
            next.selectors.insert(field.to_string(), value.to_string());
        }
        self.apply(next)
    }

    /// Set an inclusive range on `field`. Reversed bounds are swapped; two
    /// open bounds clear the range.
    pub fn set_range(&mut self, field: &str, min: Option<Bound>, max: Option<Bound>) -> bool {
        let mut next = self.criteria.clone();
        let range = Range::new(min, max);
        if range.is_open() {
            next.ranges.remove(field);
        } else {
            next.ranges.insert(field.to_string(), range);
        }
        self.apply(next)
    }

    /// Set a range from raw text input. Text that does not parse for the
    /// field's kind becomes an open bound.
    pub fn set_range_input(&mut self, field: &str, min: &str, max: &str) -> bool {
        let (lo, hi) = self.coerce_bounds(field, min, max);
        self.set_range(field, lo, hi)
    }

    pub fn clear_range(&mut self, field: &str) -> bool {
        let mut next = self.criteria.clone();
        next.ranges.remove(field);
        self.apply(next)
    }

    /// Sort by `field`. Reselecting the current field flips the direction;
    /// a new field starts ascending.
    pub fn set_sort(&mut self, field: &str) -> bool {
        let mut next = self.criteria.clone();
        next.sort = match next.sort.take() {
            Some(mut key) if key.field == field => {
                key.direction = key.direction.flipped();
                Some(key)
            }
            _ => Some(SortKey::asc(field)),
        };
        self.apply(next)
    }

    /// Sort by an explicit key, without toggling.
    pub fn sort_by(&mut self, key: SortKey) -> bool {
        let mut next = self.criteria.clone();
        next.sort = Some(key);
        self.apply(next)
    }

    /// Drop the sort key, returning to source order.
    pub fn clear_sort(&mut self) -> bool {
        let mut next = self.criteria.clone();
        next.sort = None;
        self.apply(next)
    }

    /// Restore the default criteria and the first page.
    pub fn reset(&mut self) -> bool {
        self.staged_range.cancel();
        self.pagination.page = 0;
        self.apply(self.defaults.clone())
    }

    /// Adopt criteria decoded from an external source (URL, state file).
    pub fn replace_criteria(&mut self, criteria: Criteria) -> bool {
        self.apply(criteria)
    }

    // ── Debounced range input ────────────────────────────────────────

    /// Stage a range update from a slider drag. It is committed by
    /// [`tick`](Self::tick) once input has been quiet for the debounce window.
    pub fn stage_range(&mut self, field: &str, min: Option<Bound>, max: Option<Bound>, now: Instant) {
        self.staged_range.stage((field.to_string(), min, max), now);
    }

    /// Commit a settled staged range. Returns whether criteria changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.staged_range.poll(now) {
            Some((field, min, max)) => self.set_range(&field, min, max),
            None => false,
        }
    }

    /// Commit any staged range immediately (drag end).
    pub fn flush_staged(&mut self) -> bool {
        match self.staged_range.flush() {
            Some((field, min, max)) => self.set_range(&field, min, max),
            None => false,
        }
    }

    pub fn has_staged_range(&self) -> bool {
        self.staged_range.is_pending()
    }

    // ── Pagination ───────────────────────────────────────────────────

    pub fn set_page(&mut self, page: usize) {
        self.pagination.page = page;
        self.pagination.page = self.window().page;
    }

    pub fn next_page(&mut self) -> bool {
        let w = self.window();
        if w.has_next() {
            self.pagination.page = w.page + 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        let w = self.window();
        if w.has_prev() {
            self.pagination.page = w.page - 1;
            true
        } else {
            false
        }
    }

    /// Change the page size (`0` = everything on one page). Back to page 0.
    pub fn set_per_page(&mut self, per_page: usize) {
        self.pagination = Pagination::new(0, per_page);
    }

    // ── Data ─────────────────────────────────────────────────────────

    /// Swap in a new snapshot of records (e.g. a live tick). Criteria are
    /// kept; the page is clamped to the new view.
    pub fn replace_records(&mut self, records: Vec<R>) {
        self.records = records;
        self.refresh();
        self.pagination.page = self.window().page;
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn defaults(&self) -> &Criteria {
        &self.defaults
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Indices into [`records`](Self::records) in display order.
    pub fn derived_indices(&self) -> &[usize] {
        &self.derived
    }

    /// Every matching record in display order.
    pub fn rows(&self) -> impl Iterator<Item = &R> + '_ {
        self.derived.iter().map(move |&i| &self.records[i])
    }

    /// Matching records on the current page.
    pub fn page_rows(&self) -> impl Iterator<Item = &R> + '_ {
        let w = self.window();
        self.derived[w.start..w.end]
            .iter()
            .map(move |&i| &self.records[i])
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::resolve(self.pagination, self.derived.len())
    }

    pub fn total_matches(&self) -> usize {
        self.derived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.derived.is_empty()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn apply(&mut self, next: Criteria) -> bool {
        if next == self.criteria {
            return false;
        }
        self.criteria = next;
        self.pagination.page = 0;
        self.refresh();
        for observer in &mut self.observers {
            observer.criteria_changed(&self.criteria);
        }
        true
    }

    fn refresh(&mut self) {
        self.derived = pipeline::derive(&self.records, &self.criteria, &self.schema);
        tracing::debug!(
            matches = self.derived.len(),
            total = self.records.len(),
            "derived view recomputed"
        );
    }

    fn coerce_bounds(&self, field: &str, min: &str, max: &str) -> (Option<Bound>, Option<Bound>) {
        let coerce = |raw: &str| {
            let bound = self.schema.coerce(field, raw).and_then(Bound::from_value);
            if bound.is_none() && !raw.trim().is_empty() {
                tracing::warn!(field, input = raw, "range input ignored");
            }
            bound
        };
        (coerce(min), coerce(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Direction;
    use crate::record::{DynRecord, OwnedValue};
    use crate::schema::{FieldKind, FieldSpec};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("title", FieldKind::Text).searchable(),
            FieldSpec::new("status", FieldKind::Category),
            FieldSpec::new("points", FieldKind::Number),
        ])
    }

    fn view() -> ListView<DynRecord> {
        let recs = [
            ("a", "Alpha", "open", 3.0),
            ("b", "Beta", "done", 1.0),
            ("c", "Gamma", "open", 5.0),
            ("d", "Delta", "blocked", 2.0),
        ]
        .into_iter()
        .map(|(k, t, s, p)| {
            DynRecord::new(k)
                .with("title", OwnedValue::Text(t.into()))
                .with("status", OwnedValue::Text(s.into()))
                .with("points", OwnedValue::Number(p))
        })
        .collect();
        ListView::new(recs, schema())
    }

    fn keys(v: &ListView<DynRecord>) -> Vec<String> {
        v.rows().map(|r| r.key.clone()).collect()
    }

    #[test]
    fn starts_as_identity() {
        let v = view();
        assert_eq!(keys(&v), vec!["a", "b", "c", "d"]);
        assert!(v.criteria().is_default());
    }

    #[test]
    fn toggle_selects_replaces_and_clears() {
        let mut v = view();
        assert!(v.toggle_category("status", "open"));
        assert_eq!(keys(&v), vec!["a", "c"]);

        // Selecting another value replaces, not adds.
        assert!(v.toggle_category("status", "done"));
        assert_eq!(keys(&v), vec!["b"]);
        assert_eq!(v.criteria().selectors.len(), 1);

        // Same value again clears.
        assert!(v.toggle_category("status", "done"));
        assert_eq!(keys(&v), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn set_sort_toggles_direction_on_same_field() {
        let mut v = view();
        v.set_sort("points");
        assert_eq!(keys(&v), vec!["b", "d", "a", "c"]);
        v.set_sort("points");
        assert_eq!(v.criteria().sort.as_ref().unwrap().direction, Direction::Desc);
        assert_eq!(keys(&v), vec!["c", "a", "d", "b"]);
        v.set_sort("title");
        assert_eq!(v.criteria().sort, Some(SortKey::asc("title")));
    }

    #[test]
    fn range_input_coerces_malformed_to_open() {
        let mut v = view();
        assert!(v.set_range_input("points", "2", "abc"));
        assert_eq!(keys(&v), vec!["a", "c", "d"]);
        let r = v.criteria().ranges["points"];
        assert_eq!(r.min, Some(Bound::Number(2.0)));
        assert_eq!(r.max, None);

        // Both malformed: range cleared.
        assert!(v.set_range_input("points", "x", ""));
        assert!(v.criteria().ranges.is_empty());
    }

    #[test]
    fn unchanged_criteria_is_noop() {
        let mut v = view();
        assert!(!v.set_search(""));
        assert!(v.set_search("al"));
        assert!(!v.set_search("al"));
        assert!(!v.clear_range("points"));
    }

    #[test]
    fn reset_restores_defaults_and_identity() {
        let mut v = view();
        v.set_search("a");
        v.toggle_category("status", "open");
        v.set_sort("points");
        v.set_range_input("points", "1", "4");
        assert!(v.reset());
        assert!(v.criteria().is_default());
        assert_eq!(keys(&v), vec!["a", "b", "c", "d"]);
        assert!(!v.reset());
    }

    #[test]
    fn reset_returns_to_configured_defaults() {
        let defaults = Criteria::new().with_sort(SortKey::desc("points"));
        let mut v = view().with_defaults(defaults.clone());
        assert_eq!(keys(&v), vec!["c", "a", "d", "b"]);
        v.set_search("beta");
        v.reset();
        assert_eq!(v.criteria(), &defaults);
    }

    #[test]
    fn observers_see_every_change_once() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut v = view();
        v.subscribe(Box::new(move |c: &Criteria| sink.borrow_mut().push(c.search.clone())));

        v.set_search("a");
        v.set_search("a");
        v.set_search("b");
        assert_eq!(*seen.borrow(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn criteria_change_resets_page() {
        let mut v = view().with_per_page(2);
        assert!(v.next_page());
        assert_eq!(v.pagination().page, 1);
        assert!(!v.next_page());
        v.set_sort("points");
        assert_eq!(v.pagination().page, 0);
        let page: Vec<String> = v.page_rows().map(|r| r.key.clone()).collect();
        assert_eq!(page, vec!["b", "d"]);
    }

    #[test]
    fn set_page_clamps() {
        let mut v = view().with_per_page(3);
        v.set_page(10);
        assert_eq!(v.pagination().page, 1);
        assert!(v.prev_page());
        assert!(!v.prev_page());
    }

    #[test]
    fn staged_range_commits_after_quiet_window() {
        let t0 = Instant::now();
        let mut v = view().with_debounce(Debouncer::new(Duration::from_millis(100)));
        v.stage_range("points", Some(Bound::Number(1.0)), None, t0);
        v.stage_range("points", Some(Bound::Number(3.0)), None, t0 + Duration::from_millis(40));
        assert!(!v.tick(t0 + Duration::from_millis(90)));
        assert_eq!(v.total_matches(), 4);

        assert!(v.tick(t0 + Duration::from_millis(150)));
        assert_eq!(keys(&v), vec!["a", "c"]);
        assert!(!v.has_staged_range());
    }

    #[test]
    fn replace_records_keeps_criteria() {
        let mut v = view();
        v.toggle_category("status", "open");
        let fresh = vec![DynRecord::new("z")
            .with("title", OwnedValue::Text("Zeta".into()))
            .with("status", OwnedValue::Text("open".into()))];
        v.replace_records(fresh);
        assert_eq!(keys(&v), vec!["z"]);
        assert_eq!(v.criteria().selectors["status"], "open");
    }

    #[test]
    fn toggle_ignores_non_categorical_fields() {
        let mut v = view();
        assert!(!v.toggle_category("points", "3"));
        assert!(!v.toggle_category("ghost", "x"));
        assert!(v.criteria().selectors.is_empty());
        assert_eq!(keys(&v), vec!["a", "b", "c", "d"]);

        // Text fields still take a selection.
        assert!(v.toggle_category("title", "Beta"));
        assert_eq!(keys(&v), vec!["b"]);
    }

    #[test]
    fn search_padding_is_not_a_change() {
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let mut v = view().with_per_page(2);
        v.subscribe(Box::new(move |_: &Criteria| *sink.borrow_mut() += 1));
        v.next_page();

        assert!(!v.set_search("   "));
        assert_eq!(*seen.borrow(), 0);
        assert_eq!(v.pagination().page, 1);

        assert!(v.set_search("  al "));
        assert_eq!(v.criteria().search, "al");
        assert!(!v.set_search("al  "));
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn set_per_page_returns_to_first_page() {
        let mut v = view().with_per_page(1);
        v.set_page(3);
        assert_eq!(v.pagination().page, 3);

        v.set_per_page(2);
        assert_eq!(v.pagination(), Pagination::new(0, 2));
        assert_eq!(v.window().page_count, 2);
        let page: Vec<String> = v.page_rows().map(|r| r.key.clone()).collect();
        assert_eq!(page, vec!["a", "b"]);

        v.set_per_page(0);
        assert_eq!(v.window().page_count, 1);
        assert_eq!(v.page_rows().count(), 4);
    }

    #[test]
    fn flush_commits_staged_range_immediately() {
        let t0 = Instant::now();
        let mut v = view().with_debounce(Debouncer::new(Duration::from_millis(100)));
        v.stage_range("points", None, Some(Bound::Number(2.0)), t0);
        assert!(v.has_staged_range());

        assert!(v.flush_staged());
        assert!(!v.has_staged_range());
        assert_eq!(keys(&v), vec!["b", "d"]);

        // Nothing left to commit.
        assert!(!v.flush_staged());
        assert!(!v.tick(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn clear_sort_restores_source_order() {
        let mut v = view();
        v.set_sort("points");
        assert_eq!(keys(&v), vec!["b", "d", "a", "c"]);

        assert!(v.clear_sort());
        assert_eq!(v.criteria().sort, None);
        assert_eq!(keys(&v), vec!["a", "b", "c", "d"]);
        assert!(!v.clear_sort());
    }

    #[test]
    fn reset_cancels_staged_range() {
        let t0 = Instant::now();
        let mut v = view().with_debounce(Debouncer::new(Duration::from_millis(100)));
        v.set_search("a");
        v.stage_range("points", Some(Bound::Number(4.0)), None, t0);

        assert!(v.reset());
        assert!(!v.has_staged_range());
        assert!(!v.tick(t0 + Duration::from_millis(500)));
        assert!(v.criteria().is_default());
        assert_eq!(keys(&v), vec!["a", "b", "c", "d"]);
    }
}
