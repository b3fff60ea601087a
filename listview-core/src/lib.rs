//! listview core — records, criteria, and the filter/sort/paginate pipeline.
//!
//! This crate contains the whole list-view query path:
//! - Records and typed field values, read through the `Record` trait
//! - Field schema (kinds, searchable fields, lenient input coercion)
//! - Criteria value object (search, selectors, ranges, sort)
//! - Filter predicate evaluator and sort comparator
//! - Derived view (filter, stable sort, page window)
//! - Criteria state controller with observers and debounced range input
//!
//! Everything here is synchronous and infallible. Loading data and
//! serializing criteria live in `listview-data`.

pub mod controller;
pub mod criteria;
pub mod debounce;
pub mod page;
pub mod pipeline;
pub mod predicate;
pub mod record;
pub mod schema;
pub mod sort;

pub use controller::{CriteriaObserver, ListView};
pub use criteria::{Bound, Criteria, Direction, Range, SortKey};
pub use debounce::Debouncer;
pub use page::{PageWindow, Pagination};
pub use pipeline::{derive, DerivedView};
pub use predicate::matches;
pub use record::{DynRecord, FieldValue, OwnedValue, Record};
pub use schema::{FieldKind, FieldSpec, Schema};
pub use sort::{comparator_for, Comparator};
