//! listview data — everything around the pipeline that touches the outside.
//!
//! - Record sources: JSON / CSV files coerced through a schema
//! - Built-in sample datasets (FX board, orders, tasks) and a seeded generator
//! - A seeded ticker that simulates live FX metrics
//! - Criteria serialization: URL query string and JSON state file observers
//! - Saved views keyed by criteria fingerprint
//! - TOML view configuration

pub mod config;
pub mod persistence;
pub mod query_string;
pub mod samples;
pub mod sources;
pub mod ticker;

pub use config::{ConfigError, ViewConfig};
pub use persistence::{SavedView, StateFileSync, StoreError, ViewStore};
pub use query_string::QueryStringSync;
pub use samples::{CurrencyPair, Order, SampleSet, Task};
pub use sources::{load_records, to_dyn_records, write_csv, LoadError};
pub use ticker::Ticker;
