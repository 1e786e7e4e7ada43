//! Range filter state for dataset browsing.
//!
//! A [`FilterSession`] combines a dataset's field types, its aggregated
//! statistics, and the stored filter records of the grid and modal views.
//! It derives the range and `none` flag each filter widget shows, and turns
//! user edits into normalized store writes.

pub mod cache;
pub mod data;
pub mod filter;
pub mod state;

pub use data::model::{Dataset, FieldType, FieldValue, Sample};
pub use data::schema::FieldSchema;
pub use data::stats::{Aggregation, AggregationKind, Statistics};
pub use filter::{FilterEdit, FilterKey, FilterStore, NumericFilter, Range, StoreError};
pub use state::FilterSession;
