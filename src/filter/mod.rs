//! Numeric range filters: the filter record, its derivations, and the store
//! that persists user edits.

pub mod numeric;
pub mod store;

pub use numeric::{FilterEdit, FilterKind, NumericFilter, Range};
pub use store::{FilterKey, FilterStore, StoreError};
