use crate::cache::DerivedCache;
use crate::data::schema::FieldSchema;
use crate::data::stats::{resolve_bounds, Statistics};
use crate::filter::numeric::{self, FilterEdit, NumericFilter, Range};
use crate::filter::store::{FilterKey, FilterStore};

// ---------------------------------------------------------------------------
// Filter session state
// ---------------------------------------------------------------------------

/// Memo key of a bounds derivation. Floats are keyed by their bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BoundsKey {
    path: String,
    default_range: Option<[Option<u64>; 2]>,
}

impl BoundsKey {
    fn new(path: &str, default_range: Option<&Range>) -> Self {
        BoundsKey {
            path: path.to_string(),
            default_range: default_range.map(|r| r.map(|v| v.map(f64::to_bits))),
        }
    }
}

/// The filter state of one dataset view, independent of rendering.
///
/// Reads never touch the store. Writes go through [`FilterSession::set_filter`],
/// which either upserts a record or clears it when the edit lands back on the
/// default.
#[derive(Debug, Default)]
pub struct FilterSession {
    schema: FieldSchema,
    statistics: Statistics,
    store: FilterStore,

    /// Bumped whenever schema or statistics change.
    revision: u64,
    bounds_cache: DerivedCache<BoundsKey, Range>,
}

impl FilterSession {
    pub fn new(schema: FieldSchema, statistics: Statistics) -> Self {
        FilterSession {
            schema,
            statistics,
            ..Self::default()
        }
    }

    /// Start from previously persisted filters.
    pub fn with_store(mut self, store: FilterStore) -> Self {
        self.store = store;
        self
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn store(&self) -> &FilterStore {
        &self.store
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the statistics; every derived bounds value is recomputed on
    /// its next read.
    pub fn set_statistics(&mut self, statistics: Statistics) {
        self.statistics = statistics;
        self.bump();
    }

    pub fn set_schema(&mut self, schema: FieldSchema) {
        self.schema = schema;
        self.bump();
    }

    fn bump(&mut self) {
        self.revision += 1;
        self.bounds_cache.invalidate();
        log::debug!("filter inputs changed, revision {}", self.revision);
    }

    // -- Reads --

    /// `[min, max]` of `path`, widened by `default_range` when given.
    pub fn bounds(&self, path: &str, default_range: Option<&Range>) -> Range {
        self.bounds_cache
            .get_or_compute(BoundsKey::new(path, default_range), self.revision, || {
                log::debug!("resolving bounds for '{path}'");
                resolve_bounds(&self.schema, &self.statistics, path, default_range)
            })
    }

    /// The filter displayed for `path` in the given view.
    pub fn filter(&self, path: &str, modal: bool, default_range: Option<&Range>) -> NumericFilter {
        let bounds = self.bounds(path, default_range);
        numeric::derive(self.store.get(&FilterKey::new(path, modal)), &bounds)
    }

    pub fn range(&self, path: &str, modal: bool, default_range: Option<&Range>) -> Range {
        self.filter(path, modal, default_range).range
    }

    pub fn none(&self, path: &str, modal: bool, default_range: Option<&Range>) -> bool {
        self.filter(path, modal, default_range).none
    }

    pub fn is_filtered(&self, path: &str, modal: bool, default_range: Option<&Range>) -> bool {
        let bounds = self.bounds(path, default_range);
        let filter = numeric::derive(self.store.get(&FilterKey::new(path, modal)), &bounds);
        numeric::is_filtered(&filter, &bounds)
    }

    /// Fields of one view that currently restrict samples, with the filter
    /// each one displays.
    pub fn active_filters(&self, modal: bool) -> Vec<(String, NumericFilter)> {
        self.store
            .iter()
            .filter(|(key, _)| key.modal == modal)
            .filter(|(key, _)| self.is_filtered(&key.path, modal, None))
            .map(|(key, _)| (key.path.clone(), self.filter(&key.path, modal, None)))
            .collect()
    }

    // -- Writes --

    /// Apply one edit to the filter of `path`.
    pub fn set_filter(
        &mut self,
        path: &str,
        modal: bool,
        edit: FilterEdit,
        default_range: Option<&Range>,
    ) {
        let bounds = self.bounds(path, default_range);
        let current = self.filter(path, modal, default_range);
        let key = FilterKey::new(path, modal);

        match numeric::normalize_edit(&current, edit, &bounds) {
            Some(filter) => {
                log::debug!("set filter {key:?}: {filter:?}");
                self.store.set(key, Some(filter));
            }
            None => {
                if self.store.set(key.clone(), None).is_some() {
                    log::debug!("cleared filter {key:?}, back to default");
                }
            }
        }
    }

    pub fn set_range(&mut self, path: &str, modal: bool, range: Range, default_range: Option<&Range>) {
        self.set_filter(path, modal, FilterEdit::Range(range), default_range);
    }

    pub fn set_none(&mut self, path: &str, modal: bool, none: bool, default_range: Option<&Range>) {
        self.set_filter(path, modal, FilterEdit::None(none), default_range);
    }

    /// Reset every filter of one view.
    pub fn clear_filters(&mut self, modal: bool) {
        self.store.clear_context(modal);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::model::FieldType;
    use crate::data::stats::{Aggregation, AggregationKind};

    fn bounds(name: &str, result: serde_json::Value) -> Aggregation {
        Aggregation {
            name: name.to_string(),
            kind: AggregationKind::Bounds,
            result,
        }
    }

    fn session() -> FilterSession {
        let schema = FieldSchema::new()
            .with_field("n", FieldType::Int)
            .with_field("constant", FieldType::Float)
            .with_field("created", FieldType::DateTime);
        let stats = Statistics::new(vec![
            bounds("n", json!([0, 10])),
            bounds("constant", json!([5.0, 5.0])),
            bounds(
                "created",
                json!([
                    {"_cls": "DateTime", "datetime": 1000.0},
                    {"_cls": "DateTime", "datetime": 9000.0}
                ]),
            ),
        ]);
        FilterSession::new(schema, stats)
    }

    #[test]
    fn unset_field_shows_defaults() {
        let s = session();
        assert_eq!(s.range("n", false, None), [Some(0.0), Some(10.0)]);
        assert!(s.none("n", false, None));
        assert!(!s.is_filtered("n", false, None));
        assert_eq!(s.range("unknown", false, None), [None, None]);
        assert!(!s.is_filtered("unknown", false, None));
    }

    #[test]
    fn narrowed_range_round_trips() {
        let mut s = session();
        s.set_range("n", false, [Some(2.0), Some(8.0)], None);

        assert_eq!(s.range("n", false, None), [Some(2.0), Some(8.0)]);
        assert!(!s.none("n", false, None));
        assert!(s.is_filtered("n", false, None));
        assert!(!s.is_filtered("n", true, None));
    }

    #[test]
    fn writing_the_default_leaves_no_record() {
        let mut s = session();
        s.set_range("n", false, [Some(0.0), Some(10.0)], None);
        assert!(s.store().is_empty());

        s.set_range("n", false, [Some(3.0), Some(10.0)], None);
        assert_eq!(s.store().len(), 1);
        s.set_range("n", false, [Some(0.0), Some(10.0)], None);
        assert!(s.store().is_empty());
        assert!(s.none("n", false, None));
    }

    #[test]
    fn none_toggle() {
        let mut s = session();
        s.set_none("n", false, false, None);
        assert!(s.is_filtered("n", false, None));
        assert_eq!(s.range("n", false, None), [Some(0.0), Some(10.0)]);

        s.set_none("n", false, true, None);
        assert!(s.store().is_empty());
    }

    #[test]
    fn constant_field_is_not_filtered_by_range() {
        let mut s = session();
        assert!(!s.is_filtered("constant", false, None));

        s.set_none("constant", false, false, None);
        assert!(s.is_filtered("constant", false, None));
    }

    #[test]
    fn override_changes_defaults() {
        let mut s = session();
        let wide = [Some(-5.0), Some(20.0)];
        assert_eq!(s.bounds("n", Some(&wide)), [Some(-5.0), Some(20.0)]);

        s.set_range("n", false, [Some(0.0), Some(10.0)], Some(&wide));
        assert_eq!(s.store().len(), 1);
        assert!(s.is_filtered("n", false, Some(&wide)));

        s.set_range("n", false, wide, Some(&wide));
        assert!(s.store().is_empty());
    }

    #[test]
    fn date_fields_use_timestamps() {
        let mut s = session();
        assert_eq!(s.bounds("created", None), [Some(1000.0), Some(9000.0)]);
        s.set_range("created", true, [Some(2000.0), Some(9000.0)], None);
        assert!(s.is_filtered("created", true, None));
        assert_eq!(s.active_filters(true).len(), 1);
        assert!(s.active_filters(false).is_empty());
    }

    #[test]
    fn new_statistics_invalidate_bounds() {
        let mut s = session();
        assert_eq!(s.bounds("n", None), [Some(0.0), Some(10.0)]);

        s.set_statistics(Statistics::new(vec![bounds("n", json!([1, 3]))]));
        assert_eq!(s.bounds("n", None), [Some(1.0), Some(3.0)]);
        assert_eq!(s.revision(), 1);
    }

    #[test]
    fn clear_filters_resets_one_view() {
        let mut s = session();
        s.set_range("n", false, [Some(1.0), Some(2.0)], None);
        s.set_range("n", true, [Some(1.0), Some(2.0)], None);

        s.clear_filters(false);
        assert!(!s.is_filtered("n", false, None));
        assert!(s.is_filtered("n", true, None));
    }
}
