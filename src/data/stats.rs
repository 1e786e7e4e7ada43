use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use super::model::{Dataset, FieldType, FieldValue};
use super::schema::FieldSchema;
use crate::filter::Range;

// ---------------------------------------------------------------------------
// Aggregation records
// ---------------------------------------------------------------------------

/// Which statistic an [`Aggregation`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    /// `[min, max]`, entries possibly wrapped as `{"_cls": .., "datetime": ms}`.
    Bounds,
    /// Number of samples with a non-null value.
    Count,
    /// Number of samples with a null or missing value.
    NoneCount,
}

/// One aggregated statistic for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub name: String,
    pub kind: AggregationKind,
    pub result: JsonValue,
}

/// The aggregated statistics of a dataset, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Statistics {
    pub aggregations: Vec<Aggregation>,
}

impl Statistics {
    pub fn new(aggregations: Vec<Aggregation>) -> Self {
        Statistics { aggregations }
    }

    /// First aggregation matching `(path, kind)`.
    pub fn find(&self, path: &str, kind: AggregationKind) -> Option<&Aggregation> {
        self.aggregations
            .iter()
            .find(|a| a.name == path && a.kind == kind)
    }

    pub fn count(&self, path: &str, kind: AggregationKind) -> Option<u64> {
        self.find(path, kind).and_then(|a| a.result.as_u64())
    }

    /// Compute `bounds`, `count` and `none_count` for every numeric field of
    /// `schema`. Date bounds are wrapped the way a statistics backend
    /// reports them.
    pub fn compute(dataset: &Dataset, schema: &FieldSchema) -> Self {
        let mut aggregations = Vec::new();
        for path in schema.numeric_paths() {
            let mut min: Option<f64> = None;
            let mut max: Option<f64> = None;
            let mut count = 0u64;
            let mut none_count = 0u64;

            for value in dataset.values(path) {
                if value.is_null() {
                    none_count += 1;
                    continue;
                }
                count += 1;
                for x in numeric_elements(value) {
                    min = Some(min.map_or(x, |m| m.min(x)));
                    max = Some(max.map_or(x, |m| m.max(x)));
                }
            }

            let wrap = |v: Option<f64>| -> JsonValue {
                match (v, schema.element_type(path)) {
                    (None, _) => JsonValue::Null,
                    (Some(ms), Some(FieldType::Date)) => json!({"_cls": "Date", "datetime": ms}),
                    (Some(ms), Some(FieldType::DateTime)) => {
                        json!({"_cls": "DateTime", "datetime": ms})
                    }
                    (Some(x), _) => json!(x),
                }
            };

            aggregations.push(Aggregation {
                name: path.to_string(),
                kind: AggregationKind::Bounds,
                result: JsonValue::Array(vec![wrap(min), wrap(max)]),
            });
            aggregations.push(Aggregation {
                name: path.to_string(),
                kind: AggregationKind::Count,
                result: json!(count),
            });
            aggregations.push(Aggregation {
                name: path.to_string(),
                kind: AggregationKind::NoneCount,
                result: json!(none_count),
            });
        }
        log::debug!("computed {} aggregations", aggregations.len());
        Statistics { aggregations }
    }
}

fn numeric_elements(value: &FieldValue) -> Vec<f64> {
    match value {
        FieldValue::List(items) => items.iter().filter_map(FieldValue::as_f64).collect(),
        other => other.as_f64().into_iter().collect(),
    }
}

// ---------------------------------------------------------------------------
// Bounds resolution
// ---------------------------------------------------------------------------

/// Resolve the `[min, max]` bounds of `path` from the aggregated statistics.
///
/// Date and date-time fields read the `datetime` payload of each entry.
/// A missing `bounds` entry gives `[None, None]`. When `default_range` is
/// given and an entry exists, the bounds are widened to cover it.
pub fn resolve_bounds(
    schema: &FieldSchema,
    stats: &Statistics,
    path: &str,
    default_range: Option<&Range>,
) -> Range {
    let Some(agg) = stats.find(path, AggregationKind::Bounds) else {
        return [None, None];
    };
    let Some(pair) = agg.result.as_array().filter(|a| a.len() == 2) else {
        log::warn!("unreadable bounds payload for '{path}': {}", agg.result);
        return [None, None];
    };
    let (lo, hi) = (&pair[0], &pair[1]);

    let unwrap_date = schema.is_date_or_date_time_field(path);
    let entry = |v: &JsonValue| -> Option<f64> {
        if unwrap_date {
            v.get("datetime").and_then(JsonValue::as_f64)
        } else {
            v.as_f64()
        }
    };
    let bounds = [entry(lo), entry(hi)];

    match default_range {
        Some([min, max]) => [lesser(bounds[0], *min), greater(bounds[1], *max)],
        None => bounds,
    }
}

fn lesser(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn greater(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
