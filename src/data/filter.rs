use super::model::{Dataset, FieldValue};
use crate::filter::numeric::{NumericFilter, Range};
use crate::state::FilterSession;

// ---------------------------------------------------------------------------
// Applying range filters to samples
// ---------------------------------------------------------------------------

/// Return indices of samples that pass every active filter of one view.
///
/// A sample passes a field filter when:
/// * its value is null or missing → only if `none` is set
/// * its value is a list → if any element lies in the range
/// * otherwise → if the value lies in the inclusive range, a null side
///   being unbounded
pub fn filtered_indices(dataset: &Dataset, session: &FilterSession, modal: bool) -> Vec<usize> {
    let active = session.active_filters(modal);
    if active.is_empty() {
        return (0..dataset.len()).collect();
    }

    dataset
        .samples
        .iter()
        .enumerate()
        .filter(|(_, sample)| {
            active.iter().all(|(path, filter)| {
                passes(sample.value(path), filter)
            })
        })
        .map(|(i, _)| i)
        .collect()
}

fn passes(value: &FieldValue, filter: &NumericFilter) -> bool {
    match value {
        FieldValue::Null => filter.none,
        FieldValue::List(items) if items.is_empty() => filter.none,
        FieldValue::List(items) => items.iter().any(|item| passes(item, filter)),
        other => other
            .as_f64()
            .is_some_and(|x| in_range(x, &filter.range)),
    }
}

fn in_range(x: f64, range: &Range) -> bool {
    range[0].map_or(true, |min| x >= min) && range[1].map_or(true, |max| x <= max)
}
