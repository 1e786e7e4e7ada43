use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Range and filter record
// ---------------------------------------------------------------------------

/// `[min, max]`, each side nullable. Dates are in milliseconds.
pub type Range = [Option<f64>; 2];

/// Tag carried by every stored filter record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    Numeric,
}

/// A numeric range filter on one field.
///
/// `none` tells whether samples with a missing value are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericFilter {
    pub range: Range,
    pub none: bool,
    #[serde(default)]
    pub kind: FilterKind,
}

impl NumericFilter {
    pub fn new(range: Range, none: bool) -> Self {
        NumericFilter {
            range,
            none,
            kind: FilterKind::Numeric,
        }
    }

    /// The state shown when nothing is stored: full bounds, nulls kept.
    pub fn default_for(bounds: Range) -> Self {
        NumericFilter::new(bounds, true)
    }

    /// Whether this record behaves exactly like having no filter at all.
    pub fn is_default(&self, bounds: &Range) -> bool {
        meets_default(&self.range, self.none, bounds)
    }
}

/// Exact comparison against the default state: no float tolerance.
pub fn meets_default(range: &Range, none: bool, bounds: &Range) -> bool {
    none && range == bounds
}

/// A single user edit on a filter widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterEdit {
    Range(Range),
    None(bool),
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// The filter a widget displays for a stored record (or its absence).
///
/// A missing record and a default-equivalent record read the same. Any
/// deviation from the default reports `none = false`.
pub fn derive(stored: Option<&NumericFilter>, bounds: &Range) -> NumericFilter {
    let mut filter = stored
        .cloned()
        .unwrap_or_else(|| NumericFilter::default_for(*bounds));
    if !filter.is_default(bounds) {
        filter.none = false;
    }
    filter
}

/// Merge `edit` into the displayed filter `current` and decide what the
/// store should hold afterwards.
///
/// Returns `None` when the result is default-equivalent and the stored
/// record must be cleared. A range edit is checked as if `none` were true;
/// a `none` edit is checked with the new flag.
pub fn normalize_edit(
    current: &NumericFilter,
    edit: FilterEdit,
    bounds: &Range,
) -> Option<NumericFilter> {
    let mut merged = current.clone();
    merged.kind = FilterKind::Numeric;
    let check_none = match edit {
        FilterEdit::Range(range) => {
            merged.range = range;
            true
        }
        FilterEdit::None(none) => {
            merged.none = none;
            none
        }
    };

    if meets_default(&merged.range, check_none, bounds) {
        return None;
    }
    merged.none = false;
    Some(merged)
}

/// Whether `filter` actually restricts the field.
///
/// Range positions where either side is null are ignored, and a range
/// difference only counts when the bounds are not a single constant value.
pub fn is_filtered(filter: &NumericFilter, bounds: &Range) -> bool {
    if !filter.none {
        return true;
    }
    let differs = filter
        .range
        .iter()
        .zip(bounds.iter())
        .any(|pair| matches!(pair, (Some(r), Some(b)) if r != b));
    differs && bounds[0] != bounds[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Range = [Some(0.0), Some(10.0)];

    #[test]
    fn absent_record_reads_as_default() {
        let f = derive(None, &BOUNDS);
        assert_eq!(f, NumericFilter::default_for(BOUNDS));
        assert!(!is_filtered(&f, &BOUNDS));
    }

    #[test]
    fn deviating_record_reports_none_false() {
        let stored = NumericFilter::new([Some(2.0), Some(8.0)], true);
        let f = derive(Some(&stored), &BOUNDS);
        assert_eq!(f.range, [Some(2.0), Some(8.0)]);
        assert!(!f.none);
        assert!(is_filtered(&f, &BOUNDS));
    }

    #[test]
    fn default_equivalent_record_reads_like_absent() {
        let stored = NumericFilter::new(BOUNDS, true);
        assert_eq!(derive(Some(&stored), &BOUNDS), derive(None, &BOUNDS));
    }

    #[test]
    fn range_edit_to_bounds_clears() {
        let current = NumericFilter::new([Some(2.0), Some(8.0)], false);
        assert_eq!(normalize_edit(&current, FilterEdit::Range(BOUNDS), &BOUNDS), None);
    }

    #[test]
    fn range_edit_persists_with_none_false() {
        let current = derive(None, &BOUNDS);
        let stored = normalize_edit(&current, FilterEdit::Range([Some(2.0), Some(8.0)]), &BOUNDS);
        assert_eq!(stored, Some(NumericFilter::new([Some(2.0), Some(8.0)], false)));
    }

    #[test]
    fn none_edits_toggle_between_active_and_cleared() {
        let current = derive(None, &BOUNDS);
        let stored = normalize_edit(&current, FilterEdit::None(false), &BOUNDS);
        assert_eq!(stored, Some(NumericFilter::new(BOUNDS, false)));

        let current = derive(stored.as_ref(), &BOUNDS);
        assert_eq!(normalize_edit(&current, FilterEdit::None(true), &BOUNDS), None);
    }

    #[test]
    fn none_true_on_narrowed_range_stays_false() {
        let current = NumericFilter::new([Some(2.0), Some(8.0)], false);
        let stored = normalize_edit(&current, FilterEdit::None(true), &BOUNDS);
        assert_eq!(stored, Some(NumericFilter::new([Some(2.0), Some(8.0)], false)));
    }

    #[test]
    fn degenerate_bounds_are_not_filtered_by_range() {
        let bounds = [Some(5.0), Some(5.0)];
        let f = NumericFilter::new([Some(5.0), Some(5.0)], true);
        assert!(!is_filtered(&f, &bounds));

        let shifted = NumericFilter::new([Some(4.0), Some(5.0)], true);
        assert!(!is_filtered(&shifted, &bounds));

        let excluded = NumericFilter::new([Some(5.0), Some(5.0)], false);
        assert!(is_filtered(&excluded, &bounds));
    }

    #[test]
    fn null_positions_are_ignored() {
        let f = NumericFilter::new([None, Some(10.0)], true);
        assert!(!is_filtered(&f, &BOUNDS));

        let null_bounds: Range = [None, None];
        assert!(!is_filtered(&NumericFilter::default_for(null_bounds), &null_bounds));
    }

    #[test]
    fn equality_is_exact() {
        let almost = NumericFilter::new([Some(0.0), Some(10.0 - f64::EPSILON * 8.0)], true);
        assert!(!almost.is_default(&BOUNDS));
        assert!(is_filtered(&almost, &BOUNDS));
    }
}
