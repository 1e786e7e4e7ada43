use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// DerivedCache – pull-based memo of derived values
// ---------------------------------------------------------------------------

/// Memoizes a derivation by its arguments.
///
/// Every entry remembers the input revision it was computed from. A lookup
/// with a newer revision recomputes the value, so bumping the revision is
/// enough to invalidate everything derived from the old inputs.
#[derive(Debug)]
pub struct DerivedCache<K, V> {
    entries: RefCell<HashMap<K, (u64, V)>>,
}

impl<K, V> Default for DerivedCache<K, V> {
    fn default() -> Self {
        DerivedCache {
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<K: Hash + Eq, V: Clone> DerivedCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value cached for `key` at `revision`, computing and storing
    /// it on a miss.
    ///
    /// `compute` must not reenter this cache.
    pub fn get_or_compute(&self, key: K, revision: u64, compute: impl FnOnce() -> V) -> V {
        if let Some((rev, value)) = self.entries.borrow().get(&key) {
            if *rev == revision {
                return value.clone();
            }
        }
        let value = compute();
        self.entries
            .borrow_mut()
            .insert(key, (revision, value.clone()));
        value
    }

    /// Drop every entry.
    pub fn invalidate(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
