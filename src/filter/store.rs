use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::numeric::NumericFilter;

// ---------------------------------------------------------------------------
// Keys and errors
// ---------------------------------------------------------------------------

/// A stored filter is addressed by field path and by view: the main grid
/// (`modal == false`) or the sample modal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilterKey {
    pub path: String,
    pub modal: bool,
}

impl FilterKey {
    pub fn new(path: &str, modal: bool) -> Self {
        FilterKey {
            path: path.to_string(),
            modal,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("filter store I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid filter store JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// FilterStore
// ---------------------------------------------------------------------------

/// Persisted filter records. A key is either present with a record or
/// absent, and absent means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<StoredFilter>", into = "Vec<StoredFilter>")]
pub struct FilterStore {
    filters: BTreeMap<FilterKey, NumericFilter>,
}

/// On-disk form of one entry; JSON object keys must be strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFilter {
    pub path: String,
    pub modal: bool,
    #[serde(flatten)]
    pub filter: NumericFilter,
}

impl From<Vec<StoredFilter>> for FilterStore {
    fn from(entries: Vec<StoredFilter>) -> Self {
        let filters = entries
            .into_iter()
            .map(|e| (FilterKey { path: e.path, modal: e.modal }, e.filter))
            .collect();
        FilterStore { filters }
    }
}

impl From<FilterStore> for Vec<StoredFilter> {
    fn from(store: FilterStore) -> Self {
        store
            .filters
            .into_iter()
            .map(|(key, filter)| StoredFilter {
                path: key.path,
                modal: key.modal,
                filter,
            })
            .collect()
    }
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &FilterKey) -> Option<&NumericFilter> {
        self.filters.get(key)
    }

    /// Upsert `filter`, or remove the entry when `filter` is `None`.
    /// Returns the previous record.
    pub fn set(&mut self, key: FilterKey, filter: Option<NumericFilter>) -> Option<NumericFilter> {
        match filter {
            Some(filter) => self.filters.insert(key, filter),
            None => self.filters.remove(&key),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilterKey, &NumericFilter)> {
        self.filters.iter()
    }

    /// Drop every record of one view.
    pub fn clear_context(&mut self, modal: bool) {
        self.filters.retain(|key, _| key.modal != modal);
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&FilterKey, &NumericFilter) -> bool) {
        self.filters.retain(|key, filter| keep(key, filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json(&text)?;
        log::debug!("loaded {} filters from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let text = self.to_json()?;
        std::fs::write(path, text).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
