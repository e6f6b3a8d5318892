use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use watch_porter_core::ModelNumber;

use crate::types::{CatalogEntry, CatalogError, CatalogHit};

const CATALOG_FILE: &str = "model_specs_catalog.json";

/// `<data_dir>/watch-porter/model_specs_catalog.json`
pub fn default_catalog_path() -> Result<PathBuf, CatalogError> {
    let base = dirs::data_dir().ok_or(CatalogError::NoDataDir)?;
    Ok(base.join("watch-porter").join(CATALOG_FILE))
}

/// In-memory catalog with an optional backing file.
///
/// Every mutation rewrites the whole file. Without a path (see
/// [`CatalogStore::in_memory`]) mutations stay in memory.
#[derive(Debug, Default)]
pub struct CatalogStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, CatalogEntry>,
}

impl CatalogStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Read the catalog at `path`. A missing file is an empty catalog.
    /// Values that are not entry objects are skipped.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let mut store = Self {
            path: Some(path.to_path_buf()),
            entries: BTreeMap::new(),
        };
        if !path.exists() {
            return Ok(store);
        }

        let contents = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let Value::Object(map) = serde_json::from_str::<Value>(&contents)? else {
            return Err(CatalogError::NotAnObject(path.to_path_buf()));
        };
        for (key, value) in map {
            match serde_json::from_value::<CatalogEntry>(value) {
                Ok(entry) => {
                    store.entries.insert(key, entry);
                }
                Err(e) => log::debug!("Skipping catalog entry {key}: {e}"),
            }
        }
        Ok(store)
    }

    /// Like [`load`](Self::load), but starts empty (keeping the path) when
    /// the file cannot be read.
    pub fn open(path: &Path) -> Self {
        match Self::load(path) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("Could not load catalog {}: {e}", path.display());
                Self {
                    path: Some(path.to_path_buf()),
                    entries: BTreeMap::new(),
                }
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CatalogEntry)> {
        self.entries.iter()
    }

    /// Find the best entry among the model's candidate keys.
    ///
    /// Candidates are ranked by fewest unknown groups, then most filled
    /// groups, then shortest key. Ties keep the raw key.
    pub fn lookup(&self, model: &ModelNumber) -> Option<CatalogHit> {
        let best = model
            .lookup_keys()
            .into_iter()
            .filter_map(|key| self.entries.get(&key).map(|entry| (key, entry)))
            .min_by_key(|(key, entry)| {
                (entry.unknown_count(), Reverse(entry.filled_count()), key.len())
            })?;

        log::debug!(
            "Catalog candidate selected: {} (unknown groups: {})",
            best.0,
            best.1.unknown_count()
        );
        Some(CatalogHit {
            key: best.0,
            entry: best.1.clone(),
        })
    }

    /// Add `entry` under `key` unless the key already exists. Returns the
    /// stored entry either way.
    pub fn insert_if_missing(&mut self, key: &str, entry: CatalogEntry) -> CatalogEntry {
        if let Some(existing) = self.entries.get(key) {
            return existing.clone();
        }
        self.entries.insert(key.to_string(), entry.clone());
        self.persist();
        log::info!("Added {key} to catalog");
        entry
    }

    /// Replace the entry under `key`, or add it.
    pub fn upsert(&mut self, key: &str, entry: CatalogEntry) {
        self.entries.insert(key.to_string(), entry);
        self.persist();
    }

    /// Change an existing entry in place. Returns `false` when the key is
    /// not in the catalog.
    pub fn update(&mut self, key: &str, f: impl FnOnce(&mut CatalogEntry)) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        f(entry);
        self.persist();
        true
    }

    /// Write the catalog to its file: pretty JSON to a temporary sibling,
    /// then rename over the target.
    pub fn flush(&self) -> Result<(), CatalogError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(|e| CatalogError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| CatalogError::io(path, e))?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            log::error!("Could not save catalog: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watch_porter_core::{CategoryGroup, GroupValue};

    fn entry_with(unknown: usize, filled: usize) -> CatalogEntry {
        let mut entry = CatalogEntry::default();
        for (i, group) in CategoryGroup::ALL.into_iter().take(filled).enumerate() {
            let value = if i < unknown {
                GroupValue::Unknown
            } else {
                GroupValue::label(format!("label {i}"))
            };
            entry.groups.set(group, Some(value));
        }
        entry
    }

    #[test]
    fn lookup_prefers_fewer_unknowns() {
        let mut store = CatalogStore::in_memory();
        store.upsert("SEIKOSKX007", entry_with(2, 7));
        store.upsert("SKX007", entry_with(0, 7));

        let hit = store.lookup(&ModelNumber::new("Seiko SKX007")).unwrap();
        assert_eq!(hit.key, "SKX007");
    }

    #[test]
    fn lookup_prefers_more_filled_then_raw_key() {
        let mut store = CatalogStore::in_memory();
        store.upsert("SEIKOSKX007", entry_with(0, 7));
        store.upsert("SKX007", entry_with(0, 3));
        let hit = store.lookup(&ModelNumber::new("Seiko SKX007")).unwrap();
        assert_eq!(hit.key, "SEIKOSKX007");

        store.upsert("SKX007", entry_with(0, 7));
        let hit = store.lookup(&ModelNumber::new("Seiko SKX007")).unwrap();
        assert_eq!(hit.key, "SKX007");
    }

    #[test]
    fn lookup_misses_cleanly() {
        let store = CatalogStore::in_memory();
        assert!(store.lookup(&ModelNumber::new("SKX007")).is_none());
        assert!(store.lookup(&ModelNumber::new("   ")).is_none());
    }

    #[test]
    fn insert_if_missing_keeps_existing() {
        let mut store = CatalogStore::in_memory();
        let first = CatalogEntry {
            name: "first".into(),
            ..Default::default()
        };
        let second = CatalogEntry {
            name: "second".into(),
            ..Default::default()
        };
        store.insert_if_missing("K", first);
        let kept = store.insert_if_missing("K", second);
        assert_eq!(kept.name, "first");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_only_touches_existing_keys() {
        let mut store = CatalogStore::in_memory();
        assert!(!store.update("K", |e| e.image_url = "x".into()));
        store.upsert("K", CatalogEntry::default());
        assert!(store.update("K", |e| e.image_url = "x".into()));
        assert_eq!(store.get("K").unwrap().image_url, "x");
    }
}
