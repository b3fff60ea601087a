//! Criteria persistence — JSON state file and the saved-view store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use listview_core::{Criteria, CriteriaObserver};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Load criteria from disk. Returns defaults if the file is missing or corrupt.
pub fn load(path: &Path) -> Criteria {
    try_load(path).unwrap_or_default()
}

/// Load criteria only if the state file exists and parses. `None` leaves
/// the caller's own starting criteria in place.
pub fn try_load(path: &Path) -> Option<Criteria> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(criteria) => Some(criteria),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt state file, ignoring it");
            None
        }
    }
}

/// Save criteria to disk. Creates parent directories if needed.
pub fn save(path: &Path, criteria: &Criteria) -> Result<(), StoreError> {
    write_json(path, criteria)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(io_err(path))
}

/// Writes the criteria to a state file on every change.
///
/// Write failures are logged, not propagated; the view keeps working.
#[derive(Debug, Clone)]
pub struct StateFileSync {
    path: PathBuf,
}

impl StateFileSync {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CriteriaObserver for StateFileSync {
    fn criteria_changed(&mut self, criteria: &Criteria) {
        if let Err(e) = save(&self.path, criteria) {
            tracing::warn!(error = %e, "failed to persist criteria");
        }
    }
}

// ── Saved views ──────────────────────────────────────────────────────

/// A named criteria snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedView {
    pub name: String,
    pub criteria: Criteria,
    pub saved_at: NaiveDateTime,
}

/// Saved views keyed by [`Criteria::view_id`], stored as one JSON map.
///
/// Saving the same criteria twice overwrites the earlier entry (same id).
#[derive(Debug)]
pub struct ViewStore {
    path: PathBuf,
    views: BTreeMap<String, SavedView>,
}

impl ViewStore {
    /// Open the store at `path`. A missing file is an empty store; a corrupt
    /// one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let views = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "corrupt view store, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, views })
    }

    /// Save `criteria` under `name` and return its view id.
    pub fn save(&mut self, name: impl Into<String>, criteria: &Criteria) -> Result<String, StoreError> {
        let id = criteria.view_id();
        self.views.insert(
            id.clone(),
            SavedView {
                name: name.into(),
                criteria: criteria.clone(),
                saved_at: Utc::now().naive_utc(),
            },
        );
        self.flush()?;
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Option<&SavedView> {
        self.views.get(id)
    }

    /// Look a view up by id, or failing that by exact name.
    pub fn find(&self, id_or_name: &str) -> Option<&SavedView> {
        self.get(id_or_name)
            .or_else(|| self.views.values().find(|v| v.name == id_or_name))
    }

    /// All saved views, ordered by id.
    pub fn list(&self) -> impl Iterator<Item = (&str, &SavedView)> {
        self.views.iter().map(|(id, v)| (id.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn remove(&mut self, id: &str) -> Result<Option<SavedView>, StoreError> {
        let removed = self.views.remove(id);
        if removed.is_some() {
            self.flush()?;
        }
        Ok(removed)
    }

    fn flush(&self) -> Result<(), StoreError> {
        write_json(&self.path, &self.views)
    }
}
