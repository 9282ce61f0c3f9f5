use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::types::criteria::{CriteriaUpdate, FilterCriteria, Scope};
use handle_errors::Error;

/// Durable key/value backend behind the filter store. Production writes
/// through to a JSON file; tests use the in-memory backend.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, Error>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), Error>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON document on disk holding every scope's entry, written through
/// on each change so criteria survive a full restart.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "stored filters are unreadable, starting over"
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(Error::StorageError(e)),
        };
        Ok(FileStorage { path, entries })
    }

    fn flush(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(Error::StorageError)?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.entries).map_err(Error::SerializationError)?;
        std::fs::write(&self.path, raw).map_err(Error::StorageError)
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

impl<B: StorageBackend> StorageBackend for &mut B {
    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), Error> {
        (**self).write(key, value)
    }
}

/// Lets several screens share one durable backend.
impl<B: StorageBackend> StorageBackend for Arc<Mutex<B>> {
    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        self.lock().expect("storage mutex poisoned").read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.lock().expect("storage mutex poisoned").write(key, value)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct StoredScope {
    criteria: FilterCriteria,
    #[serde(default = "first_page")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

/// Key-scoped persisted criteria plus, for the screens that want it, the
/// page the user was on. There is no schema versioning: an entry that no
/// longer deserializes is discarded and the scope starts from its defaults.
#[derive(Debug)]
pub struct FilterStore<B> {
    backend: B,
}

impl<B: StorageBackend> FilterStore<B> {
    pub fn new(backend: B) -> Self {
        FilterStore { backend }
    }

    pub fn get(&self, scope: Scope) -> FilterCriteria {
        self.load(scope).criteria
    }

    /// Shallow-merge one edit and write the result through. Any criteria
    /// change also sends the stored page back to 1.
    pub fn set(&mut self, scope: Scope, update: CriteriaUpdate) -> Result<FilterCriteria, Error> {
        let mut stored = self.load(scope);
        stored.criteria.apply(update);
        stored.page = 1;
        self.persist(scope, &stored)?;
        Ok(stored.criteria)
    }

    pub fn page(&self, scope: Scope) -> u32 {
        if scope.persists_page() {
            self.load(scope).page
        } else {
            1
        }
    }

    pub fn set_page(&mut self, scope: Scope, page: u32) -> Result<(), Error> {
        if !scope.persists_page() {
            return Ok(());
        }
        let mut stored = self.load(scope);
        stored.page = page.max(1);
        self.persist(scope, &stored)
    }

    fn load(&self, scope: Scope) -> StoredScope {
        let fresh = || StoredScope {
            criteria: scope.default_criteria(),
            page: 1,
        };
        match self.backend.read(scope.storage_key()) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(stored) => stored,
                Err(e) => {
                    tracing::warn!(
                        scope = scope.storage_key(),
                        error = %e,
                        "persisted criteria do not match the current shape, resetting"
                    );
                    fresh()
                }
            },
            Ok(None) => fresh(),
            Err(e) => {
                tracing::warn!(
                    scope = scope.storage_key(),
                    error = %e,
                    "could not read persisted criteria"
                );
                fresh()
            }
        }
    }

    fn persist(&mut self, scope: Scope, stored: &StoredScope) -> Result<(), Error> {
        let raw = serde_json::to_string(stored).map_err(Error::SerializationError)?;
        self.backend.write(scope.storage_key(), &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::criteria::{StatusFilter, VisibilityFilter};

    #[test]
    fn an_unknown_scope_starts_from_its_defaults() {
        let store = FilterStore::new(MemoryStorage::new());
        let criteria = store.get(Scope::QuestionSearch);
        assert_eq!(criteria, Scope::QuestionSearch.default_criteria());
    }

    #[test]
    fn set_merges_and_survives_a_reload() {
        let mut backend = MemoryStorage::new();
        {
            let mut store = FilterStore::new(&mut backend);
            store
                .set(Scope::MyQuestionSearch, CriteriaUpdate::title("capitals"))
                .unwrap();
            store
                .set(
                    Scope::MyQuestionSearch,
                    CriteriaUpdate::status(StatusFilter::InProgress),
                )
                .unwrap();
        }

        // a fresh store over the same backend is the reload
        let store = FilterStore::new(&mut backend);
        let criteria = store.get(Scope::MyQuestionSearch);
        assert_eq!(criteria.title, "capitals");
        assert_eq!(criteria.status, Some(StatusFilter::InProgress));
    }

    #[test]
    fn scopes_do_not_leak_into_each_other() {
        let mut store = FilterStore::new(MemoryStorage::new());
        store
            .set(Scope::QuestionSearch, CriteriaUpdate::title("rust"))
            .unwrap();

        assert_eq!(store.get(Scope::FavoriteQuestionFilter).title, "");
    }

    #[test]
    fn any_criteria_change_resets_the_stored_page() {
        let mut store = FilterStore::new(MemoryStorage::new());
        store.set_page(Scope::MyQuestionSearch, 4).unwrap();
        assert_eq!(store.page(Scope::MyQuestionSearch), 4);

        store
            .set(Scope::MyQuestionSearch, CriteriaUpdate::genre(2))
            .unwrap();
        assert_eq!(store.page(Scope::MyQuestionSearch), 1);
    }

    #[test]
    fn page_is_only_persisted_for_back_navigation_scopes() {
        let mut store = FilterStore::new(MemoryStorage::new());
        store.set_page(Scope::QuestionSearch, 7).unwrap();
        assert_eq!(store.page(Scope::QuestionSearch), 1);

        store.set_page(Scope::MyCreatedQuestionSearch, 7).unwrap();
        assert_eq!(store.page(Scope::MyCreatedQuestionSearch), 7);
    }

    #[test]
    fn a_stale_stored_shape_resets_to_defaults() {
        let mut backend = MemoryStorage::new();
        backend
            .write(
                Scope::MyQuestionSearch.storage_key(),
                r#"{"keyword":"old shape","genre":"history"}"#,
            )
            .unwrap();

        let store = FilterStore::new(backend);
        assert_eq!(
            store.get(Scope::MyQuestionSearch),
            Scope::MyQuestionSearch.default_criteria()
        );
    }

    #[test]
    fn updates_touch_only_the_edited_fields() {
        let mut store = FilterStore::new(MemoryStorage::new());
        store
            .set(
                Scope::MyCreatedQuestionSearch,
                CriteriaUpdate::visibility(VisibilityFilter::Public),
            )
            .unwrap();
        let criteria = store
            .set(Scope::MyCreatedQuestionSearch, CriteriaUpdate::title("quiz"))
            .unwrap();

        assert_eq!(criteria.visibility, Some(VisibilityFilter::Public));
        assert_eq!(criteria.title, "quiz");
    }

    #[test]
    fn file_storage_round_trips_across_reopen() {
        let path = std::env::temp_dir().join(format!(
            "ecoran-filter-store-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let storage = FileStorage::open(&path).unwrap();
            let mut store = FilterStore::new(storage);
            store
                .set(Scope::MyQuestionSearch, CriteriaUpdate::title("persisted"))
                .unwrap();
        }
        {
            let storage = FileStorage::open(&path).unwrap();
            let store = FilterStore::new(storage);
            assert_eq!(store.get(Scope::MyQuestionSearch).title, "persisted");
        }

        let _ = std::fs::remove_file(&path);
    }
}
