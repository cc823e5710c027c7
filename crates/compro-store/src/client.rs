//! `ObjectStoreClient`: the interface the `query` generator compiles
//! against. Out of scope per spec.md §1 — this crate defines the contract
//! and an in-memory double; a real cluster client lives with the
//! reconciler.

use crate::error::ObjectStoreError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Fetch a single object by name, or a list of objects by label selector.
///
/// Implementations are expected to be cheap to clone/share (`Arc` around an
/// HTTP client, a cached client handle, etc.) since the evaluator may build
/// one query compiler per clause and call it repeatedly during
/// instantiation.
pub trait ObjectStoreClient: Send + Sync {
    fn get(&self, api_version: &str, kind: &str, name: &str) -> Result<Value, ObjectStoreError>;

    fn list(&self, api_version: &str, kind: &str, match_labels: &BTreeMap<String, String>) -> Result<Vec<Value>, ObjectStoreError>;
}

/// An in-memory object store, for tests and for the scenarios in spec.md
/// §8 that don't need a real cluster. Records every `get`/`list` call it
/// receives, mirroring `ScriptedFetcher::call_count`, so tests can assert
/// a memoized query generator only calls through once per `Eval`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: Vec<StoredObject>,
    calls: Mutex<usize>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    api_version: String,
    kind: String,
    name: String,
    labels: BTreeMap<String, String>,
    value: Value,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        api_version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        labels: BTreeMap<String, String>,
        value: Value,
    ) {
        self.objects.push(StoredObject {
            api_version: api_version.into(),
            kind: kind.into(),
            name: name.into(),
            labels,
            value,
        });
    }

    /// How many times `get` or `list` has been called so far.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ObjectStoreClient for InMemoryStore {
    fn get(&self, api_version: &str, kind: &str, name: &str) -> Result<Value, ObjectStoreError> {
        *self.calls.lock().unwrap() += 1;
        self.objects
            .iter()
            .find(|obj| obj.api_version == api_version && obj.kind == kind && obj.name == name)
            .map(|obj| obj.value.clone())
            .ok_or_else(|| ObjectStoreError::NotFound {
                api_version: api_version.to_string(),
                kind: kind.to_string(),
                name: name.to_string(),
            })
    }

    fn list(&self, api_version: &str, kind: &str, match_labels: &BTreeMap<String, String>) -> Result<Vec<Value>, ObjectStoreError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self
            .objects
            .iter()
            .filter(|obj| {
                obj.api_version == api_version
                    && obj.kind == kind
                    && match_labels.iter().all(|(k, v)| obj.labels.get(k) == Some(v))
            })
            .map(|obj| obj.value.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_finds_named_object() {
        let mut store = InMemoryStore::new();
        store.insert("v1", "ConfigMap", "a", BTreeMap::new(), json!({"data": {"k": "v"}}));
        let obj = store.get("v1", "ConfigMap", "a").unwrap();
        assert_eq!(obj, json!({"data": {"k": "v"}}));
    }

    #[test]
    fn get_missing_object_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.get("v1", "ConfigMap", "missing").unwrap_err();
        assert!(matches!(err, ObjectStoreError::NotFound { .. }));
    }

    #[test]
    fn list_filters_by_match_labels() {
        let mut store = InMemoryStore::new();
        let mut app_labels = BTreeMap::new();
        app_labels.insert("app".to_string(), "web".to_string());
        store.insert("v1", "Pod", "a", app_labels.clone(), json!({"name": "a"}));
        store.insert("v1", "Pod", "b", BTreeMap::new(), json!({"name": "b"}));

        let results = store.list("v1", "Pod", &app_labels).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["name"], "a");
    }

    #[test]
    fn list_with_no_matches_is_empty_not_error() {
        let store = InMemoryStore::new();
        let results = store.list("v1", "Service", &BTreeMap::new()).unwrap();
        assert!(results.is_empty());
    }
}
