// crates/actions/src/store.rs

//! `KeyValueStore` implementations: a process-local map and a JSON document on
//! disk. Both keep namespaces and keys ordered.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use aari_core::{AariError, AariResult, KeyValueStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

type Namespaces = BTreeMap<String, BTreeMap<String, Value>>;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<Namespaces>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, namespace: &str, key: &str) -> AariResult<Option<Value>> {
        Ok(self
            .data
            .read()
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(&self, namespace: &str, key: &str, value: Value) -> AariResult<()> {
        self.data
            .write()
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, namespace: &str, key: &str) -> AariResult<Option<Value>> {
        Ok(self
            .data
            .write()
            .get_mut(namespace)
            .and_then(|entries| entries.remove(key)))
    }

    async fn entries(&self, namespace: &str) -> AariResult<Vec<(String, Value)>> {
        Ok(self
            .data
            .read()
            .get(namespace)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Whole-document JSON store. Every write rewrites the file while holding the
/// lock, so writes are serialised. The in-memory copy only changes once the
/// file write succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<Namespaces>,
}

impl JsonFileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> AariResult<Self> {
        let path = path.as_ref().to_path_buf();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Namespaces::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                AariError::Store(format!("Corrupt store file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Store file {} not found, starting empty", path.display());
                Namespaces::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, data: &Namespaces) -> AariResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&self.path, content).await?;
        debug!("Persisted store to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, namespace: &str, key: &str) -> AariResult<Option<Value>> {
        let data = self.data.lock().await;
        Ok(data.get(namespace).and_then(|e| e.get(key)).cloned())
    }

    async fn put(&self, namespace: &str, key: &str, value: Value) -> AariResult<()> {
        let mut data = self.data.lock().await;
        let mut updated = data.clone();
        updated
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self.persist(&updated).await?;
        *data = updated;
        Ok(())
    }

    async fn remove(&self, namespace: &str, key: &str) -> AariResult<Option<Value>> {
        let mut data = self.data.lock().await;
        let mut updated = data.clone();
        let removed = updated.get_mut(namespace).and_then(|e| e.remove(key));
        if removed.is_some() {
            self.persist(&updated).await?;
            *data = updated;
        }
        Ok(removed)
    }

    async fn entries(&self, namespace: &str) -> AariResult<Vec<(String, Value)>> {
        let data = self.data.lock().await;
        Ok(data
            .get(namespace)
            .map(|e| e.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aari_core::{Contact, CONTACTS_NAMESPACE};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn in_memory_round_trip() {
        let store = InMemoryStore::new();
        store.put("prefs", "theme", json!("dark")).await.unwrap();
        assert_eq!(store.get("prefs", "theme").await.unwrap(), Some(json!("dark")));
        assert_eq!(store.get("prefs", "missing").await.unwrap(), None);
        assert_eq!(store.remove("prefs", "theme").await.unwrap(), Some(json!("dark")));
        assert!(store.entries("prefs").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn entries_are_ordered_by_key() {
        let store = InMemoryStore::new();
        store.put("ns", "b", json!(2)).await.unwrap();
        store.put("ns", "a", json!(1)).await.unwrap();
        let keys: Vec<String> = store
            .entries("ns")
            .await
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn resolves_plain_and_structured_contacts() {
        let store = InMemoryStore::new();
        store
            .put(CONTACTS_NAMESPACE, "mom", json!("+15550100"))
            .await
            .unwrap();
        let contact = Contact {
            name: "John".to_string(),
            phone: "+15550101".to_string(),
            email: None,
            added_at: chrono::Utc::now(),
        };
        store
            .put(CONTACTS_NAMESPACE, "john", serde_json::to_value(&contact).unwrap())
            .await
            .unwrap();
        store
            .put(CONTACTS_NAMESPACE, "ghost", json!({"name": "Ghost", "phone": " ", "added_at": "2024-01-01T00:00:00Z"}))
            .await
            .unwrap();

        assert_eq!(
            store.resolve_contact("Mom").await.unwrap().as_deref(),
            Some("+15550100")
        );
        assert_eq!(
            store.resolve_contact("john").await.unwrap().as_deref(),
            Some("+15550101")
        );
        assert_eq!(store.resolve_contact("ghost").await.unwrap(), None);
        assert_eq!(store.resolve_contact("zorg").await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_writes_leave_the_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let parent = dir.path().join("data");
        let store = JsonFileStore::open(parent.join("store.json")).await.unwrap();
        store.put("ns", "kept", json!(1)).await.unwrap();

        // A file where the directory should be makes every write fail.
        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, "not a directory").unwrap();

        assert!(store.put("ns", "new", json!(2)).await.is_err());
        assert_eq!(store.get("ns", "new").await.unwrap(), None);

        assert!(store.remove("ns", "kept").await.is_err());
        assert_eq!(store.get("ns", "kept").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn json_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("memory.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.put(CONTACTS_NAMESPACE, "dad", json!("+15550102")).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.resolve_contact("dad").await.unwrap().as_deref(),
            Some("+15550102")
        );
    }

    #[tokio::test]
    async fn corrupt_file_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, AariError::Store(_)));
    }
}
