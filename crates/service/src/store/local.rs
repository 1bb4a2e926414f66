use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{fs, sync::RwLock};
use tracing::debug;

use super::{with_id, DeleteResult, Document, DocumentId, DocumentStore, Filter, StoreError, UpdateResult, ID_FIELD};

/// Collection name -> documents in insertion order, each carrying its `_id`.
type Collections = HashMap<String, Vec<Document>>;

/// Process-local document store.
///
/// Holds every collection in memory. When opened with a path, the whole map is
/// rewritten to that JSON file after each mutation, so state survives restarts.
/// Intended for development and tests where a database is overkill.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<RwLock<Collections>>,
    file_path: Option<PathBuf>,
}

impl LocalStore {
    pub fn in_memory() -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), file_path: None }
    }

    /// Open a file-backed store. Creates the file with no collections if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: Collections = match fs::read(&file_path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::Io(format!("cannot parse {}: {e}", file_path.display()))
            })?,
            Err(_) => {
                let empty: Collections = HashMap::new();
                write_file(&file_path, &empty).await?;
                empty
            }
        };

        Ok(Self { inner: Arc::new(RwLock::new(map)), file_path: Some(file_path) })
    }

    /// Called with the write guard still held so file order matches memory order.
    /// A failed save is rolled back by the caller before the guard is released.
    async fn save(&self, map: &Collections) -> Result<(), StoreError> {
        match &self.file_path {
            Some(path) => write_file(path, map).await,
            None => Ok(()),
        }
    }
}

async fn write_file(path: &PathBuf, map: &Collections) -> Result<(), StoreError> {
    let data = serde_json::to_vec(map).map_err(|e| StoreError::Io(e.to_string()))?;
    fs::write(path, data).await.map_err(|e| StoreError::Io(e.to_string()))
}

fn id_matches(doc: &Document, id: DocumentId) -> bool {
    doc.get(ID_FIELD).and_then(Value::as_str) == Some(id.to_string().as_str())
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let map = self.inner.read().await;
        Ok(map
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: &str, id: DocumentId) -> Result<Option<Document>, StoreError> {
        let map = self.inner.read().await;
        Ok(map
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| id_matches(d, id)))
            .cloned())
    }

    async fn insert_one(&self, collection: &str, mut doc: Document) -> Result<DocumentId, StoreError> {
        doc.remove(ID_FIELD);
        let id = DocumentId::new();
        let mut map = self.inner.write().await;
        map.entry(collection.to_string()).or_default().push(with_id(doc, id));
        if let Err(e) = self.save(&map).await {
            if let Some(docs) = map.get_mut(collection) {
                docs.pop();
            }
            return Err(e);
        }
        debug!(%collection, %id, "document inserted");
        Ok(id)
    }

    async fn update_one(&self, collection: &str, id: DocumentId, mut set: Document) -> Result<UpdateResult, StoreError> {
        set.remove(ID_FIELD);
        let mut map = self.inner.write().await;
        let Some(pos) = map
            .get(collection)
            .and_then(|docs| docs.iter().position(|d| id_matches(d, id)))
        else {
            return Ok(UpdateResult { matched_count: 0, modified_count: 0 });
        };
        let Some(docs) = map.get_mut(collection) else {
            return Ok(UpdateResult { matched_count: 0, modified_count: 0 });
        };

        let mut updated = docs[pos].clone();
        let mut changed = false;
        for (key, value) in set {
            if updated.get(&key) != Some(&value) {
                updated.insert(key, value);
                changed = true;
            }
        }
        if changed {
            let previous = std::mem::replace(&mut docs[pos], updated);
            if let Err(e) = self.save(&map).await {
                if let Some(docs) = map.get_mut(collection) {
                    docs[pos] = previous;
                }
                return Err(e);
            }
        }
        Ok(UpdateResult { matched_count: 1, modified_count: u64::from(changed) })
    }

    async fn delete_one(&self, collection: &str, id: DocumentId) -> Result<DeleteResult, StoreError> {
        let mut map = self.inner.write().await;
        let Some(docs) = map.get_mut(collection) else {
            return Ok(DeleteResult { deleted_count: 0 });
        };
        let Some(pos) = docs.iter().position(|d| id_matches(d, id)) else {
            return Ok(DeleteResult { deleted_count: 0 });
        };
        let removed = docs.remove(pos);
        if let Err(e) = self.save(&map).await {
            if let Some(docs) = map.get_mut(collection) {
                docs.insert(pos, removed);
            }
            return Err(e);
        }
        Ok(DeleteResult { deleted_count: 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_fresh_id() -> Result<(), anyhow::Error> {
        let store = LocalStore::in_memory();
        let id = store.insert_one("orders", doc(json!({"_id": "client-chosen", "item": "bike1"}))).await?;
        let found = store.find_one("orders", id).await?.expect("inserted");
        assert_eq!(found[ID_FIELD], json!(id.to_string()));
        assert_eq!(found["item"], "bike1");
        Ok(())
    }

    #[tokio::test]
    async fn find_filters_and_keeps_insertion_order() -> Result<(), anyhow::Error> {
        let store = LocalStore::in_memory();
        store.insert_one("orders", doc(json!({"email": "a@x.com", "item": "1"}))).await?;
        store.insert_one("orders", doc(json!({"email": "b@x.com", "item": "2"}))).await?;
        store.insert_one("orders", doc(json!({"email": "a@x.com", "item": "3"}))).await?;

        let mine = store.find("orders", &Filter::eq("email", "a@x.com")).await?;
        let items: Vec<_> = mine.iter().map(|d| d["item"].clone()).collect();
        assert_eq!(items, vec![json!("1"), json!("3")]);
        assert_eq!(store.find("orders", &Filter::all()).await?.len(), 3);
        assert!(store.find("services", &Filter::all()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn update_touches_only_given_fields() -> Result<(), anyhow::Error> {
        let store = LocalStore::in_memory();
        let id = store.insert_one("orders", doc(json!({"email": "a@x.com", "status": "pending"}))).await?;

        let res = store.update_one("orders", id, doc(json!({"status": "shipped"}))).await?;
        assert_eq!(res, UpdateResult { matched_count: 1, modified_count: 1 });
        let again = store.update_one("orders", id, doc(json!({"status": "shipped"}))).await?;
        assert_eq!(again, UpdateResult { matched_count: 1, modified_count: 0 });

        let found = store.find_one("orders", id).await?.unwrap();
        assert_eq!(found["status"], "shipped");
        assert_eq!(found["email"], "a@x.com");

        let missing = store.update_one("orders", DocumentId::new(), doc(json!({"status": "x"}))).await?;
        assert_eq!(missing.matched_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn delete_reports_count() -> Result<(), anyhow::Error> {
        let store = LocalStore::in_memory();
        let id = store.insert_one("orders", doc(json!({"item": "bike1"}))).await?;
        assert_eq!(store.delete_one("orders", id).await?.deleted_count, 1);
        assert_eq!(store.delete_one("orders", id).await?.deleted_count, 0);
        assert_eq!(store.delete_one("nothing-here", id).await?.deleted_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn file_store_persists_across_reopen() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("local_store_{}.json", uuid::Uuid::new_v4()));
        let store = LocalStore::open(&tmp).await?;
        let keep = store.insert_one("orders", doc(json!({"item": "keep"}))).await?;
        let drop_me = store.insert_one("orders", doc(json!({"item": "drop"}))).await?;
        store.update_one("orders", keep, doc(json!({"status": "shipped"}))).await?;
        store.delete_one("orders", drop_me).await?;

        let reopened = LocalStore::open(&tmp).await?;
        let all = reopened.find("orders", &Filter::all()).await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["status"], "shipped");
        assert!(reopened.find_one("orders", keep).await?.is_some());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_leaves_memory_unchanged() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("local_store_{}", uuid::Uuid::new_v4()));
        let path = dir.join("store.json");
        let store = LocalStore::open(&path).await?;
        let kept = store.insert_one("orders", doc(json!({"item": "kept", "status": "pending"}))).await?;

        // A directory where the file was makes every write fail
        tokio::fs::remove_file(&path).await?;
        tokio::fs::create_dir(&path).await?;

        assert!(matches!(store.insert_one("orders", doc(json!({"item": "lost"}))).await, Err(StoreError::Io(_))));
        assert!(store.update_one("orders", kept, doc(json!({"status": "shipped"}))).await.is_err());
        assert!(store.delete_one("orders", kept).await.is_err());

        let all = store.find("orders", &Filter::all()).await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["item"], "kept");
        assert_eq!(all[0]["status"], "pending");

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("local_store_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, b"{not json").await?;
        assert!(matches!(LocalStore::open(&tmp).await, Err(StoreError::Io(_))));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
