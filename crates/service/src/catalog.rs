use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::store::{Document, DocumentId, DocumentStore, Filter};

pub const SERVICES: &str = "services";

/// Read-only access to the bike service catalog.
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self { Self { store } }

    pub async fn list(&self) -> Result<Vec<Document>, ServiceError> {
        Ok(self.store.find(SERVICES, &Filter::all()).await?)
    }

    /// `Ok(None)` when the id is well formed but unknown.
    pub async fn get(&self, id: &str) -> Result<Option<Document>, ServiceError> {
        let id: DocumentId = id.parse()?;
        Ok(self.store.find_one(SERVICES, id).await?)
    }

    /// Load seed entries when the catalog is empty. Returns how many were inserted.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn seed_if_empty(&self, entries: Vec<Value>) -> Result<usize, ServiceError> {
        if !self.store.find(SERVICES, &Filter::all()).await?.is_empty() {
            info!("service catalog already populated; seed skipped");
            return Ok(0);
        }
        let mut inserted = 0;
        for entry in entries {
            let Value::Object(doc) = entry else {
                return Err(ServiceError::Validation("service seed entries must be JSON objects".into()));
            };
            self.store.insert_one(SERVICES, doc).await?;
            inserted += 1;
        }
        info!(inserted, "service catalog seeded");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LocalStore, StoreError, ID_FIELD};
    use serde_json::json;

    fn catalog() -> CatalogService { CatalogService::new(Arc::new(LocalStore::in_memory())) }

    #[tokio::test]
    async fn seed_then_list_and_get() -> Result<(), anyhow::Error> {
        let svc = catalog();
        let n = svc.seed_if_empty(vec![json!({"name": "Tune-up", "price": 40}), json!({"name": "Wheel true"})]).await?;
        assert_eq!(n, 2);

        let all = svc.list().await?;
        assert_eq!(all.len(), 2);
        let id = all[0][ID_FIELD].as_str().unwrap().to_string();
        let one = svc.get(&id).await?.expect("seeded service");
        assert_eq!(one["name"], "Tune-up");
        Ok(())
    }

    #[tokio::test]
    async fn seed_is_skipped_when_populated() -> Result<(), anyhow::Error> {
        let svc = catalog();
        svc.seed_if_empty(vec![json!({"name": "a"})]).await?;
        assert_eq!(svc.seed_if_empty(vec![json!({"name": "b"})]).await?, 0);
        assert_eq!(svc.list().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_id_is_none_and_bad_id_is_error() -> Result<(), anyhow::Error> {
        let svc = catalog();
        assert!(svc.get(&uuid::Uuid::new_v4().to_string()).await?.is_none());
        assert!(matches!(svc.get("xyz").await, Err(ServiceError::Store(StoreError::InvalidId(_)))));
        Ok(())
    }

    #[tokio::test]
    async fn non_object_seed_is_rejected() {
        let svc = catalog();
        assert!(matches!(svc.seed_if_empty(vec![json!("oops")]).await, Err(ServiceError::Validation(_))));
    }
}
