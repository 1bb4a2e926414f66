use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tracing::instrument;

use models::document;

use super::{with_id, DeleteResult, Document, DocumentId, DocumentStore, Filter, StoreError, UpdateResult, ID_FIELD};

/// PostgreSQL-backed store: every document is a JSONB row in the `document` table.
#[derive(Clone)]
pub struct SeaOrmDocumentStore {
    pub db: DatabaseConnection,
}

impl SeaOrmDocumentStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_document(model: document::Model) -> Result<Document, StoreError> {
    match model.body {
        Value::Object(body) => Ok(with_id(body, model.id.into())),
        other => Err(StoreError::InvalidDocument(format!(
            "document {} has a {} body",
            model.id,
            json_kind(&other)
        ))),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl DocumentStore for SeaOrmDocumentStore {
    #[instrument(skip(self, filter))]
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let subset = (!filter.is_empty()).then(|| filter.to_json());
        document::list(&self.db, collection, subset)
            .await?
            .into_iter()
            .map(to_document)
            .collect()
    }

    #[instrument(skip(self))]
    async fn find_one(&self, collection: &str, id: DocumentId) -> Result<Option<Document>, StoreError> {
        document::find(&self.db, collection, id.as_uuid())
            .await?
            .map(to_document)
            .transpose()
    }

    #[instrument(skip(self, doc))]
    async fn insert_one(&self, collection: &str, mut doc: Document) -> Result<DocumentId, StoreError> {
        doc.remove(ID_FIELD);
        let created = document::insert(&self.db, collection, Value::Object(doc)).await?;
        Ok(created.id.into())
    }

    #[instrument(skip(self, set))]
    async fn update_one(&self, collection: &str, id: DocumentId, mut set: Document) -> Result<UpdateResult, StoreError> {
        set.remove(ID_FIELD);
        let res = document::merge_fields(&self.db, collection, id.as_uuid(), set).await?;
        Ok(match res {
            None => UpdateResult { matched_count: 0, modified_count: 0 },
            Some(changed) => UpdateResult { matched_count: 1, modified_count: u64::from(changed) },
        })
    }

    #[instrument(skip(self))]
    async fn delete_one(&self, collection: &str, id: DocumentId) -> Result<DeleteResult, StoreError> {
        let deleted_count = document::delete(&self.db, collection, id.as_uuid()).await?;
        Ok(DeleteResult { deleted_count })
    }
}
