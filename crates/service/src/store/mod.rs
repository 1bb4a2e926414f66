//! Document store abstraction.
//!
//! Documents are schema-less JSON objects grouped into named collections. The
//! store owns identifiers: it assigns one on insert and reports it back as the
//! `_id` field of every document it returns.

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub mod local;
pub mod seaorm;

pub use local::LocalStore;
pub use seaorm::SeaOrmDocumentStore;

/// Field name carrying the document identifier.
pub const ID_FIELD: &str = "_id";

pub type Document = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid document id: {0}")]
    InvalidId(String),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("storage io error: {0}")]
    Io(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<models::errors::ModelError> for StoreError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => StoreError::InvalidDocument(msg),
            models::errors::ModelError::Db(msg) => StoreError::Db(msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self { Self(Uuid::new_v4()) }

    pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl Default for DocumentId {
    fn default() -> Self { Self::new() }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self { Self(id) }
}

impl FromStr for DocumentId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| StoreError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Conjunction of top-level field equalities. Empty matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Document,
}

impl Filter {
    pub fn all() -> Self { Self::default() }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    pub fn matches(&self, doc: &Document) -> bool {
        self.fields.iter().all(|(k, v)| doc.get(k) == Some(v))
    }

    /// The filter as a JSON object, for backends that match by containment.
    pub fn to_json(&self) -> Value { Value::Object(self.fields.clone()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Single-document operations over named collections.
///
/// Each call is one round trip with no retries; implementations must be safe to
/// share across concurrent requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;
    async fn find_one(&self, collection: &str, id: DocumentId) -> Result<Option<Document>, StoreError>;
    /// Any `_id` already present in `doc` is discarded.
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<DocumentId, StoreError>;
    /// Overwrites the top-level fields in `set`; other fields are untouched.
    async fn update_one(&self, collection: &str, id: DocumentId, set: Document) -> Result<UpdateResult, StoreError>;
    async fn delete_one(&self, collection: &str, id: DocumentId) -> Result<DeleteResult, StoreError>;
}

/// Attach the identifier to a stored body for returning to callers.
pub(crate) fn with_id(mut body: Document, id: DocumentId) -> Document {
    body.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    body
}
