use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::auth::Claims;
use crate::errors::ServiceError;
use crate::store::{DeleteResult, Document, DocumentId, DocumentStore, Filter, UpdateResult};

pub const ORDERS: &str = "orders";

/// Field holding the owner's email; the key for every ownership check.
pub const OWNER_FIELD: &str = "email";
pub const STATUS_FIELD: &str = "status";

/// Order workflows on top of the document store.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use service::orders::OrderService;
/// use service::store::LocalStore;
/// let svc = OrderService::new(Arc::new(LocalStore::in_memory()));
/// let order = serde_json::json!({"email": "a@x.com", "item": "bike1"});
/// tokio_test::block_on(svc.place(order.as_object().cloned().unwrap())).unwrap();
/// ```
pub struct OrderService {
    store: Arc<dyn DocumentStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self { Self { store } }

    /// Store the submitted order as-is; its shape is not validated.
    pub async fn place(&self, order: Document) -> Result<(), ServiceError> {
        let id = self.store.insert_one(ORDERS, order).await?;
        info!(order_id = %id, "order_placed");
        Ok(())
    }

    /// Orders owned by `requested_email`, which must be the caller's own email.
    ///
    /// A mismatch (or a caller without an email claim) stops here with
    /// `Forbidden`; the store is never queried.
    #[instrument(skip(self, caller))]
    pub async fn list_for_owner(&self, caller: &Claims, requested_email: Option<&str>) -> Result<Vec<Document>, ServiceError> {
        let email = match (caller.email.as_deref(), requested_email) {
            (Some(own), Some(requested)) if own == requested => requested,
            _ => {
                warn!(caller = caller.email.as_deref().unwrap_or("-"), "order listing for another owner refused");
                return Err(ServiceError::Forbidden);
            }
        };
        Ok(self.store.find(ORDERS, &Filter::eq(OWNER_FIELD, email)).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteResult, ServiceError> {
        let id: DocumentId = id.parse()?;
        let res = self.store.delete_one(ORDERS, id).await?;
        if res.deleted_count == 0 {
            return Err(ServiceError::not_found("Order"));
        }
        info!(order_id = %id, "order_deleted");
        Ok(res)
    }

    /// Set the status field only. Re-applying the same status matches without
    /// modifying and still succeeds.
    pub async fn update_status(&self, id: &str, status: Value) -> Result<UpdateResult, ServiceError> {
        let id: DocumentId = id.parse()?;
        let mut set = Document::new();
        set.insert(STATUS_FIELD.to_string(), status);
        let res = self.store.update_one(ORDERS, id, set).await?;
        if res.matched_count == 0 {
            return Err(ServiceError::not_found("Order"));
        }
        info!(order_id = %id, modified = res.modified_count, "order_status_updated");
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LocalStore, ID_FIELD};
    use serde_json::json;

    fn claims(email: Option<&str>) -> Claims {
        Claims { email: email.map(String::from), iat: 0, exp: u64::MAX, extra: Default::default() }
    }

    fn order(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    async fn seeded() -> Result<OrderService, anyhow::Error> {
        let svc = OrderService::new(Arc::new(LocalStore::in_memory()));
        svc.place(order(json!({"email": "a@x.com", "item": "bike1"}))).await?;
        svc.place(order(json!({"email": "b@x.com", "item": "bike2"}))).await?;
        svc.place(order(json!({"email": "a@x.com", "item": "bike3"}))).await?;
        Ok(svc)
    }

    #[tokio::test]
    async fn owner_sees_exactly_their_orders() -> Result<(), anyhow::Error> {
        let svc = seeded().await?;
        let mine = svc.list_for_owner(&claims(Some("a@x.com")), Some("a@x.com")).await?;
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|o| o["email"] == "a@x.com"));
        Ok(())
    }

    #[tokio::test]
    async fn mismatch_is_forbidden() -> Result<(), anyhow::Error> {
        let svc = seeded().await?;
        let res = svc.list_for_owner(&claims(Some("a@x.com")), Some("b@x.com")).await;
        assert!(matches!(res, Err(ServiceError::Forbidden)));
        let res = svc.list_for_owner(&claims(Some("a@x.com")), None).await;
        assert!(matches!(res, Err(ServiceError::Forbidden)));
        let res = svc.list_for_owner(&claims(None), Some("a@x.com")).await;
        assert!(matches!(res, Err(ServiceError::Forbidden)));
        Ok(())
    }

    #[tokio::test]
    async fn status_update_is_idempotent() -> Result<(), anyhow::Error> {
        let svc = seeded().await?;
        let caller = claims(Some("b@x.com"));
        let id = svc.list_for_owner(&caller, Some("b@x.com")).await?[0][ID_FIELD].as_str().unwrap().to_string();

        let first = svc.update_status(&id, json!("shipped")).await?;
        let second = svc.update_status(&id, json!("shipped")).await?;
        assert_eq!((first.matched_count, first.modified_count), (1, 1));
        assert_eq!((second.matched_count, second.modified_count), (1, 0));

        let after = svc.list_for_owner(&caller, Some("b@x.com")).await?;
        assert_eq!(after[0]["status"], "shipped");
        assert_eq!(after[0]["item"], "bike2");
        Ok(())
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() -> Result<(), anyhow::Error> {
        let svc = seeded().await?;
        let ghost = uuid::Uuid::new_v4().to_string();
        assert!(matches!(svc.delete(&ghost).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.update_status(&ghost, json!("x")).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_the_order() -> Result<(), anyhow::Error> {
        let svc = seeded().await?;
        let caller = claims(Some("a@x.com"));
        let id = svc.list_for_owner(&caller, Some("a@x.com")).await?[0][ID_FIELD].as_str().unwrap().to_string();
        assert_eq!(svc.delete(&id).await?.deleted_count, 1);
        assert_eq!(svc.list_for_owner(&caller, Some("a@x.com")).await?.len(), 1);
        assert!(matches!(svc.delete(&id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
