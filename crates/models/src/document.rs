//! `document` table: schema-less JSON bodies grouped by collection.
//!
//! The row id is the document identifier; `body` never contains `_id`.

use chrono::Utc;
use sea_orm::{entity::prelude::*, sea_query::Expr, QueryOrder, QuerySelect, Set, TransactionTrait};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub collection: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub body: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn insert<C: ConnectionTrait>(db: &C, collection: &str, body: Json) -> Result<Model, ModelError> {
    if !body.is_object() {
        return Err(ModelError::Validation("document body must be a JSON object".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        collection: Set(collection.to_string()),
        body: Set(body),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

/// All documents in `collection` whose body contains `subset` (JSONB `@>`),
/// oldest first. `None` matches everything.
pub async fn list<C: ConnectionTrait>(db: &C, collection: &str, subset: Option<Json>) -> Result<Vec<Model>, ModelError> {
    let mut query = Entity::find().filter(Column::Collection.eq(collection));
    if let Some(subset) = subset {
        query = query.filter(Expr::cust_with_values("body @> $1", [subset]));
    }
    Ok(query.order_by_asc(Column::CreatedAt).all(db).await?)
}

pub async fn find<C: ConnectionTrait>(db: &C, collection: &str, id: Uuid) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id)
        .filter(Column::Collection.eq(collection))
        .one(db)
        .await?)
}

/// Overwrite top-level fields of one document.
///
/// The row is locked (`SELECT ... FOR UPDATE`) for the read-modify-write, so
/// concurrent merges of different fields do not overwrite each other.
/// Returns `None` when no document matched, otherwise whether anything changed.
pub async fn merge_fields(
    db: &DatabaseConnection,
    collection: &str,
    id: Uuid,
    fields: serde_json::Map<String, Json>,
) -> Result<Option<bool>, ModelError> {
    let txn = db.begin().await?;
    let Some(found) = Entity::find_by_id(id)
        .filter(Column::Collection.eq(collection))
        .lock_exclusive()
        .one(&txn)
        .await?
    else {
        return Ok(None);
    };

    let mut body = found.body.clone();
    let obj = body
        .as_object_mut()
        .ok_or_else(|| ModelError::Validation(format!("document {id} has a non-object body")))?;
    let mut changed = false;
    for (key, value) in fields {
        if obj.get(&key) != Some(&value) {
            obj.insert(key, value);
            changed = true;
        }
    }

    if changed {
        let mut am: ActiveModel = found.into();
        am.body = Set(body);
        am.update(&txn).await?;
    }
    txn.commit().await?;
    Ok(Some(changed))
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete<C: ConnectionTrait>(db: &C, collection: &str, id: Uuid) -> Result<u64, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::Collection.eq(collection))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
