use axum::{extract::{Path, State}, Json};
use common::types::Envelope;
use serde_json::Value;
use service::store::Document;

use crate::{errors::ApiError, routes::ServerState};

const FOUND: &str = "Successfully got the data";

#[utoipa::path(
    get, path = "/services", tag = "services",
    responses((status = 200, description = "Every service in the catalog", body = crate::openapi::ServiceListResponse))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Envelope<Vec<Document>>>, ApiError> {
    let services = state.catalog.list().await?;
    Ok(Json(Envelope::ok(FOUND, services)))
}

/// Unknown ids answer `data: null` rather than 404.
#[utoipa::path(
    get, path = "/services/{id}", tag = "services",
    params(("id" = String, Path, description = "Service id")),
    responses((status = 200, description = "The service, or null data", body = crate::openapi::ServiceResponse))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Envelope<Value>>, ApiError> {
    let found = state.catalog.get(&id).await?;
    Ok(Json(Envelope::ok(FOUND, found.map(Value::Object).unwrap_or(Value::Null))))
}
