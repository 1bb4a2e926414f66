use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use common::types::Envelope;
use serde::Deserialize;
use serde_json::Value;
use service::store::{DeleteResult, Document, UpdateResult};

use crate::{
    auth::AuthUser,
    errors::{ApiError, JsonBody},
    routes::ServerState,
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrdersQuery {
    /// Owner email; must equal the caller's token email
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<Value>,
}

#[utoipa::path(
    post, path = "/orders", tag = "orders",
    request_body = crate::openapi::OrderDoc,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order placed (or store failure envelope)", body = crate::openapi::AckResponse),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    AuthUser(_caller): AuthUser,
    JsonBody(order): JsonBody<Document>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.orders.place(order).await?;
    Ok(Json(Envelope::ack("Order Placed Successfully")))
}

#[utoipa::path(
    get, path = "/orders", tag = "orders",
    params(OrdersQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's orders", body = crate::openapi::OrderListResponse),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token or email does not match the token")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    AuthUser(caller): AuthUser,
    query: Result<Query<OrdersQuery>, QueryRejection>,
) -> Result<Json<Envelope<Vec<Document>>>, ApiError> {
    let Query(q) = query?;
    let orders = state.orders.list_for_owner(&caller, q.email.as_deref()).await?;
    Ok(Json(Envelope::ok("Orders Found Successfully", orders)))
}

#[utoipa::path(
    delete, path = "/orders/{id}", tag = "orders",
    params(("id" = String, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::DeleteResponse),
        (status = 404, description = "No order with this id")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<DeleteResult>>, ApiError> {
    let res = state.orders.delete(&id).await?;
    Ok(Json(Envelope::ok("Successfully deleted", res)))
}

#[utoipa::path(
    patch, path = "/orders/{id}", tag = "orders",
    params(("id" = String, Path, description = "Order id")),
    request_body = crate::openapi::StatusUpdateDoc,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated (idempotent)", body = crate::openapi::UpdateResponse),
        (status = 400, description = "Missing status"),
        (status = 404, description = "No order with this id")
    )
)]
pub async fn update_status(
    State(state): State<ServerState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StatusUpdate>,
) -> Result<Json<Envelope<UpdateResult>>, ApiError> {
    let status = body
        .status
        .ok_or_else(|| ApiError::bad_request("Invalid request body", "status is required"))?;
    let res = state.orders.update_status(&id, status).await?;
    Ok(Json(Envelope::ok("Successfully Updated", res)))
}
