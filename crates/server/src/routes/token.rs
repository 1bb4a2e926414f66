use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{errors::{ApiError, JsonBody}, routes::ServerState};

#[derive(Debug, Serialize)]
pub struct TokenOutput {
    pub token: String,
}

/// Sign the submitted claims. No credential check; callers get a token for
/// whatever identity they claim.
#[utoipa::path(
    post, path = "/jwt", tag = "auth",
    request_body = crate::openapi::ClaimsDoc,
    responses(
        (status = 200, description = "Signed token", body = crate::openapi::TokenResponse),
        (status = 400, description = "Claims rejected"),
        (status = 422, description = "Body is not a JSON object")
    )
)]
pub async fn issue(
    State(state): State<ServerState>,
    JsonBody(claims): JsonBody<Map<String, Value>>,
) -> Result<Json<TokenOutput>, ApiError> {
    let token = state.tokens.issue(claims)?;
    Ok(Json(TokenOutput { token }))
}
