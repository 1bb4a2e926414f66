use serde::Serialize;
use serde_json::Value;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

// Documentation-only shapes. Handlers work on free-form JSON documents.

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct AckResponse {
    pub success: bool,
    #[schema(example = "Order Placed Successfully")]
    pub message: String,
    /// Present only on failure
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ServiceListResponse {
    pub success: bool,
    #[schema(example = "Successfully got the data")]
    pub message: String,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
}

#[derive(Serialize, ToSchema)]
pub struct ServiceResponse {
    pub success: bool,
    pub message: String,
    /// The service document, or null when the id is unknown
    #[schema(value_type = Option<Object>)]
    pub data: Value,
}

/// Any JSON object. `email` names the owner and is matched against the token.
#[derive(Serialize, ToSchema)]
pub struct OrderDoc {
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "bike1")]
    pub item: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct OrderListResponse {
    pub success: bool,
    #[schema(example = "Orders Found Successfully")]
    pub message: String,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCount {
    pub deleted_count: u64,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    #[schema(example = "Successfully deleted")]
    pub message: String,
    pub data: DeleteCount,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCount {
    pub matched_count: u64,
    /// 0 when the status already had the requested value
    pub modified_count: u64,
}

#[derive(Serialize, ToSchema)]
pub struct UpdateResponse {
    pub success: bool,
    #[schema(example = "Successfully Updated")]
    pub message: String,
    pub data: UpdateCount,
}

#[derive(Serialize, ToSchema)]
pub struct StatusUpdateDoc {
    #[schema(value_type = Object, example = "shipped")]
    pub status: Value,
}

/// Free-form claims. `iat` and `exp` are always set by the server.
#[derive(Serialize, ToSchema)]
pub struct ClaimsDoc {
    #[schema(example = "a@x.com")]
    pub email: String,
}

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /jwt, sent as `Authorization: Bearer <token>`"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Genius Bike API", version = "0.1.0", description = "Bike service catalog and order management"),
    paths(
        crate::routes::health,
        crate::routes::services::list,
        crate::routes::services::get,
        crate::routes::token::issue,
        crate::routes::orders::create,
        crate::routes::orders::list,
        crate::routes::orders::delete,
        crate::routes::orders::update_status,
    ),
    components(schemas(
        HealthResponse,
        AckResponse,
        ServiceListResponse,
        ServiceResponse,
        OrderDoc,
        OrderListResponse,
        DeleteCount,
        DeleteResponse,
        UpdateCount,
        UpdateResponse,
        StatusUpdateDoc,
        ClaimsDoc,
        TokenResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness"),
        (name = "services", description = "Public service catalog"),
        (name = "auth", description = "Token issuing"),
        (name = "orders", description = "Orders (bearer token required)")
    )
)]
pub struct ApiDoc;
