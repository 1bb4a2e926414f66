use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::{auth::TokenService, catalog::CatalogService, orders::OrderService, store::DocumentStore};

use crate::openapi::ApiDoc;

pub mod orders;
pub mod services;
pub mod token;

/// Shared handler state. Built once at startup; every field is cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<CatalogService>,
    pub orders: Arc<OrderService>,
    pub tokens: Arc<TokenService>,
}

impl ServerState {
    pub fn new(store: Arc<dyn DocumentStore>, tokens: TokenService) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(Arc::clone(&store))),
            orders: Arc::new(OrderService::new(store)),
            tokens: Arc::new(tokens),
        }
    }
}

impl FromRef<ServerState> for Arc<TokenService> {
    fn from_ref(state: &ServerState) -> Self { Arc::clone(&state.tokens) }
}

/// Plaintext liveness probe.
pub async fn root() -> &'static str {
    "Hello from genius bike"
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public catalog and token routes, the
/// token-gated order routes, and API docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/services", get(services::list))
        .route("/services/:id", get(services::get))
        .route("/jwt", post(token::issue));

    // Gated per handler through the `AuthUser` extractor
    let order_routes = Router::new()
        .route("/orders", post(orders::create).get(orders::list))
        .route("/orders/:id", patch(orders::update_status).delete(orders::delete));

    public
        .merge(order_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
