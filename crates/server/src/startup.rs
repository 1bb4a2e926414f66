use std::{future::Future, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use serde_json::Value;
use service::{
    auth::TokenService,
    store::{DocumentStore, LocalStore, SeaOrmDocumentStore},
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// PostgreSQL when a database is configured, otherwise the file-backed local store.
async fn open_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match cfg.database.resolved_url() {
        Some(url) => {
            let db = models::db::connect_with_config(&url, &cfg.database).await?;
            migration::Migrator::up(&db, None).await.context("running migrations")?;
            info!(backend = "postgres", host = %cfg.database.host, "document store ready");
            Ok(Arc::new(SeaOrmDocumentStore::new(db)))
        }
        None => {
            let store = LocalStore::open(&cfg.storage.file)
                .await
                .with_context(|| format!("opening {}", cfg.storage.file))?;
            info!(backend = "local", file = %cfg.storage.file, "document store ready");
            Ok(Arc::new(store))
        }
    }
}

async fn load_seed(path: &str) -> anyhow::Result<Vec<Value>> {
    let bytes = tokio::fs::read(path).await.with_context(|| format!("reading seed file {path}"))?;
    serde_json::from_slice(&bytes).with_context(|| format!("{path} must hold a JSON array of objects"))
}

/// Open the store, seed the catalog if asked to, and wire the services together.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let store = open_store(cfg).await?;
    let tokens = TokenService::new(&cfg.auth.access_token_secret, cfg.auth.token_ttl_secs);
    let state = ServerState::new(store, tokens);

    if let Some(path) = &cfg.storage.services_seed {
        let entries = load_seed(path).await?;
        state.catalog.seed_if_empty(entries).await?;
    }
    Ok(state)
}

pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Serve until `shutdown` resolves; in-flight requests are allowed to finish.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cfg.server.host, cfg.server.port))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}
