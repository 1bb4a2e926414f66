use std::time::Duration;

use once_cell::sync::Lazy;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

/// `DATABASE_URL` as seen by tests; `.env` is loaded first if present.
pub static DATABASE_URL: Lazy<Option<String>> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty())
});

/// Open a pooled connection using the pool settings from `configs`.
pub async fn connect_with_config(url: &str, cfg: &configs::DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(url.to_owned());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opt).await?;
    info!(max_connections = cfg.max_connections, "database pool ready");
    Ok(db)
}

/// Connect with default pool settings, or `None` when no `DATABASE_URL` is set.
pub async fn connect() -> anyhow::Result<Option<DatabaseConnection>> {
    match DATABASE_URL.as_deref() {
        Some(url) => Ok(Some(connect_with_config(url, &configs::DatabaseConfig::default()).await?)),
        None => Ok(None),
    }
}
