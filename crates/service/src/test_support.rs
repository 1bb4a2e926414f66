#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DATABASE_URL};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Fresh connection for the current test, or `None` when no database is configured.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let Some(url) = DATABASE_URL.as_deref() else {
        eprintln!("skip: DATABASE_URL not set");
        return Ok(None);
    };

    let cfg = configs::DatabaseConfig { max_connections: 5, ..Default::default() };
    MIGRATED
        .get_or_try_init(|| async {
            let db = connect_with_config(url, &cfg).await?;
            migration::Migrator::up(&db, None).await?;
            Ok::<(), anyhow::Error>(())
        })
        .await?;

    Ok(Some(connect_with_config(url, &cfg).await?))
}
