use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 5000, worker_threads: None }
    }
}

/// PostgreSQL document store settings.
///
/// Either `url` is given directly, or it is assembled from `user`/`password`
/// plus `host` and `name`. With neither, the server falls back to the local store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            user: None,
            password: None,
            host: default_db_host(),
            name: default_db_name(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub access_token_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { access_token_secret: String::new(), token_ttl_secs: default_token_ttl() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_file")]
    pub file: String,
    #[serde(default)]
    pub services_seed: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { file: default_store_file(), services_seed: None }
    }
}

fn default_db_host() -> String { "localhost:5432".into() }
fn default_db_name() -> String { "genius_bike".into() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_token_ttl() -> u64 { 3600 }
fn default_store_file() -> String { "data/store.json".into() }

/// Read `CONFIG_PATH` (default `config.toml`). A missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !std::path::Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File config, then process environment on top, then validation.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay environment values. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") { self.server.host = host; }
        if let Some(port) = get("PORT").and_then(|p| p.parse().ok()) { self.server.port = port; }
        if let Some(w) = get("TOKIO_WORKER_THREADS").and_then(|v| v.parse().ok()) {
            self.server.worker_threads = Some(w);
        }

        if let Some(url) = get("DATABASE_URL") { self.database.url = url; }
        if let Some(user) = get("DB_USER") { self.database.user = Some(user); }
        if let Some(password) = get("DB_PASSWORD") { self.database.password = Some(password); }
        if let Some(host) = get("DB_HOST") { self.database.host = host; }
        if let Some(name) = get("DB_NAME") { self.database.name = name; }

        if let Some(secret) = get("ACCESS_TOKEN_SECRET") { self.auth.access_token_secret = secret; }
        if let Some(ttl) = get("TOKEN_TTL_SECS").and_then(|v| v.parse().ok()) {
            self.auth.token_ttl_secs = ttl;
        }

        if let Some(file) = get("STORE_FILE") { self.storage.file = file; }
        if let Some(seed) = get("SERVICES_SEED") { self.storage.services_seed = Some(seed); }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.validate()?;
        self.auth.validate()?;
        if self.storage.file.trim().is_empty() {
            self.storage.file = default_store_file();
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "0.0.0.0".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Connection URL if the document store should be PostgreSQL.
    pub fn resolved_url(&self) -> Option<String> {
        if !self.url.trim().is_empty() {
            return Some(self.url.trim().to_string());
        }
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some(format!(
                "postgres://{}:{}@{}/{}",
                user, password, self.host, self.name
            )),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(url) = self.resolved_url() {
            let lower = url.to_lowercase();
            if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
                return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
            }
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(anyhow!("database.connect_timeout_secs must be positive"));
        }
        Ok(())
    }
}

impl AuthConfig {
    fn validate(&self) -> Result<()> {
        if self.access_token_secret.trim().is_empty() {
            return Err(anyhow!(
                "auth.access_token_secret is empty; set it in config.toml or ACCESS_TOKEN_SECRET"
            ));
        }
        if self.token_ttl_secs == 0 {
            return Err(anyhow!("auth.token_ttl_secs must be positive"));
        }
        Ok(())
    }
}
