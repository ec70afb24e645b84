//! Storage configuration from flags and environment
//!
//! Precedence: explicit flag, then environment (including `.env`, loaded in
//! `main`), then defaults. The backend is inferred when `--store` is absent:
//! Supabase if `SUPABASE_URL` is set, SQLite for `sqlite:` URLs, else
//! Postgres.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use registro_server::db::{create_pg_pool, create_sqlite_pool, migrations, DEFAULT_MAX_CONNECTIONS};
use registro_server::store::{
    MemoryUserStore, PgUserStore, SqliteUserStore, SupabaseConfig, SupabaseUserStore,
};
use registro_server::UserStore;

const DEFAULT_SQLITE_URL: &str = "sqlite://registro.db";

/// Storage backend
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Sqlite,
    Supabase,
    Memory,
}

/// Storage selection shared by every command
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Storage backend (inferred from the other settings when omitted)
    #[arg(long, value_enum, env = "REGISTRO_STORE")]
    pub store: Option<StoreKind>,

    /// Database URL (postgres:// or sqlite://); overrides DB_* variables
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase anon key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Maximum pooled connections for Postgres
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
}

/// Fully resolved backend settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    Postgres { url: String, max_connections: u32 },
    Sqlite { url: String },
    Supabase { url: String, anon_key: String },
    Memory,
}

impl StoreSettings {
    pub fn kind(&self) -> StoreKind {
        match self {
            Self::Postgres { .. } => StoreKind::Postgres,
            Self::Sqlite { .. } => StoreKind::Sqlite,
            Self::Supabase { .. } => StoreKind::Supabase,
            Self::Memory => StoreKind::Memory,
        }
    }
}

impl StoreArgs {
    /// Resolve against the process environment
    pub fn resolve(&self) -> Result<StoreSettings> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<StoreSettings> {
        let kind = self.store.unwrap_or_else(|| self.infer_kind());

        let settings = match kind {
            StoreKind::Postgres => StoreSettings::Postgres {
                url: match &self.database_url {
                    Some(url) => url.clone(),
                    None => postgres_url_from_parts(&env),
                },
                max_connections: self.max_connections,
            },
            StoreKind::Sqlite => StoreSettings::Sqlite {
                url: self
                    .database_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SQLITE_URL.to_owned()),
            },
            StoreKind::Supabase => {
                let (Some(url), Some(anon_key)) = (&self.supabase_url, &self.supabase_key) else {
                    bail!(
                        "Supabase store requires SUPABASE_URL and SUPABASE_ANON_KEY \
                         (url: {}, key: {})",
                        presence(&self.supabase_url),
                        presence(&self.supabase_key)
                    );
                };
                StoreSettings::Supabase {
                    url: url.clone(),
                    anon_key: anon_key.clone(),
                }
            }
            StoreKind::Memory => StoreSettings::Memory,
        };

        Ok(settings)
    }

    fn infer_kind(&self) -> StoreKind {
        if self.supabase_url.is_some() {
            StoreKind::Supabase
        } else if self
            .database_url
            .as_deref()
            .is_some_and(|url| url.starts_with("sqlite:"))
        {
            StoreKind::Sqlite
        } else {
            StoreKind::Postgres
        }
    }
}

fn presence(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "set"
    } else {
        "missing"
    }
}

/// Assemble a Postgres URL from `DB_USER`, `DB_PASSWORD`, `DB_HOST`,
/// `DB_PORT` and `DB_NAME`. TLS is required when `NODE_ENV=production` or
/// `DB_SSL=true`.
fn postgres_url_from_parts(env: &impl Fn(&str) -> Option<String>) -> String {
    let var = |key: &str, default: &str| env(key).unwrap_or_else(|| default.to_owned());

    let user = var("DB_USER", "postgres");
    let host = var("DB_HOST", "localhost");
    let port = var("DB_PORT", "5432");
    let name = var("DB_NAME", "postgres");

    let credentials = match env("DB_PASSWORD") {
        Some(password) => format!(
            "{}:{}",
            urlencoding::encode(&user),
            urlencoding::encode(&password)
        ),
        None => urlencoding::encode(&user).into_owned(),
    };

    let mut url = format!("postgres://{}@{}:{}/{}", credentials, host, port, name);

    let production = env("NODE_ENV").as_deref() == Some("production");
    let ssl = env("DB_SSL").is_some_and(|v| v == "true" || v == "1");
    if production || ssl {
        url.push_str("?sslmode=require");
    }
    url
}

/// Open the configured store, optionally creating the schema first.
pub async fn open_store(settings: &StoreSettings, migrate: bool) -> Result<Arc<dyn UserStore>> {
    let store: Arc<dyn UserStore> = match settings {
        StoreSettings::Postgres {
            url,
            max_connections,
        } => {
            let pool = create_pg_pool(url, *max_connections)
                .await
                .context("Failed to create Postgres pool")?;
            if migrate {
                migrations::run_postgres(&pool)
                    .await
                    .context("Postgres migration failed")?;
            }
            Arc::new(PgUserStore::new(pool))
        }
        StoreSettings::Sqlite { url } => {
            let pool = create_sqlite_pool(url)
                .await
                .with_context(|| format!("Failed to open SQLite database {}", url))?;
            if migrate {
                migrations::run_sqlite(&pool)
                    .await
                    .context("SQLite migration failed")?;
            }
            Arc::new(SqliteUserStore::new(pool))
        }
        StoreSettings::Supabase { url, anon_key } => {
            if migrate {
                tracing::debug!("Supabase schema is managed by Supabase, skipping migrations");
            }
            let config = SupabaseConfig::new(url.clone(), anon_key.clone());
            Arc::new(SupabaseUserStore::new(config).context("Invalid Supabase configuration")?)
        }
        StoreSettings::Memory => Arc::new(MemoryUserStore::new()),
    };

    Ok(store)
}
