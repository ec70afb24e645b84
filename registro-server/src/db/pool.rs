//! Database connection pool management
//!
//! Uses sqlx pools with explicit connection limits.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{PgPool, SqlitePool};

/// Default pool size for both backends; one small table needs little.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a request waits for a free connection before failing with a
/// storage error.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect a Postgres pool of at most `max_connections`.
///
/// Fails fast when the server is unreachable, so `registro check` and
/// startup report it instead of hanging.
///
/// ```ignore
/// let pool = create_pg_pool("postgres://localhost/registro", DEFAULT_MAX_CONNECTIONS).await?;
/// ```
pub async fn create_pg_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
}

/// Create a SQLite pool, creating the database file if missing.
///
/// In-memory URLs (`sqlite::memory:`) get a single connection that is never
/// recycled, since every SQLite connection opens its own private memory
/// database.
pub async fn create_sqlite_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = if is_memory_url(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(DEFAULT_MAX_CONNECTIONS)
    };

    pool.connect_with(options).await
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
