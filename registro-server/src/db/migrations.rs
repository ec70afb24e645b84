//! Schema migrations for the `usuarios` table
//!
//! Idempotent: safe to run on every startup.

use sqlx::{PgPool, SqlitePool};

/// Create the `usuarios` table and its index on Postgres
pub async fn run_postgres(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running usuarios migrations (postgres)...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS usuarios (
            id BIGSERIAL PRIMARY KEY,
            nombre VARCHAR(255) NOT NULL,
            email VARCHAR(255) UNIQUE NOT NULL,
            descripcion TEXT DEFAULT '',
            telefono VARCHAR(50) DEFAULT '',
            fecha_registro TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_usuarios_fecha_registro ON usuarios (fecha_registro DESC)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Migrations complete: usuarios table ready");
    Ok(())
}

/// Create the `usuarios` table and its index on SQLite.
///
/// `fecha_registro` defaults to an RFC 3339 UTC string with millisecond
/// precision so ordering by the column matches registration order.
pub async fn run_sqlite(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    tracing::info!("Running usuarios migrations (sqlite)...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS usuarios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL CHECK (length(nombre) <= 255),
            email TEXT NOT NULL UNIQUE CHECK (length(email) <= 255),
            descripcion TEXT DEFAULT '',
            telefono TEXT DEFAULT '' CHECK (length(telefono) <= 50),
            fecha_registro TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_usuarios_fecha_registro ON usuarios (fecha_registro DESC)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Migrations complete: usuarios table ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_sqlite_pool;

    #[tokio::test]
    async fn sqlite_migration_is_idempotent() {
        let pool = create_sqlite_pool("sqlite::memory:").await.unwrap();
        run_sqlite(&pool).await.expect("first run failed");
        run_sqlite(&pool).await.expect("second run failed");

        let (tables,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'usuarios'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 1);
    }

    #[tokio::test]
    async fn sqlite_defaults_registration_timestamp() {
        let pool = create_sqlite_pool("sqlite::memory:").await.unwrap();
        run_sqlite(&pool).await.unwrap();

        sqlx::query("INSERT INTO usuarios (nombre, email) VALUES ('Ana', 'ana@x.com')")
            .execute(&pool)
            .await
            .unwrap();

        let (stamp,): (String,) = sqlx::query_as("SELECT fecha_registro FROM usuarios")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok(), "got {stamp}");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn postgres_migration_is_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pg_pool(&url, 1).await.unwrap();
        run_postgres(&pool).await.expect("first run failed");
        run_postgres(&pool).await.expect("second run failed");
    }
}
