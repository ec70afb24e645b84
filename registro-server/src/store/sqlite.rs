//! SQLite store over a sqlx pool

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{StoreResult, UserRow, UserStore};
use crate::models::{NewUser, User, UserUpdate};

const SELECT_USERS: &str =
    "SELECT id, nombre, email, telefono, descripcion, fecha_registro FROM usuarios";

/// User store backed by a SQLite pool (file or in-memory)
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("{SELECT_USERS} ORDER BY fecha_registro DESC, id DESC"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USERS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<i64> {
        let result = sqlx::query(
            "INSERT INTO usuarios (nombre, email, telefono, descripcion) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(user.nombre())
        .bind(user.email())
        .bind(user.telefono())
        .bind(user.descripcion())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update_by_id(&self, id: i64, changes: &UserUpdate) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE usuarios
            SET nombre = ?1,
                email = ?2,
                telefono = COALESCE(?3, telefono),
                descripcion = COALESCE(?4, descripcion)
            WHERE id = ?5
            "#,
        )
        .bind(changes.nombre())
        .bind(changes.email())
        .bind(changes.telefono())
        .bind(changes.descripcion())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn kind(&self) -> &'static str {
        "sqlite"
    }
}
