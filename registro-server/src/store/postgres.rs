//! Postgres store over a sqlx pool
//!
//! Column casts let this read tables created by older deployments
//! (`SERIAL` ids, `TIMESTAMP` without time zone) as well as the schema
//! from [`crate::db::migrations`].

use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreResult, UserRow, UserStore};
use crate::models::{NewUser, User, UserUpdate};

const SELECT_USERS: &str = r#"
    SELECT
        id::BIGINT AS id,
        nombre,
        email,
        telefono,
        descripcion,
        fecha_registro::TIMESTAMPTZ AS fecha_registro
    FROM usuarios
"#;

/// User store backed by a Postgres pool
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("{SELECT_USERS} ORDER BY fecha_registro DESC, id DESC"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USERS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO usuarios (nombre, email, telefono, descripcion)
            VALUES ($1, $2, $3, $4)
            RETURNING id::BIGINT
            "#,
        )
        .bind(user.nombre())
        .bind(user.email())
        .bind(user.telefono())
        .bind(user.descripcion())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_by_id(&self, id: i64, changes: &UserUpdate) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE usuarios
            SET nombre = $1,
                email = $2,
                telefono = COALESCE($3, telefono),
                descripcion = COALESCE($4, descripcion)
            WHERE id = $5
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
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
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
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::{create_pg_pool, migrations, DEFAULT_MAX_CONNECTIONS};
    use crate::models::UserInput;
    use crate::store::StoreError;

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p registro-server -- --ignored

    async fn store() -> PgUserStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pg_pool(&url, DEFAULT_MAX_CONNECTIONS)
            .await
            .expect("pool creation failed");
        migrations::run_postgres(&pool).await.expect("migration failed");
        PgUserStore::new(pool)
    }

    fn input(email: &str) -> UserInput {
        UserInput {
            nombre: Some("Prueba".into()),
            email: Some(email.into()),
            ..Default::default()
        }
    }

    fn new_user(email: &str) -> NewUser {
        NewUser::from_input(input(email)).unwrap()
    }

    fn unique_email(tag: &str) -> String {
        format!("{}-{}@test.local", tag, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_get_delete_roundtrip() {
        let store = store().await;
        let email = unique_email("roundtrip");
        let id = store.insert(&new_user(&email)).await.expect("insert failed");

        let user = store.get_by_id(id).await.unwrap().expect("row missing");
        assert_eq!(user.email, email);
        assert_eq!(user.telefono, "");

        assert!(store.delete_by_id(id).await.unwrap());
        assert!(store.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unique_violation_is_duplicate_email() {
        let store = store().await;
        let email = unique_email("dup");
        let id = store.insert(&new_user(&email)).await.expect("insert failed");

        let err = store.insert(&new_user(&email)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        store.delete_by_id(id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_inserts_of_one_email_keep_one_row() {
        let store = Arc::new(store().await);
        let email = unique_email("race");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let user = new_user(&email);
                tokio::spawn(async move { store.insert(&user).await })
            })
            .collect();

        let mut ids = Vec::new();
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.expect("task panicked") {
                Ok(id) => ids.push(id),
                Err(StoreError::DuplicateEmail) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ids.len(), 1);
        assert_eq!(duplicates, 7);

        store.delete_by_id(ids[0]).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_without_optionals_keeps_them() {
        let store = store().await;
        let email = unique_email("partial");
        let mut raw = input(&email);
        raw.telefono = Some("555".into());
        raw.descripcion = Some("hola".into());
        let id = store.insert(&NewUser::from_input(raw).unwrap()).await.unwrap();

        let changes = UserUpdate::from_input(UserInput {
            nombre: Some("Otra".into()),
            ..input(&email)
        })
        .unwrap();
        assert!(store.update_by_id(id, &changes).await.unwrap());

        let user = store.get_by_id(id).await.unwrap().expect("row missing");
        assert_eq!(user.nombre, "Otra");
        assert_eq!(user.telefono, "555");
        assert_eq!(user.descripcion, "hola");

        store.delete_by_id(id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_missing_row_matches_nothing() {
        let store = store().await;
        let changes = UserUpdate::from_input(input(&unique_email("ghost"))).unwrap();
        assert!(!store.update_by_id(i64::MAX, &changes).await.unwrap());
    }
}
