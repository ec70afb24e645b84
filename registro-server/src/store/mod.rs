//! Storage collaborators for the `usuarios` table
//!
//! Every backend implements [`UserStore`] and translates its own vendor
//! error codes into [`StoreError`]. Nothing above this module inspects
//! backend-specific codes.

pub mod memory;
pub mod postgres;
pub mod sqlite;
pub mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;

use crate::models::{NewUser, User, UserUpdate};

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use sqlite::SqliteUserStore;
pub use supabase::{SupabaseConfig, SupabaseUserStore};

/// Normalized storage error kind
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint on `email` rejected the write
    #[error("duplicate email")]
    DuplicateEmail,

    /// Any other backend failure (connectivity, bad query, other constraints)
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::DuplicateEmail,
            _ => Self::Backend(e.to_string()),
        }
    }
}

/// Persistence contract for users.
///
/// `update_by_id` and `delete_by_id` report whether a row matched, so the
/// caller decides what "absent" means. `update_by_id` leaves `telefono` and
/// `descripcion` untouched when the update carries `None` for them.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users, most recently registered first.
    async fn list(&self) -> StoreResult<Vec<User>>;

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Insert a user; storage assigns `id` and `fecha_registro`.
    async fn insert(&self, user: &NewUser) -> StoreResult<i64>;

    /// Apply the changes to the given row.
    async fn update_by_id(&self, id: i64, changes: &UserUpdate) -> StoreResult<bool>;

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool>;

    /// Cheap round trip to confirm the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Release pooled connections. Called once on shutdown.
    async fn close(&self) {}

    /// Short backend name for logs
    fn kind(&self) -> &'static str;
}

/// Row shape shared by the SQL and PostgREST backends.
///
/// `telefono`/`descripcion` are nullable in the table; they come back as
/// empty strings.
#[derive(Debug, FromRow, Deserialize)]
pub(crate) struct UserRow {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub descripcion: Option<String>,
    #[serde(with = "crate::models::user::timestamp")]
    pub fecha_registro: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            nombre: self.nombre,
            email: self.email,
            descripcion: self.descripcion.unwrap_or_default(),
            telefono: self.telefono.unwrap_or_default(),
            fecha_registro: self.fecha_registro,
        }
    }
}
