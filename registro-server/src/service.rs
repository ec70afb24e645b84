//! User directory service
//!
//! The five CRUD operations over [`User`], independent of storage
//! technology. Each call validates input and issues exactly one storage
//! operation.

use std::sync::Arc;

use crate::models::{NewUser, User, UserInput, UserUpdate, ValidationError};
use crate::store::{StoreError, UserStore};

/// Errors surfaced by [`UserDirectoryService`]
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("El email ya está registrado")]
    DuplicateEmail,

    #[error("Usuario no encontrado")]
    NotFound { id: i64 },

    #[error("{0}")]
    Storage(String),
}

impl From<StoreError> for DirectoryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::Backend(message) => Self::Storage(message),
        }
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Stateless CRUD front for a shared [`UserStore`]
#[derive(Clone)]
pub struct UserDirectoryService {
    store: Arc<dyn UserStore>,
}

impl UserDirectoryService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// All users, most recently registered first.
    pub async fn list(&self) -> DirectoryResult<Vec<User>> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: i64) -> DirectoryResult<User> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(DirectoryError::NotFound { id })
    }

    /// Validate and insert a new user, returning the storage-assigned id.
    pub async fn create(&self, input: UserInput) -> DirectoryResult<i64> {
        let user = NewUser::from_input(input)?;
        let id = self.store.insert(&user).await?;
        tracing::info!(id, store = self.store.kind(), "usuario registrado");
        Ok(id)
    }

    /// Update an existing user.
    ///
    /// Applies the same validation as [`create`](Self::create). `telefono`
    /// and `descripcion` keep their stored values when the input omits them.
    pub async fn update(&self, id: i64, input: UserInput) -> DirectoryResult<()> {
        let changes = UserUpdate::from_input(input)?;
        if !self.store.update_by_id(id, &changes).await? {
            return Err(DirectoryError::NotFound { id });
        }
        tracing::info!(id, "usuario actualizado");
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> DirectoryResult<()> {
        if !self.store.delete_by_id(id).await? {
            return Err(DirectoryError::NotFound { id });
        }
        tracing::info!(id, "usuario eliminado");
        Ok(())
    }
}
