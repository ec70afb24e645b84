//! In-process store
//!
//! Backs tests and `--store memory` local runs. Enforces the same email
//! uniqueness as the SQL schema.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{NewUser, User, UserUpdate};

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, User>,
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// Users kept in a map behind an async RwLock
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner.rows.values().cloned().collect();
        users.sort_by(|a, b| {
            b.fecha_registro
                .cmp(&a.fecha_registro)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(users)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<i64> {
        let mut inner = self.inner.write().await;
        if inner.email_taken(user.email(), None) {
            return Err(StoreError::DuplicateEmail);
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.insert(
            id,
            User {
                id,
                nombre: user.nombre().to_owned(),
                email: user.email().to_owned(),
                descripcion: user.descripcion().to_owned(),
                telefono: user.telefono().to_owned(),
                fecha_registro: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update_by_id(&self, id: i64, changes: &UserUpdate) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        if !inner.rows.contains_key(&id) {
            return Ok(false);
        }
        if inner.email_taken(changes.email(), Some(id)) {
            return Err(StoreError::DuplicateEmail);
        }

        if let Some(row) = inner.rows.get_mut(&id) {
            row.nombre = changes.nombre().to_owned();
            row.email = changes.email().to_owned();
            if let Some(telefono) = changes.telefono() {
                row.telefono = telefono.to_owned();
            }
            if let Some(descripcion) = changes.descripcion() {
                row.descripcion = descripcion.to_owned();
            }
        }
        Ok(true)
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::models::UserInput;

    fn input(nombre: &str, email: &str) -> UserInput {
        UserInput {
            nombre: Some(nombre.into()),
            email: Some(email.into()),
            ..Default::default()
        }
    }

    fn new_user(nombre: &str, email: &str) -> NewUser {
        NewUser::from_input(input(nombre, email)).unwrap()
    }

    fn changes(nombre: &str, email: &str) -> UserUpdate {
        UserUpdate::from_input(input(nombre, email)).unwrap()
    }

    #[tokio::test]
    async fn ids_are_sequential_from_one() {
        let store = MemoryUserStore::new();
        assert_eq!(store.insert(&new_user("Ana", "ana@x.com")).await.unwrap(), 1);
        assert_eq!(store.insert(&new_user("Luis", "luis@x.com")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn duplicate_email_on_insert() {
        let store = MemoryUserStore::new();
        store.insert(&new_user("Ana", "ana@x.com")).await.unwrap();
        let err = store.insert(&new_user("Otra", "ana@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_may_keep_own_email() {
        let store = MemoryUserStore::new();
        let id = store.insert(&new_user("Ana", "ana@x.com")).await.unwrap();
        assert!(store.update_by_id(id, &changes("Ana María", "ana@x.com")).await.unwrap());
        assert_eq!(store.get_by_id(id).await.unwrap().unwrap().nombre, "Ana María");
    }

    #[tokio::test]
    async fn update_rejects_email_of_other_row() {
        let store = MemoryUserStore::new();
        store.insert(&new_user("Ana", "ana@x.com")).await.unwrap();
        let luis = store.insert(&new_user("Luis", "luis@x.com")).await.unwrap();
        let err = store
            .update_by_id(luis, &changes("Luis", "ana@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn missing_rows_report_no_match() {
        let store = MemoryUserStore::new();
        assert!(!store.update_by_id(9, &changes("Ana", "ana@x.com")).await.unwrap());
        assert!(!store.delete_by_id(9).await.unwrap());
        assert!(store.get_by_id(9).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_without_optionals_keeps_them() {
        let store = MemoryUserStore::new();
        let mut raw = input("Ana", "ana@x.com");
        raw.telefono = Some("555".into());
        raw.descripcion = Some("hola".into());
        let id = store.insert(&NewUser::from_input(raw).unwrap()).await.unwrap();

        assert!(store.update_by_id(id, &changes("Ana B", "ana@x.com")).await.unwrap());

        let user = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.nombre, "Ana B");
        assert_eq!(user.telefono, "555");
        assert_eq!(user.descripcion, "hola");
    }

    #[tokio::test]
    async fn concurrent_inserts_of_one_email_keep_one_row() {
        let store = Arc::new(MemoryUserStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.insert(&new_user(&format!("U{i}"), "same@x.com")).await
                })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            match handle.await.expect("task panicked") {
                Ok(_) => inserted += 1,
                Err(StoreError::DuplicateEmail) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(inserted, 1);
        assert_eq!(store.len().await, 1);
    }
}
