//! Supabase store over the PostgREST HTTP API
//!
//! Talks to `{url}/rest/v1/usuarios` with the project's anon key. Writes ask
//! for `return=representation` so an empty array means no row matched.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{StoreError, StoreResult, UserRow, UserStore};
use crate::models::{NewUser, User, UserUpdate};

/// Postgres SQLSTATE for unique_violation, forwarded by PostgREST
const UNIQUE_VIOLATION: &str = "23505";

/// Connection settings for a Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }
}

/// User store backed by Supabase's REST interface
pub struct SupabaseUserStore {
    http: Client,
    table_url: String,
}

#[derive(Serialize)]
struct UserPayload<'a> {
    nombre: &'a str,
    email: &'a str,
    telefono: &'a str,
    descripcion: &'a str,
}

impl<'a> From<&'a NewUser> for UserPayload<'a> {
    fn from(u: &'a NewUser) -> Self {
        Self {
            nombre: u.nombre(),
            email: u.email(),
            telefono: u.telefono(),
            descripcion: u.descripcion(),
        }
    }
}

/// PATCH body; absent optionals are left out so PostgREST keeps the column
#[derive(Serialize)]
struct UpdatePayload<'a> {
    nombre: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    telefono: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    descripcion: Option<&'a str>,
}

impl<'a> From<&'a UserUpdate> for UpdatePayload<'a> {
    fn from(u: &'a UserUpdate) -> Self {
        Self {
            nombre: u.nombre(),
            email: u.email(),
            telefono: u.telefono(),
            descripcion: u.descripcion(),
        }
    }
}

#[derive(Deserialize)]
struct IdRow {
    id: i64,
}

/// PostgREST error body
#[derive(Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

impl SupabaseUserStore {
    /// Build a client for the given project.
    ///
    /// Fails when the URL is not http(s) or the key is empty or not a
    /// valid header value.
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        let base = config.url.trim_end_matches('/');
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(StoreError::Backend(
                "SUPABASE_URL must start with http:// or https://".into(),
            ));
        }
        if config.anon_key.trim().is_empty() {
            return Err(StoreError::Backend("SUPABASE_ANON_KEY is empty".into()));
        }

        let invalid_key = |_| StoreError::Backend("SUPABASE_ANON_KEY is not a valid header".into());
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&config.anon_key).map_err(invalid_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.anon_key)).map_err(invalid_key)?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("registro/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self {
            http,
            table_url: format!("{}/rest/v1/usuarios", base),
        })
    }

    /// Send a request and decode a JSON body, mapping PostgREST errors.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| StoreError::Backend(format!("invalid response body: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, body = %body, "PostgREST request failed");

        match serde_json::from_str::<PostgrestError>(&body) {
            Ok(err) if err.code.as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(StoreError::DuplicateEmail)
            }
            Ok(PostgrestError {
                message: Some(message),
                ..
            }) => Err(StoreError::Backend(message)),
            _ => Err(StoreError::Backend(format!("HTTP {}: {}", status.as_u16(), body))),
        }
    }

    fn returning_ids(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .query(&[("select", "id")])
            .header("Prefer", "return=representation")
    }
}

#[async_trait]
impl UserStore for SupabaseUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let request = self
            .http
            .get(&self.table_url)
            .query(&[("select", "*"), ("order", "fecha_registro.desc,id.desc")]);
        let rows: Vec<UserRow> = self.send(request).await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let request = self
            .http
            .get(&self.table_url)
            .query(&[("select", "*".to_owned()), ("id", format!("eq.{}", id))]);
        let rows: Vec<UserRow> = self.send(request).await?;

        Ok(rows.into_iter().next().map(UserRow::into_user))
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<i64> {
        let request = self
            .returning_ids(self.http.post(&self.table_url))
            .json(&[UserPayload::from(user)]);
        let rows: Vec<IdRow> = self.send(request).await?;

        rows.first()
            .map(|r| r.id)
            .ok_or_else(|| StoreError::Backend("insert returned no rows".into()))
    }

    async fn update_by_id(&self, id: i64, changes: &UserUpdate) -> StoreResult<bool> {
        let request = self
            .returning_ids(self.http.patch(&self.table_url))
            .query(&[("id", format!("eq.{}", id))])
            .json(&UpdatePayload::from(changes));
        let rows: Vec<IdRow> = self.send(request).await?;

        Ok(!rows.is_empty())
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<bool> {
        let request = self
            .returning_ids(self.http.delete(&self.table_url))
            .query(&[("id", format!("eq.{}", id))]);
        let rows: Vec<IdRow> = self.send(request).await?;

        Ok(!rows.is_empty())
    }

    async fn ping(&self) -> StoreResult<()> {
        let request = self
            .http
            .get(&self.table_url)
            .query(&[("select", "id"), ("limit", "1")]);
        let _: Vec<IdRow> = self.send(request).await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "supabase"
    }
}
