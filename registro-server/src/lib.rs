//! registro-server: user registration CRUD over pluggable storage
//!
//! Exposes list/get/create/update/delete for the `usuarios` table as a
//! JSON HTTP API. Storage is any [`store::UserStore`]: Postgres, SQLite,
//! Supabase (PostgREST) or in-memory.

pub mod db;
pub mod http;
pub mod models;
pub mod service;
pub mod store;

pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
pub use models::{NewUser, User, UserInput, UserUpdate, ValidationError};
pub use service::{DirectoryError, UserDirectoryService};
pub use store::{StoreError, UserStore};
