//! Database layer - connection pools and schema migrations
//!
//! # Design Principles
//!
//! - Bounded connection pool (default 5 connections) - no Arc<Mutex<Connection>>
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Pools are built once at startup and handed to a store, never global

pub mod migrations;
pub mod pool;

pub use pool::{create_pg_pool, create_sqlite_pool, DEFAULT_MAX_CONNECTIONS};
