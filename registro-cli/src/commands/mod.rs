//! Command implementations for the registro CLI

pub mod check;
pub mod migrate;
pub mod serve;

// Re-export dispatcher functions for flat access from main.rs
pub use check::run_check;
pub use migrate::run_migrate;
pub use serve::run_serve;
