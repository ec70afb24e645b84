//! HTTP server command
//!
//! Opens the configured store, runs migrations unless told not to, and
//! serves the usuarios API until Ctrl+C / SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use registro_server::{run_server, ServerConfig, UserDirectoryService};

use crate::config::{open_store, StoreArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides --port)
    #[arg(long, short = 'b', env = "BIND_ADDR")]
    pub bind: Option<SocketAddr>,

    /// Port to listen on. Binds 127.0.0.1 only; in containers or PaaS
    /// deploys use --bind 0.0.0.0:<port> (or BIND_ADDR) to accept outside
    /// connections
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Do not create the usuarios table on startup
    #[arg(long)]
    pub skip_migrations: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

impl ServeArgs {
    fn bind_addr(&self) -> SocketAddr {
        self.bind
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], self.port)))
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let settings = args.store.resolve()?;
    tracing::info!(store = ?settings.kind(), "Starting registro server on {}", args.bind_addr());

    let store = open_store(&settings, !args.skip_migrations).await?;

    // Report connectivity up front; the server still starts so requests
    // surface the storage error themselves.
    match store.ping().await {
        Ok(()) => tracing::info!(store = store.kind(), "Storage connection ok"),
        Err(e) => tracing::warn!(store = store.kind(), "Storage not reachable: {}", e),
    }

    let config = ServerConfig {
        bind_addr: args.bind_addr(),
        cors_permissive: args.cors_permissive,
    };

    // Run server (blocks until shutdown, closes the store afterwards)
    run_server(UserDirectoryService::new(store), config)
        .await
        .context("Server error")?;

    Ok(())
}
