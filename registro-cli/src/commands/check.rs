//! Storage connectivity check

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{open_store, StoreArgs};

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

/// Ping the configured store; fails when it is unreachable
pub async fn run_check(args: CheckArgs) -> Result<()> {
    let settings = args.store.resolve()?;
    let store = open_store(&settings, false).await?;

    let result = store
        .ping()
        .await
        .with_context(|| format!("Cannot reach {} store", store.kind()));
    store.close().await;
    result?;

    println!("✅ Conexión a {} exitosa", store.kind());
    Ok(())
}
