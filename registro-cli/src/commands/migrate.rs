//! Schema migration command

use anyhow::{bail, Result};
use clap::Parser;

use crate::config::{open_store, StoreArgs, StoreKind};

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

/// Create the usuarios table on a SQL backend
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let settings = args.store.resolve()?;

    match settings.kind() {
        StoreKind::Postgres | StoreKind::Sqlite => {}
        other => bail!("migrate only applies to postgres or sqlite stores, not {:?}", other),
    }

    let store = open_store(&settings, true).await?;
    store.close().await;

    println!("Migración completada: tabla usuarios creada");
    Ok(())
}
