//! registro CLI - user registration API server
//!
//! Entry point for the `registro` binary, which provides:
//! - `serve`: the usuarios JSON API over the configured store
//! - `migrate`: create the usuarios table on Postgres or SQLite
//! - `check`: verify the configured store is reachable

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "registro",
    author,
    version,
    about = "User registration API: list, create, update and delete usuarios",
    long_about = "Serve the usuarios CRUD API backed by Postgres, SQLite, Supabase or an \
                  in-memory store. Settings come from flags, the environment and a .env file."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create the usuarios table (postgres or sqlite)
    Migrate(commands::migrate::MigrateArgs),
    /// Check connectivity to the configured store
    Check(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
        Commands::Check(args) => commands::run_check(args).await?,
    }
    Ok(())
}
