//! Schema migration command
//!
//! Command: migrate

use anyhow::{Context, Result};
use bazaar_core::BazaarConfig;
use bazaar_store::migrations;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Drop all marketplace tables before creating them (destroys data)
    #[arg(long)]
    pub reset: bool,
}

pub async fn run_migrate(args: MigrateArgs, config: &BazaarConfig) -> Result<()> {
    let pool = super::connect(config).await?;

    if args.reset {
        tracing::warn!("dropping marketplace tables");
        migrations::drop_all(&pool)
            .await
            .context("Failed to drop tables")?;
    }

    migrations::run(&pool).await.context("Migration failed")?;
    eprintln!("Schema is up to date");
    Ok(())
}
