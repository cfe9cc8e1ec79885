//! Command implementations for bazaarctl

pub mod config;
pub mod country;
pub mod item;
pub mod migrate;

pub use config::run_config;
pub use country::run_country;
pub use item::run_item;
pub use migrate::run_migrate;

use anyhow::{Context, Result};
use bazaar_core::BazaarConfig;
use serde::Serialize;
use sqlx::PgPool;

/// Open a pool for the configured database.
pub async fn connect(config: &BazaarConfig) -> Result<PgPool> {
    bazaar_store::create_pool_from_config(&config.database)
        .await
        .context("Failed to connect to database (check DATABASE_URL or [database].url)")
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
