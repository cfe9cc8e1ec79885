//! Schema for the marketplace tables
//!
//! Statements are idempotent (`IF NOT EXISTS`), so running them against an
//! existing database is a no-op.

use sqlx::PgPool;

/// Tables in dependency order; `drop_all` walks this list in reverse.
const TABLES: &[&str] = &[
    "is_currency",
    "is_country",
    "is_country_to_currency",
    "is_phone_number",
    "is_item",
];

/// Create all marketplace tables
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running marketplace migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS is_currency (
            currency_id SERIAL PRIMARY KEY,
            currency_name VARCHAR(64) NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS is_country (
            country_id SERIAL PRIMARY KEY,
            country_name VARCHAR(64) NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS is_country_to_currency (
            country_id INTEGER NOT NULL REFERENCES is_country(country_id) ON DELETE CASCADE,
            currency_id INTEGER NOT NULL REFERENCES is_currency(currency_id) ON DELETE CASCADE,
            PRIMARY KEY (country_id, currency_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS is_phone_number (
            phone_number_id BIGSERIAL PRIMARY KEY,
            phone_number VARCHAR(32) NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Items keep their country optional; deleting a referenced
    // currency, phone number or country is refused.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS is_item (
            item_id BIGSERIAL PRIMARY KEY,
            item_name VARCHAR(128) NOT NULL,
            amount INTEGER NOT NULL CHECK (amount >= 0),
            price_for_one NUMERIC(12, 2) NOT NULL CHECK (price_for_one >= 0),
            currency_id INTEGER NOT NULL REFERENCES is_currency(currency_id),
            img_url TEXT,
            item_description TEXT,
            put_up_for_sale DATE NOT NULL,
            phone_number_id BIGINT NOT NULL REFERENCES is_phone_number(phone_number_id),
            country_id INTEGER REFERENCES is_country(country_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_is_item_name ON is_item (item_name)")
        .execute(pool)
        .await?;

    tracing::info!("Marketplace migrations complete");
    Ok(())
}

/// Drop every marketplace table. Used by integration tests for a clean slate.
pub async fn drop_all(pool: &PgPool) -> Result<(), sqlx::Error> {
    for table in TABLES.iter().rev() {
        tracing::debug!(table, "dropping table");
        sqlx::query(&format!("DROP TABLE IF EXISTS {} CASCADE", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}
