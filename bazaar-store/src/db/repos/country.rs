//! Country repository
//!
//! Rows are mapped by `FromRow`; the currency collection is read with one
//! LEFT JOIN and folded back into each country. Writes that touch the
//! link table run in a single transaction:
//! - save: insert with the caller's id, advance the id sequence, link currencies by id
//! - save_ignore_id: insert by name, link currencies by name (rolled back on failure)
//! - update: rename, then replace the link rows

use async_trait::async_trait;
use bazaar_core::{Country, Currency};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, info, warn};

use crate::db::dao::{CountryDao, Dao};
use crate::error::{DaoError, DaoResult, Operation};

macro_rules! country_select {
    () => {
        r#"
        SELECT c.country_id, c.country_name, cur.currency_id, cur.currency_name
        FROM is_country c
        LEFT JOIN is_country_to_currency cc ON cc.country_id = c.country_id
        LEFT JOIN is_currency cur ON cur.currency_id = cc.currency_id
        "#
    };
}

const SELECT_BY_ID: &str = concat!(country_select!(), "WHERE c.country_id = $1 ORDER BY cur.currency_id");
const SELECT_BY_NAME: &str = concat!(country_select!(), "WHERE c.country_name = $1 ORDER BY cur.currency_id");
const SELECT_ALL: &str = concat!(country_select!(), "ORDER BY c.country_id, cur.currency_id");

/// Move the id sequence past the highest stored id, so generated ids never
/// collide with ids inserted explicitly.
const SYNC_ID_SEQUENCE: &str = r#"
    SELECT setval(
        pg_get_serial_sequence('is_country', 'country_id'),
        GREATEST((SELECT MAX(country_id) FROM is_country), 1)
    )
"#;

/// One country/currency pair; currency columns are NULL for a country
/// without currencies.
#[derive(Debug, Clone, FromRow)]
struct CountryCurrencyRow {
    country_id: i32,
    country_name: String,
    currency_id: Option<i32>,
    currency_name: Option<String>,
}

/// Fold joined rows into countries. Rows must be grouped by country.
fn fold_rows(rows: Vec<CountryCurrencyRow>) -> Vec<Country> {
    let mut out: Vec<Country> = Vec::new();

    for row in rows {
        let currency = match (row.currency_id, row.currency_name) {
            (Some(id), Some(name)) => Some(Currency::new(id, name)),
            _ => None,
        };

        match out.last_mut() {
            Some(last) if last.id == row.country_id => last.currencies.extend(currency),
            _ => {
                let mut country = Country::new(row.country_id, row.country_name);
                country.currencies.extend(currency);
                out.push(country);
            }
        }
    }

    out
}

/// Commit on success, roll back and wrap the error otherwise.
async fn finish(
    tx: Transaction<'_, Postgres>,
    result: Result<(), sqlx::Error>,
    op: Operation,
) -> DaoResult<()> {
    match result {
        Ok(()) => tx
            .commit()
            .await
            .map_err(|source| DaoError::Database { op, source }),
        Err(source) => {
            match tx.rollback().await {
                Ok(()) => warn!(%op, error = %source, "country transaction rolled back"),
                Err(e) => warn!(%op, error = %e, "country rollback failed"),
            }
            Err(DaoError::Database { op, source })
        }
    }
}

async fn link_currencies_by_id(
    conn: &mut PgConnection,
    country_id: i32,
    currencies: &[Currency],
) -> Result<(), sqlx::Error> {
    for currency in currencies {
        sqlx::query("INSERT INTO is_country_to_currency (country_id, currency_id) VALUES ($1, $2)")
            .bind(country_id)
            .bind(currency.id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn insert_with_id(conn: &mut PgConnection, country: &Country) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO is_country (country_id, country_name) VALUES ($1, $2)")
        .bind(country.id)
        .bind(country.name.as_str())
        .execute(&mut *conn)
        .await?;

    sqlx::query(SYNC_ID_SEQUENCE).execute(&mut *conn).await?;

    link_currencies_by_id(conn, country.id, &country.currencies).await
}

async fn insert_by_name(conn: &mut PgConnection, country: &Country) -> Result<i32, sqlx::Error> {
    let (country_id,): (i32,) =
        sqlx::query_as("INSERT INTO is_country (country_name) VALUES ($1) RETURNING country_id")
            .bind(country.name.as_str())
            .fetch_one(&mut *conn)
            .await?;

    // An unknown currency name yields NULL and violates the link table's
    // NOT NULL constraint, failing the whole transaction.
    for currency in &country.currencies {
        sqlx::query(
            r#"
            INSERT INTO is_country_to_currency (country_id, currency_id)
            VALUES ($1, (SELECT currency_id FROM is_currency WHERE currency_name = $2))
            "#,
        )
        .bind(country_id)
        .bind(currency.name.as_str())
        .execute(&mut *conn)
        .await?;
    }

    Ok(country_id)
}

async fn overwrite(conn: &mut PgConnection, id: i32, country: &Country) -> Result<(), sqlx::Error> {
    let result = sqlx::query("UPDATE is_country SET country_name = $1 WHERE country_id = $2")
        .bind(country.name.as_str())
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }

    sqlx::query("DELETE FROM is_country_to_currency WHERE country_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    link_currencies_by_id(conn, id, &country.currencies).await
}

/// Country repository
pub struct CountryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CountryRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, sql: &'static str, key: &'static str, value: Key<'_>) -> DaoResult<Country> {
        let query = sqlx::query_as::<_, CountryCurrencyRow>(sql);
        let query = match value {
            Key::Id(id) => query.bind(id),
            Key::Name(name) => query.bind(name),
        };

        let rows = query.fetch_all(self.pool).await.map_err(DaoError::fetch)?;

        fold_rows(rows)
            .into_iter()
            .next()
            .ok_or_else(|| DaoError::not_found("country", key, value))
    }
}

/// Lookup key for single-country fetches
#[derive(Debug, Clone, Copy)]
enum Key<'k> {
    Id(i32),
    Name(&'k str),
}

impl std::fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Id(id) => write!(f, "{}", id),
            Key::Name(name) => f.write_str(name),
        }
    }
}

#[async_trait]
impl<'a> Dao<Country, i32> for CountryRepo<'a> {
    async fn get_by_id(&self, id: i32) -> DaoResult<Country> {
        debug!(id, "fetching country");
        self.fetch(SELECT_BY_ID, "id", Key::Id(id)).await
    }

    async fn all_entities(&self) -> DaoResult<Vec<Country>> {
        let rows = sqlx::query_as::<_, CountryCurrencyRow>(SELECT_ALL)
            .fetch_all(self.pool)
            .await
            .map_err(DaoError::fetch)?;

        let countries = fold_rows(rows);
        debug!(count = countries.len(), "fetched countries");
        Ok(countries)
    }

    async fn save(&self, country: &Country) -> DaoResult<()> {
        country
            .validate_name()
            .map_err(|e| DaoError::invalid(Operation::Store, e))?;

        let mut tx = self.pool.begin().await.map_err(DaoError::store)?;
        let result = insert_with_id(&mut tx, country).await;
        finish(tx, result, Operation::Store).await?;

        info!(id = country.id, name = %country.name, "saved country");
        Ok(())
    }

    async fn save_ignore_id(&self, country: &Country) -> DaoResult<()> {
        country
            .validate()
            .map_err(|e| DaoError::invalid(Operation::Store, e))?;

        let mut tx = self.pool.begin().await.map_err(DaoError::store)?;
        let result = insert_by_name(&mut tx, country).await;
        let assigned = result.as_ref().ok().copied();
        finish(tx, result.map(|_| ()), Operation::Store).await?;

        info!(id = ?assigned, name = %country.name, "saved country with generated id");
        Ok(())
    }

    async fn update(&self, id: i32, country: &Country) -> DaoResult<()> {
        country
            .validate_name()
            .map_err(|e| DaoError::invalid(Operation::Update, e))?;

        let mut tx = self.pool.begin().await.map_err(DaoError::update)?;
        let result = overwrite(&mut tx, id, country).await;
        finish(tx, result, Operation::Update).await?;

        info!(id, name = %country.name, "updated country");
        Ok(())
    }

    async fn delete(&self, id: i32) -> DaoResult<()> {
        let result = sqlx::query("DELETE FROM is_country WHERE country_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(DaoError::delete)?;

        info!(id, deleted = result.rows_affected(), "deleted country");
        Ok(())
    }
}

#[async_trait]
impl<'a> CountryDao for CountryRepo<'a> {
    async fn get_by_name(&self, name: &str) -> DaoResult<Country> {
        debug!(name, "fetching country by name");
        self.fetch(SELECT_BY_NAME, "name", Key::Name(name)).await
    }

    async fn delete_by_name(&self, name: &str) -> DaoResult<()> {
        let result = sqlx::query("DELETE FROM is_country WHERE country_name = $1")
            .bind(name)
            .execute(self.pool)
            .await
            .map_err(DaoError::delete)?;

        info!(name, deleted = result.rows_affected(), "deleted country by name");
        Ok(())
    }
}
