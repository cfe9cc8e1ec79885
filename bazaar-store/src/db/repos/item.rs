//! Item repository
//!
//! Hand-written statements throughout:
//! - reads: one select joining currency, phone number and (optional) country,
//!   mapped column by column
//! - writes: currency, phone number and country ids resolved by name in
//!   sub-selects, so callers never need surrogate keys of referenced rows

use std::collections::HashSet;

use async_trait::async_trait;
use bazaar_core::model::MAX_ITEM_NAME_LEN;
use bazaar_core::{similar_patterns, Country, Currency, Item, PhoneNumber};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use crate::db::dao::{Dao, ItemDao};
use crate::error::{DaoError, DaoResult, Operation};

macro_rules! item_select {
    () => {
        r#"
        SELECT
            i.item_id, i.item_name, i.amount, i.price_for_one,
            i.currency_id, cur.currency_name,
            i.img_url, i.item_description, i.put_up_for_sale,
            i.phone_number_id, p.phone_number,
            i.country_id, c.country_name
        FROM is_item i
        INNER JOIN is_currency cur ON cur.currency_id = i.currency_id
        INNER JOIN is_phone_number p ON p.phone_number_id = i.phone_number_id
        LEFT JOIN is_country c ON c.country_id = i.country_id
        "#
    };
}

const SELECT_BY_ID: &str = concat!(item_select!(), "WHERE i.item_id = $1");
const SELECT_ALL: &str = concat!(item_select!(), "ORDER BY i.item_id");
const SELECT_LIKE: &str = concat!(item_select!(), "WHERE i.item_name ILIKE $1 ORDER BY i.item_id");

const INSERT_WITH_ID: &str = r#"
    INSERT INTO is_item (
        item_id, item_name, amount, price_for_one, currency_id,
        img_url, item_description, put_up_for_sale, phone_number_id, country_id
    )
    VALUES (
        $1, $2, $3, $4,
        (SELECT currency_id FROM is_currency WHERE currency_name = $5),
        $6, $7, $8,
        (SELECT phone_number_id FROM is_phone_number WHERE phone_number = $9),
        (SELECT country_id FROM is_country WHERE country_name = $10)
    )
"#;

const INSERT_GENERATED_ID: &str = r#"
    INSERT INTO is_item (
        item_name, amount, price_for_one, currency_id,
        img_url, item_description, put_up_for_sale, phone_number_id, country_id
    )
    VALUES (
        $1, $2, $3,
        (SELECT currency_id FROM is_currency WHERE currency_name = $4),
        $5, $6, $7,
        (SELECT phone_number_id FROM is_phone_number WHERE phone_number = $8),
        (SELECT country_id FROM is_country WHERE country_name = $9)
    )
    RETURNING item_id
"#;

/// Keep generated ids ahead of ids inserted by `save`.
const SYNC_ID_SEQUENCE: &str = r#"
    SELECT setval(
        pg_get_serial_sequence('is_item', 'item_id'),
        GREATEST((SELECT MAX(item_id) FROM is_item), 1)
    )
"#;

const UPDATE: &str = r#"
    UPDATE is_item SET
        item_name = $1,
        amount = $2,
        price_for_one = $3,
        currency_id = (SELECT currency_id FROM is_currency WHERE currency_name = $4),
        img_url = $5,
        item_description = $6,
        put_up_for_sale = $7,
        phone_number_id = (SELECT phone_number_id FROM is_phone_number WHERE phone_number = $8),
        country_id = (SELECT country_id FROM is_country WHERE country_name = $9)
    WHERE item_id = $10
"#;

/// Map one joined row onto an [`Item`].
///
/// A NULL `country_id` means the item has no country.
fn map_row(row: &PgRow) -> Result<Item, sqlx::Error> {
    let country = match row.try_get::<Option<i32>, _>("country_id")? {
        Some(id) => Some(Country::new(id, row.try_get::<String, _>("country_name")?)),
        None => None,
    };

    Ok(Item {
        id: row.try_get("item_id")?,
        name: row.try_get("item_name")?,
        amount: row.try_get("amount")?,
        price_for_one: row.try_get("price_for_one")?,
        currency: Currency::new(row.try_get("currency_id")?, row.try_get::<String, _>("currency_name")?),
        image_url: row.try_get("img_url")?,
        description: row.try_get("item_description")?,
        put_up_for_sale: row.try_get("put_up_for_sale")?,
        phone_number: PhoneNumber::new(
            row.try_get("phone_number_id")?,
            row.try_get::<String, _>("phone_number")?,
        ),
        country,
    })
}

/// Search input no stored item name could match.
fn too_long_to_match(name: &str) -> bool {
    name.trim().chars().count() > MAX_ITEM_NAME_LEN
}

/// Keep the first occurrence of each item id.
fn push_unique(out: &mut Vec<Item>, seen: &mut HashSet<i64>, items: Vec<Item>) {
    for item in items {
        if seen.insert(item.id) {
            out.push(item);
        }
    }
}

/// Item repository
pub struct ItemRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn validate(item: &Item, op: Operation) -> DaoResult<()> {
        item.validate().map_err(|e| DaoError::invalid(op, e))
    }
}

#[async_trait]
impl<'a> Dao<Item, i64> for ItemRepo<'a> {
    async fn get_by_id(&self, id: i64) -> DaoResult<Item> {
        debug!(id, "fetching item");

        let row = sqlx::query(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(DaoError::fetch)?
            .ok_or_else(|| DaoError::not_found("item", "id", id))?;

        map_row(&row).map_err(DaoError::fetch)
    }

    async fn all_entities(&self) -> DaoResult<Vec<Item>> {
        let rows = sqlx::query(SELECT_ALL)
            .fetch_all(self.pool)
            .await
            .map_err(DaoError::fetch)?;

        let items = rows
            .iter()
            .map(map_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DaoError::fetch)?;

        debug!(count = items.len(), "fetched items");
        Ok(items)
    }

    async fn save(&self, item: &Item) -> DaoResult<()> {
        Self::validate(item, Operation::Store)?;

        let mut tx = self.pool.begin().await.map_err(DaoError::store)?;

        // Unknown currency or phone number resolves to NULL and trips the
        // NOT NULL constraint; an unknown country is stored as NULL.
        sqlx::query(INSERT_WITH_ID)
            .bind(item.id)
            .bind(item.name.as_str())
            .bind(item.amount)
            .bind(item.price_for_one)
            .bind(item.currency.name.as_str())
            .bind(item.image_url.as_deref())
            .bind(item.description.as_deref())
            .bind(item.put_up_for_sale)
            .bind(item.phone_number.number.as_str())
            .bind(item.country_name())
            .execute(&mut *tx)
            .await
            .map_err(DaoError::store)?;

        sqlx::query(SYNC_ID_SEQUENCE)
            .execute(&mut *tx)
            .await
            .map_err(DaoError::store)?;

        tx.commit().await.map_err(DaoError::store)?;

        info!(id = item.id, name = %item.name, "saved item");
        Ok(())
    }

    async fn save_ignore_id(&self, item: &Item) -> DaoResult<()> {
        Self::validate(item, Operation::Store)?;

        let (id,): (i64,) = sqlx::query_as(INSERT_GENERATED_ID)
            .bind(item.name.as_str())
            .bind(item.amount)
            .bind(item.price_for_one)
            .bind(item.currency.name.as_str())
            .bind(item.image_url.as_deref())
            .bind(item.description.as_deref())
            .bind(item.put_up_for_sale)
            .bind(item.phone_number.number.as_str())
            .bind(item.country_name())
            .fetch_one(self.pool)
            .await
            .map_err(DaoError::store)?;

        info!(id, name = %item.name, "saved item with generated id");
        Ok(())
    }

    async fn update(&self, id: i64, item: &Item) -> DaoResult<()> {
        Self::validate(item, Operation::Update)?;

        let result = sqlx::query(UPDATE)
            .bind(item.name.as_str())
            .bind(item.amount)
            .bind(item.price_for_one)
            .bind(item.currency.name.as_str())
            .bind(item.image_url.as_deref())
            .bind(item.description.as_deref())
            .bind(item.put_up_for_sale)
            .bind(item.phone_number.number.as_str())
            .bind(item.country_name())
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(DaoError::update)?;

        if result.rows_affected() == 0 {
            return Err(DaoError::update(sqlx::Error::RowNotFound));
        }

        info!(id, name = %item.name, "updated item");
        Ok(())
    }

    async fn delete(&self, id: i64) -> DaoResult<()> {
        let result = sqlx::query("DELETE FROM is_item WHERE item_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(DaoError::delete)?;

        info!(id, deleted = result.rows_affected(), "deleted item");
        Ok(())
    }
}

#[async_trait]
impl<'a> ItemDao for ItemRepo<'a> {
    async fn items_with_similar_name(&self, name: &str) -> DaoResult<Vec<Item>> {
        if too_long_to_match(name) {
            debug!(len = name.len(), "search input longer than any item name");
            return Ok(Vec::new());
        }

        let patterns = similar_patterns(name);
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        // All patterns share one connection for the duration of the search
        let mut conn = self.pool.acquire().await.map_err(DaoError::fetch)?;
        let mut out = Vec::new();
        let mut seen = HashSet::new();

        for pattern in &patterns {
            let rows = sqlx::query(SELECT_LIKE)
                .bind(pattern.as_str())
                .fetch_all(&mut *conn)
                .await
                .map_err(DaoError::fetch)?;

            let items = rows
                .iter()
                .map(map_row)
                .collect::<Result<Vec<_>, _>>()
                .map_err(DaoError::fetch)?;

            push_unique(&mut out, &mut seen, items);
        }

        debug!(name, patterns = patterns.len(), matches = out.len(), "similar name search");
        Ok(out)
    }
}
