//! DAO contracts
//!
//! Each call is serviced on its own pooled connection and reports failures
//! as a [`DaoError`](crate::DaoError) of the matching operation kind.

use async_trait::async_trait;
use bazaar_core::{Country, Item};

use crate::error::DaoResult;

/// CRUD contract shared by every entity DAO.
#[async_trait]
pub trait Dao<T, Id>: Send + Sync
where
    T: Send + Sync + 'static,
    Id: Send + 'static,
{
    /// Fetch one entity. An absent row is a `NotFound` error, not `None`.
    async fn get_by_id(&self, id: Id) -> DaoResult<T>;

    async fn all_entities(&self) -> DaoResult<Vec<T>>;

    /// Insert the entity with the id it carries.
    async fn save(&self, entity: &T) -> DaoResult<()>;

    /// Insert the entity and let the database assign its id.
    async fn save_ignore_id(&self, entity: &T) -> DaoResult<()>;

    /// Overwrite row `id` with the entity's fields.
    ///
    /// The id stored inside `entity` is ignored. Updating an absent row
    /// fails with `sqlx::Error::RowNotFound` under the update kind.
    async fn update(&self, id: Id, entity: &T) -> DaoResult<()>;

    /// Delete by id. Deleting an absent row succeeds.
    async fn delete(&self, id: Id) -> DaoResult<()>;
}

#[async_trait]
pub trait CountryDao: Dao<Country, i32> {
    /// Exact, case-sensitive lookup by country name.
    async fn get_by_name(&self, name: &str) -> DaoResult<Country>;

    async fn delete_by_name(&self, name: &str) -> DaoResult<()>;
}

#[async_trait]
pub trait ItemDao: Dao<Item, i64> {
    /// Items whose name resembles `name`, tolerating one mistyped character.
    ///
    /// Results are unique by item id, in the order they were first matched.
    async fn items_with_similar_name(&self, name: &str) -> DaoResult<Vec<Item>>;
}
