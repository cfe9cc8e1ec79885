//! bazaar-store: PostgreSQL data access for marketplace entities
//!
//! Two persistence styles live side by side. Countries are mapped onto
//! rows by `sqlx::FromRow` and their currency links are maintained by the
//! repository. Items are written with hand-built SQL that resolves foreign
//! keys by natural key and read back through a joined select with manual
//! row mapping.

pub mod db;
pub mod error;

pub use db::{create_pool, create_pool_from_config, migrations, CountryDao, CountryRepo, Dao, ItemDao, ItemRepo};
pub use error::{DaoError, DaoResult, Operation};
