//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Connection pool, one connection per operation, released on drop
//! - Single-entity reads use JOINs, no N+1 queries
//! - Foreign keys resolved by natural key inside the statement
//! - Transactions only for multi-statement writes

pub mod dao;
pub mod migrations;
pub mod pool;
pub mod repos;

pub use dao::{CountryDao, Dao, ItemDao};
pub use pool::{create_pool, create_pool_from_config, create_pool_with_options};
pub use repos::*;
