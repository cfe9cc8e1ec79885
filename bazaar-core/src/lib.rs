//! bazaar-core: marketplace entities shared by the store and the CLI
//!
//! Entities carry no persistence logic; validation happens at the
//! boundary via [`validation`] before any statement is issued.

pub mod config;
pub mod model;
pub mod similar;
pub mod validation;

pub use config::{BazaarConfig, DatabaseConfig, LoggingConfig};
pub use model::{Country, Currency, Item, PhoneNumber};
pub use similar::similar_patterns;
pub use validation::ValidationError;
