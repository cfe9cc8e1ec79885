//! Repository implementations for database access
//!
//! - `country`: row structs derived with `FromRow`, links kept in a transaction
//! - `item`: hand-written statements with sub-select foreign key lookups

pub mod country;
pub mod item;

pub use country::CountryRepo;
pub use item::ItemRepo;
