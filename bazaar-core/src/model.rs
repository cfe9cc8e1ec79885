//! Marketplace entities
//!
//! Plain data records. Mandatory references (an item's currency and phone
//! number) are owned fields; the only optional reference is an item's
//! country.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

/// Maximum length of a country or currency name (matches `VARCHAR(64)`)
pub const MAX_SHORT_NAME_LEN: usize = 64;

/// Maximum length of an item name (matches `VARCHAR(128)`)
pub const MAX_ITEM_NAME_LEN: usize = 128;

/// Currency accepted in a country
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    pub id: i32,
    pub name: String,
}

impl Currency {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::name("currency name", &self.name, MAX_SHORT_NAME_LEN)
    }
}

/// Country together with the currencies it accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub currencies: Vec<Currency>,
}

impl Country {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            currencies: Vec::new(),
        }
    }

    pub fn with_currencies(mut self, currencies: Vec<Currency>) -> Self {
        self.currencies = currencies;
        self
    }

    pub fn validate_name(&self) -> Result<(), ValidationError> {
        validation::name("country name", &self.name, MAX_SHORT_NAME_LEN)
    }

    /// Validate the country name and every attached currency name.
    ///
    /// Only needed when currencies are resolved by name; links by id
    /// ignore the names entirely.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_name()?;
        self.currencies.iter().try_for_each(Currency::validate)
    }
}

/// Contact number attached to a listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub id: i64,
    pub number: String,
}

impl PhoneNumber {
    pub fn new(id: i64, number: impl Into<String>) -> Self {
        Self {
            id,
            number: number.into(),
        }
    }
}

/// Classified listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub amount: i32,
    pub price_for_one: Decimal,
    pub currency: Currency,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub put_up_for_sale: NaiveDate,
    pub phone_number: PhoneNumber,
    pub country: Option<Country>,
}

impl Item {
    /// Validate the fields written by the item DAO.
    ///
    /// Referenced entities are checked by their natural key only, since that
    /// is all the store resolves them by.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::name("item name", &self.name, MAX_ITEM_NAME_LEN)?;
        validation::non_negative("amount", self.amount.into())?;
        validation::non_negative("price", self.price_for_one)?;
        self.currency.validate()?;
        validation::phone_number(&self.phone_number.number)?;
        if let Some(country) = &self.country {
            validation::name("country name", &country.name, MAX_SHORT_NAME_LEN)?;
        }
        Ok(())
    }

    /// Name of the referenced country, if any.
    pub fn country_name(&self) -> Option<&str> {
        self.country.as_ref().map(|c| c.name.as_str())
    }
}
