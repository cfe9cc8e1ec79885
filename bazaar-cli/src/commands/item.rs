//! Item commands
//!
//! Command: item

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bazaar_core::{BazaarConfig, Country, Currency, Item, PhoneNumber};
use bazaar_store::{Dao, ItemDao, ItemRepo};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use super::{connect, print_json};

#[derive(Parser, Debug)]
pub struct ItemArgs {
    #[command(subcommand)]
    pub command: ItemCommands,
}

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// List all items
    List,
    /// Show one item by id
    Get {
        /// Item id
        id: i64,
    },
    /// Find items with a name similar to the given one
    Search {
        /// Name to look for (one mistyped character is tolerated)
        name: String,
    },
    /// Add an item, letting the database assign its id
    Add(AddArgs),
    /// Import items with explicit ids from a JSON array
    Import {
        /// Path to a JSON file holding an array of items
        file: PathBuf,
    },
    /// Overwrite an item with the fields from a JSON file
    Update {
        /// Item id
        id: i64,

        /// Path to a JSON file holding one item
        file: PathBuf,
    },
    /// Delete an item by id
    Delete {
        /// Item id
        id: i64,
    },
}

#[derive(Parser, Debug)]
#[command(after_help = "Currencies and phone numbers are not created by bazaarctl. Insert them \
                        into is_currency and is_phone_number before adding items.")]
pub struct AddArgs {
    /// Item name
    #[arg(long)]
    pub name: String,

    /// Number of units for sale
    #[arg(long, default_value_t = 1)]
    pub amount: i32,

    /// Price for one unit, e.g. 19.99
    #[arg(long)]
    pub price: Decimal,

    /// Currency name (must already exist)
    #[arg(long)]
    pub currency: String,

    /// Contact phone number (must already exist)
    #[arg(long)]
    pub phone: String,

    /// Country name
    #[arg(long)]
    pub country: Option<String>,

    /// Image URL
    #[arg(long)]
    pub image_url: Option<String>,

    /// Free-form description
    #[arg(long)]
    pub description: Option<String>,

    /// Sale date as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

impl AddArgs {
    fn into_item(self) -> Item {
        Item {
            id: 0,
            name: self.name,
            amount: self.amount,
            price_for_one: self.price,
            currency: Currency::new(0, self.currency),
            image_url: self.image_url,
            description: self.description,
            put_up_for_sale: self.date.unwrap_or_else(|| Local::now().date_naive()),
            phone_number: PhoneNumber::new(0, self.phone),
            country: self.country.map(|name| Country::new(0, name)),
        }
    }
}

pub async fn run_item(args: ItemArgs, config: &BazaarConfig) -> Result<()> {
    let pool = connect(config).await?;
    let dao = ItemRepo::new(&pool);

    match args.command {
        ItemCommands::List => print_json(&dao.all_entities().await?),
        ItemCommands::Get { id } => print_json(&dao.get_by_id(id).await?),
        ItemCommands::Search { name } => print_json(&dao.items_with_similar_name(&name).await?),
        ItemCommands::Add(add) => {
            let item = add.into_item();
            dao.save_ignore_id(&item).await?;
            eprintln!("Added item '{}'", item.name);
            Ok(())
        }
        ItemCommands::Import { file } => {
            let items: Vec<Item> = read_json(&file)?;
            for item in &items {
                dao.save(item)
                    .await
                    .with_context(|| format!("Failed to import item {} '{}'", item.id, item.name))?;
            }
            eprintln!("Imported {} items", items.len());
            Ok(())
        }
        ItemCommands::Update { id, file } => {
            let item: Item = read_json(&file)?;
            dao.update(id, &item).await?;
            print_json(&dao.get_by_id(id).await?)
        }
        ItemCommands::Delete { id } => Ok(dao.delete(id).await?),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}
