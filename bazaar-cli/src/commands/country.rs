//! Country commands
//!
//! Command: country

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bazaar_core::{BazaarConfig, Country, Currency};
use bazaar_store::{CountryDao, CountryRepo, Dao};
use clap::{Parser, Subcommand};

use super::{connect, print_json};

#[derive(Parser, Debug)]
pub struct CountryArgs {
    #[command(subcommand)]
    pub command: CountryCommands,
}

#[derive(Subcommand, Debug)]
pub enum CountryCommands {
    /// List all countries with their currencies
    List,
    /// Show one country by id
    Get {
        /// Country id
        id: i32,
    },
    /// Show one country by exact name
    Find {
        /// Country name (case-sensitive)
        name: String,
    },
    /// Add a country, letting the database assign its id
    #[command(after_help = "Currencies are not created by bazaarctl. Insert them into \
                            is_currency before referencing them here.")]
    Add {
        /// Country name
        name: String,

        /// Currency name accepted in the country (repeatable, must already exist)
        #[arg(long = "currency", short = 'c')]
        currencies: Vec<String>,
    },
    /// Import countries with explicit ids from a JSON array
    Import {
        /// Path to a JSON file holding an array of countries
        file: PathBuf,
    },
    /// Rename a country and replace its currencies
    Update {
        /// Country id
        id: i32,

        /// New country name
        name: String,

        /// Currency id accepted in the country (repeatable)
        #[arg(long = "currency-id")]
        currency_ids: Vec<i32>,
    },
    /// Delete a country by id
    Delete {
        /// Country id
        id: i32,
    },
    /// Delete a country by exact name
    DeleteByName {
        /// Country name (case-sensitive)
        name: String,
    },
}

pub async fn run_country(args: CountryArgs, config: &BazaarConfig) -> Result<()> {
    let pool = connect(config).await?;
    let dao = CountryRepo::new(&pool);

    match args.command {
        CountryCommands::List => print_json(&dao.all_entities().await?),
        CountryCommands::Get { id } => print_json(&dao.get_by_id(id).await?),
        CountryCommands::Find { name } => print_json(&dao.get_by_name(&name).await?),
        CountryCommands::Add { name, currencies } => {
            let country = Country::new(0, name).with_currencies(
                currencies.into_iter().map(|c| Currency::new(0, c)).collect(),
            );
            dao.save_ignore_id(&country).await?;
            print_json(&dao.get_by_name(&country.name).await?)
        }
        CountryCommands::Import { file } => {
            let countries = read_countries(&file)?;
            for country in &countries {
                dao.save(country)
                    .await
                    .with_context(|| format!("Failed to import country '{}'", country.name))?;
            }
            eprintln!("Imported {} countries", countries.len());
            Ok(())
        }
        CountryCommands::Update {
            id,
            name,
            currency_ids,
        } => {
            let country = Country::new(id, name).with_currencies(
                currency_ids
                    .into_iter()
                    .map(|cid| Currency::new(cid, String::new()))
                    .collect(),
            );
            dao.update(id, &country).await?;
            print_json(&dao.get_by_id(id).await?)
        }
        CountryCommands::Delete { id } => Ok(dao.delete(id).await?),
        CountryCommands::DeleteByName { name } => Ok(dao.delete_by_name(&name).await?),
    }
}

fn read_countries(path: &Path) -> Result<Vec<Country>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).context("Expected a JSON array of countries")
}
