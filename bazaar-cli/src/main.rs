//! bazaarctl - marketplace data tooling
//!
//! Thin command-line front end over the bazaar DAOs:
//! - Schema setup (`migrate` subcommand)
//! - Country CRUD and lookups by name (`country` subcommand)
//! - Item CRUD and similar-name search (`item` subcommand)
//! - Config file management (`config` subcommand)
//!
//! Results are printed as JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::Result;
use bazaar_core::BazaarConfig;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "bazaarctl",
    author,
    version,
    about = "Inspect and edit classifieds marketplace data",
    long_about = "Run the marketplace schema migrations and read or write countries and items \
                  through the same data access objects the application uses."
)]
struct Cli {
    /// Config file (default: ~/.bazaar/config.toml)
    #[arg(long, global = true, env = "BAZAAR_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the marketplace tables (idempotent)
    Migrate(commands::migrate::MigrateArgs),
    /// Country operations (list, get, find, add, import, update, delete)
    Country(commands::country::CountryArgs),
    /// Item operations (list, get, search, add, import, update, delete)
    Item(commands::item::ItemArgs),
    /// Manage bazaarctl configuration (init, show, path)
    Config(commands::config::ConfigArgs),
}

fn load_config(path: Option<&PathBuf>) -> Result<BazaarConfig> {
    match path {
        Some(path) => BazaarConfig::load_from(path),
        None => BazaarConfig::load(),
    }
}

fn tolerates_bad_config(command: &Commands) -> bool {
    use commands::config::ConfigCommands;

    match command {
        Commands::Config(args) => matches!(args.command, ConfigCommands::Init(_) | ConfigCommands::Path),
        _ => false,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // `config init` and `config path` must work without a readable config
    let config = if tolerates_bad_config(&cli.command) {
        load_config(cli.config.as_ref()).unwrap_or_default()
    } else {
        load_config(cli.config.as_ref())?
    };

    if let Err(err) = tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        default_level: config.logging.level.clone(),
    }) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    match cli.command {
        Commands::Migrate(args) => commands::run_migrate(args, &config).await,
        Commands::Country(args) => commands::run_country(args, &config).await,
        Commands::Item(args) => commands::run_item(args, &config).await,
        Commands::Config(args) => {
            let path = cli.config.unwrap_or_else(BazaarConfig::config_path);
            commands::run_config(args, &path, &config)
        }
    }
}
