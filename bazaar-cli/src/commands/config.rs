//! Config file management
//!
//! Command: config

use std::path::Path;

use anyhow::{anyhow, Result};
use bazaar_core::BazaarConfig;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with default values
    Init(InitArgs),
    /// Print the effective configuration (file + environment)
    Show,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs, path: &Path, effective: &BazaarConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args, path),
        ConfigCommands::Show => {
            print!("{}", toml::to_string_pretty(effective)?);
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn run_init(args: InitArgs, path: &Path) -> Result<()> {
    if path.exists() && !args.force {
        return Err(anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            path
        ));
    }

    BazaarConfig::default().save_to(path)?;

    eprintln!("Created config at: {:?}", path);
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit the config: $EDITOR {:?}", path);
    eprintln!("  2. Run: bazaarctl migrate");

    Ok(())
}
