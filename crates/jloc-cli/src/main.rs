//! jloc - inspect and watch JSON string tables

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jloc_cli::{logging_config, manager_options, render_table};
use jloc_config::{Config, ConfigLoader};
use jloc_i18n::{Culture, ResourceManager};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overriding the configuration file
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a single string
    Get {
        /// String key
        name: String,

        /// Culture to look up, defaults to the configured default culture
        #[arg(short = 'C', long)]
        culture: Option<String>,

        /// Only consult the exact culture's table
        #[arg(long)]
        no_fallback: bool,
    },

    /// Print every string visible for a culture as JSON
    Dump {
        /// Culture to dump, defaults to the configured default culture
        #[arg(short = 'C', long)]
        culture: Option<String>,

        /// Leave out strings inherited from parent cultures
        #[arg(long)]
        no_fallback: bool,
    },

    /// Keep tables loaded for a culture and log reloads until interrupted
    Watch {
        /// Culture whose tables to preload
        #[arg(short = 'C', long)]
        culture: Option<String>,
    },
}

fn parse_culture(culture: Option<&str>) -> Result<Culture> {
    match culture {
        Some(name) => Culture::new(name).with_context(|| format!("invalid culture '{}'", name)),
        None => Ok(Culture::invariant()),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;

    if let Err(e) = jloc_common::init_logging(logging_config(&config.logging, args.log_level.as_deref())) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Configuration loaded successfully");

    let manager = ResourceManager::new(manager_options(&config.localization)?)
        .context("failed to create resource manager")?;

    match args.command {
        Command::Get {
            name,
            culture,
            no_fallback,
        } => {
            let culture = parse_culture(culture.as_deref())?;
            match manager.get_string(&name, &culture, !no_fallback)? {
                Some(value) => println!("{}", value),
                None => warn!("'{}' not found", name),
            }
        }
        Command::Dump { culture, no_fallback } => {
            let culture = parse_culture(culture.as_deref())?;
            match manager.get_resource_set(&culture, !no_fallback)? {
                Some(entries) => println!("{}", render_table(entries)?),
                None => warn!("No table for culture '{}'", culture),
            }
        }
        Command::Watch { culture } => {
            let culture = parse_culture(culture.as_deref())?;
            if !manager.is_watching() {
                anyhow::bail!("watching is disabled in the configuration");
            }

            manager.get_resource_set(&culture, true)?;
            info!(
                "Watching {} with {} table(s) loaded, press Ctrl+C to stop",
                manager.resources_path().display(),
                manager.loaded_keys().len()
            );

            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {:?}", e);
            }
            info!("Received shutdown signal");
        }
    }

    let written = manager.flush();
    if written > 0 {
        info!("Wrote {} pending table(s)", written);
    }

    Ok(())
}
