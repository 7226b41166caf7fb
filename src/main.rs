//! Mdsite - a minimal markdown static site generator.

mod blog;
mod build;
mod cli;
mod config;
mod content;
mod logger;
mod render;
mod serve;
mod utils;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use serve::serve_site;
use std::path::Path;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Commands::Build => build_site(config),
        Commands::Serve { .. } => {
            build_site(config)?;
            serve_site(config)
        }
    }
}

/// Load configuration from CLI arguments, falling back to defaults when no
/// config file is present (a bare content directory is a valid site).
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        log!("config"; "{} not found, using defaults", cli.config.display());
        SiteConfig::default()
    };
    config.update_with_cli(cli);

    Ok(config)
}
