//! gh-pages-multi - publish several versions of a static site from one git branch.

mod cli;
mod config;
mod deploy;
mod embed;
mod logger;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    match &cli.command {
        Commands::Deploy { args } => cli::deploy::deploy_site(cli.config.as_deref(), args),
        Commands::BetterTarget { target } => {
            cli::deploy::print_better_target(target);
            Ok(())
        }
    }
}
