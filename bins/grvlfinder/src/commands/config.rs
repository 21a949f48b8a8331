//! `config`: show or create the configuration file

use crate::context::{print_json, Context};
use anyhow::{bail, Context as _, Result};
use clap::Subcommand;
use grvlfinder_cli::output::Status;
use grvlfinder_core::config::{default_path, Config};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write a configuration file with default values
    Init {
        /// Target file (user config directory when omitted)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(ctx: &Context, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            if ctx.is_json() {
                return print_json(&ctx.config.schema);
            }
            match &ctx.config.path {
                Some(path) => Status::info(&format!("Loaded from {}", path.display())),
                None => Status::info("No configuration file found, showing defaults"),
            }
            println!();
            println!("{}", toml::to_string_pretty(&ctx.config.schema)?.dimmed());
        }
        ConfigCommand::Init { path, force } => {
            let Some(target) = path.or_else(default_path) else {
                bail!("Could not determine a configuration directory; pass --path");
            };
            if target.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", target.display());
            }
            let mut config = Config::default();
            config
                .save_to(&target)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            Status::success(&format!("Created {}", target.display()));
        }
    }
    Ok(())
}
