//! `cache`: inspect and prune cached Overpass responses

use crate::context::{print_json, Context};
use anyhow::{Context as _, Result};
use clap::Subcommand;
use grvlfinder_cli::output::{format_count, format_size, Status};
use grvlfinder_core::cache::{Cache, CacheConfig};

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show entry counts and size
    Stats,
    /// Remove every entry
    Clear,
    /// Remove expired entries
    Cleanup,
}

pub fn run(ctx: &Context, command: &CacheCommand) -> Result<()> {
    let cache = Cache::new(CacheConfig::from_settings(&ctx.config.schema.cache))
        .context("Failed to open cache")?;

    match command {
        CacheCommand::Stats => {
            let stats = cache.stats()?;
            if ctx.is_json() {
                return print_json(&stats);
            }
            Status::header("Cache");
            println!("  Directory: {}", stats.cache_dir.display());
            println!("  Entries:   {} ({} expired)", stats.total_entries, stats.expired_entries);
            println!("  Size:      {}", format_size(stats.total_size_bytes));
            if !ctx.config.schema.cache.enabled {
                Status::info("Caching is disabled in the configuration");
            }
        }
        CacheCommand::Clear => {
            let removed = cache.clear()?;
            report(ctx, "clear", removed)?;
        }
        CacheCommand::Cleanup => {
            let removed = cache.cleanup()?;
            report(ctx, "cleanup", removed)?;
        }
    }
    Ok(())
}

fn report(ctx: &Context, action: &str, removed: usize) -> Result<()> {
    if ctx.is_json() {
        return print_json(&serde_json::json!({ "action": action, "removed": removed }));
    }
    Status::success(&format!("Removed {}", format_count(removed, "entry", "entries")));
    Ok(())
}
