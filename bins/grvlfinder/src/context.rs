//! Shared state for commands: loaded config, output format and service handles

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use grvlfinder_analysis::RoadFinder;
use grvlfinder_api_client::{ClientConfig, GrvlClient};
use grvlfinder_core::cache::{Cache, CacheConfig};
use grvlfinder_core::config::Config;
use grvlfinder_scoring::BikeProfile;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored text
    #[default]
    Text,
    /// Pretty-printed JSON on stdout
    Json,
}

/// Everything a command needs
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
}

impl Context {
    /// Load config from `path` or the standard locations
    pub fn load(path: Option<&Path>, format: OutputFormat) -> Result<Self> {
        let config = Config::load(path).context("Failed to load configuration")?;
        Ok(Self { config, format })
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Rider profile from the `[profile]` section
    pub fn profile(&self) -> Result<BikeProfile> {
        BikeProfile::from_config(&self.config.schema.profile)
            .context("Invalid [profile] section in configuration")
    }

    /// HTTP client configured from `[services]`
    pub fn client(&self) -> Result<GrvlClient> {
        let config = ClientConfig::from_services(&self.config.schema.services);
        GrvlClient::with_config(config).context("Failed to create HTTP client")
    }

    /// Response cache, `None` when disabled
    pub fn cache(&self) -> Result<Option<Arc<Cache>>> {
        let settings = &self.config.schema.cache;
        if !settings.enabled {
            return Ok(None);
        }
        let cache = Cache::new(CacheConfig::from_settings(settings)).context("Failed to open cache")?;
        Ok(Some(Arc::new(cache)))
    }

    /// Road finder for `profile`, cached when the cache is enabled
    pub fn road_finder(&self, client: &GrvlClient, profile: BikeProfile) -> Result<RoadFinder> {
        let finder = RoadFinder::new(client, profile);
        Ok(match self.cache()? {
            Some(cache) => finder.with_cache(cache),
            None => finder,
        })
    }

    /// Persist the profile and report where it went
    pub fn save_profile(&mut self, profile: &BikeProfile) -> Result<()> {
        profile.to_config(&mut self.config.schema.profile);
        let path = self.config.save().context("Failed to save configuration")?;
        tracing::info!(path = %path.display(), "Profile saved");
        Ok(())
    }
}

/// Print `value` as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
