//! Configuration file loading and saving

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed configuration
    pub schema: ConfigSchema,
    /// File the configuration was read from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or the first standard location found.
    ///
    /// An explicit path that does not exist is an error; no file at all yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = if let Some(ref p) = config_path {
            debug!(path = %p.display(), "Loading configuration");
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Write the configuration to `path` and remember it
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(&self.schema)?;
        std::fs::write(path, content)
            .map_err(Error::from)
            .context(format!("While writing {}", path.display()))?;
        debug!(path = %path.display(), "Configuration saved");
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Write the configuration back where it came from, or to the user config location
    pub fn save(&mut self) -> Result<PathBuf> {
        let target = match self.path.clone() {
            Some(p) => p,
            None => default_path()
                .ok_or_else(|| Error::config("Could not determine a configuration directory"))?,
        };
        self.save_to(&target)?;
        Ok(target)
    }
}

/// User-level configuration file location
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("grvlfinder").join("config.toml"))
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let local = [".grvlfinder.toml", "grvlfinder.toml"]
        .into_iter()
        .map(PathBuf::from);

    local
        .chain(default_path())
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}", path.display())).with_source(e)
    })?;

    let schema: ConfigSchema = toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("While parsing {}", path.display()))?;
    schema
        .validate()
        .context(format!("While checking {}", path.display()))
        .with_suggestion("Run `grvlfinder config show` to see the default values")?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.export.default_file_name, "route.gpx");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_save_and_reload_profile() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.schema.profile.bike_type = "race-road".to_string();
        config.schema.profile.custom_weights.insert("slope".into(), 7);
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.schema.profile.bike_type, "race-road");
        assert_eq!(loaded.schema.profile.custom_weights.get("slope"), Some(&7));
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_invalid_toml_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[profile\nbike_type = 3").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParse);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_out_of_range_value_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zero.toml");
        std::fs::write(&path, "[routing]\nmax_nodes = 0\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert!(err.suggestion.is_some());
    }
}
