//! Service configuration management
//!
//! Layers, lowest precedence first: built-in defaults (already reflecting
//! `NHL_*` and `DATABASE_URL`), an optional TOML file, then `POOL__*`
//! environment variables using `__` as the section separator, e.g.
//! `POOL__CACHE__PLAYER_WINDOW_SECS=30`.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use pool_store::StoreConfig;
use stats_cache::CacheTtlConfig;
use stats_provider::StatsProviderConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub stats: StatsProviderConfig,
    pub cache: CacheTtlConfig,
    pub store: StoreConfig,
    pub service: ServiceSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    pub store_backend: StoreBackend,

    /// Rows shown by `top-scorers` when no limit is given
    pub top_scorers_limit: u32,

    /// Maximum rows returned by a player search
    pub search_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { store_backend: StoreBackend::Postgres, top_scorers_limit: 10, search_limit: 20 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl ServiceConfig {
    /// Defaults with the per-crate environment overrides applied
    pub fn from_env_defaults() -> Self {
        Self {
            stats: StatsProviderConfig::from_env(),
            store: StoreConfig::from_env(),
            ..Default::default()
        }
    }
}

/// Load configuration from defaults, an optional file and the environment
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let defaults = Config::try_from(&ServiceConfig::from_env_defaults())
        .context("Failed to serialize default configuration")?;

    let mut builder = Config::builder().add_source(defaults);

    if let Some(path) = path {
        tracing::debug!("Loading configuration from file: {:?}", path);
        builder = builder.add_source(File::from(path).required(true));
    }

    let config: ServiceConfig = builder
        .add_source(Environment::with_prefix("POOL").separator("__").try_parsing(true))
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        bail!("Invalid log level: {}", config.logging.level);
    }

    let valid_formats = ["json", "pretty", "compact"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        bail!("Invalid log format: {}", config.logging.format);
    }

    if config.service.search_limit == 0 || config.service.top_scorers_limit == 0 {
        bail!("Result limits must be greater than 0");
    }

    config.stats.validate().map_err(anyhow::Error::msg).context("Invalid stats configuration")?;
    config.cache.validate().map_err(anyhow::Error::msg).context("Invalid cache configuration")?;

    if config.service.store_backend == StoreBackend::Postgres {
        config.store.validate().map_err(anyhow::Error::msg).context("Invalid store configuration")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[cache]
player_window_secs = 30

[service]
store_backend = "memory"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.cache.player_window_secs, 30);
        assert_eq!(config.cache.roster_secs, 86400);
        assert_eq!(config.service.store_backend, StoreBackend::Memory);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.stats.game_type_id, 2);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = ServiceConfig::default();
        config.logging.level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = ServiceConfig::default();
        config.cache.player_window_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/pool.toml"))).is_err());
    }
}
