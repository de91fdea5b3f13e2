//! Configuration Loader
//!
//! Layers a configuration file under environment-variable overrides using
//! the `config` crate, then validates the result.
//!
//! Environment overrides use the `TASKER_FLOW_` prefix and `__` between
//! nested keys, e.g. `TASKER_FLOW_BACKPRESSURE__DEFAULT_CAPACITY=250`.

use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::FlowControlConfig;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "TASKER_FLOW";

/// Loaded, validated flow-control configuration
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: FlowControlConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// Load from `path` (format chosen by extension) with environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Arc<ConfigManager>> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading flow control configuration");

        let builder = Config::builder()
            .add_source(File::from(path))
            .add_source(Self::environment());
        let config = Self::build(builder, &path.display().to_string())?;

        Ok(Arc::new(ConfigManager {
            config,
            source: Some(path.to_path_buf()),
        }))
    }

    /// Load from defaults and environment overrides only
    pub fn load_from_env() -> ConfigResult<Arc<ConfigManager>> {
        let builder = Config::builder().add_source(Self::environment());
        let config = Self::build(builder, "environment")?;

        Ok(Arc::new(ConfigManager {
            config,
            source: None,
        }))
    }

    /// Wrap an already constructed configuration after validating it
    pub fn from_config(config: FlowControlConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            source: None,
        }))
    }

    pub fn config(&self) -> &FlowControlConfig {
        &self.config
    }

    /// File the configuration was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        source_name: &str,
    ) -> ConfigResult<FlowControlConfig> {
        let raw = builder.build().map_err(|e| ConfigurationError::LoadError {
            source_name: source_name.to_string(),
            error: e.to_string(),
        })?;

        let config: FlowControlConfig =
            raw.try_deserialize()
                .map_err(|e| ConfigurationError::DeserializeError {
                    error: e.to_string(),
                })?;

        config.validate()?;

        info!(
            source = source_name,
            enabled = config.enabled,
            default_capacity = config.backpressure.default_capacity,
            poll_interval_ms = config.backpressure.poll_interval_ms,
            health_poll_period_ms = config.health_monitor.poll_period_ms,
            "Flow control configuration loaded"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_validates() {
        let mut config = FlowControlConfig::default();
        assert!(ConfigManager::from_config(config.clone()).is_ok());

        config.backpressure.poll_interval_ms = 0;
        assert!(ConfigManager::from_config(config).is_err());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let result = ConfigManager::load_from_file("/nonexistent/flow-control.toml");
        assert!(matches!(result, Err(ConfigurationError::LoadError { .. })));
    }
}
