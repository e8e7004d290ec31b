//! Configuration loader.
//!
//! Environment-aware YAML loading: a base `fintx.yaml` is deep-merged with an
//! optional `fintx.<environment>.yaml` overlay, then secret overrides are
//! applied from the process environment (`DATABASE_URL`). The merged result
//! is validated before any component sees it.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::Value as YamlValue;
use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::FinTxConfig;

const BASE_FILE: &str = "fintx.yaml";

/// Loaded configuration plus the context it was loaded in.
pub struct ConfigManager {
    config: FinTxConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection from the default
    /// `config/` directory.
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory.
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration with an explicit environment. Useful for tests that
    /// must not touch global environment variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        // An explicitly requested directory must exist; only the implicit
        // default may fall back to built-in configuration.
        let config_directory = match config_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(ConfigurationError::FileNotFound {
                        path: dir.display().to_string(),
                    });
                }
                dir
            }
            None => PathBuf::from("config"),
        };

        debug!(
            environment,
            directory = %config_directory.display(),
            "loading configuration"
        );

        let mut config = Self::load_and_merge(&config_directory, environment)?;

        // Secret override: never stored in YAML.
        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                config.database.url = Some(url);
            }
        }

        config.validate()?;

        info!(
            environment,
            database_host = %config.database.host,
            poll_interval_seconds = config.monitor.poll_interval_seconds,
            "configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    pub fn config(&self) -> &FinTxConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    fn detect_environment() -> String {
        env::var("FINTX_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    /// Read the base file (defaults when absent) and deep-merge the optional
    /// environment overlay on top.
    fn load_and_merge(directory: &Path, environment: &str) -> ConfigResult<FinTxConfig> {
        let base_path = directory.join(BASE_FILE);
        let mut merged = if base_path.exists() {
            Self::read_yaml(&base_path)?
        } else {
            debug!(path = %base_path.display(), "base configuration missing, using defaults");
            serde_yaml::to_value(FinTxConfig::default()).map_err(|e| {
                ConfigurationError::ParseError {
                    path: base_path.display().to_string(),
                    message: e.to_string(),
                }
            })?
        };

        let overlay_path = directory.join(format!("fintx.{environment}.yaml"));
        if overlay_path.exists() {
            let overlay = Self::read_yaml(&overlay_path)?;
            Self::deep_merge(&mut merged, overlay);
        }

        serde_yaml::from_value(merged).map_err(|e| ConfigurationError::ParseError {
            path: base_path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn read_yaml(path: &Path) -> ConfigResult<YamlValue> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigurationError::ReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigurationError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Mapping keys in `overlay` replace or recursively merge into `base`.
    fn deep_merge(base: &mut YamlValue, overlay: YamlValue) {
        match (base, overlay) {
            (YamlValue::Mapping(base_map), YamlValue::Mapping(overlay_map)) => {
                for (key, value) in overlay_map {
                    match base_map.get_mut(&key) {
                        Some(existing) => Self::deep_merge(existing, value),
                        None => {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
            (slot, value) => *slot = value,
        }
    }
}
