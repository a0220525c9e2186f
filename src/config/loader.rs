//! Configuration Loader
//!
//! Environment-aware settings loading on top of the `config` crate. Handles
//! file discovery, environment detection and override merging.

use super::GuardSettings;
use crate::error::Result;
use crate::logging::log_error;
use config::{Config, Environment, File};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`GuardSettings`] from files and environment variables
pub struct ConfigLoader;

impl ConfigLoader {
    /// Base settings file name
    pub const BASE_FILE: &'static str = "circuit-guard.toml";

    /// Prefix of environment variables, e.g. `CIRCUIT_GUARD__DEFAULT__COOLDOWN_MS`
    pub const ENV_PREFIX: &'static str = "CIRCUIT_GUARD";

    /// Load settings with environment auto-detection from `./config`
    pub fn load() -> Result<GuardSettings> {
        Self::load_from_directory(None)
    }

    /// Load settings from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> Result<GuardSettings> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load settings from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> Result<GuardSettings> {
        Self::load_with_overrides(config_dir, environment, None)
    }

    /// Like [`load_from_directory_with_env`](Self::load_from_directory_with_env)
    /// but reads variables from `env_overrides` instead of the process environment
    pub fn load_with_overrides(
        config_dir: Option<PathBuf>,
        environment: &str,
        env_overrides: Option<HashMap<String, String>>,
    ) -> Result<GuardSettings> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            environment = %environment,
            directory = %config_directory.display(),
            "Loading circuit guard configuration"
        );

        let settings: GuardSettings = Config::builder()
            .add_source(File::from(config_directory.join(Self::BASE_FILE)).required(false))
            .add_source(
                File::from(Self::environment_file(&config_directory, environment)).required(false),
            )
            .add_source(
                Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env_overrides),
            )
            .build()?
            .try_deserialize()?;

        if let Err(err) = settings.validate() {
            log_error(
                "config_loader",
                "validate",
                &err.to_string(),
                Some(environment),
            );
            return Err(err);
        }

        debug!(
            default_threshold = settings.default.failure_threshold,
            default_cooldown_ms = settings.default.cooldown_ms,
            components = settings.components.len(),
            "Configuration loaded successfully"
        );

        Ok(settings)
    }

    /// Detect current environment
    pub fn detect_environment() -> String {
        crate::logging::get_environment()
    }

    fn default_config_directory() -> PathBuf {
        PathBuf::from("config")
    }

    fn environment_file(config_directory: &Path, environment: &str) -> PathBuf {
        config_directory.join(format!("circuit-guard.{environment}.toml"))
    }
}
