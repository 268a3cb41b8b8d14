//! Configuration loader
//!
//! Loads configuration from defaults, a TOML file and environment variables.

use crate::config::AppConfig;
use crate::constants::*;
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use rsm_domain::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration loader service
#[derive(Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (explicit path, or the first default location found)
    /// 3. Environment variables with prefix (e.g., `RSM__RUNTIME__BASE_URI`)
    ///
    /// An explicit path that does not exist is an error.
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        match &self.config_path {
            Some(config_path) if config_path.exists() => {
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            }
            Some(config_path) => {
                log_config_loaded(config_path, false);
                return Err(Error::config(format!(
                    "Configuration file not found: {}",
                    config_path.display()
                )));
            }
            None => {
                if let Some(default_path) = Self::find_default_config_path() {
                    figment = figment.merge(Toml::file(&default_path));
                    log_config_loaded(&default_path, true);
                }
            }
        }

        figment = figment.merge(
            Env::prefixed(&format!("{}{CONFIG_ENV_SEPARATOR}", self.env_prefix))
                .split(CONFIG_ENV_SEPARATOR),
        );

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;
        Ok(app_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;
        std::fs::write(path.as_ref(), toml_string).io_context("Failed to write config file")?;
        Ok(())
    }

    /// Get the configured file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// First existing default configuration file
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = vec![
            current_dir.join(DEFAULT_CONFIG_FILENAME),
            current_dir
                .join(format!(".{DEFAULT_CONFIG_DIR}"))
                .join(DEFAULT_CONFIG_FILENAME),
            dirs::config_dir()
                .map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME))
                .unwrap_or_default(),
        ];

        candidates
            .into_iter()
            .find(|path| !path.as_os_str().is_empty() && path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate application configuration
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_runtime_config(config)?;
    validate_modules_config(config)?;
    parse_log_level(&config.logging.level)?;
    Ok(())
}

fn validate_runtime_config(config: &AppConfig) -> Result<()> {
    let runtime = &config.runtime;
    Url::parse(&runtime.base_uri)
        .config_context(format!("Invalid base URI '{}'", runtime.base_uri))?;

    for (name, value) in [
        ("event_prefix", &runtime.event_prefix),
        ("factory_prefix", &runtime.factory_prefix),
        ("base_attribute", &runtime.base_attribute),
    ] {
        if value.is_empty() {
            return Err(Error::config(format!("runtime.{name} cannot be empty")));
        }
    }
    if runtime.scope.marker_attribute.is_empty() {
        return Err(Error::config("runtime.scope.marker_attribute cannot be empty"));
    }

    for (alias, base) in &runtime.protocols {
        if !is_scheme(alias) {
            return Err(Error::config(format!(
                "Protocol alias '{alias}' is not a valid URL scheme"
            )));
        }
        Url::parse(base).config_context(format!("Invalid base for protocol '{alias}'"))?;
    }
    Ok(())
}

fn validate_modules_config(config: &AppConfig) -> Result<()> {
    if config.modules.loader != REGISTRY_LOADER {
        return Err(Error::config(format!(
            "Unknown module loader '{}'. Available: {REGISTRY_LOADER}",
            config.modules.loader
        )));
    }
    if config.modules.max_cached == Some(0) {
        return Err(Error::config("modules.max_cached cannot be 0"));
    }
    Ok(())
}

fn is_scheme(alias: &str) -> bool {
    let mut chars = alias.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
