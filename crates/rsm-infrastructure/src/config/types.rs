//! Configuration types

use crate::constants::{DEFAULT_LOG_LEVEL, REGISTRY_LOADER};
use rsm_application::{RuntimeSettings, ScopeBoundary};
use rsm_domain::constants::{
    DEFAULT_BASE_ATTRIBUTE, DEFAULT_BASE_URI, DEFAULT_EVENT_PREFIX, DEFAULT_FACTORY_PREFIX,
    DEFAULT_HOST_ATTRIBUTE,
};
use rsm_domain::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Resolution and attribute naming
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Module loading
    #[serde(default)]
    pub modules: ModulesConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which ancestors open a new resolution scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// Nodes carrying the marker attribute
    #[default]
    Marker,
    /// Every element
    Element,
}

/// Scope boundary configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Boundary rule
    pub boundary: BoundaryKind,
    /// Marker attribute for the `marker` rule
    pub marker_attribute: String,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            boundary: BoundaryKind::Marker,
            marker_attribute: DEFAULT_HOST_ATTRIBUTE.to_string(),
        }
    }
}

/// Resolution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Document default base URI
    pub base_uri: String,
    /// Prefix of event listener attributes
    pub event_prefix: String,
    /// Prefix of factory attributes
    pub factory_prefix: String,
    /// Attribute overriding the base URI for a subtree
    pub base_attribute: String,
    /// Scope boundary rule
    pub scope: ScopeConfig,
    /// Protocol aliases (`ui = "https://cdn.example/app/"`)
    pub protocols: BTreeMap<String, String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_string(),
            event_prefix: DEFAULT_EVENT_PREFIX.to_string(),
            factory_prefix: DEFAULT_FACTORY_PREFIX.to_string(),
            base_attribute: DEFAULT_BASE_ATTRIBUTE.to_string(),
            scope: ScopeConfig::default(),
            protocols: BTreeMap::new(),
        }
    }
}

impl RuntimeConfig {
    /// Convert to the settings used by the runtime
    pub fn to_settings(&self) -> Result<RuntimeSettings> {
        let boundary = match self.scope.boundary {
            BoundaryKind::Marker => ScopeBoundary::Marker(self.scope.marker_attribute.clone()),
            BoundaryKind::Element => ScopeBoundary::Element,
        };
        let mut settings = RuntimeSettings::default()
            .with_base_uri(&self.base_uri)?
            .with_boundary(boundary);
        settings.event_prefix = self.event_prefix.clone();
        settings.factory_prefix = self.factory_prefix.clone();
        settings.base_attribute = self.base_attribute.clone();
        for (alias, base) in &self.protocols {
            settings = settings.with_protocol(alias, base)?;
        }
        Ok(settings)
    }
}

/// Module loading configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Loader name
    pub loader: String,
    /// Maximum number of resolved modules kept in memory (unbounded when absent)
    pub max_cached: Option<u64>,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            loader: REGISTRY_LOADER.to_string(),
            max_cached: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON output format
    pub json_format: bool,
    /// Log to a daily rolling file in addition to stderr
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
        }
    }
}
