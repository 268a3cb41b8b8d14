//! Configuration
//!
//! TOML configuration merged with environment overrides through figment.

pub mod loader;
pub mod types;

pub use loader::{ConfigLoader, validate_app_config};
pub use types::{AppConfig, BoundaryKind, LoggingConfig, ModulesConfig, RuntimeConfig, ScopeConfig};
