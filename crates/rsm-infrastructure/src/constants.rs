//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Wire-format constants are defined in `rsm_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "rsm.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "rsm";

/// Environment variable prefix for configuration (`RSM__RUNTIME__BASE_URI`)
pub const CONFIG_ENV_PREFIX: &str = "RSM";

/// Separator between the prefix and nested keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Environment variable overriding the configured log filter
pub const LOG_FILTER_ENV: &str = "RSM_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log file stem for the rolling appender
pub const DEFAULT_LOG_FILE_STEM: &str = "rsm";

// ============================================================================
// MODULE LOADING CONSTANTS
// ============================================================================

/// Loader backed by the compile-time module registry
pub const REGISTRY_LOADER: &str = "registry";

/// Loader name reported by the in-memory static loader
pub const STATIC_LOADER: &str = "static";
