//! Module Registry
//!
//! Compile-time registration of loadable modules. A crate contributes a module
//! by adding an entry to [`MODULES`]:
//!
//! ```rust,ignore
//! #[linkme::distributed_slice(MODULES)]
//! static TODO_MODULE: ModuleEntry = ModuleEntry {
//!     url: "app:/todo",
//!     description: "Todo list handlers",
//!     build: todo_module,
//! };
//! ```
//!
//! The registry loader builds a module from its entry when the resolver first
//! imports the module URL.

use crate::constants::REGISTRY_LOADER;
use async_trait::async_trait;
use rsm_application::{Module, ModuleLoader};
use rsm_domain::error::{Error, Result};
use tracing::debug;
use url::Url;

/// Registry entry of a loadable module
pub struct ModuleEntry {
    /// Canonical module URL (`builtin:/events`)
    pub url: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Builds the module's exports
    pub build: fn() -> Module,
}

#[linkme::distributed_slice]
pub static MODULES: [ModuleEntry] = [..];

/// Registered modules as `(url, description)`, sorted by URL
pub fn list_modules() -> Vec<(&'static str, &'static str)> {
    let mut modules: Vec<_> = MODULES
        .iter()
        .map(|entry| (entry.url, entry.description))
        .collect();
    modules.sort_unstable();
    modules
}

/// Registry entry for a module URL
pub fn find_module(url: &str) -> Option<&'static ModuleEntry> {
    MODULES.iter().find(|entry| entry.url == url)
}

/// Loader serving modules from the compile-time registry
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryModuleLoader;

impl RegistryModuleLoader {
    /// Create a registry loader
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModuleLoader for RegistryModuleLoader {
    fn loader_name(&self) -> &str {
        REGISTRY_LOADER
    }

    async fn load(&self, url: &Url) -> Result<Module> {
        let entry = find_module(url.as_str()).ok_or_else(|| {
            let available: Vec<&str> = list_modules().into_iter().map(|(url, _)| url).collect();
            Error::module_load(
                url.as_str(),
                format!("no registered module. Available: {}", available.join(", ")),
            )
        })?;
        debug!(url = entry.url, "Building registered module");
        Ok((entry.build)())
    }
}
