//! Static module loader
//!
//! Serves modules registered at runtime from memory. Counts loads per URL and
//! can simulate latency and failing URLs, which makes import behavior
//! observable in tests.

use crate::constants::STATIC_LOADER;
use async_trait::async_trait;
use dashmap::DashMap;
use rsm_application::{EVENTS_MODULE_URL, Module, ModuleLoader, events_module};
use rsm_domain::error::{Error, Result};
use std::time::Duration;
use url::Url;

/// In-memory module loader
#[derive(Default)]
pub struct StaticModuleLoader {
    modules: DashMap<String, Module>,
    failures: DashMap<String, String>,
    loads: DashMap<String, usize>,
    latency: Option<Duration>,
}

impl StaticModuleLoader {
    /// Empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that already serves the builtin events module
    pub fn with_builtins() -> Self {
        Self::new().with_module(EVENTS_MODULE_URL, events_module())
    }

    /// Serve `module` at `url`
    ///
    /// `url` is normalized through URL parsing, so `file:///app/./a.js` and
    /// `file:///app/a.js` name the same module.
    pub fn with_module(self, url: &str, module: Module) -> Self {
        self.modules.insert(normalize(url), module);
        self
    }

    /// Fail every load of `url` with `message`
    pub fn with_failure<S: Into<String>>(self, url: &str, message: S) -> Self {
        self.failures.insert(normalize(url), message.into());
        self
    }

    /// Delay every load by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of loads requested for `url`
    pub fn load_count(&self, url: &str) -> usize {
        self.loads.get(&normalize(url)).map_or(0, |count| *count)
    }

    /// Total number of loads requested
    pub fn total_loads(&self) -> usize {
        self.loads.iter().map(|count| *count.value()).sum()
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), String::from)
}

#[async_trait]
impl ModuleLoader for StaticModuleLoader {
    fn loader_name(&self) -> &str {
        STATIC_LOADER
    }

    async fn load(&self, url: &Url) -> Result<Module> {
        *self.loads.entry(url.as_str().to_string()).or_insert(0) += 1;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(message) = self.failures.get(url.as_str()) {
            return Err(Error::module_load(url.as_str(), message.value().clone()));
        }
        self.modules
            .get(url.as_str())
            .map(|module| module.value().clone())
            .ok_or_else(|| Error::module_load(url.as_str(), "no such module"))
    }
}
