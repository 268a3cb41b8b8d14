//! Runtime Bootstrap
//!
//! Composition root: turns an [`AppConfig`] and a document into a ready
//! [`Runtime`] with the configured module loader.
//!
//! ```text
//! AppConfig → RuntimeSettings ─┐
//!          → ModuleLoader ─────┼→ Runtime → Dispatcher / EventBootstrap
//! Document ────────────────────┘
//! ```

use crate::config::{AppConfig, ModulesConfig};
use crate::constants::REGISTRY_LOADER;
use crate::document::MemoryDocument;
use crate::modules::RegistryModuleLoader;
use rsm_application::{DEFAULT_BUS_CAPACITY, EventBootstrap, ModuleLoader, Runtime};
use rsm_domain::DocumentTree;
use rsm_domain::error::{Error, Result};
use std::sync::Arc;
use tracing::info;

/// Module loader named by the configuration
pub fn create_loader(config: &ModulesConfig) -> Result<Arc<dyn ModuleLoader>> {
    match config.loader.as_str() {
        REGISTRY_LOADER => Ok(Arc::new(RegistryModuleLoader::new())),
        other => Err(Error::config(format!(
            "Unknown module loader '{other}'. Available: {REGISTRY_LOADER}"
        ))),
    }
}

/// Runtime over `document` with the configured loader
pub fn init_runtime(config: &AppConfig, document: Arc<dyn DocumentTree>) -> Result<Arc<Runtime>> {
    let loader = create_loader(&config.modules)?;
    init_runtime_with_loader(config, document, loader)
}

/// Runtime over `document` with an explicit loader
pub fn init_runtime_with_loader(
    config: &AppConfig,
    document: Arc<dyn DocumentTree>,
    loader: Arc<dyn ModuleLoader>,
) -> Result<Arc<Runtime>> {
    let settings = config.runtime.to_settings()?;
    Ok(Runtime::with_module_capacity(
        document,
        loader,
        settings,
        config.modules.max_cached,
    ))
}

/// Application context: configuration, document and runtime
pub struct AppContext {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// The document being served
    pub document: Arc<MemoryDocument>,
    /// Resolution runtime over the document
    pub runtime: Arc<Runtime>,
}

impl AppContext {
    /// Document-level event listener over this context's runtime
    pub fn event_bootstrap(&self) -> EventBootstrap {
        EventBootstrap::new(self.runtime.dispatcher(), DEFAULT_BUS_CAPACITY)
    }
}

/// Build the application context
pub fn init_app(config: AppConfig, document: Arc<MemoryDocument>) -> Result<AppContext> {
    let runtime = init_runtime(&config, Arc::clone(&document) as Arc<dyn DocumentTree>)?;
    info!(
        loader = runtime.symbols().loader_name(),
        nodes = document.len(),
        "Application context ready"
    );
    Ok(AppContext {
        config: Arc::new(config),
        document,
        runtime,
    })
}
