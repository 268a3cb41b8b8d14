//! # Infrastructure Layer
//!
//! Technical concerns around the resolution core.
//!
//! ## Module Categories
//!
//! ### Configuration & Bootstrap
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | TOML configuration with environment overrides |
//! | [`bootstrap`] | Composition root building the runtime |
//! | [`constants`] | Infrastructure constants |
//!
//! ### Documents & Modules
//! | Module | Description |
//! |--------|-------------|
//! | [`document`] | In-memory document tree and JSON fixtures |
//! | [`modules`] | linkme module registry, registry and static loaders |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod document;
pub mod error_ext;
pub mod logging;
pub mod modules;

pub use bootstrap::{AppContext, create_loader, init_app, init_runtime, init_runtime_with_loader};
pub use config::{AppConfig, ConfigLoader};
pub use document::{MemoryDocument, NodeSpec};
pub use error_ext::ErrorContext;
pub use modules::{ModuleEntry, RegistryModuleLoader, StaticModuleLoader, list_modules};
