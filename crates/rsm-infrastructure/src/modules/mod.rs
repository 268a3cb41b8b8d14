//! Module loaders
//!
//! - [`registry`] - linkme registry of compiled-in modules and its loader
//! - [`static_loader`] - in-memory loader with load accounting
//! - `builtin` - registration of the builtin events module

mod builtin;
pub mod registry;
pub mod static_loader;

pub use registry::{MODULES, ModuleEntry, RegistryModuleLoader, find_module, list_modules};
pub use static_loader::StaticModuleLoader;
