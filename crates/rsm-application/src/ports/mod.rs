//! Application ports
//!
//! Interfaces between the resolution core and the code it loads:
//!
//! - [`symbols`] - modules, exports, handlers, entity types and the module loader
//! - [`injector`] - resolution contexts and the values flowing through them

pub mod injector;
pub mod symbols;

pub use injector::{Injected, Injector, Provided};
pub use symbols::{EntityType, Export, Handler, Instance, Module, ModuleLoader, ResolvedSymbol};
