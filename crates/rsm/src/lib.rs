//! # Resumable Runtime
//!
//! Lazy symbol resolution and node-scoped dependency injection over a
//! document tree.
//!
//! Handlers and types are referenced by serializable QRL strings stored in
//! node attributes. Nothing is loaded until an event reaches a listener; the
//! runtime then imports the listener's module, walks the resolution contexts
//! of the node's ancestors to find or materialize the instances the handler
//! needs, and invokes it.
//!
//! ## Example
//!
//! ```ignore
//! use rsm::infrastructure::{AppConfig, MemoryDocument, init_app};
//! use rsm::domain::Event;
//! use std::sync::Arc;
//!
//! let document = Arc::new(MemoryDocument::from_json(page)?);
//! let app = init_app(AppConfig::default(), Arc::clone(&document))?;
//! let button = document.find_by_id("inc").unwrap();
//! let outcome = app.runtime.dispatcher().dispatch(Event::new("click", button)).await?;
//! app.runtime.serialize()?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - QRLs, composite keys, events, the document port and errors
//! - `application` - resolver, injectors, instance caches, `inject`, dispatch
//! - `infrastructure` - configuration, logging, in-memory document, module registry
//! - [`demo`] - the compiled-in `demo:/counter` module
//! - [`commands`] - implementation of the `rsm` command line

pub mod commands;
pub mod demo;

/// Domain layer - value objects, ports and errors
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use rsm_domain::*;
}

/// Application layer - the resolution core
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use rsm_application::*;
}

/// Infrastructure layer - config, logging, documents and module loaders
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use rsm_infrastructure::*;
}

// Commonly used types at the crate root
pub use domain::{CompositeKey, Error, Event, NodeId, Qrl, Result};
pub use application::{Dispatcher, EventBootstrap, Injector, Module, Runtime, inject};
pub use infrastructure::{AppConfig, AppContext, ConfigLoader, MemoryDocument, init_app};
