//! Application Layer - Resumable Runtime
//!
//! The resolution core of the resumable runtime: lazy symbol resolution,
//! node-scoped dependency injection with a per-node instance cache, provider
//! composition and event dispatch over a document tree.
//!
//! ## Architecture
//!
//! - [`runtime::Runtime`] holds the shared state of one document
//! - [`injector`] contains the element-scoped and event-scoped resolution
//!   contexts
//! - [`resolver`] turns QRLs into module exports through a `ModuleLoader`
//! - [`instances`] keeps at most one instance per (node, key)
//! - [`inject`] and [`providers`] compose handlers from providers
//! - [`dispatch`] and [`listeners`] route events to the nearest listener
//!
//! ## Ports (Interfaces)
//!
//! - `ports::symbols::*`: modules, exports, handlers, entity types, loaders
//! - `ports::injector::*`: resolution contexts and injected values
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `rsm-domain`: QRLs, composite keys, events, the document port
//! - Pure Rust libraries for async, caching and concurrency

pub mod attributes;
pub mod dispatch;
pub mod inject;
pub mod injector;
pub mod instances;
pub mod listeners;
pub mod ports;
pub mod providers;
pub mod resolver;
pub mod runtime;
pub mod settings;

pub use attributes::AttributeStore;
pub use dispatch::{
    DispatchOutcome, Dispatcher, EMIT_EVENT_EXPORT, EVENTS_MODULE_URL, EmitEventHandler,
    events_module,
};
pub use inject::{ConcreteType, Injectable, Provider, ProviderFn, inject};
pub use injector::{ElementInjector, EventInjector};
pub use instances::{CachedInstance, InstanceCaches, NodeCache, TypeRegistry};
pub use listeners::{DEFAULT_BUS_CAPACITY, DispatchReport, EventBootstrap};
pub use ports::{
    EntityType, Export, Handler, Injected, Injector, Instance, Module, ModuleLoader, Provided,
    ResolvedSymbol,
};
pub use resolver::SymbolResolver;
pub use runtime::Runtime;
pub use settings::{RuntimeSettings, ScopeBoundary};
