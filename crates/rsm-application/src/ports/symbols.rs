//! Symbol Ports
//!
//! A QRL resolves to an export of a [`Module`]. Exports are either handlers
//! (functions invoked with a resolution context and positional arguments) or
//! entity types (the "classes" the runtime materializes into instances).
//!
//! Modules are produced by a [`ModuleLoader`], the host's module-loading
//! mechanism. The loader is the code-splitting boundary: whatever produced the
//! module's exports guarantees they are real, importable symbols.

use crate::ports::injector::{Injected, Injector, Provided};
use async_trait::async_trait;
use downcast_rs::{DowncastSync, impl_downcast};
use rsm_domain::error::{Error, Result};
use rsm_domain::{CompositeKey, Props};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

// ============================================================================
// Handlers and instances
// ============================================================================

/// Callable export
///
/// Closures of the shape `Fn(Arc<dyn Injector>, Vec<Injected>) -> Provided`
/// are handlers.
pub trait Handler: Send + Sync {
    /// Invoke the handler with a resolution context and positional arguments
    fn call(&self, ctx: Arc<dyn Injector>, args: Vec<Injected>) -> Provided;
}

impl<F> Handler for F
where
    F: Fn(Arc<dyn Injector>, Vec<Injected>) -> Provided + Send + Sync,
{
    fn call(&self, ctx: Arc<dyn Injector>, args: Vec<Injected>) -> Provided {
        self(ctx, args)
    }
}

/// Materialized service, entity or component
///
/// Instances keep their mutable state behind interior mutability and expose a
/// serializable snapshot of it.
pub trait Instance: DowncastSync {
    /// Serializable snapshot of the instance state
    fn state(&self) -> Result<Value>;
}

impl_downcast!(sync Instance);

/// Declared type of a materializable instance
///
/// The runtime owns construction: rehydration calls [`construct`] with the
/// stored state, cold construction first awaits [`initial_state`]. Types must
/// not replace that sequence; [`overrides_constructor`] reporting `true` is
/// rejected with `OverriddenConstructor`.
///
/// [`construct`]: EntityType::construct
/// [`initial_state`]: EntityType::initial_state
/// [`overrides_constructor`]: EntityType::overrides_constructor
#[async_trait]
pub trait EntityType: Send + Sync {
    /// Type tag used in composite keys and factory attribute names
    fn type_tag(&self) -> &str;

    /// Names of the props that form the instance identity, in key order
    fn identity_props(&self) -> &[&str] {
        &[]
    }

    /// Build an instance from its props and state
    fn construct(&self, props: Props, state: Value) -> Result<Arc<dyn Instance>>;

    /// Produce the initial state of a cold-constructed instance
    async fn initial_state(&self, props: &Props) -> Result<Value>;

    /// Hook run after construction, before the instance is cached
    fn post_construct(&self, _instance: &Arc<dyn Instance>) -> Result<()> {
        Ok(())
    }

    /// Hook run when the instance is released
    fn teardown(&self, _instance: &Arc<dyn Instance>) {}

    /// Whether the type replaces the runtime-owned construction hook
    fn overrides_constructor(&self) -> bool {
        false
    }

    /// Composite key for the given props
    fn key_for(&self, props: &Props) -> Result<CompositeKey> {
        let identity = self
            .identity_props()
            .iter()
            .map(|name| {
                props.get(*name).cloned().ok_or_else(|| {
                    Error::invalid_key(
                        self.type_tag(),
                        format!("missing identity prop '{name}'"),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CompositeKey::new(self.type_tag(), identity))
    }

    /// Identity props recovered from a composite key
    fn props_for(&self, key: &CompositeKey) -> Result<Props> {
        let names = self.identity_props();
        if names.len() != key.identity().len() {
            return Err(Error::invalid_key(
                key.encode(),
                format!(
                    "type '{}' declares {} identity props, key has {}",
                    self.type_tag(),
                    names.len(),
                    key.identity().len()
                ),
            ));
        }
        Ok(names
            .iter()
            .map(|name| name.to_string())
            .zip(key.identity().iter().cloned())
            .collect())
    }
}

// ============================================================================
// Modules
// ============================================================================

/// Export of a module
#[derive(Clone)]
pub enum Export {
    /// Callable symbol
    Handler(Arc<dyn Handler>),
    /// Materializable type
    Type(Arc<dyn EntityType>),
}

impl Export {
    /// Kind of export for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Handler(_) => "handler",
            Self::Type(_) => "type",
        }
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Type(ty) => f.debug_tuple("Type").field(&ty.type_tag()).finish(),
        }
    }
}

/// Named exports of a loaded module
#[derive(Clone, Default, Debug)]
pub struct Module {
    exports: HashMap<String, Export>,
}

impl Module {
    /// Create an empty module
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler export
    pub fn with_handler<S, H>(mut self, name: S, handler: H) -> Self
    where
        S: Into<String>,
        H: Handler + 'static,
    {
        self.exports
            .insert(name.into(), Export::Handler(Arc::new(handler)));
        self
    }

    /// Add an entity type export
    pub fn with_type<S, T>(mut self, name: S, entity_type: T) -> Self
    where
        S: Into<String>,
        T: EntityType + 'static,
    {
        self.exports
            .insert(name.into(), Export::Type(Arc::new(entity_type)));
        self
    }

    /// Add a prepared export
    pub fn with_export<S: Into<String>>(mut self, name: S, export: Export) -> Self {
        self.exports.insert(name.into(), export);
        self
    }

    /// Look up an export
    pub fn export(&self, name: &str) -> Option<&Export> {
        self.exports.get(name)
    }

    /// Sorted export names
    pub fn export_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.exports.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Host module-loading mechanism
///
/// `load` is called at most once per module URL by the symbol resolver; the
/// loader itself does not need to cache.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Loader name for diagnostics
    fn loader_name(&self) -> &str;

    /// Fetch and instantiate the module at `url`
    ///
    /// `url` carries neither fragment nor query. Failures are reported as
    /// `ModuleLoad` errors.
    async fn load(&self, url: &Url) -> Result<Module>;
}

// ============================================================================
// Resolved symbols
// ============================================================================

/// An export located through a QRL, with its captured arguments
#[derive(Clone)]
pub struct ResolvedSymbol {
    url: Url,
    export_name: String,
    export: Export,
    captured: Vec<Value>,
}

impl ResolvedSymbol {
    /// Create a resolved symbol
    pub fn new<S: Into<String>>(url: Url, export_name: S, export: Export, captured: Vec<Value>) -> Self {
        Self {
            url,
            export_name: export_name.into(),
            export,
            captured,
        }
    }

    /// Full URL of the symbol (module URL, `#export`, query)
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Export name inside the module
    pub fn export_name(&self) -> &str {
        &self.export_name
    }

    /// The export itself
    pub fn export(&self) -> &Export {
        &self.export
    }

    /// Captured arguments bound ahead of call-site arguments
    pub fn captured(&self) -> &[Value] {
        &self.captured
    }

    /// Callable with captured arguments pre-bound
    pub fn handler(&self) -> Result<Arc<dyn Handler>> {
        match &self.export {
            Export::Handler(handler) if self.captured.is_empty() => Ok(Arc::clone(handler)),
            Export::Handler(handler) => Ok(Arc::new(BoundHandler {
                inner: Arc::clone(handler),
                captured: self.captured.clone(),
            })),
            Export::Type(_) => Err(Error::symbol_kind(
                self.url.as_str(),
                &self.export_name,
                "handler",
            )),
        }
    }

    /// Entity type behind the symbol
    pub fn entity_type(&self) -> Result<Arc<dyn EntityType>> {
        match &self.export {
            Export::Type(entity_type) => Ok(Arc::clone(entity_type)),
            Export::Handler(_) => Err(Error::symbol_kind(
                self.url.as_str(),
                &self.export_name,
                "type",
            )),
        }
    }

    /// Invoke the symbol as a handler
    pub fn call(&self, ctx: Arc<dyn Injector>, args: Vec<Injected>) -> Provided {
        match self.handler() {
            Ok(handler) => handler.call(ctx, args),
            Err(err) => Provided::error(err),
        }
    }
}

impl fmt::Debug for ResolvedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSymbol")
            .field("url", &self.url.as_str())
            .field("export", &self.export)
            .field("captured", &self.captured)
            .finish()
    }
}

/// Handler with captured arguments placed ahead of runtime arguments
struct BoundHandler {
    inner: Arc<dyn Handler>,
    captured: Vec<Value>,
}

impl Handler for BoundHandler {
    fn call(&self, ctx: Arc<dyn Injector>, args: Vec<Injected>) -> Provided {
        let bound = self
            .captured
            .iter()
            .cloned()
            .map(Injected::Json)
            .chain(args)
            .collect();
        self.inner.call(ctx, bound)
    }
}
