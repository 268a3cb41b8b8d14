//! Resolution Context Port
//!
//! An [`Injector`] is a node-scoped resolution context. Element-scoped
//! contexts own a per-node instance cache; event-scoped contexts are transient
//! and delegate every instance lookup to their parent.
//!
//! Values handed to providers and handlers travel as [`Injected`]; a provider
//! or handler answers with [`Provided`], which is either already settled or a
//! pending future.

use crate::ports::symbols::{EntityType, Instance, ResolvedSymbol};
use async_trait::async_trait;
use downcast_rs::{DowncastSync, impl_downcast};
use futures::future::BoxFuture;
use rsm_domain::error::{Error, Result};
use rsm_domain::{CompositeKey, Event, NodeId, Props, Qrl};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use url::Url;

/// Node-scoped resolution context
#[async_trait]
pub trait Injector: DowncastSync {
    /// Node this context is bound to
    fn element(&self) -> NodeId;

    /// Next-outer context, `None` at the root
    ///
    /// Computed lazily and stable for the lifetime of this context.
    fn parent(&self) -> Option<Arc<dyn Injector>>;

    /// Locate or materialize the instance identified by `key`
    async fn get_instance(
        &self,
        key: &CompositeKey,
        type_hint: Option<Arc<dyn EntityType>>,
    ) -> Result<Arc<dyn Instance>>;

    /// Resolve a QRL relative to this context's element
    async fn resolve_qrl(&self, qrl: &Qrl) -> Result<ResolvedSymbol>;

    /// Event being handled (event-scoped contexts only)
    fn event(&self) -> Option<&Arc<Event>> {
        None
    }

    /// Resolved handler URL (event-scoped contexts only)
    fn url(&self) -> Option<&Url> {
        None
    }

    /// Query props of the handler URL (event-scoped contexts only)
    fn props(&self) -> Option<&Props> {
        None
    }

    /// Persist the state of every instance owned by this context
    ///
    /// Returns the number of instances written.
    fn serialize(&self) -> Result<usize>;
}

impl_downcast!(sync Injector);

/// Value passed between providers and handlers
#[derive(Clone)]
pub enum Injected {
    /// No value
    Unit,
    /// Plain JSON value (captured arguments, constants, handler results)
    Json(Value),
    /// Materialized service, entity or component instance
    Instance(Arc<dyn Instance>),
    /// Document node
    Element(NodeId),
    /// Event being handled
    Event(Arc<Event>),
    /// Resolved handler URL
    Url(Url),
    /// Flat property map
    Props(Props),
    /// Resolved QRL
    Symbol(ResolvedSymbol),
    /// Resolution context
    Injector(Arc<dyn Injector>),
}

impl Injected {
    /// Short name of the variant for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Json(_) => "json",
            Self::Instance(_) => "instance",
            Self::Element(_) => "element",
            Self::Event(_) => "event",
            Self::Url(_) => "url",
            Self::Props(_) => "props",
            Self::Symbol(_) => "symbol",
            Self::Injector(_) => "injector",
        }
    }

    /// JSON payload, if this is a JSON value
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Node, if this is an element
    pub fn as_element(&self) -> Option<NodeId> {
        match self {
            Self::Element(node) => Some(*node),
            _ => None,
        }
    }

    /// Event, if this is an event
    pub fn as_event(&self) -> Option<&Arc<Event>> {
        match self {
            Self::Event(event) => Some(event),
            _ => None,
        }
    }

    /// URL, if this is a URL
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    /// Props, if this is a property map
    pub fn as_props(&self) -> Option<&Props> {
        match self {
            Self::Props(props) => Some(props),
            _ => None,
        }
    }

    /// Symbol, if this is a resolved QRL
    pub fn as_symbol(&self) -> Option<&ResolvedSymbol> {
        match self {
            Self::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Context, if this is an injector
    pub fn as_injector(&self) -> Option<&Arc<dyn Injector>> {
        match self {
            Self::Injector(injector) => Some(injector),
            _ => None,
        }
    }

    /// Raw instance handle, if this is an instance
    pub fn as_instance(&self) -> Option<&Arc<dyn Instance>> {
        match self {
            Self::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Instance downcast to its concrete type
    pub fn instance<T: Instance>(&self) -> Option<Arc<T>> {
        self.as_instance()
            .and_then(|instance| Arc::clone(instance).downcast_arc::<T>().ok())
    }
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("Unit"),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Instance(_) => f.write_str("Instance(..)"),
            Self::Element(node) => f.debug_tuple("Element").field(node).finish(),
            Self::Event(event) => f.debug_tuple("Event").field(&event.event_type).finish(),
            Self::Url(url) => f.debug_tuple("Url").field(&url.as_str()).finish(),
            Self::Props(props) => f.debug_tuple("Props").field(props).finish(),
            Self::Symbol(symbol) => f.debug_tuple("Symbol").field(&symbol.url().as_str()).finish(),
            Self::Injector(injector) => f.debug_tuple("Injector").field(&injector.element()).finish(),
        }
    }
}

impl From<Value> for Injected {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Arc<dyn Instance>> for Injected {
    fn from(instance: Arc<dyn Instance>) -> Self {
        Self::Instance(instance)
    }
}

/// Outcome of a provider or handler: settled now, or pending
pub enum Provided {
    /// Settled in the current turn
    Ready(Result<Injected>),
    /// Settles when the future completes
    Pending(BoxFuture<'static, Result<Injected>>),
}

impl Provided {
    /// Settled value
    pub fn value(value: Injected) -> Self {
        Self::Ready(Ok(value))
    }

    /// Settled failure
    pub fn error(error: Error) -> Self {
        Self::Ready(Err(error))
    }

    /// Pending value
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Injected>> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }

    /// Whether the outcome is already settled
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Settled outcome without awaiting, `None` when pending
    pub fn now(self) -> Option<Result<Injected>> {
        match self {
            Self::Ready(result) => Some(result),
            Self::Pending(_) => None,
        }
    }

    /// Await the outcome
    pub async fn settle(self) -> Result<Injected> {
        match self {
            Self::Ready(result) => result,
            Self::Pending(future) => future.await,
        }
    }
}

impl From<Result<Injected>> for Provided {
    fn from(result: Result<Injected>) -> Self {
        Self::Ready(result)
    }
}

impl fmt::Debug for Provided {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}
