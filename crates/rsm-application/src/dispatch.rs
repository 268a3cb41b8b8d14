//! Event Dispatch
//!
//! Finds the closest listener attribute for an event, starting at the event
//! target and walking toward the root. Only the nearest listener runs. The
//! listener's QRL is resolved relative to the listener node and invoked with
//! `[element, event, url]` and an event-scoped context.
//!
//! A listener that is present but cannot be resolved or invoked fails loudly;
//! an event nobody listens to is reported as [`DispatchOutcome::Unhandled`].

use crate::injector::EventInjector;
use crate::ports::injector::{Injected, Injector, Provided};
use crate::ports::symbols::{Handler, Module};
use crate::runtime::Runtime;
use rsm_domain::error::{Error, Result};
use rsm_domain::{Event, NodeId, Qrl};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// URL of the builtin events module
pub const EVENTS_MODULE_URL: &str = "builtin:/events";

/// Export name of the builtin re-emit handler
pub const EMIT_EVENT_EXPORT: &str = "emitEvent";

/// Result of dispatching one event
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A listener handled the event
    Handled {
        /// Node carrying the listener attribute
        node: NodeId,
        /// Resolved handler URL
        url: Url,
        /// Value the handler settled with
        result: Injected,
    },
    /// No listener was found between the target and the root
    Unhandled,
}

impl DispatchOutcome {
    /// Whether a listener handled the event
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }

    /// Node of the listener that handled the event
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Handled { node, .. } => Some(*node),
            Self::Unhandled => None,
        }
    }

    /// Handler result, [`Injected::Unit`] when unhandled
    pub fn into_injected(self) -> Injected {
        match self {
            Self::Handled { result, .. } => result,
            Self::Unhandled => Injected::Unit,
        }
    }
}

/// Dispatches events through the document of a runtime
#[derive(Clone)]
pub struct Dispatcher {
    runtime: Arc<Runtime>,
}

impl Dispatcher {
    /// Create a dispatcher
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }

    /// Runtime this dispatcher works on
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Dispatch `event` to the closest listener of its type
    pub async fn dispatch(&self, event: Event) -> Result<DispatchOutcome> {
        self.runtime.ensure_attached(event.target)?;
        let attribute = self.runtime.settings().event_attribute(&event.event_type);
        let Some((node, value)) = self
            .runtime
            .attributes()
            .find_closest(event.target, &attribute)
        else {
            debug!(event = %event.event_type, target = %event.target, "No listener");
            return Ok(DispatchOutcome::Unhandled);
        };

        let event = Arc::new(event);
        self.invoke(node, &value, Arc::clone(&event))
            .await
            .inspect_err(|e| {
                warn!(
                    event = %event.event_type,
                    node = %node,
                    listener = %value,
                    error = %e,
                    "Listener failed"
                );
            })
    }

    async fn invoke(&self, node: NodeId, listener: &str, event: Arc<Event>) -> Result<DispatchOutcome> {
        let qrl: Qrl = listener.parse()?;
        let symbol = self.runtime.resolve(&qrl, node).await?;
        let handler = symbol.handler()?;
        let url = symbol.url().clone();

        let ctx: Arc<dyn Injector> = Arc::new(EventInjector::new(
            Arc::clone(&self.runtime),
            node,
            Arc::clone(&event),
            url.clone(),
        ));
        let args = vec![
            Injected::Element(node),
            Injected::Event(event),
            Injected::Url(url.clone()),
        ];
        debug!(node = %node, url = %url, "Invoking listener");
        let result = handler.call(ctx, args).settle().await?;
        Ok(DispatchOutcome::Handled { node, url, result })
    }
}

/// Builtin handler re-emitting a new event from the listener node
///
/// Only usable as an event listener: outside an event-scoped context there is
/// no handler URL to read `$type` from.
pub struct EmitEventHandler;

impl Handler for EmitEventHandler {
    fn call(&self, ctx: Arc<dyn Injector>, _args: Vec<Injected>) -> Provided {
        match ctx.downcast_arc::<EventInjector>() {
            Ok(injector) => Provided::pending(async move {
                injector.emit().await.map(DispatchOutcome::into_injected)
            }),
            Err(ctx) => Provided::error(Error::missing_event_type(format!(
                "{EVENTS_MODULE_URL}#{EMIT_EVENT_EXPORT} outside an event context at {}",
                ctx.element()
            ))),
        }
    }
}

/// The builtin events module
pub fn events_module() -> Module {
    Module::new().with_handler(EMIT_EVENT_EXPORT, EmitEventHandler)
}
