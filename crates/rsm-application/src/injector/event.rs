//! Event-scoped context
//!
//! Created by the dispatcher for one handler invocation. It exposes the event,
//! the resolved handler URL and the URL's query props (without `$capture`),
//! and delegates instance lookups to the element-scoped context of the
//! listener node. It owns no cache and cannot be serialized.

use crate::dispatch::DispatchOutcome;
use crate::injector::ElementInjector;
use crate::ports::injector::Injector;
use crate::ports::symbols::{EntityType, Instance, ResolvedSymbol};
use crate::runtime::Runtime;
use async_trait::async_trait;
use rsm_domain::constants::{CAPTURE_PARAM, EVENT_TYPE_PARAM};
use rsm_domain::error::{Error, Result};
use rsm_domain::{CompositeKey, Event, NodeId, Props, Qrl};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Resolution context of one dispatched event
pub struct EventInjector {
    runtime: Arc<Runtime>,
    element: Arc<ElementInjector>,
    event: Arc<Event>,
    url: Url,
    props: Props,
}

impl EventInjector {
    /// Context for `event` handled at `node` by the handler at `url`
    pub fn new(runtime: Arc<Runtime>, node: NodeId, event: Arc<Event>, url: Url) -> Self {
        let props = url
            .query_pairs()
            .into_owned()
            .filter(|(name, _)| name.as_str() != CAPTURE_PARAM)
            .collect();
        Self {
            element: Arc::new(ElementInjector::new(Arc::clone(&runtime), node)),
            runtime,
            event,
            url,
            props,
        }
    }

    /// Element-scoped context of the listener node
    pub fn element_injector(&self) -> &Arc<ElementInjector> {
        &self.element
    }

    /// Re-emit a new event from the listener node
    ///
    /// The event type comes from the `$type` prop of the handler URL; every
    /// other prop becomes an event property. Bubbling
    /// starts at the listener node itself. Fails when no listener handles the
    /// new event.
    pub async fn emit(&self) -> Result<DispatchOutcome> {
        let event_type = self
            .props
            .get(EVENT_TYPE_PARAM)
            .cloned()
            .ok_or_else(|| Error::missing_event_type(self.url.as_str()))?;
        let properties: Props = self
            .props
            .iter()
            .filter(|(name, _)| name.as_str() != EVENT_TYPE_PARAM)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let node = self.element.element();
        let event = Event::new(event_type.clone(), node).with_properties(properties);
        debug!(event = %event_type, node = %node, source = %self.event.event_type, "Re-emitting event");

        match self.runtime.dispatcher().dispatch(event).await? {
            DispatchOutcome::Unhandled => Err(Error::no_listener_found(
                &event_type,
                self.runtime.settings().event_attribute(&event_type),
                self.runtime.attributes().describe(node),
            )),
            handled => Ok(handled),
        }
    }
}

#[async_trait]
impl Injector for EventInjector {
    fn element(&self) -> NodeId {
        self.element.element()
    }

    fn parent(&self) -> Option<Arc<dyn Injector>> {
        Some(Arc::clone(&self.element) as Arc<dyn Injector>)
    }

    async fn get_instance(
        &self,
        key: &CompositeKey,
        type_hint: Option<Arc<dyn EntityType>>,
    ) -> Result<Arc<dyn Instance>> {
        self.element.get_instance(key, type_hint).await
    }

    async fn resolve_qrl(&self, qrl: &Qrl) -> Result<ResolvedSymbol> {
        self.element.resolve_qrl(qrl).await
    }

    fn event(&self) -> Option<&Arc<Event>> {
        Some(&self.event)
    }

    fn url(&self) -> Option<&Url> {
        Some(&self.url)
    }

    fn props(&self) -> Option<&Props> {
        Some(&self.props)
    }

    fn serialize(&self) -> Result<usize> {
        Err(Error::not_serializable(format!(
            "event context of '{}' at {}",
            self.event.event_type,
            self.runtime.attributes().describe(self.element.element())
        )))
    }
}
