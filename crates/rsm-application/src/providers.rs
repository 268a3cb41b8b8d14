//! Standard providers
//!
//! Ready-made [`Provider`]s for the values a handler commonly needs from its
//! resolution context. Context values (element, event, URL, props) settle
//! synchronously; instances and resolved QRLs are pending.

use crate::inject::{ConcreteType, Provider, ProviderFn};
use crate::ports::injector::{Injected, Injector, Provided};
use crate::ports::symbols::EntityType;
use rsm_domain::error::{Error, Result};
use rsm_domain::{CompositeKey, Qrl};
use serde_json::Value;
use std::sync::Arc;

fn missing(what: &str, ctx: &Arc<dyn Injector>) -> Error {
    Error::internal(format!("no {what} in the resolution context at {}", ctx.element()))
}

/// The context's element
pub fn provide_element() -> Provider {
    Provider::direct(|ctx| Provided::value(Injected::Element(ctx.element())))
}

/// The context itself
pub fn provide_injector() -> Provider {
    Provider::direct(|ctx| Provided::value(Injected::Injector(Arc::clone(ctx))))
}

/// The event being handled
pub fn provide_event() -> Provider {
    Provider::direct(|ctx| match ctx.event() {
        Some(event) => Provided::value(Injected::Event(Arc::clone(event))),
        None => Provided::error(missing("event", ctx)),
    })
}

/// The resolved handler URL
pub fn provide_url() -> Provider {
    Provider::direct(|ctx| match ctx.url() {
        Some(url) => Provided::value(Injected::Url(url.clone())),
        None => Provided::error(missing("handler URL", ctx)),
    })
}

/// Query props of the handler URL
pub fn provide_props() -> Provider {
    Provider::direct(|ctx| match ctx.props() {
        Some(props) => Provided::value(Injected::Props(props.clone())),
        None => Provided::error(missing("props", ctx)),
    })
}

/// A single query prop as a JSON string, `null` when absent
pub fn provide_prop<S: Into<String>>(name: S) -> Provider {
    let name = name.into();
    Provider::direct(move |ctx| {
        let value = ctx
            .props()
            .and_then(|props| props.get(&name))
            .map_or(Value::Null, |value| Value::String(value.clone()));
        Provided::value(Injected::Json(value))
    })
}

/// A constant JSON value
pub fn provide_value(value: Value) -> Provider {
    Provider::direct(move |_| Provided::value(Injected::Json(value.clone())))
}

/// The QRL named by a query prop, resolved relative to the context
pub fn provide_qrl_exp<S: Into<String>>(param: S) -> Provider {
    let param = param.into();
    Provider::direct(move |ctx| {
        let raw = match ctx.props().and_then(|props| props.get(&param)) {
            Some(raw) => raw.clone(),
            None => return Provided::error(missing(&format!("prop '{param}'"), ctx)),
        };
        let qrl: Qrl = match raw.parse() {
            Ok(qrl) => qrl,
            Err(err) => return Provided::error(err),
        };
        let ctx = Arc::clone(ctx);
        Provided::pending(async move { ctx.resolve_qrl(&qrl).await.map(Injected::Symbol) })
    })
}

type KeyFn = dyn Fn(&Arc<dyn Injector>) -> Result<CompositeKey> + Send + Sync;

/// Instance of an entity type, keyed from the context
pub struct EntityProvider {
    entity_type: Arc<dyn EntityType>,
    key: Arc<KeyFn>,
}

impl EntityProvider {
    /// Provider of `entity_type` instances under the key `key` computes
    pub fn new<F>(entity_type: Arc<dyn EntityType>, key: F) -> Self
    where
        F: Fn(&Arc<dyn Injector>) -> Result<CompositeKey> + Send + Sync + 'static,
    {
        Self {
            entity_type,
            key: Arc::new(key),
        }
    }
}

impl ConcreteType for EntityProvider {
    fn resolver(&self) -> ProviderFn {
        let entity_type = Arc::clone(&self.entity_type);
        let key_fn = Arc::clone(&self.key);
        Arc::new(move |ctx: &Arc<dyn Injector>| {
            let key = match key_fn(ctx) {
                Ok(key) => key,
                Err(err) => return Provided::error(err),
            };
            let ctx = Arc::clone(ctx);
            let entity_type = Arc::clone(&entity_type);
            Provided::pending(async move {
                ctx.get_instance(&key, Some(entity_type))
                    .await
                    .map(Injected::Instance)
            })
        })
    }
}

/// Instance of `entity_type` under the key computed by `key`
pub fn provide_entity<F>(entity_type: Arc<dyn EntityType>, key: F) -> Provider
where
    F: Fn(&Arc<dyn Injector>) -> Result<CompositeKey> + Send + Sync + 'static,
{
    Provider::wrapped(EntityProvider::new(entity_type, key))
}

/// Instance of `entity_type` keyed by its identity props from the context
pub fn provide_entity_from_props(entity_type: Arc<dyn EntityType>) -> Provider {
    let keyed = Arc::clone(&entity_type);
    provide_entity(entity_type, move |ctx| {
        let props = ctx.props().cloned().unwrap_or_default();
        keyed.key_for(&props)
    })
}
