//! Element-scoped context
//!
//! Lookup order for a key at a node:
//!
//! 1. live instance in the node cache
//! 2. non-empty state attribute named by the encoded key: rehydrate
//! 3. factory attribute for the key's type tag: cold construction
//! 4. otherwise repeat 1-3 on each ancestor below the parent scope, then ask
//!    the parent scope; at the root the lookup fails
//!
//! The nearest node that claims the key owns it. Ownership is decided before
//! anything is constructed, and the owner's node cache coalesces concurrent
//! materializations of the same key.

use crate::instances::{CachedInstance, NodeCache};
use crate::ports::injector::Injector;
use crate::ports::symbols::{EntityType, Instance, ResolvedSymbol};
use crate::runtime::Runtime;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use rsm_domain::error::{Error, Result};
use rsm_domain::ports::JsonCodec;
use rsm_domain::{Codec, CompositeKey, NodeId, Qrl};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Resolution context bound to one node
pub struct ElementInjector {
    runtime: Arc<Runtime>,
    node: NodeId,
    parent: OnceLock<Option<Arc<ElementInjector>>>,
}

enum Materialize {
    Rehydrate(String),
    Construct(String),
}

enum Claim {
    Live(NodeId, Arc<dyn Instance>),
    Owned {
        owner: NodeId,
        cache: Arc<NodeCache>,
        plan: Option<Materialize>,
    },
}

impl ElementInjector {
    pub(crate) fn new(runtime: Arc<Runtime>, node: NodeId) -> Self {
        Self {
            runtime,
            node,
            parent: OnceLock::new(),
        }
    }

    /// Runtime this context belongs to
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Next-outer element-scoped context
    pub fn parent_injector(&self) -> Option<&Arc<ElementInjector>> {
        self.parent
            .get_or_init(|| {
                self.runtime
                    .parent_scope(self.node)
                    .map(|scope| Arc::new(ElementInjector::new(Arc::clone(&self.runtime), scope)))
            })
            .as_ref()
    }

    /// Instance for `key`, walking outward from this node
    ///
    /// Every node from this one up to (not including) the parent scope is a
    /// candidate owner; the first that claims the key materializes it.
    /// `origin` is the node the lookup started at, used for diagnostics.
    fn lookup<'a>(
        &'a self,
        key: &'a CompositeKey,
        type_hint: Option<Arc<dyn EntityType>>,
        origin: NodeId,
    ) -> BoxFuture<'a, Result<Arc<dyn Instance>>> {
        async move {
            let encoded = key.encode();
            let factory_attribute = self.runtime.settings().factory_attribute(key.type_tag());
            let parent = self.parent_injector();
            let scope_end = parent.map(|parent| parent.node);

            let claim = std::iter::once(self.node)
                .chain(self.runtime.attributes().ancestors(self.node))
                .take_while(|&candidate| Some(candidate) != scope_end)
                .find_map(|candidate| self.claim(candidate, &encoded, &factory_attribute));

            match claim {
                Some(Claim::Live(owner, instance)) => {
                    debug!(key = %encoded, node = %owner, "Instance cache hit");
                    Ok(instance)
                }
                Some(Claim::Owned { owner, cache, plan }) => {
                    let runtime = Arc::clone(&self.runtime);
                    let owned_key = key.clone();
                    cache
                        .get_or_materialize(&encoded, move || async move {
                            match plan {
                                Some(plan) => {
                                    materialize(runtime, owner, owned_key, plan, type_hint).await
                                }
                                None => Err(Error::no_attribute_found(
                                    owned_key.encode(),
                                    Some(runtime.settings().factory_attribute(owned_key.type_tag())),
                                    runtime.attributes().describe(owner),
                                )),
                            }
                        })
                        .await
                }
                None => match parent {
                    Some(parent) => parent.lookup(key, type_hint, origin).await,
                    None => Err(Error::no_attribute_found(
                        encoded,
                        Some(factory_attribute),
                        self.runtime.attributes().describe(origin),
                    )),
                },
            }
        }
        .boxed()
    }

    /// Whether `candidate` owns `encoded`: live, in flight, or declared by attribute
    fn claim(&self, candidate: NodeId, encoded: &str, factory_attribute: &str) -> Option<Claim> {
        let existing = self.runtime.instances().existing(candidate);
        if let Some(instance) = existing.as_ref().and_then(|cache| cache.get(encoded)) {
            return Some(Claim::Live(candidate, instance));
        }
        let pending = existing
            .as_ref()
            .is_some_and(|cache| cache.is_pending(encoded));

        let attributes = self.runtime.attributes();
        let plan = attributes
            .get_non_empty(candidate, encoded)
            .map(Materialize::Rehydrate)
            .or_else(|| {
                attributes
                    .get_non_empty(candidate, factory_attribute)
                    .map(Materialize::Construct)
            });
        if plan.is_none() && !pending {
            return None;
        }
        Some(Claim::Owned {
            owner: candidate,
            cache: existing.unwrap_or_else(|| self.runtime.instances().node(candidate)),
            plan,
        })
    }

    /// Write the state of every live instance of this node into its key attribute
    pub(crate) fn write_state(&self) -> Result<usize> {
        let Some(cache) = self.runtime.instances().existing(self.node) else {
            return Ok(0);
        };
        let codec = JsonCodec::<Value>::new();
        let mut written = 0;
        for cached in cache.live() {
            let state = codec.encode(&cached.instance.state()?)?;
            self.runtime
                .attributes()
                .set(self.node, &cached.key.encode(), &state)?;
            written += 1;
        }
        debug!(node = %self.node, written, "Wrote instance state");
        Ok(written)
    }
}

async fn materialize(
    runtime: Arc<Runtime>,
    node: NodeId,
    key: CompositeKey,
    plan: Materialize,
    type_hint: Option<Arc<dyn EntityType>>,
) -> Result<CachedInstance> {
    match plan {
        Materialize::Rehydrate(raw_state) => {
            let entity_type = match type_hint.or_else(|| runtime.types().get(key.type_tag())) {
                Some(entity_type) => entity_type,
                None => runtime.factory_type(node, key.type_tag()).await?,
            };
            if entity_type.overrides_constructor() {
                return Err(Error::overridden_constructor(key.type_tag()));
            }
            runtime.register_type(Arc::clone(&entity_type));

            let props = entity_type.props_for(&key)?;
            let state = JsonCodec::<Value>::new().decode(&raw_state)?;
            let instance = entity_type.construct(props, state)?;
            entity_type.post_construct(&instance)?;
            debug!(key = %key, node = %node, "Rehydrated instance");
            Ok(CachedInstance {
                key,
                instance,
                entity_type,
            })
        }
        Materialize::Construct(factory) => {
            let qrl: Qrl = factory.parse()?;
            let entity_type = runtime.resolve(&qrl, node).await?.entity_type()?;
            if entity_type.overrides_constructor() {
                return Err(Error::overridden_constructor(key.type_tag()));
            }
            runtime.register_type(Arc::clone(&entity_type));

            let props = entity_type.props_for(&key)?;
            let state = entity_type.initial_state(&props).await?;
            let instance = entity_type.construct(props, state)?;
            entity_type.post_construct(&instance)?;
            // Empty marker: the node owns the key until state is serialized.
            runtime.attributes().set(node, &key.encode(), "")?;
            info!(key = %key, node = %node, factory = %qrl, "Constructed instance");
            Ok(CachedInstance {
                key,
                instance,
                entity_type,
            })
        }
    }
}

#[async_trait]
impl Injector for ElementInjector {
    fn element(&self) -> NodeId {
        self.node
    }

    fn parent(&self) -> Option<Arc<dyn Injector>> {
        self.parent_injector()
            .map(|parent| Arc::clone(parent) as Arc<dyn Injector>)
    }

    async fn get_instance(
        &self,
        key: &CompositeKey,
        type_hint: Option<Arc<dyn EntityType>>,
    ) -> Result<Arc<dyn Instance>> {
        self.lookup(key, type_hint, self.node).await
    }

    async fn resolve_qrl(&self, qrl: &Qrl) -> Result<ResolvedSymbol> {
        self.runtime.resolve(qrl, self.node).await
    }

    fn serialize(&self) -> Result<usize> {
        self.write_state()
    }
}
