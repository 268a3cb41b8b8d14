//! Keyed Instance Cache
//!
//! One [`NodeCache`] per node maps encoded composite keys to materialized
//! instances. Caches are never consulted across nodes: the same key requested
//! at another node yields an independent instance unless that node's
//! attributes name it.
//!
//! ## Single flight
//!
//! At most one instance exists per (node, key). The first lookup of a key
//! installs a shared in-flight materialization; concurrent lookups of the same
//! key await that same future instead of constructing a second instance. The
//! in-flight slot is replaced by the live instance on success and cleared on
//! failure, so a later lookup can retry.
//!
//! ## Eviction
//!
//! Only explicit: [`NodeCache::release`] removes a live instance and runs the
//! type's teardown hook. There is no time- or size-based eviction.

use crate::ports::symbols::{EntityType, Instance};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared};
use rsm_domain::error::Result;
use rsm_domain::{CompositeKey, NodeId};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// A live instance together with the type that built it
#[derive(Clone)]
pub struct CachedInstance {
    /// Key the instance is cached under
    pub key: CompositeKey,
    /// The instance
    pub instance: Arc<dyn Instance>,
    /// Type used for teardown and serialization
    pub entity_type: Arc<dyn EntityType>,
}

type Materializing = Shared<BoxFuture<'static, Result<CachedInstance>>>;

enum Slot {
    Live(CachedInstance),
    Pending(Materializing),
}

/// Instance cache of a single node
#[derive(Default)]
pub struct NodeCache {
    slots: DashMap<String, Slot>,
}

impl NodeCache {
    /// Live instance for an encoded key
    pub fn get(&self, key: &str) -> Option<Arc<dyn Instance>> {
        match self.slots.get(key)?.value() {
            Slot::Live(cached) => Some(Arc::clone(&cached.instance)),
            Slot::Pending(_) => None,
        }
    }

    /// Whether a materialization for the key is in flight
    pub fn is_pending(&self, key: &str) -> bool {
        self.slots
            .get(key)
            .is_some_and(|slot| matches!(slot.value(), Slot::Pending(_)))
    }

    /// Return the live instance for `key`, or materialize it exactly once
    ///
    /// `materialize` is only called when neither a live instance nor an
    /// in-flight materialization exists for the key.
    pub async fn get_or_materialize<F, Fut>(
        &self,
        key: &str,
        materialize: F,
    ) -> Result<Arc<dyn Instance>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<CachedInstance>> + Send + 'static,
    {
        let pending = match self.slots.entry(key.to_string()) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Live(cached) => return Ok(Arc::clone(&cached.instance)),
                Slot::Pending(in_flight) => {
                    debug!(key, "Joining in-flight materialization");
                    in_flight.clone()
                }
            },
            Entry::Vacant(entry) => {
                let in_flight = materialize().boxed().shared();
                entry.insert(Slot::Pending(in_flight.clone()));
                in_flight
            }
        };

        let outcome = pending.clone().await;
        self.settle(key, &pending, &outcome);
        outcome.map(|cached| cached.instance)
    }

    fn settle(&self, key: &str, pending: &Materializing, outcome: &Result<CachedInstance>) {
        if let Entry::Occupied(mut entry) = self.slots.entry(key.to_string()) {
            let same_flight =
                matches!(entry.get(), Slot::Pending(in_flight) if in_flight.ptr_eq(pending));
            if !same_flight {
                return;
            }
            match outcome {
                Ok(cached) => {
                    entry.insert(Slot::Live(cached.clone()));
                }
                Err(_) => {
                    entry.remove();
                }
            }
        }
    }

    /// Remove a live instance and run its teardown hook
    pub fn release(&self, key: &str) -> Option<CachedInstance> {
        let (_, slot) = self
            .slots
            .remove_if(key, |_, slot| matches!(slot, Slot::Live(_)))?;
        match slot {
            Slot::Live(cached) => {
                cached.entity_type.teardown(&cached.instance);
                debug!(key, "Released instance");
                Some(cached)
            }
            Slot::Pending(_) => None,
        }
    }

    /// Release every live instance
    pub fn release_all(&self) -> Vec<CachedInstance> {
        let keys: Vec<String> = self
            .slots
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::Live(_)))
            .map(|slot| slot.key().clone())
            .collect();
        keys.iter().filter_map(|key| self.release(key)).collect()
    }

    /// Snapshot of the live instances
    pub fn live(&self) -> Vec<CachedInstance> {
        self.slots
            .iter()
            .filter_map(|slot| match slot.value() {
                Slot::Live(cached) => Some(cached.clone()),
                Slot::Pending(_) => None,
            })
            .collect()
    }

    /// Number of live instances
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::Live(_)))
            .count()
    }

    /// Whether the cache holds no live instance
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-node instance caches of a runtime
#[derive(Default)]
pub struct InstanceCaches {
    nodes: DashMap<NodeId, Arc<NodeCache>>,
}

impl InstanceCaches {
    /// Create an empty cache set
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache of `node`, created on first access
    pub fn node(&self, node: NodeId) -> Arc<NodeCache> {
        Arc::clone(self.nodes.entry(node).or_default().value())
    }

    /// Cache of `node`, if one was ever created
    pub fn existing(&self, node: NodeId) -> Option<Arc<NodeCache>> {
        self.nodes.get(&node).map(|cache| Arc::clone(cache.value()))
    }

    /// Release one instance owned by `node`
    pub fn release(&self, node: NodeId, key: &str) -> Option<CachedInstance> {
        self.existing(node)?.release(key)
    }

    /// Release every instance owned by `node` and drop its cache
    pub fn release_node(&self, node: NodeId) -> Vec<CachedInstance> {
        match self.nodes.remove(&node) {
            Some((_, cache)) => cache.release_all(),
            None => Vec::new(),
        }
    }

    /// Nodes that currently own a cache
    pub fn owners(&self) -> Vec<NodeId> {
        let mut owners: Vec<NodeId> = self.nodes.iter().map(|entry| *entry.key()).collect();
        owners.sort_unstable();
        owners
    }
}

/// Entity types known by type tag
///
/// Types are remembered once they were passed as hints or resolved from a
/// factory attribute, so rehydration does not re-resolve factories.
#[derive(Default)]
pub struct TypeRegistry {
    types: DashMap<String, Arc<dyn EntityType>>,
}

impl TypeRegistry {
    /// Remember a type under its tag
    pub fn register(&self, entity_type: Arc<dyn EntityType>) {
        self.types
            .insert(entity_type.type_tag().to_string(), entity_type);
    }

    /// Known type for a tag
    pub fn get(&self, type_tag: &str) -> Option<Arc<dyn EntityType>> {
        self.types.get(type_tag).map(|entry| Arc::clone(entry.value()))
    }
}
